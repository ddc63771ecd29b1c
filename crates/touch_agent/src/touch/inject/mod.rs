//! Tap injection through interchangeable transports
//!
//! Every strategy emits the same ten-event sequence from
//! [`tap_sequence`](super::codec::tap_sequence); they differ only in how
//! the events reach the device node:
//! - `sendevent`: one `sendevent` invocation per event
//! - `inline`: raw records written through `printf` escapes, then `dd`
//! - `push`: raw records written locally, pushed, then `dd`

mod inline;
mod push;
mod sendevent;

pub use inline::{shell_escape_bytes, InlineBinaryInjector};
pub use push::PushFileInjector;
pub use sendevent::SendEventInjector;

use super::discovery::{discover_with_source, DiscoverySource, TouchDeviceInfo};
use super::translate::{translate, ScreenSize};
use crate::adb::DeviceChannel;
use crate::config::TIMING_CONFIG;
use crate::error::{Result, TouchError};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Delivers one tap at device-native coordinates
#[async_trait]
pub trait TouchInjector: Send + Sync {
    /// Short strategy name used in logs
    fn name(&self) -> &'static str;

    /// Emit the tap sequence for `(x, y)` onto `device`
    async fn inject(
        &self,
        channel: &dyn DeviceChannel,
        device: &TouchDeviceInfo,
        x: i32,
        y: i32,
    ) -> Result<()>;
}

/// Selectable injection transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InjectionStrategy {
    #[default]
    SendEvent,
    InlineBinary,
    PushFile,
}

impl InjectionStrategy {
    pub const ALL: [InjectionStrategy; 3] = [
        InjectionStrategy::SendEvent,
        InjectionStrategy::InlineBinary,
        InjectionStrategy::PushFile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendEvent => "sendevent",
            Self::InlineBinary => "inline",
            Self::PushFile => "push",
        }
    }

    /// Injector implementing this strategy with the global configuration
    pub fn injector(&self) -> Box<dyn TouchInjector> {
        match self {
            Self::SendEvent => Box::new(SendEventInjector::new()),
            Self::InlineBinary => Box::new(InlineBinaryInjector),
            Self::PushFile => Box::new(PushFileInjector),
        }
    }
}

impl fmt::Display for InjectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InjectionStrategy {
    type Err = TouchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sendevent" | "command" => Ok(Self::SendEvent),
            "inline" | "inline-binary" => Ok(Self::InlineBinary),
            "push" | "push-file" => Ok(Self::PushFile),
            other => Err(TouchError::InvalidStrategy(other.to_string())),
        }
    }
}

/// What a completed tap resolved to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TapReport {
    pub strategy: &'static str,
    pub device: TouchDeviceInfo,
    pub source: DiscoverySource,
    pub screen: ScreenSize,
    pub device_x: i32,
    pub device_y: i32,
}

/// Use `supplied`, else ask the device, else the 1080x1920 default
pub async fn resolve_screen_size(
    channel: &dyn DeviceChannel,
    supplied: Option<ScreenSize>,
) -> ScreenSize {
    if let Some(size) = supplied {
        return size;
    }
    match channel.screen_size().await {
        Ok(size) => size,
        Err(e) => {
            warn!("Could not read screen size, using {:?}: {}", ScreenSize::DEFAULT, e);
            ScreenSize::DEFAULT
        }
    }
}

/// Tap at screen pixel `(x, y)`: discover the touchscreen, translate the
/// point into its native range and inject through `injector`.
pub async fn tap(
    injector: &dyn TouchInjector,
    channel: &dyn DeviceChannel,
    x: f64,
    y: f64,
    screen: Option<ScreenSize>,
) -> Result<TapReport> {
    let (device, source) = discover_with_source(channel).await;
    let screen = resolve_screen_size(channel, screen).await;
    let (device_x, device_y) = translate(x, y, screen, &device);

    info!(
        "Tap ({}, {}) on {}x{} -> {} ({}, {}) via {}",
        x,
        y,
        screen.width,
        screen.height,
        device.path,
        device_x,
        device_y,
        injector.name()
    );

    injector.inject(channel, &device, device_x, device_y).await?;

    Ok(TapReport {
        strategy: injector.name(),
        device,
        source,
        screen,
        device_x,
        device_y,
    })
}

/// Fresh device-side path for one event buffer
pub(crate) fn device_tmp_path(tag: &str) -> String {
    format!(
        "{}/touch_{}_{}.bin",
        TIMING_CONFIG.injection.device_tmp_dir.trim_end_matches('/'),
        tag,
        Uuid::new_v4().simple()
    )
}

/// `rm -f` a device file; failures are logged, never returned
pub(crate) async fn remove_device_file(channel: &dyn DeviceChannel, path: &str) {
    match channel.shell(&["rm", "-f", path]).await {
        Ok(output) if output.success() => debug!("Removed {}", path),
        Ok(output) => warn!("Could not remove {}: {}", path, output.combined()),
        Err(e) => warn!("Could not remove {}: {}", path, e),
    }
}

/// Copy exactly `len` bytes from `source` onto the device node
pub(crate) async fn copy_to_node(
    channel: &dyn DeviceChannel,
    source: &str,
    node: &str,
    len: usize,
) -> Result<()> {
    let input = format!("if={}", source);
    let output = format!("of={}", node);
    let block = format!("bs={}", len);
    channel
        .shell(&["dd", input.as_str(), output.as_str(), block.as_str(), "count=1"])
        .await?
        .check("dd")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::scripted::ScriptedChannel;

    const PANEL_DUMP: &str = "\
/dev/input/event3: Touch Panel
  ABS_MT_POSITION_X : value 0, min 0, max 4095
  ABS_MT_POSITION_Y : value 0, min 0, max 4095
  INPUT_PROP_DIRECT
";

    #[test]
    fn test_strategy_round_trips_through_str() {
        for strategy in InjectionStrategy::ALL {
            let parsed: InjectionStrategy = strategy.to_string().parse().unwrap();
            assert_eq!(parsed, strategy);
            assert_eq!(strategy.injector().name(), strategy.as_str());
        }
        assert!("swipe".parse::<InjectionStrategy>().is_err());
    }

    #[test]
    fn test_device_tmp_paths_are_unique() {
        let a = device_tmp_path("push");
        let b = device_tmp_path("push");
        assert_ne!(a, b);
        assert!(a.starts_with("/data/local/tmp/touch_push_"));
    }

    #[tokio::test]
    async fn test_screen_size_defaults_when_unreadable() {
        let channel = ScriptedChannel::new().on("wm size", "wm: not found");
        assert_eq!(resolve_screen_size(&channel, None).await, ScreenSize::DEFAULT);

        let supplied = ScreenSize::new(720, 1280);
        assert_eq!(
            resolve_screen_size(&channel, supplied).await,
            supplied.unwrap()
        );
    }

    #[tokio::test]
    async fn test_tap_translates_before_injecting() {
        let channel = ScriptedChannel::new()
            .on("getevent -lp", PANEL_DUMP)
            .on("wm size", "Physical size: 1080x1920\n");
        let injector = SendEventInjector::with_pair_delay(std::time::Duration::ZERO);

        let report = tap(&injector, &channel, 1080.0, 0.0, None).await.unwrap();

        assert_eq!((report.device_x, report.device_y), (4095, 0));
        assert_eq!(report.device.path, "/dev/input/event3");
        let calls = channel.calls();
        assert_eq!(calls[0], "getevent -lp");
        assert_eq!(calls[1], "wm size");
        assert_eq!(calls[2], "sendevent /dev/input/event3 3 53 00004095");
    }

    #[tokio::test]
    async fn test_tap_uses_default_screen() {
        let channel = ScriptedChannel::new().on("getevent -lp", PANEL_DUMP);
        let injector = SendEventInjector::with_pair_delay(std::time::Duration::ZERO);

        let report = tap(&injector, &channel, 540.0, 960.0, None).await.unwrap();

        assert_eq!(report.screen, ScreenSize::DEFAULT);
        assert_eq!((report.device_x, report.device_y), (2048, 2048));
    }
}
