//! Tap injection through individual `sendevent` invocations

use super::TouchInjector;
use crate::adb::DeviceChannel;
use crate::config::TIMING_CONFIG;
use crate::error::Result;
use crate::touch::codec::{
    tap_sequence, InputEvent, ABS_MT_POSITION_X, ABS_MT_POSITION_Y, EV_ABS,
};
use crate::touch::discovery::TouchDeviceInfo;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Sends each event as its own shell command, pausing after every pair
#[derive(Debug, Clone)]
pub struct SendEventInjector {
    pair_delay: Duration,
}

impl SendEventInjector {
    pub fn new() -> Self {
        Self::with_pair_delay(TIMING_CONFIG.injection.event_pair_delay())
    }

    pub fn with_pair_delay(pair_delay: Duration) -> Self {
        Self { pair_delay }
    }
}

impl Default for SendEventInjector {
    fn default() -> Self {
        Self::new()
    }
}

/// Position values are zero-padded to eight digits
fn format_value(event: &InputEvent) -> String {
    let is_position = event.event_type == EV_ABS
        && (event.code == ABS_MT_POSITION_X || event.code == ABS_MT_POSITION_Y);
    if is_position {
        format!("{:08}", event.value)
    } else {
        event.value.to_string()
    }
}

#[async_trait]
impl TouchInjector for SendEventInjector {
    fn name(&self) -> &'static str {
        "sendevent"
    }

    async fn inject(
        &self,
        channel: &dyn DeviceChannel,
        device: &TouchDeviceInfo,
        x: i32,
        y: i32,
    ) -> Result<()> {
        for (index, event) in tap_sequence(x, y).iter().enumerate() {
            let event_type = event.event_type.to_string();
            let code = event.code.to_string();
            let value = format_value(event);

            let args = [
                "sendevent",
                device.path.as_str(),
                event_type.as_str(),
                code.as_str(),
                value.as_str(),
            ];
            channel
                .shell(&args)
                .await
                .and_then(|output| output.check("sendevent"))
                .map_err(|e| {
                    e.context(format!(
                        "sendevent injection failed at event {} on {}",
                        index + 1,
                        device.path
                    ))
                })?;

            if index % 2 == 1 {
                tokio::time::sleep(self.pair_delay).await;
            }
        }

        debug!("sendevent tap ({}, {}) delivered to {}", x, y, device.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::scripted::ScriptedChannel;
    use crate::error::TouchError;

    fn device() -> TouchDeviceInfo {
        TouchDeviceInfo::with_default_ranges("3", "/dev/input/event3")
    }

    #[tokio::test]
    async fn test_issues_ten_commands_in_order() {
        let channel = ScriptedChannel::new();
        let injector = SendEventInjector::with_pair_delay(Duration::ZERO);

        injector.inject(&channel, &device(), 1234, 56).await.unwrap();

        let expected: Vec<String> = [
            "3 53 00001234",
            "3 54 00000056",
            "0 2 0",
            "0 0 0",
            "3 53 00001234",
            "3 54 00000056",
            "0 2 0",
            "0 0 0",
            "0 2 0",
            "0 0 0",
        ]
        .iter()
        .map(|args| format!("sendevent /dev/input/event3 {}", args))
        .collect();
        assert_eq!(channel.calls(), expected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_after_each_pair() {
        let channel = ScriptedChannel::new();
        let injector = SendEventInjector::with_pair_delay(Duration::from_millis(50));

        let started = tokio::time::Instant::now();
        injector.inject(&channel, &device(), 1, 1).await.unwrap();

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(250));
        assert!(elapsed < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_stops_on_first_failure() {
        let channel =
            ScriptedChannel::new().exit_with("sendevent", 1, "could not open /dev/input/event3");
        let injector = SendEventInjector::with_pair_delay(Duration::ZERO);

        let err = injector.inject(&channel, &device(), 1, 1).await.unwrap_err();

        assert!(matches!(err, TouchError::Injection { .. }));
        assert!(err.to_string().contains("event 1"));
        assert_eq!(channel.calls().len(), 1);
    }
}
