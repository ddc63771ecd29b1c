//! touch_agent: touchscreen discovery and synthetic tap injection for
//! Android devices
//!
//! This library provides:
//! - Discovery of the touchscreen input node from `getevent -lp` output,
//!   with heuristic scoring and layered fallbacks
//! - Translation of screen pixels into the device's native axis ranges
//! - Encoding of raw kernel `input_event` records
//! - Three interchangeable tap injection strategies over ADB
//! - A streaming `getevent` monitor for debugging
//!
//! # Example
//!
//! ```no_run
//! use touch_agent::{tap, AdbChannel, InjectionStrategy};
//!
//! #[tokio::main]
//! async fn main() -> touch_agent::Result<()> {
//!     let channel = AdbChannel::new(Some("emulator-5554"));
//!     let injector = InjectionStrategy::InlineBinary.injector();
//!
//!     let report = tap(injector.as_ref(), &channel, 540.0, 960.0, None).await?;
//!     println!("Tapped {} at ({}, {})", report.device.path, report.device_x, report.device_y);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;

// Configuration module
pub mod config;

// Device transport
pub mod adb;

// Core functionality
pub mod touch;

// Re-export commonly used types and functions
pub use error::{Result, TouchError};

// Config re-exports
pub use config::{
    DiscoveryTimingConfig, InjectionTimingConfig, MonitorTimingConfig, TimingConfig,
    TIMING_CONFIG,
};

// ADB re-exports
pub use adb::{
    list_devices, AdbChannel, CommandOutput, ConnectionType, DeviceChannel, DeviceInfo,
};

// Touch re-exports
pub use touch::{
    decode, discover_touch_device, discover_with_source, encode, monitor_events, tap,
    tap_sequence, translate, DeviceCandidate, DiscoverySource, EventMonitor, InjectionStrategy,
    InputEvent, MonitorEvent, ScreenSize, TapReport, TouchDeviceInfo, TouchInjector,
};
