//! ADB (Android Debug Bridge) transport
//!
//! This module provides:
//! - `channel`: the `DeviceChannel` capability and its `adb` implementation
//! - `connection`: connected-device listing

mod channel;
mod connection;

#[cfg(test)]
pub(crate) mod scripted;

pub use channel::{parse_wm_size, AdbChannel, CommandOutput, DeviceChannel};
pub use connection::{list_devices, parse_device_list, ConnectionType, DeviceInfo};
