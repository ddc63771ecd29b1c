//! Connected-device listing over ADB

use crate::error::{Result, TouchError};
use serde::Serialize;
use std::time::Duration;
use tokio::process::Command;

/// How a device is attached to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionType {
    Usb,
    Emulator,
    Remote,
}

/// Information about a connected device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub device_id: String,
    pub status: String,
    pub connection_type: ConnectionType,
    pub model: Option<String>,
}

impl DeviceInfo {
    /// Whether the device is online and authorised
    pub fn is_ready(&self) -> bool {
        self.status == "device"
    }
}

/// List devices reported by `adb devices -l`
pub async fn list_devices(adb_path: &str) -> Result<Vec<DeviceInfo>> {
    let output = tokio::time::timeout(
        Duration::from_secs(5),
        Command::new(adb_path).arg("devices").arg("-l").output(),
    )
    .await
    .map_err(|_| TouchError::Timeout("List devices timeout after 5s".to_string()))??;

    Ok(parse_device_list(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse the body of `adb devices -l`
pub fn parse_device_list(stdout: &str) -> Vec<DeviceInfo> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("List of devices") && !line.starts_with('*')
        })
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                return None;
            }

            let device_id = parts[0].to_string();
            let connection_type = if device_id.contains(':') {
                ConnectionType::Remote
            } else if device_id.starts_with("emulator-") {
                ConnectionType::Emulator
            } else {
                ConnectionType::Usb
            };

            let model = parts[2..]
                .iter()
                .find_map(|part| part.strip_prefix("model:"))
                .map(str::to_string);

            Some(DeviceInfo {
                device_id,
                status: parts[1].to_string(),
                connection_type,
                model,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_list() {
        let stdout = "\
* daemon started successfully
List of devices attached
emulator-5554          device product:sdk_gphone64 model:sdk_gphone64_x86_64 transport_id:1
127.0.0.1:5555         device product:bluestacks model:SM_G988N transport_id:2
R58M12ABCDE            unauthorized usb:1-1 transport_id:3
";
        let devices = parse_device_list(stdout);

        assert_eq!(devices.len(), 3);
        assert_eq!(devices[0].connection_type, ConnectionType::Emulator);
        assert_eq!(devices[0].model.as_deref(), Some("sdk_gphone64_x86_64"));
        assert_eq!(devices[1].connection_type, ConnectionType::Remote);
        assert_eq!(devices[2].connection_type, ConnectionType::Usb);
        assert!(!devices[2].is_ready());
        assert!(devices[2].model.is_none());
    }

    #[test]
    fn test_parse_empty_device_list() {
        assert!(parse_device_list("List of devices attached\n\n").is_empty());
    }
}
