//! Tap injection by writing raw records from a `printf` byte literal

use super::{copy_to_node, device_tmp_path, remove_device_file, TouchInjector};
use crate::adb::DeviceChannel;
use crate::error::Result;
use crate::touch::codec::{encode, tap_sequence};
use crate::touch::discovery::TouchDeviceInfo;
use async_trait::async_trait;
use std::fmt::Write;
use tracing::debug;

/// Render bytes as `\xNN` escapes understood by the device's `printf`
pub fn shell_escape_bytes(buf: &[u8]) -> String {
    buf.iter().fold(String::with_capacity(buf.len() * 4), |mut out, byte| {
        let _ = write!(out, "\\x{:02x}", byte);
        out
    })
}

/// Materialises the event buffer on the device with `printf`, then `dd`s it
/// onto the node. Needs no file transfer, only a shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineBinaryInjector;

async fn write_and_copy(
    channel: &dyn DeviceChannel,
    buf: &[u8],
    tmp: &str,
    node: &str,
) -> Result<()> {
    let script = format!("printf '{}' > {}", shell_escape_bytes(buf), tmp);
    channel.shell(&[script.as_str()]).await?.check("printf")?;
    copy_to_node(channel, tmp, node, buf.len()).await
}

#[async_trait]
impl TouchInjector for InlineBinaryInjector {
    fn name(&self) -> &'static str {
        "inline"
    }

    async fn inject(
        &self,
        channel: &dyn DeviceChannel,
        device: &TouchDeviceInfo,
        x: i32,
        y: i32,
    ) -> Result<()> {
        let buf = encode(&tap_sequence(x, y));
        let tmp = device_tmp_path("inline");

        let result = write_and_copy(channel, &buf, &tmp, &device.path).await;
        remove_device_file(channel, &tmp).await;

        result.map_err(|e| {
            e.context(format!("Inline binary injection failed on {}", device.path))
        })?;
        debug!("Inline tap ({}, {}) delivered to {}", x, y, device.path);
        Ok(())
    }
}
