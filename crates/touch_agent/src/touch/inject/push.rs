//! Tap injection by pushing a binary event file to the device

use super::{copy_to_node, device_tmp_path, remove_device_file, TouchInjector};
use crate::adb::DeviceChannel;
use crate::error::Result;
use crate::touch::codec::{encode, tap_sequence};
use crate::touch::discovery::TouchDeviceInfo;
use async_trait::async_trait;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// Writes the encoded buffer to a local temp file, pushes it and `dd`s it
/// onto the node. Both temp files are removed whatever the outcome.
#[derive(Debug, Clone, Copy, Default)]
pub struct PushFileInjector;

fn write_local(buf: &[u8]) -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("touch_events_")
        .suffix(".bin")
        .tempfile()?;
    file.write_all(buf)?;
    file.flush()?;
    Ok(file)
}

async fn push_and_copy(
    channel: &dyn DeviceChannel,
    local: &NamedTempFile,
    remote: &str,
    node: &str,
    len: usize,
) -> Result<()> {
    channel.push_file(local.path(), remote).await?;
    copy_to_node(channel, remote, node, len).await
}

#[async_trait]
impl TouchInjector for PushFileInjector {
    fn name(&self) -> &'static str {
        "push"
    }

    async fn inject(
        &self,
        channel: &dyn DeviceChannel,
        device: &TouchDeviceInfo,
        x: i32,
        y: i32,
    ) -> Result<()> {
        let context = || format!("File push injection failed on {}", device.path);

        let buf = encode(&tap_sequence(x, y));
        let local = write_local(&buf).map_err(|e| e.context(context()))?;
        let remote = device_tmp_path("push");

        let result = push_and_copy(channel, &local, &remote, &device.path, buf.len()).await;

        remove_device_file(channel, &remote).await;
        let local_path = local.path().to_path_buf();
        if let Err(e) = local.close() {
            warn!("Could not remove {}: {}", local_path.display(), e);
        }

        result.map_err(|e| e.context(context()))?;
        debug!("Pushed tap ({}, {}) delivered to {}", x, y, device.path);
        Ok(())
    }
}
