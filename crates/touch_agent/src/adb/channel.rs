//! Command channel to a device over ADB

use crate::error::{Result, TouchError};
use crate::touch::ScreenSize;
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

lazy_static! {
    static ref WM_SIZE_RE: Regex = Regex::new(r"(Physical|Override) size:\s*(\d+)x(\d+)").unwrap();
}

/// Captured output of one device command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Successful output with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// stdout followed by stderr, trimmed
    pub fn combined(&self) -> String {
        format!("{}{}", self.stdout, self.stderr).trim().to_string()
    }

    /// Turn a non-zero exit into `CommandFailed`
    pub fn check(self, what: &str) -> Result<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(TouchError::CommandFailed(format!(
                "{} exited with {:?}: {}",
                what,
                self.exit_code,
                self.combined()
            )))
        }
    }
}

/// Blocking round-trips to one target device.
///
/// Every touch operation is expressed in terms of this capability so the
/// transport can be swapped (a real `adb` binary, or a scripted double in
/// tests).
#[async_trait]
pub trait DeviceChannel: Send + Sync {
    /// Run `args` in the device shell and capture its output
    async fn shell(&self, args: &[&str]) -> Result<CommandOutput>;

    /// Copy a local file to `remote` on the device
    async fn push_file(&self, local: &Path, remote: &str) -> Result<()>;

    /// Build (without spawning) a process running `args` in the device shell
    fn shell_command(&self, args: &[&str]) -> Command;

    /// Query the display size, preferring an override size when one is set
    async fn screen_size(&self) -> Result<ScreenSize> {
        let output = self.shell(&["wm", "size"]).await?;
        parse_wm_size(&output.stdout).ok_or_else(|| {
            TouchError::Parse(format!("Unrecognised wm size output: {}", output.combined()))
        })
    }
}

/// Parse `wm size` output such as `Physical size: 1080x2400`
pub fn parse_wm_size(text: &str) -> Option<ScreenSize> {
    let mut physical = None;
    let mut override_size = None;

    for caps in WM_SIZE_RE.captures_iter(text) {
        let width: u32 = caps[2].parse().ok()?;
        let height: u32 = caps[3].parse().ok()?;
        let Some(size) = ScreenSize::new(width, height) else {
            continue;
        };
        match &caps[1] {
            "Override" => override_size = Some(size),
            _ => physical = Some(size),
        }
    }

    override_size.or(physical)
}

/// `DeviceChannel` backed by the `adb` executable
#[derive(Debug, Clone)]
pub struct AdbChannel {
    adb_path: String,
    serial: Option<String>,
}

impl AdbChannel {
    /// Target `serial`, or the only connected device when `None`
    pub fn new(serial: Option<&str>) -> Self {
        Self::with_path("adb", serial)
    }

    /// Use a custom `adb` executable
    pub fn with_path(adb_path: impl Into<String>, serial: Option<&str>) -> Self {
        Self {
            adb_path: adb_path.into(),
            serial: serial.map(str::to_string),
        }
    }

    pub fn adb_path(&self) -> &str {
        &self.adb_path
    }

    pub fn serial(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// `adb [-s <serial>]`
    fn adb_command(&self) -> Command {
        let mut cmd = Command::new(&self.adb_path);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd
    }
}

impl Default for AdbChannel {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl DeviceChannel for AdbChannel {
    async fn shell(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!("adb shell {:?} (serial: {:?})", args, self.serial);

        let output = self
            .shell_command(args)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }

    async fn push_file(&self, local: &Path, remote: &str) -> Result<()> {
        debug!("adb push {} {}", local.display(), remote);

        let output = self
            .adb_command()
            .arg("push")
            .arg(local)
            .arg(remote)
            .output()
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TouchError::TransferFailed(
                format!("{}{}", stdout, stderr).trim().to_string(),
            ))
        }
    }

    fn shell_command(&self, args: &[&str]) -> Command {
        let mut cmd = self.adb_command();
        cmd.arg("shell").args(args);
        cmd
    }
}
