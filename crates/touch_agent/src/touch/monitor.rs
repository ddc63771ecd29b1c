//! Streaming `getevent` observer for interactive debugging

use crate::adb::DeviceChannel;
use crate::config::TIMING_CONFIG;
use crate::error::{Result, TouchError};
use chrono::{DateTime, Local};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Something observed while monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// One line of `getevent` output, as received
    Line {
        received_at: DateTime<Local>,
        text: String,
    },
    /// The capture process exited; `None` when it was killed
    Finished { exit_code: Option<i32> },
}

/// Time-bounded `getevent -lt` capture
#[derive(Debug, Clone)]
pub struct EventMonitor {
    duration: Duration,
    kill_grace: Duration,
}

impl EventMonitor {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            kill_grace: Duration::from_secs_f64(TIMING_CONFIG.monitor.kill_grace),
        }
    }

    /// How long past `duration` to wait before killing the capture locally
    pub fn with_kill_grace(mut self, kill_grace: Duration) -> Self {
        self.kill_grace = kill_grace;
        self
    }

    /// Stream capture lines to `tx`, optionally limited to one device node.
    /// A final [`MonitorEvent::Finished`] is always sent before returning,
    /// with `None` when the exit status is unknown.
    pub async fn run<C>(
        &self,
        channel: &C,
        device: Option<&str>,
        tx: mpsc::Sender<MonitorEvent>,
    ) -> Result<Option<i32>>
    where
        C: DeviceChannel + ?Sized,
    {
        let seconds = self.duration.as_secs().max(1).to_string();
        let mut args = vec!["timeout", seconds.as_str(), "getevent", "-lt"];
        if let Some(path) = device {
            args.push(path);
        }

        let spawned = channel
            .shell_command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn();
        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                let _ = tx.send(MonitorEvent::Finished { exit_code: None }).await;
                return Err(e.into());
            }
        };

        let streamed = self.forward_lines(&mut child, &tx).await;
        if let Err(e) = &streamed {
            warn!("getevent capture aborted: {}", e);
            if let Err(e) = child.start_kill() {
                debug!("getevent already gone: {}", e);
            }
        }

        let waited = child.wait().await.map(|status| status.code());
        let exit_code = waited.as_ref().ok().copied().flatten();
        let _ = tx.send(MonitorEvent::Finished { exit_code }).await;

        streamed?;
        Ok(waited?)
    }

    /// Forward stdout lines until EOF, a dropped observer or the deadline
    async fn forward_lines(
        &self,
        child: &mut Child,
        tx: &mpsc::Sender<MonitorEvent>,
    ) -> Result<()> {
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TouchError::CommandFailed("getevent stdout unavailable".to_string()))?;
        let mut lines = BufReader::new(stdout).lines();

        let deadline = tokio::time::sleep(self.duration + self.kill_grace);
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(text) = line? else {
                        return Ok(());
                    };
                    let event = MonitorEvent::Line {
                        received_at: Local::now(),
                        text,
                    };
                    if tx.send(event).await.is_err() {
                        debug!("Monitor observer dropped, stopping capture");
                        child.start_kill()?;
                        return Ok(());
                    }
                }
                _ = &mut deadline => {
                    warn!("getevent outlived its {:?} bound, killing it", self.duration);
                    child.start_kill()?;
                    return Ok(());
                }
            }
        }
    }
}

/// Capture `getevent` output for `duration` using the configured grace period
pub async fn monitor_events<C>(
    channel: &C,
    device: Option<&str>,
    duration: Duration,
    tx: mpsc::Sender<MonitorEvent>,
) -> Result<Option<i32>>
where
    C: DeviceChannel + ?Sized,
{
    EventMonitor::new(duration).run(channel, device, tx).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::scripted::ScriptedChannel;

    async fn collect(mut rx: mpsc::Receiver<MonitorEvent>) -> (Vec<String>, Option<Option<i32>>) {
        let mut lines = Vec::new();
        let mut finished = None;
        while let Some(event) = rx.recv().await {
            match event {
                MonitorEvent::Line { text, .. } => lines.push(text),
                MonitorEvent::Finished { exit_code } => finished = Some(exit_code),
            }
        }
        (lines, finished)
    }

    #[tokio::test]
    async fn test_streams_lines_then_finishes() {
        let channel = ScriptedChannel::new().streaming(concat!(
            "printf '/dev/input/event3: EV_ABS ABS_MT_POSITION_X 00000100\\n",
            "/dev/input/event3: EV_SYN SYN_REPORT 00000000\\n'; exit 3",
        ));
        let (tx, rx) = mpsc::channel(16);

        let device = Some("/dev/input/event3");
        let exit_code = monitor_events(&channel, device, Duration::from_secs(2), tx)
            .await
            .unwrap();

        let (lines, finished) = collect(rx).await;
        assert_eq!(exit_code, Some(3));
        assert_eq!(finished, Some(Some(3)));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("ABS_MT_POSITION_X"));
        assert_eq!(
            channel.calls(),
            vec!["timeout 2 getevent -lt /dev/input/event3".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreadable_output_still_finishes() {
        let channel = ScriptedChannel::new().streaming("printf '\\377\\376\\n'; sleep 1");
        let (tx, rx) = mpsc::channel(16);

        let result = monitor_events(&channel, None, Duration::from_secs(2), tx).await;

        let (lines, finished) = collect(rx).await;
        assert!(result.is_err());
        assert!(lines.is_empty());
        assert!(finished.is_some());
    }

    #[tokio::test]
    async fn test_spawn_failure_still_finishes() {
        let channel = ScriptedChannel::new().unspawnable();
        let (tx, rx) = mpsc::channel(16);

        let err = monitor_events(&channel, None, Duration::from_secs(1), tx)
            .await
            .unwrap_err();

        let (lines, finished) = collect(rx).await;
        assert!(matches!(err, TouchError::Io(_)));
        assert!(lines.is_empty());
        assert_eq!(finished, Some(None));
    }

    #[tokio::test]
    async fn test_kills_capture_past_its_bound() {
        let channel = ScriptedChannel::new().streaming("echo started; exec sleep 30");
        let (tx, rx) = mpsc::channel(16);

        let exit_code = EventMonitor::new(Duration::from_millis(100))
            .with_kill_grace(Duration::from_millis(100))
            .run(&channel, None, tx)
            .await
            .unwrap();

        let (lines, finished) = collect(rx).await;
        assert_eq!(lines, vec!["started".to_string()]);
        assert_eq!(exit_code, None);
        assert_eq!(finished, Some(None));
        assert_eq!(channel.calls(), vec!["timeout 1 getevent -lt".to_string()]);
    }
}
