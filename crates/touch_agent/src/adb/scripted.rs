//! Scripted in-memory `DeviceChannel` for tests

use super::{CommandOutput, DeviceChannel};
use crate::error::{Result, TouchError};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use tokio::process::Command;

#[derive(Debug, Clone)]
enum Reply {
    Output(CommandOutput),
    Fail,
    Stall,
}

/// A recorded push: remote path and the bytes the local file held at push time
#[derive(Debug, Clone)]
pub(crate) struct PushedFile {
    pub local: std::path::PathBuf,
    pub remote: String,
    pub contents: Vec<u8>,
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedChannel {
    replies: Mutex<Vec<(String, Reply)>>,
    calls: Mutex<Vec<String>>,
    pushes: Mutex<Vec<PushedFile>>,
    fail_push: bool,
    stream_script: String,
    unspawnable: bool,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `stdout` to shell commands starting with `prefix`
    pub fn on(self, prefix: &str, stdout: &str) -> Self {
        self.reply(prefix, Reply::Output(CommandOutput::ok(stdout)))
    }

    /// Reply with a non-zero exit to shell commands starting with `prefix`
    pub fn exit_with(self, prefix: &str, code: i32, stderr: &str) -> Self {
        self.reply(
            prefix,
            Reply::Output(CommandOutput {
                stdout: String::new(),
                stderr: stderr.to_string(),
                exit_code: Some(code),
            }),
        )
    }

    /// Fail the channel itself for shell commands starting with `prefix`
    pub fn fail_on(self, prefix: &str) -> Self {
        self.reply(prefix, Reply::Fail)
    }

    pub fn failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    /// Local `sh -c` script standing in for a streaming device command
    pub fn streaming(mut self, script: &str) -> Self {
        self.stream_script = script.to_string();
        self
    }

    /// Streaming commands point at a program that does not exist
    pub fn unspawnable(mut self) -> Self {
        self.unspawnable = true;
        self
    }

    /// Never answer shell commands starting with `prefix`
    pub fn stall_on(self, prefix: &str) -> Self {
        self.reply(prefix, Reply::Stall)
    }

    fn reply(self, prefix: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push((prefix.to_string(), reply));
        self
    }

    /// Shell commands and pushes in issue order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pushes(&self) -> Vec<PushedFile> {
        self.pushes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeviceChannel for ScriptedChannel {
    async fn shell(&self, args: &[&str]) -> Result<CommandOutput> {
        let line = args.join(" ");
        self.calls.lock().unwrap().push(line.clone());

        let reply = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, reply)| reply.clone());
        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Fail) => Err(TouchError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device offline",
            ))),
            Some(Reply::Stall) => std::future::pending().await,
            None => Ok(CommandOutput::ok("")),
        }
    }

    async fn push_file(&self, local: &Path, remote: &str) -> Result<()> {
        self.calls.lock().unwrap().push(format!("push {}", remote));
        if self.fail_push {
            return Err(TouchError::TransferFailed("remote write failed".to_string()));
        }
        let contents = std::fs::read(local)?;
        self.pushes.lock().unwrap().push(PushedFile {
            local: local.to_path_buf(),
            remote: remote.to_string(),
            contents,
        });
        Ok(())
    }

    fn shell_command(&self, args: &[&str]) -> Command {
        self.calls.lock().unwrap().push(args.join(" "));
        if self.unspawnable {
            return Command::new("/nonexistent/touch-agent-getevent");
        }
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&self.stream_script);
        cmd
    }
}
