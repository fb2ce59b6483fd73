//! Out-of-process execution of single adb commands

use async_trait::async_trait;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::DEFAULT_ADB_PATH;

/// How long to wait for pipe readers after the child is gone
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

/// How a command invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    /// The process ran and exited (successfully or not)
    Exited,
    /// The process was killed after exceeding its timeout
    TimedOut,
    /// The executable could not be started
    SpawnFailed,
}

/// Result of a single command invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub succeeded: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub status: CommandStatus,
}

impl CommandResult {
    /// Result of a process that ran to completion
    pub fn exited(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            succeeded: exit_code == 0,
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code,
            status: CommandStatus::Exited,
        }
    }

    /// Result of a process killed at its deadline, keeping any partial output
    pub fn timed_out(timeout: Duration, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        let mut stderr = stderr.into();
        if !stderr.is_empty() && !stderr.ends_with('\n') {
            stderr.push('\n');
        }
        stderr.push_str(&format!("timed out after {:.1}s", timeout.as_secs_f64()));
        Self {
            succeeded: false,
            stdout: stdout.into(),
            stderr,
            exit_code: -1,
            status: CommandStatus::TimedOut,
        }
    }

    /// Result of an executable that could not be started
    pub fn spawn_failed(detail: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr: detail.into(),
            exit_code: -1,
            status: CommandStatus::SpawnFailed,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.status == CommandStatus::TimedOut
    }

    /// True when the bridge executable itself is missing or unusable
    pub fn channel_unavailable(&self) -> bool {
        self.status == CommandStatus::SpawnFailed
    }

    /// Best available human-readable explanation of this result
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        let stdout = self.stdout.trim();
        if !stderr.is_empty() {
            stderr.to_string()
        } else if !stdout.is_empty() {
            stdout.to_string()
        } else {
            format!("exit code {}", self.exit_code)
        }
    }
}

/// Executes one command against the device bridge.
///
/// Implementations never fail: every problem is folded into the returned
/// [`CommandResult`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[String], timeout: Duration) -> CommandResult;
}

/// Runs commands through the real `adb` executable
#[derive(Debug, Clone)]
pub struct AdbRunner {
    adb_path: String,
}

impl AdbRunner {
    /// Create a runner using `adb` from the execution path
    pub fn new() -> Self {
        Self {
            adb_path: DEFAULT_ADB_PATH.to_string(),
        }
    }

    /// Create a runner with a custom adb path
    pub fn with_path(adb_path: impl Into<String>) -> Self {
        Self {
            adb_path: adb_path.into(),
        }
    }

    pub fn adb_path(&self) -> &str {
        &self.adb_path
    }
}

impl Default for AdbRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for AdbRunner {
    async fn run(&self, args: &[String], timeout: Duration) -> CommandResult {
        debug!("{} {}", self.adb_path, args.join(" "));

        let spawned = Command::new(&self.adb_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                warn!("failed to spawn '{}': {}", self.adb_path, e);
                return CommandResult::spawn_failed(format!(
                    "failed to spawn '{}': {}",
                    self.adb_path, e
                ));
            }
        };

        let stdout = OutputPipe::start(child.stdout.take());
        let stderr = OutputPipe::start(child.stderr.take());

        let waited = tokio::time::timeout(timeout, child.wait()).await;
        if waited.is_err() {
            let _ = child.kill().await;
        }

        // Grandchildren may hold the pipes open past the exit of adb itself
        let (stdout, stderr) = tokio::join!(stdout.finish(), stderr.finish());

        let result = match waited {
            Ok(Ok(status)) => CommandResult::exited(status.code().unwrap_or(-1), stdout, stderr),
            Ok(Err(e)) => CommandResult::exited(-1, stdout, format!("{}wait failed: {}", stderr, e)),
            Err(_) => {
                warn!(
                    "adb {} timed out after {:.1}s",
                    args.join(" "),
                    timeout.as_secs_f64()
                );
                CommandResult::timed_out(timeout, stdout, stderr)
            }
        };

        debug!(
            "exit={} stdout={:?} stderr={:?}",
            result.exit_code,
            result.stdout.trim(),
            result.stderr.trim()
        );
        result
    }
}

/// Reader task copying one child pipe into a buffer that outlives it
struct OutputPipe {
    buffer: Arc<Mutex<Vec<u8>>>,
    task: Option<JoinHandle<()>>,
}

impl OutputPipe {
    fn start<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let task = reader.map(|reader| tokio::spawn(pump(reader, Arc::clone(&buffer))));
        Self { buffer, task }
    }

    /// Wait briefly for end of stream, then return whatever arrived
    async fn finish(self) -> String {
        if let Some(mut task) = self.task {
            if tokio::time::timeout(OUTPUT_GRACE, &mut task).await.is_err() {
                task.abort();
            }
        }
        let bytes = self.buffer.lock().await;
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

async fn pump<R: AsyncRead + Unpin>(mut reader: R, buffer: Arc<Mutex<Vec<u8>>>) {
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buffer.lock().await.extend_from_slice(&chunk[..n]),
        }
    }
}
