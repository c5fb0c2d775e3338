//! Command Runner
//!
//! Information Hiding:
//! - Process spawning and output capture hidden
//! - Timeout enforcement hidden from callers
//! - Arguments passed as argv, never through a shell

use super::ToolResult;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

/// Runs one external program with a hard timeout and returns its stdout as text
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: PathBuf,
    timeout_ms: u64,
}

impl CommandRunner {
    pub fn new(program: impl Into<PathBuf>, timeout_ms: u64) -> Self {
        Self {
            program: program.into(),
            timeout_ms,
        }
    }

    /// Run the program. Non-zero exits keep their stdout; spawn errors and
    /// timeouts come back as failed results with empty output.
    pub async fn run(&self, args: &[String]) -> ToolResult {
        tracing::info!(
            "[CommandRunner] {} {}",
            self.program.display(),
            args.join(" ")
        );

        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let result = timeout(Duration::from_millis(self.timeout_ms), command.output()).await;

        match result {
            Ok(Ok(output)) => {
                let stdout = String::from_utf8_lossy(&output.stdout).to_string();

                if output.status.success() {
                    ToolResult::success(stdout)
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    tracing::debug!(
                        "[CommandRunner] {} exited with {:?}: {}",
                        self.program.display(),
                        output.status.code(),
                        stderr.trim()
                    );
                    ToolResult::failure_with_output(
                        stdout,
                        format!(
                            "Command failed with exit code {:?}: {}",
                            output.status.code(),
                            stderr.trim()
                        ),
                    )
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    "[CommandRunner] Failed to spawn {}: {}",
                    self.program.display(),
                    e
                );
                ToolResult::failure(format!(
                    "Failed to execute {}: {}",
                    self.program.display(),
                    e
                ))
            }
            Err(_) => {
                tracing::warn!(
                    "[CommandRunner] {} timed out after {}ms",
                    self.program.display(),
                    self.timeout_ms
                );
                ToolResult::failure(format!(
                    "Command timed out after {}ms",
                    self.timeout_ms
                ))
            }
        }
    }
}
