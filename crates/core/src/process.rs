//! Cancellable child-process execution shared by the capture and encoder back-ends.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::cancel::CancelToken;

/// Result of a process that ran to completion.
#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub status: ExitStatus,
    pub stderr: String,
}

impl ProcessOutput {
    /// Last few stderr lines, or `None` when nothing was written.
    pub fn stderr_tail(&self) -> Option<String> {
        let lines: Vec<&str> = self.stderr.lines().collect();
        if lines.is_empty() {
            return None;
        }
        let start = lines.len().saturating_sub(20);
        Some(lines[start..].join("\n"))
    }
}

#[derive(Debug)]
pub(crate) enum ProcessError {
    NotFound(PathBuf),
    Io(std::io::Error),
    TimedOut(Duration),
    Cancelled,
}

/// Runs `program` with `args`, killing it when `cancel` fires or `limit` elapses.
pub(crate) async fn run_cancellable(
    program: &Path,
    args: &[String],
    cancel: &CancelToken,
    limit: Duration,
) -> Result<ProcessOutput, ProcessError> {
    if cancel.is_cancelled() {
        return Err(ProcessError::Cancelled);
    }

    let child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessError::NotFound(program.to_path_buf())
            } else {
                ProcessError::Io(e)
            }
        })?;

    // Losing the race drops the child, which kills it.
    tokio::select! {
        _ = cancel.cancelled() => Err(ProcessError::Cancelled),
        result = timeout(limit, child.wait_with_output()) => match result {
            Ok(Ok(output)) => Ok(ProcessOutput {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }),
            Ok(Err(e)) => Err(ProcessError::Io(e)),
            Err(_) => Err(ProcessError::TimedOut(limit)),
        },
    }
}
