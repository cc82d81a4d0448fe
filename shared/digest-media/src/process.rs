use crate::{MediaError, Result};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Run an external tool to completion, optionally bounded by a timeout.
///
/// The child is killed when the timeout elapses.
pub(crate) async fn run_with_timeout(
    mut cmd: Command,
    label: &str,
    timeout_seconds: u64,
) -> Result<Output> {
    cmd.kill_on_drop(true);
    tracing::debug!("Executing command: {:?}", cmd);

    if timeout_seconds == 0 {
        return Ok(cmd.output().await?);
    }

    match tokio::time::timeout(Duration::from_secs(timeout_seconds), cmd.output()).await {
        Ok(output) => Ok(output?),
        Err(_) => Err(MediaError::Timeout {
            command: label.to_string(),
            seconds: timeout_seconds,
        }),
    }
}

/// Check whether a command can be spawned at all
pub(crate) async fn command_available(cmd_name: &str) -> bool {
    Command::new(cmd_name)
        .arg("--help")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Last non-empty stderr line, or the exit status when stderr is empty
pub(crate) fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| output.status.to_string())
}
