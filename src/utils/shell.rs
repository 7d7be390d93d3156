// src/utils/shell.rs
use std::path::Path;
use std::process::Output;
use anyhow::{Result, Context};
use tokio::process::Command;
use tracing::{debug, trace, warn};

/// Execute a shell command
pub async fn execute_command(cmd: &str, workdir: Option<&Path>) -> Result<Output> {
    debug!("Executing command: {}", cmd);

    let mut command = Command::new("sh");
    command.arg("-c").arg(cmd);
    if let Some(dir) = workdir {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .context(format!("Failed to execute command: {}", cmd))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!("Command failed: {}\nStderr: {}", cmd, stderr);
    } else {
        trace!("Command succeeded: {}", cmd);
    }

    Ok(output)
}

/// Execute a shell command with a timeout
pub async fn execute_command_with_timeout(
    cmd: &str,
    workdir: Option<&Path>,
    timeout_secs: u64,
) -> Result<Output> {
    debug!("Executing command with timeout {}: {}", timeout_secs, cmd);

    let command_future = execute_command(cmd, workdir);

    match tokio::time::timeout(std::time::Duration::from_secs(timeout_secs), command_future).await {
        Ok(result) => result,
        Err(_) => {
            warn!("Command timed out after {} seconds: {}", timeout_secs, cmd);
            Err(anyhow::anyhow!("Command timed out after {} seconds: {}", timeout_secs, cmd))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_command_captures_stdout() {
        let output = execute_command("printf hello", None).await.unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout), "hello");
    }

    #[tokio::test]
    async fn test_execute_command_reports_failure_status() {
        let output = execute_command("exit 3", None).await.unwrap();
        assert!(!output.status.success());
    }

    #[tokio::test]
    async fn test_execute_command_respects_workdir() {
        let dir = tempfile::tempdir().unwrap();
        let output = execute_command("pwd", Some(dir.path())).await.unwrap();
        let printed = String::from_utf8_lossy(&output.stdout);
        let expected = std::fs::canonicalize(dir.path()).unwrap();
        assert_eq!(std::path::PathBuf::from(printed.trim_end()), expected);
    }

    #[tokio::test]
    async fn test_timeout_aborts_slow_command() {
        let result = execute_command_with_timeout("sleep 5", None, 1).await;
        assert!(result.is_err());
    }
}
