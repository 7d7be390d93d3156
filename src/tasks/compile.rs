use std::path::PathBuf;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;

use crate::config::CompileConfig;
use crate::core::task::Task;
use crate::error::{StagehandResult, StagehandError};
use crate::utils::shell;

/// Invokes the configured compiler command through the shell
pub struct CompileTask {
    name: String,
    command: String,
    workdir: Option<PathBuf>,
    timeout_seconds: u64,
}

#[async_trait]
impl Task for CompileTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Run the configured compiler command"
    }

    async fn run(&self) -> StagehandResult<()> {
        info!("Compiling with '{}'", self.command);

        let output = shell::execute_command_with_timeout(
            &self.command,
            self.workdir.as_deref(),
            self.timeout_seconds,
        )
        .await
        .map_err(|e| StagehandError::ExternalTool {
            tool: self.command.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StagehandError::ExternalTool {
                tool: self.command.clone(),
                message: stderr.trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Create a compile task from the compile configuration
pub fn create(name: &str, config: &CompileConfig, workdir: Option<PathBuf>) -> Arc<dyn Task> {
    Arc::new(CompileTask {
        name: name.to_string(),
        command: config.command.clone(),
        workdir,
        timeout_seconds: config.timeout_seconds,
    })
}
