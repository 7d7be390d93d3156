use std::path::PathBuf;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;

use crate::core::task::Task;
use crate::error::{StagehandResult, StagehandError};
use crate::utils::fs::collect_files;

/// Emits a declaration index for the package: one module entry per source
/// file, namespaced under the project name.
pub struct DeclarationsTask {
    name: String,
    module_name: String,
    source_dir: PathBuf,
    dest_dir: PathBuf,
    file_name: String,
}

#[async_trait]
impl Task for DeclarationsTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Generate the package declaration file from the source tree"
    }

    async fn run(&self) -> StagehandResult<()> {
        let files = collect_files(&self.source_dir)?;

        let mut entries = Vec::with_capacity(files.len());
        for file in &files {
            let relative = file
                .strip_prefix(&self.source_dir)
                .map_err(|_| StagehandError::File {
                    path: file.clone(),
                    message: format!("Not under {}", self.source_dir.display()),
                })?;

            let module = relative.with_extension("");
            let module = module
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            entries.push(format!("declare module \"{}/{}\";", self.module_name, module));
        }

        std::fs::create_dir_all(&self.dest_dir).map_err(|e| StagehandError::File {
            path: self.dest_dir.clone(),
            message: format!("Failed to create directory: {}", e),
        })?;

        let target = self.dest_dir.join(&self.file_name);
        let content = format!("{}\n", entries.join("\n"));
        std::fs::write(&target, content).map_err(|e| StagehandError::File {
            path: target.clone(),
            message: format!("Failed to write file: {}", e),
        })?;

        info!(
            "Wrote {} declaration entries to {}",
            entries.len(),
            target.display()
        );
        Ok(())
    }
}

/// Create a declaration-generation task
pub fn create(
    name: &str,
    module_name: &str,
    source_dir: PathBuf,
    dest_dir: PathBuf,
    file_name: &str,
) -> Arc<dyn Task> {
    Arc::new(DeclarationsTask {
        name: name.to_string(),
        module_name: module_name.to_string(),
        source_dir,
        dest_dir,
        file_name: file_name.to_string(),
    })
}
