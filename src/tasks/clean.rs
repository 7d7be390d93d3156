use std::path::PathBuf;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::core::task::Task;
use crate::error::{StagehandResult, StagehandError};

/// Deletes directory trees, typically stale build output.
/// Missing paths are not an error.
pub struct CleanTask {
    name: String,
    description: String,
    paths: Vec<PathBuf>,
}

#[async_trait]
impl Task for CleanTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn run(&self) -> StagehandResult<()> {
        for path in &self.paths {
            match tokio::fs::remove_dir_all(path).await {
                Ok(()) => info!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Nothing to remove at {}", path.display());
                }
                Err(e) => {
                    return Err(StagehandError::File {
                        path: path.clone(),
                        message: format!("Failed to remove directory: {}", e),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Create a clean task for the given paths
pub fn create(name: &str, description: &str, paths: Vec<PathBuf>) -> Arc<dyn Task> {
    Arc::new(CleanTask {
        name: name.to_string(),
        description: description.to_string(),
        paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_removes_existing_tree() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("build");
        std::fs::create_dir_all(target.join("nested")).unwrap();
        std::fs::write(target.join("nested/file.txt"), b"x").unwrap();

        let task = create("clean", "", vec![target.clone()]);
        task.run().await.unwrap();

        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_missing_path_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let task = create("clean", "", vec![dir.path().join("absent")]);
        task.run().await.unwrap();
    }
}
