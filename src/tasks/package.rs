//! Tasks that stage files into the package directory: copying compiled
//! output, publishing the manifest, and rewriting the README.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use crate::core::task::Task;
use crate::error::{StagehandResult, StagehandError};

fn read_file(path: &Path) -> StagehandResult<String> {
    std::fs::read_to_string(path).map_err(|e| StagehandError::File {
        path: path.to_path_buf(),
        message: format!("Failed to read file: {}", e),
    })
}

fn write_file(path: &Path, content: &str) -> StagehandResult<()> {
    std::fs::write(path, content).map_err(|e| StagehandError::File {
        path: path.to_path_buf(),
        message: format!("Failed to write file: {}", e),
    })
}

fn ensure_dir(path: &Path) -> StagehandResult<()> {
    std::fs::create_dir_all(path).map_err(|e| StagehandError::File {
        path: path.to_path_buf(),
        message: format!("Failed to create directory: {}", e),
    })
}

/// Copies the compiled output tree into the package directory,
/// preserving relative structure
pub struct CopyFilesTask {
    name: String,
    source_dir: PathBuf,
    dest_dir: PathBuf,
}

impl CopyFilesTask {
    fn copy_tree(&self, src: &Path, dst: &Path) -> StagehandResult<usize> {
        ensure_dir(dst)?;
        let mut copied = 0;

        let entries = std::fs::read_dir(src).map_err(|e| StagehandError::DirectoryRead {
            path: src.to_path_buf(),
            message: e.to_string(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| StagehandError::DirectoryRead {
                path: src.to_path_buf(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            let target = dst.join(entry.file_name());

            let file_type = entry.file_type().map_err(|e| StagehandError::Stat {
                path: path.clone(),
                message: e.to_string(),
            })?;

            if file_type.is_dir() {
                copied += self.copy_tree(&path, &target)?;
            } else if file_type.is_file() {
                std::fs::copy(&path, &target).map_err(|e| StagehandError::File {
                    path: path.clone(),
                    message: format!("Failed to copy to {}: {}", target.display(), e),
                })?;
                copied += 1;
            }
        }

        Ok(copied)
    }
}

#[async_trait]
impl Task for CopyFilesTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Copy compiled output into the package directory"
    }

    async fn run(&self) -> StagehandResult<()> {
        let copied = self.copy_tree(&self.source_dir, &self.dest_dir)?;
        info!(
            "Copied {} files from {} to {}",
            copied,
            self.source_dir.display(),
            self.dest_dir.display()
        );
        Ok(())
    }
}

/// Create a copy task from source to destination directory
pub fn create_copy(name: &str, source_dir: PathBuf, dest_dir: PathBuf) -> Arc<dyn Task> {
    Arc::new(CopyFilesTask {
        name: name.to_string(),
        source_dir,
        dest_dir,
    })
}

/// Rewrites the project manifest for publication: the `private` flag is
/// flipped to `false` and the result lands in the package directory
pub struct ManifestTask {
    name: String,
    manifest_path: PathBuf,
    dest_dir: PathBuf,
}

#[async_trait]
impl Task for ManifestTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Publish the manifest into the package directory"
    }

    async fn run(&self) -> StagehandResult<()> {
        let content = read_file(&self.manifest_path)?;
        let mut manifest: serde_json::Value = serde_json::from_str(&content)
            .map_err(|e| StagehandError::Serialization(format!(
                "Failed to parse {}: {}",
                self.manifest_path.display(),
                e
            )))?;

        let object = manifest.as_object_mut().ok_or_else(|| {
            StagehandError::Serialization(format!(
                "{} is not a JSON object",
                self.manifest_path.display()
            ))
        })?;
        object.insert("private".to_string(), serde_json::Value::Bool(false));

        let file_name = self.manifest_path.file_name().ok_or_else(|| StagehandError::File {
            path: self.manifest_path.clone(),
            message: "Manifest path has no file name".to_string(),
        })?;

        ensure_dir(&self.dest_dir)?;
        let target = self.dest_dir.join(file_name);
        let rendered = serde_json::to_string_pretty(&manifest)
            .map_err(|e| StagehandError::Serialization(e.to_string()))?;
        write_file(&target, &rendered)?;

        info!("Wrote public manifest to {}", target.display());
        Ok(())
    }
}

/// Create a manifest-publication task
pub fn create_manifest(name: &str, manifest_path: PathBuf, dest_dir: PathBuf) -> Arc<dyn Task> {
    Arc::new(ManifestTask {
        name: name.to_string(),
        manifest_path,
        dest_dir,
    })
}

/// Rewrites fenced code-block language tags in the README and copies it
/// into the package directory
pub struct ReadmeTask {
    name: String,
    readme_path: PathBuf,
    dest_dir: PathBuf,
    rewrite_from: String,
    rewrite_to: String,
}

#[async_trait]
impl Task for ReadmeTask {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Rewrite README code fences and copy it into the package directory"
    }

    async fn run(&self) -> StagehandResult<()> {
        let content = read_file(&self.readme_path)?;

        let pattern = format!(
            r"(?s)```{}(.*?)```",
            regex::escape(&self.rewrite_from)
        );
        let fence = Regex::new(&pattern)
            .map_err(|e| StagehandError::InvalidInput(format!("Bad fence pattern: {}", e)))?;

        let replacement = format!("```{}$1```", self.rewrite_to);
        let rewritten = fence.replace_all(&content, replacement.as_str());
        debug!(
            "Rewrote {} -> {} fences in {}",
            self.rewrite_from,
            self.rewrite_to,
            self.readme_path.display()
        );

        let file_name = self.readme_path.file_name().ok_or_else(|| StagehandError::File {
            path: self.readme_path.clone(),
            message: "README path has no file name".to_string(),
        })?;

        ensure_dir(&self.dest_dir)?;
        let target = self.dest_dir.join(file_name);
        write_file(&target, &rewritten)?;

        info!("Wrote packaged README to {}", target.display());
        Ok(())
    }
}

/// Create a README-rewrite task
pub fn create_readme(
    name: &str,
    readme_path: PathBuf,
    dest_dir: PathBuf,
    rewrite_from: &str,
    rewrite_to: &str,
) -> Arc<dyn Task> {
    Arc::new(ReadmeTask {
        name: name.to_string(),
        readme_path,
        dest_dir,
        rewrite_from: rewrite_from.to_string(),
        rewrite_to: rewrite_to.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_copy_preserves_structure() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("out");
        let dst = dir.path().join("package");

        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("a.js"), b"a").unwrap();
        std::fs::write(src.join("nested/b.js"), b"b").unwrap();

        let task = create_copy("package-files", src, dst.clone());
        task.run().await.unwrap();

        assert_eq!(std::fs::read(dst.join("a.js")).unwrap(), b"a");
        assert_eq!(std::fs::read(dst.join("nested/b.js")).unwrap(), b"b");
    }

    #[tokio::test]
    async fn test_manifest_private_flag_is_flipped() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        let dst = dir.path().join("package");
        std::fs::write(
            &manifest,
            r#"{"name": "lib", "private": true, "version": "1.0.0"}"#,
        )
        .unwrap();

        let task = create_manifest("package-manifest", manifest, dst.clone());
        task.run().await.unwrap();

        let published: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dst.join("manifest.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(published["private"], serde_json::Value::Bool(false));
        assert_eq!(published["name"], "lib");
    }

    #[tokio::test]
    async fn test_manifest_must_be_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.json");
        std::fs::write(&manifest, "[1, 2]").unwrap();

        let task = create_manifest("package-manifest", manifest, dir.path().join("package"));
        let err = task.run().await.unwrap_err();
        assert!(matches!(err, StagehandError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_readme_fences_are_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let readme = dir.path().join("README.md");
        let dst = dir.path().join("package");
        std::fs::write(
            &readme,
            "# Lib\n```typescript\nlet x: number = 1;\n```\n```bash\nls\n```\n",
        )
        .unwrap();

        let task = create_readme("package-readme", readme, dst.clone(), "typescript", "javascript");
        task.run().await.unwrap();

        let published = std::fs::read_to_string(dst.join("README.md")).unwrap();
        assert!(published.contains("```javascript\nlet x: number = 1;\n```"));
        assert!(published.contains("```bash\nls\n```"));
        assert!(!published.contains("```typescript"));
    }
}
