use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::engine::{SequenceSpec, Step};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    pub compile: CompileConfig,
    pub readme: ReadmeConfig,
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub sequences: HashMap<String, SequenceSpec>,
}

/// Project layout settings consumed by the built-in tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub package_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub readme_path: PathBuf,
    pub declaration_file: String,
}

/// Compiler invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    pub command: String,
    pub timeout_seconds: u64,
}

/// Fenced code-block rewrite applied to the packaged README
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadmeConfig {
    pub rewrite_from: String,
    pub rewrite_to: String,
}

/// Executor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub max_concurrent_tasks: usize,
}

impl Config {
    /// Load configuration from a file or fall back to the defaults
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        crate::config::loader::load_config(config_path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "project".to_string(),
                source_dir: PathBuf::from("src"),
                build_dir: PathBuf::from("build/out"),
                package_dir: PathBuf::from("build/package"),
                manifest_path: PathBuf::from("manifest.json"),
                readme_path: PathBuf::from("README.md"),
                declaration_file: "index.d.ts".to_string(),
            },
            compile: CompileConfig {
                command: "make build".to_string(),
                timeout_seconds: 600,
            },
            readme: ReadmeConfig {
                rewrite_from: "typescript".to_string(),
                rewrite_to: "javascript".to_string(),
            },
            executor: ExecutorConfig {
                max_concurrent_tasks: num_cpus::get(),
            },
            sequences: HashMap::from([(
                "package".to_string(),
                SequenceSpec::new(vec![
                    Step::Parallel(vec![
                        "clean-compiled".to_string(),
                        "clean-package".to_string(),
                    ]),
                    Step::Single("compile".to_string()),
                    Step::Parallel(vec![
                        "package-files".to_string(),
                        "package-manifest".to_string(),
                        "package-readme".to_string(),
                        "package-declarations".to_string(),
                    ]),
                ]),
            )]),
        }
    }
}
