use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use config::{Config as ConfigLoader, FileFormat};

use super::schema::Config;

/// Load configuration, layering the built-in defaults, an optional config
/// file, and `STAGEHAND_*` environment variables.
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let mut config_builder = ConfigLoader::builder();

    // Default configuration
    config_builder = config_builder.add_source(
        config::File::from_str(
            include_str!("../../config/default.toml"),
            FileFormat::Toml
        )
    );

    // User-provided configuration
    if let Some(path) = config_path {
        config_builder = config_builder.add_source(config::File::from(path));
    } else {
        // Project-local file first, then the per-user one
        let project_path = PathBuf::from("stagehand.toml");
        if project_path.exists() {
            config_builder = config_builder.add_source(config::File::from(project_path.as_path()));
        } else {
            let default_path = get_default_config_path();
            if default_path.exists() {
                config_builder = config_builder.add_source(config::File::from(default_path.as_path()));
            }
        }
    }

    // Environment variables
    config_builder = config_builder.add_source(
        config::Environment::with_prefix("STAGEHAND")
    );

    // Build and parse configuration
    let config: Config = config_builder
        .build()?
        .try_deserialize()
        .context("Failed to load configuration")?;

    Ok(config)
}

/// Get the default configuration path
fn get_default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stagehand/config.toml")
}

/// Initialize a new configuration file and return its path
pub fn init_config(force: bool) -> Result<PathBuf> {
    let config_path = PathBuf::from("stagehand.toml");

    if config_path.exists() && !force {
        anyhow::bail!(
            "Configuration already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    let config = Config::default();
    config.save(&config_path)?;

    Ok(config_path)
}
