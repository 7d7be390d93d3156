// src/config/mod.rs
mod loader;
mod schema;

pub use loader::{init_config, load_config};
pub use schema::{
    Config, CompileConfig, ExecutorConfig, ProjectConfig, ReadmeConfig,
};
