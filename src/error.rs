use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StagehandError {
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Task not found: {0}")]
    UnknownTask(String),

    #[error("Step {step} of the sequence is an empty parallel group")]
    EmptyStage { step: usize },

    #[error("Task execution failed: {name} - {message}")]
    TaskExecution {
        name: String,
        message: String,
    },

    #[error("Failed to read directory {path:?}: {message}")]
    DirectoryRead {
        path: PathBuf,
        message: String,
    },

    #[error("Failed to stat {path:?}: {message}")]
    Stat {
        path: PathBuf,
        message: String,
    },

    #[error("File error: {path:?} - {message}")]
    File {
        path: PathBuf,
        message: String,
    },

    #[error("External tool error: {tool} - {message}")]
    ExternalTool {
        tool: String,
        message: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl From<anyhow::Error> for StagehandError {
    fn from(error: anyhow::Error) -> Self {
        StagehandError::Unexpected(error.to_string())
    }
}

pub type StagehandResult<T> = std::result::Result<T, StagehandError>;
