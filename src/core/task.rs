// src/core/task.rs
use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::debug;

use crate::error::{StagehandResult, StagehandError};

/// Task trait that all build tasks must implement
#[async_trait]
pub trait Task: Send + Sync {
    /// Name the task is registered under. Must be unique and non-empty.
    fn name(&self) -> &str;

    /// One-line description shown when listing tasks
    fn description(&self) -> &str {
        ""
    }

    /// Execute the task
    async fn run(&self) -> StagehandResult<()>;
}

/// Owner of the name-to-task mapping.
///
/// Registration happens once during startup; during a run the registry is
/// read-only, so it can be shared behind an `Arc` without locking.
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<dyn Task>>,
}

impl TaskRegistry {
    /// Create a new, empty registry
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Register a task under its own name
    pub fn register(&mut self, task: Arc<dyn Task>) -> StagehandResult<()> {
        let name = task.name().to_string();

        if name.is_empty() {
            return Err(StagehandError::InvalidInput(
                "Task name must not be empty".to_string(),
            ));
        }

        if self.tasks.contains_key(&name) {
            return Err(StagehandError::DuplicateTask(name));
        }

        debug!("Registered task '{}'", name);
        self.tasks.insert(name, task);
        Ok(())
    }

    /// Look up a task by name
    pub fn lookup(&self, name: &str) -> StagehandResult<Arc<dyn Task>> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| StagehandError::UnknownTask(name.to_string()))
    }

    /// Check if a task exists
    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Get all registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get all registered tasks, sorted by name
    pub fn tasks(&self) -> Vec<Arc<dyn Task>> {
        let mut tasks: Vec<Arc<dyn Task>> = self.tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.name().cmp(b.name()));
        tasks
    }

    /// Get the number of registered tasks
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
