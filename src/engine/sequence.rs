// src/engine/sequence.rs
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::task::{Task, TaskRegistry};
use crate::error::{StagehandResult, StagehandError};

/// Single step of a sequence: one task name, or a group of task names that
/// run concurrently. Serialized form is a bare string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Single(String),
    Parallel(Vec<String>),
}

/// Ordered list of steps making up a named pipeline. Step order is execution
/// order; order inside a parallel step carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceSpec {
    pub steps: Vec<Step>,
}

impl SequenceSpec {
    /// Create a sequence spec from a list of steps
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Get the number of steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Load a sequence spec from a JSON file
    pub fn load(path: &Path) -> StagehandResult<Self> {
        debug!("Loading sequence from {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| StagehandError::File {
                path: path.to_path_buf(),
                message: format!("Failed to read file: {}", e),
            })?;

        let spec: SequenceSpec = serde_json::from_str(&content)
            .map_err(|e| StagehandError::Serialization(format!("Failed to parse JSON: {}", e)))?;

        Ok(spec)
    }

    /// Save a sequence spec to a JSON file
    pub fn save(&self, path: &Path) -> StagehandResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StagehandError::Serialization(format!("Failed to serialize sequence: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| StagehandError::File {
                path: path.to_path_buf(),
                message: format!("Failed to write file: {}", e),
            })?;

        Ok(())
    }
}

/// A task resolved against the registry, keyed by its registered name
#[derive(Clone)]
pub struct ResolvedTask {
    pub name: String,
    pub task: Arc<dyn Task>,
}

/// A non-empty set of resolved tasks dispatched concurrently as one step
#[derive(Clone)]
pub struct Stage {
    tasks: Vec<ResolvedTask>,
}

impl Stage {
    /// Get the resolved tasks of this stage
    pub fn tasks(&self) -> &[ResolvedTask] {
        &self.tasks
    }

    /// Get the task names of this stage
    pub fn names(&self) -> Vec<String> {
        self.tasks.iter().map(|t| t.name.clone()).collect()
    }

    /// Get the number of tasks in this stage
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

/// The validated, resolved form of a sequence spec: an ordered list of stages
pub struct ExecutionGraph {
    stages: Vec<Stage>,
}

impl ExecutionGraph {
    /// Get the stages in execution order
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Get the number of stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Check whether the graph has no stages at all
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Task names per stage, in execution order. Used for listing sequences
    /// and for structural comparison of graphs.
    pub fn structure(&self) -> Vec<Vec<String>> {
        self.stages.iter().map(|s| s.names()).collect()
    }
}

/// Resolve a sequence spec into an execution graph.
///
/// Resolution is all-or-nothing: the first unknown task name or empty
/// parallel step aborts it and no graph is produced. Duplicate names inside
/// one parallel step are collapsed to a single occurrence.
pub fn resolve(spec: &SequenceSpec, registry: &TaskRegistry) -> StagehandResult<ExecutionGraph> {
    let mut stages = Vec::with_capacity(spec.steps.len());

    for (index, step) in spec.steps.iter().enumerate() {
        let stage = match step {
            Step::Single(name) => Stage {
                tasks: vec![ResolvedTask {
                    name: name.clone(),
                    task: registry.lookup(name)?,
                }],
            },
            Step::Parallel(names) => {
                if names.is_empty() {
                    return Err(StagehandError::EmptyStage { step: index });
                }

                let mut seen = HashSet::new();
                let mut tasks = Vec::with_capacity(names.len());
                for name in names {
                    if !seen.insert(name.as_str()) {
                        continue;
                    }
                    tasks.push(ResolvedTask {
                        name: name.clone(),
                        task: registry.lookup(name)?,
                    });
                }

                Stage { tasks }
            }
        };

        stages.push(stage);
    }

    debug!("Resolved sequence into {} stages", stages.len());
    Ok(ExecutionGraph { stages })
}
