// src/engine/executor.rs
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use tokio::sync::Semaphore;
use tracing::{info, debug, warn, error};

use crate::error::{StagehandResult, StagehandError};
use super::sequence::{ExecutionGraph, ResolvedTask};

/// Status of a single executed task
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TaskStatus {
    Completed,
    Failed,
}

/// Result of executing one task within a stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskReport {
    pub name: String,
    pub status: TaskStatus,
    pub error: Option<String>,
    pub execution_time: Duration,
}

impl TaskReport {
    fn failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

/// Results of one fully settled stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub index: usize,
    pub tasks: Vec<TaskReport>,
}

impl StageReport {
    /// Names of the tasks that failed in this stage, in dispatch order
    pub fn failed_tasks(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|t| t.failed())
            .map(|t| t.name.clone())
            .collect()
    }
}

/// Overall status of a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RunStatus {
    Success,
    Failed {
        stage: usize,
        failed_tasks: Vec<String>,
    },
}

/// Result of a run: one report per settled stage plus overall timing.
/// Stages that never started because an earlier stage failed do not appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub sequence: String,
    pub status: RunStatus,
    pub stages: Vec<StageReport>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: u64,
}

impl RunReport {
    /// Whether every stage settled successfully
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Reports of all failing tasks across the run
    pub fn failures(&self) -> Vec<&TaskReport> {
        self.stages
            .iter()
            .flat_map(|s| s.tasks.iter())
            .filter(|t| t.failed())
            .collect()
    }

    /// Save the report to a JSON file
    pub fn save(&self, path: &Path) -> StagehandResult<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| StagehandError::Serialization(format!("Failed to serialize report: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| StagehandError::File {
                path: path.to_path_buf(),
                message: format!("Failed to write file: {}", e),
            })?;

        Ok(())
    }
}

/// Executor for walking an execution graph stage by stage.
///
/// Within a stage every task is forked onto the runtime and the stage settles
/// only once all of them have finished. A failing task never interrupts its
/// siblings; it only prevents later stages from starting.
pub struct Executor {
    max_concurrent_tasks: usize,
    semaphore: Arc<Semaphore>,
}

impl Executor {
    /// Create a new executor with the given per-stage concurrency bound
    pub fn new(max_concurrent_tasks: usize) -> Self {
        let max_concurrent_tasks = max_concurrent_tasks.max(1);
        Self {
            max_concurrent_tasks,
            semaphore: Arc::new(Semaphore::new(max_concurrent_tasks)),
        }
    }

    /// Run an execution graph to completion or first failing stage
    pub async fn run(&self, sequence: &str, graph: &ExecutionGraph) -> RunReport {
        info!(
            "Running sequence '{}' ({} stages, max concurrency {})",
            sequence,
            graph.stage_count(),
            self.max_concurrent_tasks
        );
        let start_time = Utc::now();

        let mut stages = Vec::with_capacity(graph.stage_count());
        let mut status = RunStatus::Success;

        for (index, stage) in graph.stages().iter().enumerate() {
            debug!("Dispatching stage {} ({} tasks)", index, stage.task_count());
            let report = self.run_stage(index, stage.tasks()).await;
            let failed = report.failed_tasks();
            stages.push(report);

            if !failed.is_empty() {
                warn!(
                    "Stage {} failed ({}); not starting later stages",
                    index,
                    failed.join(", ")
                );
                status = RunStatus::Failed {
                    stage: index,
                    failed_tasks: failed,
                };
                break;
            }
        }

        let end_time = Utc::now();
        let duration = (end_time - start_time).num_seconds().max(0) as u64;

        match &status {
            RunStatus::Success => info!("Sequence '{}' completed successfully", sequence),
            RunStatus::Failed { stage, failed_tasks } => error!(
                "Sequence '{}' failed at stage {}: {}",
                sequence,
                stage,
                failed_tasks.join(", ")
            ),
        }

        RunReport {
            sequence: sequence.to_string(),
            status,
            stages,
            start_time,
            end_time,
            duration_seconds: duration,
        }
    }

    /// Fork every task of a stage, then join all of them. The stage outcome
    /// is decided only after the slowest task has finished.
    async fn run_stage(&self, index: usize, tasks: &[ResolvedTask]) -> StageReport {
        let mut handles = Vec::with_capacity(tasks.len());

        for resolved in tasks {
            let resolved = resolved.clone();
            let semaphore = self.semaphore.clone();

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.expect("Semaphore closed");
                Self::run_task(resolved).await
            });

            handles.push(handle);
        }

        let mut reports = Vec::with_capacity(tasks.len());
        for (handle, resolved) in handles.into_iter().zip(tasks) {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!("Task '{}' aborted: {}", resolved.name, e);
                    reports.push(TaskReport {
                        name: resolved.name.clone(),
                        status: TaskStatus::Failed,
                        error: Some(format!("Task aborted: {}", e)),
                        execution_time: Duration::from_secs(0),
                    });
                }
            }
        }

        StageReport {
            index,
            tasks: reports,
        }
    }

    /// Execute a single task, turning its outcome into a report
    async fn run_task(resolved: ResolvedTask) -> TaskReport {
        debug!("Executing task '{}'", resolved.name);
        let start = std::time::Instant::now();

        let (status, error) = match resolved.task.run().await {
            Ok(()) => (TaskStatus::Completed, None),
            Err(e) => {
                error!("Task '{}' failed: {}", resolved.name, e);
                (TaskStatus::Failed, Some(e.to_string()))
            }
        };

        let execution_time = start.elapsed();
        debug!(
            "Task '{}' finished in {:?} with status {:?}",
            resolved.name, execution_time, status
        );

        TaskReport {
            name: resolved.name.clone(),
            status,
            error,
            execution_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Instant;
    use async_trait::async_trait;

    use crate::core::task::{Task, TaskRegistry};
    use crate::engine::sequence::{resolve, SequenceSpec, Step};

    /// Records start and end instants per execution into a shared log
    struct RecordingTask {
        name: String,
        delay: Duration,
        fail: bool,
        log: Arc<Mutex<Vec<(String, Instant, Instant)>>>,
    }

    #[async_trait]
    impl Task for RecordingTask {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self) -> StagehandResult<()> {
            let start = Instant::now();
            tokio::time::sleep(self.delay).await;
            let end = Instant::now();
            self.log.lock().unwrap().push((self.name.clone(), start, end));

            if self.fail {
                Err(StagehandError::TaskExecution {
                    name: self.name.clone(),
                    message: "boom".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    type EventLog = Arc<Mutex<Vec<(String, Instant, Instant)>>>;

    fn recording_registry(
        tasks: &[(&str, u64, bool)],
    ) -> (TaskRegistry, EventLog) {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let mut registry = TaskRegistry::new();

        for (name, delay_ms, fail) in tasks {
            registry
                .register(Arc::new(RecordingTask {
                    name: name.to_string(),
                    delay: Duration::from_millis(*delay_ms),
                    fail: *fail,
                    log: log.clone(),
                }))
                .unwrap();
        }

        (registry, log)
    }

    fn single(name: &str) -> Step {
        Step::Single(name.to_string())
    }

    fn parallel(names: &[&str]) -> Step {
        Step::Parallel(names.iter().map(|n| n.to_string()).collect())
    }

    fn window(log: &EventLog, name: &str) -> (Instant, Instant) {
        let log = log.lock().unwrap();
        let entry = log
            .iter()
            .find(|(n, _, _)| n == name)
            .unwrap_or_else(|| panic!("task '{}' never ran", name));
        (entry.1, entry.2)
    }

    fn ran(log: &EventLog, name: &str) -> bool {
        log.lock().unwrap().iter().any(|(n, _, _)| n == name)
    }

    #[tokio::test]
    async fn test_empty_graph_is_a_noop_success() {
        let (registry, _log) = recording_registry(&[]);
        let graph = resolve(&SequenceSpec::default(), &registry).unwrap();

        let report = Executor::new(4).run("empty", &graph).await;
        assert!(report.is_success());
        assert!(report.stages.is_empty());
    }

    #[tokio::test]
    async fn test_stages_run_in_order_with_join_barrier() {
        let (registry, log) = recording_registry(&[
            ("a", 20, false),
            ("b", 30, false),
            ("c", 5, false),
            ("d", 5, false),
        ]);
        let spec = SequenceSpec::new(vec![single("a"), parallel(&["b", "c"]), single("d")]);
        let graph = resolve(&spec, &registry).unwrap();

        let report = Executor::new(4).run("ordered", &graph).await;
        assert!(report.is_success());
        assert_eq!(report.stages.len(), 3);

        let (_, a_end) = window(&log, "a");
        let (b_start, b_end) = window(&log, "b");
        let (c_start, c_end) = window(&log, "c");
        let (d_start, _) = window(&log, "d");

        assert!(a_end <= b_start);
        assert!(a_end <= c_start);
        assert!(b_end.max(c_end) <= d_start);
    }

    #[tokio::test]
    async fn test_failure_stops_later_stages() {
        let (registry, log) = recording_registry(&[
            ("a", 5, true),
            ("b", 5, false),
            ("c", 5, false),
        ]);
        let spec = SequenceSpec::new(vec![parallel(&["a", "b"]), single("c")]);
        let graph = resolve(&spec, &registry).unwrap();

        let report = Executor::new(4).run("contained", &graph).await;
        assert!(!report.is_success());
        assert!(!ran(&log, "c"));

        match report.status {
            RunStatus::Failed { stage, failed_tasks } => {
                assert_eq!(stage, 0);
                assert_eq!(failed_tasks, vec!["a".to_string()]);
            }
            RunStatus::Success => panic!("run should have failed"),
        }
    }

    #[tokio::test]
    async fn test_failing_task_does_not_interrupt_siblings() {
        // "fast" fails almost immediately, "slow" keeps running; the stage
        // must still wait for "slow" and record its completion.
        let (registry, log) = recording_registry(&[
            ("fast", 1, true),
            ("slow", 50, false),
        ]);
        let spec = SequenceSpec::new(vec![parallel(&["fast", "slow"])]);
        let graph = resolve(&spec, &registry).unwrap();

        let report = Executor::new(4).run("barrier", &graph).await;
        assert!(!report.is_success());
        assert!(ran(&log, "slow"));

        let stage = &report.stages[0];
        assert_eq!(stage.tasks.len(), 2);
        assert_eq!(stage.failed_tasks(), vec!["fast".to_string()]);

        let slow = stage.tasks.iter().find(|t| t.name == "slow").unwrap();
        assert_eq!(slow.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn test_concurrent_failures_are_aggregated() {
        let (registry, _log) = recording_registry(&[
            ("a", 5, true),
            ("b", 10, true),
            ("c", 5, false),
        ]);
        let spec = SequenceSpec::new(vec![parallel(&["a", "b", "c"])]);
        let graph = resolve(&spec, &registry).unwrap();

        let report = Executor::new(4).run("aggregated", &graph).await;
        match &report.status {
            RunStatus::Failed { stage, failed_tasks } => {
                assert_eq!(*stage, 0);
                let mut failed_tasks = failed_tasks.clone();
                failed_tasks.sort();
                assert_eq!(failed_tasks, vec!["a".to_string(), "b".to_string()]);
            }
            RunStatus::Success => panic!("run should have failed"),
        }

        assert_eq!(report.failures().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_names_run_once() {
        let (registry, log) = recording_registry(&[("a", 5, false)]);
        let spec = SequenceSpec::new(vec![parallel(&["a", "a"])]);
        let graph = resolve(&spec, &registry).unwrap();

        let report = Executor::new(4).run("dedup", &graph).await;
        assert!(report.is_success());
        assert_eq!(log.lock().unwrap().len(), 1);
        assert_eq!(report.stages[0].tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_rerun_after_failure_is_stateless() {
        let (registry, _log) = recording_registry(&[("a", 1, true)]);
        let spec = SequenceSpec::new(vec![single("a")]);
        let graph = resolve(&spec, &registry).unwrap();

        let executor = Executor::new(2);
        let first = executor.run("again", &graph).await;
        let second = executor.run("again", &graph).await;

        assert!(!first.is_success());
        assert!(!second.is_success());
        assert_eq!(second.stages.len(), 1);
    }

    #[tokio::test]
    async fn test_report_round_trips_to_json() {
        let (registry, _log) = recording_registry(&[("a", 1, false)]);
        let spec = SequenceSpec::new(vec![single("a")]);
        let graph = resolve(&spec, &registry).unwrap();

        let report = Executor::new(1).run("roundtrip", &graph).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save(&path).unwrap();

        let loaded: RunReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(loaded.is_success());
        assert_eq!(loaded.sequence, "roundtrip");
    }
}
