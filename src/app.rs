// src/app.rs
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Result, bail};
use tracing::info;

use crate::config::Config;
use crate::core::task::TaskRegistry;
use crate::engine::{self, Executor, RunStatus, SequenceSpec, Step};
use crate::tasks;

/// Application commands
pub enum Command {
    Run(RunCommand),
    Tasks,
    Sequences,
}

/// Parameters for running a sequence or a single task
pub struct RunCommand {
    pub name: Option<String>,
    pub sequence_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub max_concurrent: Option<usize>,
}

/// Main application struct that holds the configuration and the registry
pub struct App {
    config: Config,
    registry: Arc<TaskRegistry>,
}

impl App {
    /// Create a new application instance with the built-in tasks registered
    pub fn new(config: Config) -> Result<Self> {
        let mut registry = TaskRegistry::new();
        tasks::register_builtin(&mut registry, &config)?;

        Ok(Self {
            config,
            registry: Arc::new(registry),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Run a specific command
    pub async fn run_command(&self, command: &Command) -> Result<()> {
        match command {
            Command::Run(run_cmd) => self.handle_run(run_cmd).await,
            Command::Tasks => self.handle_tasks(),
            Command::Sequences => self.handle_sequences(),
        }
    }

    async fn handle_run(&self, command: &RunCommand) -> Result<()> {
        let (label, spec) = self.select_sequence(command)?;

        let graph = engine::resolve(&spec, &self.registry)?;
        let max_concurrent = command
            .max_concurrent
            .unwrap_or(self.config.executor.max_concurrent_tasks);

        let executor = Executor::new(max_concurrent);
        let report = executor.run(&label, &graph).await;

        if let Some(path) = &command.output {
            report.save(path)?;
            info!("Wrote run report to {}", path.display());
        }

        match &report.status {
            RunStatus::Success => {
                println!(
                    "Sequence '{}' completed ({} stages, {}s)",
                    label,
                    report.stages.len(),
                    report.duration_seconds
                );
                Ok(())
            }
            RunStatus::Failed { stage, failed_tasks } => {
                for failure in report.failures() {
                    eprintln!(
                        "  {}: {}",
                        failure.name,
                        failure.error.as_deref().unwrap_or("unknown error")
                    );
                }
                bail!(
                    "Sequence '{}' failed at stage {}: {}",
                    label,
                    stage,
                    failed_tasks.join(", ")
                )
            }
        }
    }

    /// Pick the sequence to run: an explicit file, a configured sequence, or
    /// a single registered task wrapped in a one-stage sequence.
    fn select_sequence(&self, command: &RunCommand) -> Result<(String, SequenceSpec)> {
        if let Some(path) = &command.sequence_file {
            let spec = SequenceSpec::load(path)?;
            let label = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            return Ok((label, spec));
        }

        let Some(name) = &command.name else {
            bail!("A task or sequence name is required (or use --sequence-file)");
        };

        if let Some(spec) = self.config.sequences.get(name) {
            return Ok((name.clone(), spec.clone()));
        }

        if self.registry.has_task(name) {
            return Ok((
                name.clone(),
                SequenceSpec::new(vec![Step::Single(name.clone())]),
            ));
        }

        bail!(
            "'{}' is neither a configured sequence nor a registered task (see `stagehand tasks`)",
            name
        )
    }

    fn handle_tasks(&self) -> Result<()> {
        println!("Available tasks:");

        for task in self.registry.tasks() {
            if task.description().is_empty() {
                println!("- {}", task.name());
            } else {
                println!("- {} ({})", task.name(), task.description());
            }
        }

        Ok(())
    }

    fn handle_sequences(&self) -> Result<()> {
        println!("Configured sequences:");

        let mut names: Vec<&String> = self.config.sequences.keys().collect();
        names.sort();

        for name in names {
            println!("- {}", name);
            for step in &self.config.sequences[name].steps {
                println!("    {}", format_step(step));
            }
        }

        Ok(())
    }
}

fn format_step(step: &Step) -> String {
    match step {
        Step::Single(name) => name.clone(),
        Step::Parallel(names) => format!("[{}]", names.join(", ")),
    }
}
