mod executor;
mod sequence;

pub use executor::{Executor, RunReport, RunStatus, StageReport, TaskReport, TaskStatus};
pub use sequence::{resolve, ExecutionGraph, ResolvedTask, SequenceSpec, Stage, Step};
