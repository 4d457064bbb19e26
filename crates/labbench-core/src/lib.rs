//! # labbench-core
//!
//! Project layout and pipeline orchestration for labbench.
//!
//! Tasks are registered explicitly in a [`TaskRegistry`] at startup, grouped
//! into [`Pipeline`]s, and executed by a [`PipelineRunner`]. Each task gets a
//! [`TaskContext`] with the resolved [`ProjectPaths`] and can open analysis
//! sessions under the project's output directory.

mod context;
mod error;
mod outcome;
mod paths;
mod pipeline;
mod registry;
mod runner;

pub use context::TaskContext;
pub use error::{PathsError, PipelineError, RegistryError, TaskError};
pub use outcome::{PipelineOutcome, StepRecord};
pub use paths::{PathsConfig, ProjectPaths, PROJECT_MARKER};
pub use pipeline::{Pipeline, Step};
pub use registry::{FnTask, Task, TaskRegistry};
pub use runner::PipelineRunner;
