use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathsError {
    #[error("Failed to create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("Pipeline '{pipeline}' references unknown task '{task}'")]
    UnknownTask { pipeline: String, task: String },

    #[error("Pipeline '{0}' is already registered")]
    DuplicatePipeline(String),

    #[error("Pipeline '{0}' has no steps")]
    EmptyPipeline(String),
}

/// Errors raised by a task's entry point
#[derive(Error, Debug)]
pub enum TaskError {
    #[error("Session error: {0}")]
    Session(#[from] labbench_session::SessionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing input {}", .0.display())]
    MissingInput(PathBuf),

    #[error("{0}")]
    Failed(String),
}

impl TaskError {
    pub fn failed(message: impl Into<String>) -> Self {
        TaskError::Failed(message.into())
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Unknown pipeline '{0}'")]
    UnknownPipeline(String),
}
