use serde::Serialize;

use crate::error::RegistryError;
use crate::registry::TaskRegistry;

/// One step of a pipeline: a display title and the task it runs
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    pub title: String,
    pub task: String,
}

/// An ordered list of steps run by [`crate::PipelineRunner`]
#[derive(Debug, Clone, Serialize)]
pub struct Pipeline {
    pub name: String,
    pub description: String,
    pub steps: Vec<Step>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, title: impl Into<String>, task: impl Into<String>) -> Self {
        self.steps.push(Step {
            title: title.into(),
            task: task.into(),
        });
        self
    }

    /// Check that the pipeline has steps and that all of them are registered.
    pub fn validate(&self, registry: &TaskRegistry) -> Result<(), RegistryError> {
        if self.steps.is_empty() {
            return Err(RegistryError::EmptyPipeline(self.name.clone()));
        }
        match self.steps.iter().find(|s| !registry.contains(&s.task)) {
            Some(step) => Err(RegistryError::UnknownTask {
                pipeline: self.name.clone(),
                task: step.task.clone(),
            }),
            None => Ok(()),
        }
    }
}
