use std::collections::HashMap;

use crate::context::TaskContext;
use crate::error::{RegistryError, TaskError};
use crate::pipeline::Pipeline;

/// A unit of pipeline work: a data pull, a processing pass or an analysis
pub trait Task: Send + Sync {
    /// Identifier used by pipelines and the CLI (e.g. "example_collect")
    fn id(&self) -> &str;

    /// One-line description for listings
    fn description(&self) -> &str;

    /// Entry point
    fn run(&self, ctx: &TaskContext) -> Result<(), TaskError>;
}

type TaskFn = Box<dyn Fn(&TaskContext) -> Result<(), TaskError> + Send + Sync>;

/// Adapts a plain function or closure into a [`Task`]
pub struct FnTask {
    id: String,
    description: String,
    entry: TaskFn,
}

impl FnTask {
    pub fn new<F>(id: impl Into<String>, description: impl Into<String>, entry: F) -> Self
    where
        F: Fn(&TaskContext) -> Result<(), TaskError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            description: description.into(),
            entry: Box::new(entry),
        }
    }
}

impl Task for FnTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn run(&self, ctx: &TaskContext) -> Result<(), TaskError> {
        (self.entry)(ctx)
    }
}

/// Explicit mapping from task identifiers to entry points, plus the
/// pipelines built from them. Populated once at startup.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: Vec<Box<dyn Task>>,
    index: HashMap<String, usize>,
    pipelines: Vec<Pipeline>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Box<dyn Task>) -> Result<(), RegistryError> {
        let id = task.id().to_string();
        if self.index.contains_key(&id) {
            return Err(RegistryError::DuplicateTask(id));
        }
        tracing::debug!(task = %id, "Registered task");
        self.index.insert(id, self.tasks.len());
        self.tasks.push(task);
        Ok(())
    }

    pub fn register_fn<F>(
        &mut self,
        id: &str,
        description: &str,
        entry: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&TaskContext) -> Result<(), TaskError> + Send + Sync + 'static,
    {
        self.register(Box::new(FnTask::new(id, description, entry)))
    }

    /// Add a pipeline. Every step must name a task registered before it.
    pub fn register_pipeline(&mut self, pipeline: Pipeline) -> Result<(), RegistryError> {
        if self.pipeline(&pipeline.name).is_some() {
            return Err(RegistryError::DuplicatePipeline(pipeline.name));
        }
        pipeline.validate(self)?;
        self.pipelines.push(pipeline);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Task> {
        self.index.get(id).map(|&i| self.tasks[i].as_ref())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Tasks in registration order
    pub fn tasks(&self) -> impl Iterator<Item = &(dyn Task + 'static)> {
        self.tasks.iter().map(|t| t.as_ref())
    }

    pub fn ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.id()).collect()
    }

    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.iter().find(|p| p.name == name)
    }

    /// Pipelines in registration order
    pub fn pipelines(&self) -> &[Pipeline] {
        &self.pipelines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &TaskContext) -> Result<(), TaskError> {
        Ok(())
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = TaskRegistry::new();
        registry.register_fn("collect", "Pull data", noop).unwrap();
        registry.register_fn("analyze", "Rank", noop).unwrap();

        assert_eq!(registry.ids(), vec!["collect", "analyze"]);
        assert_eq!(registry.get("analyze").unwrap().description(), "Rank");
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_task_rejected() {
        let mut registry = TaskRegistry::new();
        registry.register_fn("collect", "a", noop).unwrap();
        let err = registry.register_fn("collect", "b", noop).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateTask(ref id) if id == "collect"));
        assert_eq!(registry.get("collect").unwrap().description(), "a");
    }

    #[test]
    fn test_pipeline_with_unknown_task_rejected() {
        let mut registry = TaskRegistry::new();
        registry.register_fn("collect", "a", noop).unwrap();

        let pipeline = Pipeline::new("example", "demo")
            .step("Data Collection", "collect")
            .step("Analysis", "analyze");
        let err = registry.register_pipeline(pipeline).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownTask { ref task, .. } if task == "analyze"));
        assert!(registry.pipelines().is_empty());
    }

    #[test]
    fn test_duplicate_pipeline_rejected() {
        let mut registry = TaskRegistry::new();
        registry.register_fn("collect", "a", noop).unwrap();
        registry
            .register_pipeline(Pipeline::new("p", "").step("one", "collect"))
            .unwrap();
        let err = registry
            .register_pipeline(Pipeline::new("p", "").step("two", "collect"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePipeline(_)));
    }
}
