use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use labbench_logging::{EventLogger, LogEvent};
use labbench_session::SessionConfig;

use crate::context::TaskContext;
use crate::error::PipelineError;
use crate::outcome::{PipelineOutcome, StepRecord};
use crate::paths::ProjectPaths;
use crate::pipeline::Pipeline;
use crate::registry::TaskRegistry;

/// Runs registered pipelines step by step
pub struct PipelineRunner<'a> {
    registry: &'a TaskRegistry,
    paths: ProjectPaths,
    session_config: SessionConfig,
    events: Arc<EventLogger>,
    interrupted: Arc<AtomicBool>,
}

impl<'a> PipelineRunner<'a> {
    pub fn new(
        registry: &'a TaskRegistry,
        paths: ProjectPaths,
        session_config: SessionConfig,
        events: Arc<EventLogger>,
    ) -> Self {
        Self {
            registry,
            paths,
            session_config,
            events,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing interrupt flag, e.g. one Ctrl+C handler across runs
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    /// Get a handle to signal interruption. Checked before every step and
    /// reset once a run stops on it.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    /// Run the pipeline registered under `name`
    pub fn run_named(&self, name: &str) -> Result<PipelineOutcome, PipelineError> {
        let pipeline = self
            .registry
            .pipeline(name)
            .ok_or_else(|| PipelineError::UnknownPipeline(name.to_string()))?;
        self.run(pipeline)
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self, pipeline: &Pipeline) -> Result<PipelineOutcome, PipelineError> {
        pipeline.validate(self.registry)?;

        let started = Instant::now();
        let total = pipeline.steps.len();
        let mut completed: Vec<StepRecord> = Vec::with_capacity(total);

        self.events.log(&LogEvent::PipelineStarted {
            pipeline: pipeline.name.clone(),
            steps: total,
            root: self.paths.root.clone(),
        });

        for (index, step) in pipeline.steps.iter().enumerate() {
            // Consume the interrupt so the next run starts clean
            if self.interrupted.swap(false, Ordering::SeqCst) {
                info!(pipeline = %pipeline.name, "Pipeline interrupted by user");
                self.events.log(&LogEvent::PipelineInterrupted {
                    pipeline: pipeline.name.clone(),
                    steps_completed: completed.len(),
                });
                return Ok(PipelineOutcome::interrupted(
                    pipeline.name.clone(),
                    completed,
                    started.elapsed(),
                ));
            }

            // Validated above
            let Some(task) = self.registry.get(&step.task) else {
                continue;
            };

            self.events.log(&LogEvent::StepStarted {
                index,
                total,
                title: step.title.clone(),
                task: step.task.clone(),
            });

            let ctx = TaskContext::new(
                task.id(),
                self.paths.clone(),
                self.session_config.clone(),
                self.events.clone(),
            );

            debug!(task = %step.task, "Running task");
            let step_started = Instant::now();
            let _span = ctx.logger.span().entered();

            match task.run(&ctx) {
                Ok(()) => {
                    let duration_secs = step_started.elapsed().as_secs_f64();
                    self.events.log(&LogEvent::StepCompleted {
                        index,
                        task: step.task.clone(),
                        duration_secs,
                    });
                    completed.push(StepRecord {
                        title: step.title.clone(),
                        task: step.task.clone(),
                        duration_secs,
                    });
                }
                Err(e) => {
                    warn!(task = %step.task, error = %e, "Task failed");
                    self.events.log(&LogEvent::StepFailed {
                        index,
                        task: step.task.clone(),
                        error: e.to_string(),
                    });
                    self.events.log(&LogEvent::PipelineFailed {
                        pipeline: pipeline.name.clone(),
                        task: step.task.clone(),
                        error: e.to_string(),
                        duration_secs: started.elapsed().as_secs_f64(),
                    });
                    return Ok(PipelineOutcome::failed(
                        pipeline.name.clone(),
                        completed,
                        step.task.clone(),
                        e.to_string(),
                        started.elapsed(),
                    ));
                }
            }
        }

        self.events.log(&LogEvent::PipelineCompleted {
            pipeline: pipeline.name.clone(),
            steps: completed.len(),
            duration_secs: started.elapsed().as_secs_f64(),
        });

        Ok(PipelineOutcome::success(
            pipeline.name.clone(),
            completed,
            started.elapsed(),
        ))
    }
}
