use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a step that finished
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub title: String,
    pub task: String,
    pub duration_secs: f64,
}

/// The final outcome of a pipeline run
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    /// Every step ran
    Success {
        pipeline: String,
        steps: Vec<StepRecord>,
        total_duration_secs: f64,
    },
    /// A step returned an error; later steps did not run
    Failed {
        pipeline: String,
        steps_completed: Vec<StepRecord>,
        failed_step: String,
        error: String,
        total_duration_secs: f64,
    },
    /// User requested stop (e.g., Ctrl+C)
    Interrupted {
        pipeline: String,
        steps_completed: Vec<StepRecord>,
        total_duration_secs: f64,
    },
}

impl PipelineOutcome {
    pub fn success(pipeline: String, steps: Vec<StepRecord>, duration: Duration) -> Self {
        Self::Success {
            pipeline,
            steps,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn failed(
        pipeline: String,
        steps_completed: Vec<StepRecord>,
        failed_step: String,
        error: String,
        duration: Duration,
    ) -> Self {
        Self::Failed {
            pipeline,
            steps_completed,
            failed_step,
            error,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn interrupted(
        pipeline: String,
        steps_completed: Vec<StepRecord>,
        duration: Duration,
    ) -> Self {
        Self::Interrupted {
            pipeline,
            steps_completed,
            total_duration_secs: duration.as_secs_f64(),
        }
    }

    pub fn steps_completed(&self) -> usize {
        match self {
            Self::Success { steps, .. } => steps.len(),
            Self::Failed {
                steps_completed, ..
            } => steps_completed.len(),
            Self::Interrupted {
                steps_completed, ..
            } => steps_completed.len(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success { .. } => 0,
            Self::Failed { .. } => 1,
            Self::Interrupted { .. } => 130,
        }
    }
}
