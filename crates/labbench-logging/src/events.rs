use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Structured log events for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LogEvent {
    PipelineStarted {
        pipeline: String,
        steps: usize,
        root: PathBuf,
    },
    StepStarted {
        index: usize,
        total: usize,
        title: String,
        task: String,
    },
    StepCompleted {
        index: usize,
        task: String,
        duration_secs: f64,
    },
    StepFailed {
        index: usize,
        task: String,
        error: String,
    },
    SessionCreated {
        name: String,
        dir: PathBuf,
    },
    PipelineCompleted {
        pipeline: String,
        steps: usize,
        duration_secs: f64,
    },
    PipelineFailed {
        pipeline: String,
        task: String,
        error: String,
        duration_secs: f64,
    },
    PipelineInterrupted {
        pipeline: String,
        steps_completed: usize,
    },
}

impl LogEvent {
    /// Add a timestamp to serialize with the event
    fn with_timestamp(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "timestamp".to_string(),
                serde_json::Value::String(chrono::Local::now().to_rfc3339()),
            );
        }
        value
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors and visual structure
    #[default]
    Pretty,
    /// JSON lines format for machine consumption
    Json,
    /// Compact single-line format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

const RULE: &str = "════════════════════════════════════════════════════════════════════════";

/// Renders pipeline events on stderr and optionally mirrors them to a file
pub struct EventLogger {
    format: LogFormat,
    file_writer: Option<Mutex<File>>,
}

impl EventLogger {
    pub fn new(format: LogFormat) -> Self {
        Self {
            format,
            file_writer: None,
        }
    }

    /// Create an event logger that also appends JSON lines to `log_path`
    pub fn with_file(format: LogFormat, log_path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(Self {
            format,
            file_writer: Some(Mutex::new(file)),
        })
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    pub fn log(&self, event: &LogEvent) {
        // File output is always JSON
        if let Some(ref writer) = self.file_writer {
            if let Ok(mut file) = writer.lock() {
                let json = event.with_timestamp();
                let _ = writeln!(file, "{}", json);
            }
        }

        let mut stderr = std::io::stderr();
        match self.format {
            LogFormat::Json => {
                if let Ok(json) = serde_json::to_string(event) {
                    let _ = writeln!(stderr, "{}", json);
                }
            }
            LogFormat::Pretty => {
                for line in Self::render_pretty(event) {
                    let _ = writeln!(stderr, "{}", line);
                }
            }
            LogFormat::Compact => {
                let _ = writeln!(stderr, "{}", Self::render_compact(event));
            }
        }
    }

    fn render_pretty(event: &LogEvent) -> Vec<String> {
        match event {
            LogEvent::PipelineStarted {
                pipeline,
                steps,
                root,
            } => vec![
                String::new(),
                RULE.bright_blue().to_string(),
                format!(
                    "  {} {}",
                    pipeline.to_uppercase().bold().bright_white(),
                    "PIPELINE".bold().bright_white()
                ),
                format!("  {} {}", "Project:".dimmed(), root.display()),
                format!(
                    "  {} {}",
                    "Started:".dimmed(),
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                ),
                format!("  {} {}", "Steps:".dimmed(), steps),
                RULE.bright_blue().to_string(),
            ],
            LogEvent::StepStarted {
                index,
                total,
                title,
                ..
            } => vec![
                String::new(),
                format!(
                    "{} {}",
                    format!("▶ Step {}/{}:", index + 1, total).bright_cyan().bold(),
                    title.bold()
                ),
                "─".repeat(40).dimmed().to_string(),
            ],
            LogEvent::StepCompleted { duration_secs, .. } => {
                vec![format!("  {} Done ({:.1}s)", "✓".bright_green(), duration_secs)]
            }
            LogEvent::StepFailed { task, error, .. } => vec![format!(
                "  {} {} failed: {}",
                "✗".bright_red(),
                task,
                error.bright_red()
            )],
            LogEvent::SessionCreated { name, dir } => vec![format!(
                "  {} Session {} → {}",
                "📁".dimmed(),
                name.bright_cyan(),
                dir.display().to_string().dimmed()
            )],
            LogEvent::PipelineCompleted {
                pipeline,
                duration_secs,
                ..
            } => vec![
                String::new(),
                RULE.bright_green().to_string(),
                format!(
                    "  {} {} completed ({:.1}s)",
                    "✓".bright_green(),
                    pipeline.bold(),
                    duration_secs
                ),
                RULE.bright_green().to_string(),
            ],
            LogEvent::PipelineFailed {
                pipeline,
                task,
                error,
                ..
            } => vec![
                String::new(),
                RULE.bright_red().to_string(),
                format!(
                    "  {} {} failed at {}",
                    "✗".bright_red(),
                    pipeline.bold(),
                    task.bright_red()
                ),
                format!("  {} {}", "Error:".dimmed(), error),
                RULE.bright_red().to_string(),
            ],
            LogEvent::PipelineInterrupted {
                pipeline,
                steps_completed,
            } => vec![
                String::new(),
                format!(
                    "{} {} interrupted after {} step(s)",
                    "⚠".bright_yellow(),
                    pipeline,
                    steps_completed
                ),
            ],
        }
    }

    fn render_compact(event: &LogEvent) -> String {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        match event {
            LogEvent::PipelineStarted {
                pipeline, steps, ..
            } => format!("[{}] pipeline:start {} steps={}", timestamp, pipeline, steps),
            LogEvent::StepStarted {
                index, total, task, ..
            } => format!("[{}] step:start:{}/{} {}", timestamp, index + 1, total, task),
            LogEvent::StepCompleted {
                index,
                task,
                duration_secs,
            } => format!(
                "[{}] step:done:{} {} {:.1}s",
                timestamp,
                index + 1,
                task,
                duration_secs
            ),
            LogEvent::StepFailed { index, task, error } => {
                format!("[{}] step:fail:{} {} {}", timestamp, index + 1, task, error)
            }
            LogEvent::SessionCreated { name, dir } => {
                format!("[{}] session:{} {}", timestamp, name, dir.display())
            }
            LogEvent::PipelineCompleted {
                pipeline,
                steps,
                duration_secs,
            } => format!(
                "[{}] pipeline:done {} steps={} {:.1}s",
                timestamp, pipeline, steps, duration_secs
            ),
            LogEvent::PipelineFailed {
                pipeline,
                task,
                error,
                ..
            } => format!(
                "[{}] pipeline:fail {} at {}: {}",
                timestamp, pipeline, task, error
            ),
            LogEvent::PipelineInterrupted {
                pipeline,
                steps_completed,
            } => format!(
                "[{}] pipeline:interrupted {} after {}",
                timestamp, pipeline, steps_completed
            ),
        }
    }
}
