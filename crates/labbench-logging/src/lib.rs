//! # labbench-logging
//!
//! Logging for labbench projects.
//!
//! One logging configuration is installed per process with [`init_logging`];
//! modules then ask for a named handle with [`get_logger`] instead of
//! configuring anything themselves.
//!
//! ## Key Types
//!
//! - [`LoggingConfig`] - Level, console format and log file settings
//! - [`LoggingGuard`] - Keeps the background file writer alive
//! - [`ComponentLogger`] - Logger handle tagged with a component name
//! - [`EventLogger`] / [`LogEvent`] - Structured pipeline progress events
//!
//! ## Log Formats
//!
//! - `Pretty` - Human-readable colored output
//! - `JSON` - Structured JSON lines
//! - `Compact` - Minimal text output

mod events;

pub use events::{EventLogger, LogEvent, LogFormat};

use std::fmt::Display;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::Layered;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Logging is already initialized for this process")]
    AlreadyInitialized,

    #[error("Invalid log level '{level}': {reason}")]
    InvalidLevel { level: String, reason: String },

    #[error("File logging is enabled but no log directory was given")]
    MissingLogDir,

    #[error("Failed to open log file: {0}")]
    Appender(String),

    #[error("Failed to create log directory {}: {source}", path.display())]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Logging settings, usually read from the `[logging]` table of `labbench.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Also write a log file per run
    #[serde(default = "default_log_to_file")]
    pub log_to_file: bool,
    /// Where log files go (normally `<output>/logs`)
    #[serde(skip)]
    pub log_dir: Option<PathBuf>,
    /// Prefix of the log file name
    #[serde(skip, default = "default_program")]
    pub program: String,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_to_file() -> bool {
    true
}

fn default_program() -> String {
    "labbench".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
            log_to_file: default_log_to_file(),
            log_dir: None,
            program: default_program(),
        }
    }
}

impl LoggingConfig {
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

/// The configuration that was installed for this process
#[derive(Debug, Clone)]
pub struct ActiveLogging {
    pub level: String,
    pub format: LogFormat,
    pub log_file: Option<PathBuf>,
}

static ACTIVE: OnceCell<ActiveLogging> = OnceCell::new();

/// Returned by [`init_logging`]; dropping it flushes and closes the log file.
pub struct LoggingGuard {
    log_file: Option<PathBuf>,
    _file_guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

type Base = Layered<EnvFilter, Registry>;
type BoxedLayer = Box<dyn Layer<Base> + Send + Sync + 'static>;

/// Install the process-wide subscriber. Must be called at most once.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    if ACTIVE.get().is_some() {
        return Err(LoggingError::AlreadyInitialized);
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| LoggingError::InvalidLevel {
            level: config.level.clone(),
            reason: e.to_string(),
        })?,
    };

    // Console output goes to stderr; stdout is reserved for command results
    let mut layers: Vec<BoxedLayer> = Vec::new();
    layers.push(match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
    });

    let mut file_guard = None;
    let mut log_file = None;
    if config.log_to_file {
        let dir = config.log_dir.as_ref().ok_or(LoggingError::MissingLogDir)?;
        std::fs::create_dir_all(dir).map_err(|source| LoggingError::LogDir {
            path: dir.clone(),
            source,
        })?;

        let file_name = log_file_name(&config.program, Local::now());
        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(&file_name)
            .build(dir)
            .map_err(|e| LoggingError::Appender(e.to_string()))?;
        let (writer, guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt::layer().with_writer(writer).with_ansi(false).boxed());

        file_guard = Some(guard);
        log_file = Some(dir.join(file_name));
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(layers)
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    let _ = ACTIVE.set(ActiveLogging {
        level: config.level.clone(),
        format: config.format,
        log_file: log_file.clone(),
    });

    if let Some(ref path) = log_file {
        tracing::info!(log_file = %path.display(), "Logging to file");
    }

    Ok(LoggingGuard {
        log_file,
        _file_guard: file_guard,
    })
}

/// The installed configuration, if [`init_logging`] has run.
pub fn active_logging() -> Option<&'static ActiveLogging> {
    ACTIVE.get()
}

/// `<program>_<YYYYMMDD_HHMMSS>.log`
pub fn log_file_name(program: &str, at: DateTime<Local>) -> String {
    format!("{}_{}.log", program, at.format("%Y%m%d_%H%M%S"))
}

/// A logger tagged with the component (module, task, script) using it.
///
/// Cheap to create; before [`init_logging`] runs, events are discarded.
#[derive(Debug, Clone)]
pub struct ComponentLogger {
    component: String,
}

/// Get a logger for `component`.
pub fn get_logger(component: impl Into<String>) -> ComponentLogger {
    ComponentLogger {
        component: component.into(),
    }
}

impl ComponentLogger {
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn debug(&self, message: impl Display) {
        tracing::debug!(component = %self.component, "{}", message);
    }

    pub fn info(&self, message: impl Display) {
        tracing::info!(component = %self.component, "{}", message);
    }

    pub fn warn(&self, message: impl Display) {
        tracing::warn!(component = %self.component, "{}", message);
    }

    pub fn error(&self, message: impl Display) {
        tracing::error!(component = %self.component, "{}", message);
    }

    /// A span carrying the component name, for grouping nested events
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!("component", name = %self.component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_log_file_name() {
        let at = Local.with_ymd_and_hms(2025, 8, 13, 15, 30, 45).unwrap();
        assert_eq!(log_file_name("main", at), "main_20250813_153045.log");
    }

    #[test]
    fn test_get_logger_without_init() {
        let logger = get_logger("analysis::ppi");
        assert_eq!(logger.component(), "analysis::ppi");
        // No subscriber installed: must not panic
        logger.info("nothing listens");
        let _entered = logger.span().entered();
    }

    #[test]
    fn test_config_from_toml() {
        let config: LoggingConfig = toml::from_str(
            r#"
level = "debug"
format = "json"
log_to_file = false
"#,
        )
        .unwrap();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert!(!config.log_to_file);
        assert_eq!(config.program, "labbench");
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result: Result<LoggingConfig, _> = toml::from_str("colour = true");
        assert!(result.is_err());
    }
}
