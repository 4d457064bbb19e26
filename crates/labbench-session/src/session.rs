use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{segment_problem, SessionConfig};
use crate::error::SessionError;

/// A timestamped output directory for one analysis run.
///
/// The directory is `<output_root>/<name>/<timestamp>/` and exists on disk
/// for as long as the value does. Nothing about the session changes after
/// construction; artifacts are written under [`AnalysisSession::dir`].
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    name: String,
    created_at: DateTime<Local>,
    timestamp: String,
    dir: PathBuf,
}

impl AnalysisSession {
    /// Create a session stamped with the current local time.
    pub fn create(
        name: &str,
        output_root: impl AsRef<Path>,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        Self::create_at(name, output_root, config, Local::now())
    }

    /// Create a session stamped with `created_at`.
    ///
    /// Creating the same name at the same formatted instant twice reuses the
    /// existing directory.
    pub fn create_at(
        name: &str,
        output_root: impl AsRef<Path>,
        config: &SessionConfig,
        created_at: DateTime<Local>,
    ) -> Result<Self, SessionError> {
        validate_name(name)?;
        let timestamp = config.format_timestamp(&created_at)?;
        let dir = output_root.as_ref().join(name).join(&timestamp);

        fs::create_dir_all(&dir).map_err(|e| SessionError::from_io(&dir, e))?;

        info!(session = %timestamp, dir = %dir.display(), "Analysis session ready");

        Ok(Self {
            name: name.to_string(),
            created_at,
            timestamp,
            dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// The formatted `created_at`, which is also the leaf directory name
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of `file_name` inside the session directory. The caller owns
    /// `file_name`; nested or relative paths are joined as given.
    pub fn path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Write text content to `file_name` inside the session directory.
    /// `file_name` must be a plain file name, not a path.
    pub fn save(&self, file_name: &str, contents: impl AsRef<str>) -> Result<PathBuf, SessionError> {
        if let Some(reason) = segment_problem(file_name) {
            return Err(SessionError::InvalidFileName {
                file_name: file_name.to_string(),
                reason: reason.to_string(),
            });
        }
        let path = self.path(file_name);
        fs::write(&path, contents.as_ref()).map_err(|e| SessionError::from_io(&path, e))?;
        info!(path = %path.display(), "Saved");
        Ok(path)
    }

    /// Write `value` as pretty JSON to `file_name` inside the session directory.
    pub fn save_json<T: Serialize>(
        &self,
        file_name: &str,
        value: &T,
    ) -> Result<PathBuf, SessionError> {
        let json = serde_json::to_string_pretty(value).map_err(|source| SessionError::Serialize {
            file_name: file_name.to_string(),
            source,
        })?;
        self.save(file_name, json)
    }

    /// Mark the run as done. The directory stays on disk.
    pub fn finish(self) -> PathBuf {
        info!(dir = %self.dir.display(), "Analysis session completed");
        self.dir
    }
}

/// Create a session under `output_root` with the default timestamp format.
pub fn create_analysis_session(
    name: &str,
    output_root: impl AsRef<Path>,
) -> Result<AnalysisSession, SessionError> {
    AnalysisSession::create(name, output_root, &SessionConfig::default())
}

/// Create a session under `output_root` with an explicit configuration.
pub fn create_analysis_session_with(
    name: &str,
    output_root: impl AsRef<Path>,
    config: &SessionConfig,
) -> Result<AnalysisSession, SessionError> {
    AnalysisSession::create(name, output_root, config)
}

/// A session name has to be exactly one path segment.
pub fn validate_name(name: &str) -> Result<(), SessionError> {
    match segment_problem(name) {
        Some(reason) => {
            debug!(session_name = name, reason, "Rejected session name");
            Err(SessionError::InvalidName {
                name: name.to_string(),
                reason: reason.to_string(),
            })
        }
        None => Ok(()),
    }
}
