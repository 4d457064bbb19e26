use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::SessionError;

/// Directory under the output root reserved for log files
pub const LOGS_DIR_NAME: &str = "logs";

/// A session directory found on disk.
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub name: String,
    pub timestamp: String,
    pub created_at: Option<DateTime<Local>>,
    pub dir: PathBuf,
    pub file_count: usize,
}

/// Filter for listing sessions
#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub name: Option<String>,
    pub since: Option<NaiveDate>,
}

/// Read-only view over the sessions under one output root.
pub struct SessionStore {
    output_root: PathBuf,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(output_root: impl Into<PathBuf>, config: &SessionConfig) -> Self {
        Self {
            output_root: output_root.into(),
            config: config.clone(),
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// List sessions matching the filter, newest first.
    pub fn list(&self, filter: &SessionFilter) -> Result<Vec<SessionEntry>, SessionError> {
        if !self.output_root.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for analysis_dir in subdirectories(&self.output_root)? {
            let Some(name) = file_name(&analysis_dir) else {
                continue;
            };
            if name == LOGS_DIR_NAME {
                continue;
            }
            if let Some(ref wanted) = filter.name {
                if &name != wanted {
                    continue;
                }
            }

            let session_dirs = match subdirectories(&analysis_dir) {
                Ok(dirs) => dirs,
                Err(e) => {
                    tracing::warn!("Skipping unreadable analysis dir {:?}: {}", analysis_dir, e);
                    continue;
                }
            };

            for dir in session_dirs {
                let Some(timestamp) = file_name(&dir) else {
                    continue;
                };
                let created_at = self.config.parse_timestamp(&timestamp);

                if let Some(since) = filter.since {
                    match created_at {
                        Some(ts) if ts.date_naive() >= since => {}
                        _ => continue,
                    }
                }

                let file_count = match fs::read_dir(&dir) {
                    Ok(read) => read.filter_map(Result::ok).count(),
                    Err(e) => {
                        tracing::warn!("Failed to read session {:?}: {}", dir, e);
                        continue;
                    }
                };

                entries.push(SessionEntry {
                    name: name.clone(),
                    timestamp,
                    created_at,
                    dir,
                    file_count,
                });
            }
        }

        entries.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.timestamp.cmp(&a.timestamp))
                .then_with(|| a.name.cmp(&b.name))
        });

        Ok(entries)
    }

    /// Most recent session for `name`, if any.
    pub fn latest(&self, name: &str) -> Result<Option<SessionEntry>, SessionError> {
        let filter = SessionFilter {
            name: Some(name.to_string()),
            ..Default::default()
        };
        Ok(self.list(&filter)?.into_iter().next())
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, SessionError> {
    let read = fs::read_dir(dir).map_err(|e| SessionError::from_io(dir, e))?;
    let mut dirs = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| SessionError::from_io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|s| s.to_string())
}
