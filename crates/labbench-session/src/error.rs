use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while creating or reading analysis sessions
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid session name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid file name '{file_name}': {reason}")]
    InvalidFileName { file_name: String, reason: String },

    #[error("Invalid timestamp format '{format}': {reason}")]
    InvalidTimestampFormat { format: String, reason: String },

    #[error("Permission denied creating {}: {source}", path.display())]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize {file_name}: {source}")]
    Serialize {
        file_name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl SessionError {
    /// Classify an I/O failure at `path`, separating permission problems
    /// from everything else.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::PermissionDenied => SessionError::PermissionDenied {
                path: path.to_path_buf(),
                source,
            },
            _ => SessionError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, SessionError::PermissionDenied { .. })
    }
}
