use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::PathsError;

/// File that marks a project root
pub const PROJECT_MARKER: &str = "labbench.toml";

/// Directory names of the project layout, from the `[paths]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    #[serde(default = "default_data")]
    pub data: PathBuf,
    #[serde(default = "default_metadata")]
    pub metadata: PathBuf,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_data() -> PathBuf {
    PathBuf::from("data")
}

fn default_metadata() -> PathBuf {
    PathBuf::from("metadata")
}

fn default_output() -> PathBuf {
    PathBuf::from("output")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data: default_data(),
            metadata: default_metadata(),
            output: default_output(),
        }
    }
}

/// Resolved directories of one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub data: PathBuf,
    pub raw_data: PathBuf,
    pub processed_data: PathBuf,
    pub metadata: PathBuf,
    pub output: PathBuf,
    pub logs: PathBuf,
}

impl ProjectPaths {
    /// Default layout under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_layout(root, &PathsConfig::default())
    }

    /// Layout under `root` using configured directory names. Absolute
    /// entries are used as given.
    pub fn from_layout(root: impl Into<PathBuf>, layout: &PathsConfig) -> Self {
        let root = root.into();
        let data = root.join(&layout.data);
        let output = root.join(&layout.output);

        Self {
            raw_data: data.join("raw"),
            processed_data: data.join("processed"),
            metadata: root.join(&layout.metadata),
            logs: output.join(labbench_session::LOGS_DIR_NAME),
            data,
            output,
            root,
        }
    }

    /// Find the project root: the nearest ancestor of `start` (inclusive)
    /// holding a `labbench.toml`, or `start` itself when there is none.
    pub fn discover(start: &Path) -> PathBuf {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_MARKER).is_file())
            .unwrap_or(start)
            .to_path_buf()
    }

    /// Every directory of the layout, parents first
    pub fn layout_dirs(&self) -> [&Path; 6] {
        [
            self.data.as_path(),
            self.raw_data.as_path(),
            self.processed_data.as_path(),
            self.metadata.as_path(),
            self.output.as_path(),
            self.logs.as_path(),
        ]
    }

    /// Create any missing layout directories.
    pub fn ensure_layout(&self) -> Result<(), PathsError> {
        for dir in self.layout_dirs() {
            std::fs::create_dir_all(dir).map_err(|source| PathsError::CreateDir {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        tracing::debug!(root = %self.root.display(), "Project layout ready");
        Ok(())
    }

    pub fn raw(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.raw_data.join(file_name)
    }

    pub fn processed(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.processed_data.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_layout() {
        let paths = ProjectPaths::new("/work/project");
        assert_eq!(paths.raw_data, PathBuf::from("/work/project/data/raw"));
        assert_eq!(
            paths.processed_data,
            PathBuf::from("/work/project/data/processed")
        );
        assert_eq!(paths.metadata, PathBuf::from("/work/project/metadata"));
        assert_eq!(paths.output, PathBuf::from("/work/project/output"));
        assert_eq!(paths.logs, PathBuf::from("/work/project/output/logs"));
        assert_eq!(
            paths.processed("three_digit_ppi.csv"),
            PathBuf::from("/work/project/data/processed/three_digit_ppi.csv")
        );
    }

    #[test]
    fn test_configured_layout() {
        let layout: PathsConfig = toml::from_str(
            r#"
output = "Output"
data = "/mnt/shared/data"
"#,
        )
        .unwrap();
        let paths = ProjectPaths::from_layout("/work/project", &layout);
        assert_eq!(paths.output, PathBuf::from("/work/project/Output"));
        assert_eq!(paths.raw_data, PathBuf::from("/mnt/shared/data/raw"));
        assert_eq!(paths.metadata, PathBuf::from("/work/project/metadata"));
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(PROJECT_MARKER), "").unwrap();
        let nested = dir.path().join("Analysis").join("quarto");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(ProjectPaths::discover(&nested), dir.path());
    }

    #[test]
    fn test_discover_falls_back_to_start() {
        let dir = TempDir::new().unwrap();
        let start = dir.path().join("somewhere");
        std::fs::create_dir_all(&start).unwrap();
        // Only correct when no ancestor of the temp dir is a project
        if start.ancestors().any(|d| d.join(PROJECT_MARKER).is_file()) {
            return;
        }
        assert_eq!(ProjectPaths::discover(&start), start);
    }

    #[test]
    fn test_ensure_layout_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let paths = ProjectPaths::new(dir.path());
        paths.ensure_layout().unwrap();
        paths.ensure_layout().unwrap();
        for d in paths.layout_dirs() {
            assert!(d.is_dir(), "{} missing", d.display());
        }
    }
}
