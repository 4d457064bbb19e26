//! Project configuration file support for labbench.
//!
//! Loads configuration from `labbench.toml` at the project root.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use labbench_core::{PathsConfig, PROJECT_MARKER};
use labbench_logging::LoggingConfig;
use labbench_session::SessionConfig;

/// Project-level configuration loaded from `labbench.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Directory names of the project layout
    #[serde(default)]
    pub paths: PathsConfig,
    /// Session directory naming
    #[serde(default)]
    pub session: SessionConfig,
    /// Console and file logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Written by `labbench init`
pub const DEFAULT_CONFIG: &str = r#"# labbench project configuration

[paths]
data = "data"          # raw/ and processed/ live under here
metadata = "metadata"
output = "output"      # analysis sessions and logs/

[session]
# Session directories are output/<analysis>/<timestamp>/
timestamp_format = "%Y-%m-%d_%H-%M-%S"

[logging]
level = "info"         # RUST_LOG overrides this
format = "pretty"      # pretty | json | compact
log_to_file = true     # output/logs/<program>_<YYYYMMDD_HHMMSS>.log
"#;

impl ProjectConfig {
    /// Load configuration from the project root.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(root: &Path) -> Result<Option<Self>> {
        let config_path = root.join(PROJECT_MARKER);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }
}
