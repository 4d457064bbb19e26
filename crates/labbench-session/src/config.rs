use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::Deserialize;

use crate::error::SessionError;

/// Default leaf directory pattern: `YYYY-MM-DD_HH-MM-SS`
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Session settings, usually read from the `[session]` table of `labbench.toml`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// chrono strftime pattern used for the session directory name
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_timestamp_format() -> String {
    DEFAULT_TIMESTAMP_FORMAT.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl SessionConfig {
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Render `instant` with the configured pattern.
    ///
    /// The result must be usable as a single directory name, so patterns
    /// chrono rejects, or that produce an empty string or a path separator,
    /// are errors.
    pub fn format_timestamp(&self, instant: &DateTime<Local>) -> Result<String, SessionError> {
        let invalid = |reason: &str| SessionError::InvalidTimestampFormat {
            format: self.timestamp_format.clone(),
            reason: reason.to_string(),
        };

        if StrftimeItems::new(&self.timestamp_format).any(|item| matches!(item, Item::Error)) {
            return Err(invalid("unrecognized strftime specifier"));
        }

        let mut rendered = String::new();
        write!(rendered, "{}", instant.format(&self.timestamp_format))
            .map_err(|_| invalid("pattern could not be rendered"))?;

        if let Some(reason) = segment_problem(&rendered) {
            let reason = format!("renders an unusable directory name ({})", reason);
            return Err(invalid(reason.as_str()));
        }

        Ok(rendered)
    }

    /// Parse a session directory name back into a local timestamp.
    /// Returns `None` for directories not written with this pattern.
    pub fn parse_timestamp(&self, leaf: &str) -> Option<DateTime<Local>> {
        let naive = NaiveDateTime::parse_from_str(leaf, &self.timestamp_format).ok()?;
        Local.from_local_datetime(&naive).earliest()
    }
}

/// Characters that would split a name into more than one path segment
fn is_separator(c: char) -> bool {
    c == '/' || c == '\\' || std::path::is_separator(c)
}

/// Why `segment` is not usable as exactly one directory entry, if it isn't.
pub(crate) fn segment_problem(segment: &str) -> Option<&'static str> {
    if segment.is_empty() {
        Some("name is empty")
    } else if segment.chars().any(is_separator) {
        Some("name contains a path separator")
    } else if segment == "." || segment == ".." {
        Some("name is a relative path component")
    } else if segment.contains('\0') {
        Some("name contains a NUL byte")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 8, 13, 15, 30, 45).unwrap()
    }

    #[test]
    fn test_default_format() {
        let config = SessionConfig::default();
        assert_eq!(
            config.format_timestamp(&instant()).unwrap(),
            "2025-08-13_15-30-45"
        );
    }

    #[test]
    fn test_custom_format() {
        let config = SessionConfig::default().with_timestamp_format("%Y%m%dT%H%M%S");
        assert_eq!(
            config.format_timestamp(&instant()).unwrap(),
            "20250813T153045"
        );
    }

    #[test]
    fn test_separator_in_format_rejected() {
        let config = SessionConfig::default().with_timestamp_format("%Y/%m/%d");
        let err = config.format_timestamp(&instant()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidTimestampFormat { .. }));
    }

    #[test]
    fn test_relative_component_format_rejected() {
        for pattern in [".", ".."] {
            let config = SessionConfig::default().with_timestamp_format(pattern);
            let err = config.format_timestamp(&instant()).unwrap_err();
            assert!(
                matches!(err, SessionError::InvalidTimestampFormat { .. }),
                "{:?} accepted",
                pattern
            );
        }
        // Dots inside a longer leaf are fine
        let config = SessionConfig::default().with_timestamp_format("%Y.%m.%d");
        assert_eq!(config.format_timestamp(&instant()).unwrap(), "2025.08.13");
    }

    #[test]
    fn test_nul_in_format_rejected() {
        let config = SessionConfig::default().with_timestamp_format("%Y\0%m");
        assert!(config.format_timestamp(&instant()).is_err());
    }

    #[test]
    fn test_bad_specifier_rejected() {
        let config = SessionConfig::default().with_timestamp_format("%Y-%Q");
        assert!(config.format_timestamp(&instant()).is_err());
    }

    #[test]
    fn test_empty_format_rejected() {
        let config = SessionConfig::default().with_timestamp_format("");
        assert!(config.format_timestamp(&instant()).is_err());
    }

    #[test]
    fn test_parse_round_trips_leaf_name() {
        let config = SessionConfig::default();
        let parsed = config.parse_timestamp("2025-08-13_15-30-45").unwrap();
        assert_eq!(parsed, instant());
        assert!(config.parse_timestamp("not-a-session").is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: SessionConfig = toml::from_str("").unwrap();
        assert_eq!(config.timestamp_format, DEFAULT_TIMESTAMP_FORMAT);
    }
}
