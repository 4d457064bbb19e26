use std::fs;

use labbench_logging::{active_logging, get_logger, init_logging, LogFormat, LoggingConfig, LoggingError};
use tempfile::TempDir;

// Process-wide state: everything that touches the global subscriber lives in
// one test so ordering cannot matter.
#[test]
fn test_init_logging_once_with_file() {
    let dir = TempDir::new().unwrap();
    let log_dir = dir.path().join("output").join("logs");

    let config = LoggingConfig {
        level: "info".to_string(),
        format: LogFormat::Compact,
        ..Default::default()
    }
    .with_log_dir(&log_dir)
    .with_program("logging_tests");

    let guard = init_logging(&config).unwrap();
    let log_file = guard.log_file().unwrap().to_path_buf();
    assert!(log_file.starts_with(&log_dir));
    let file_name = log_file.file_name().unwrap().to_str().unwrap().to_string();
    assert!(file_name.starts_with("logging_tests_"));
    assert!(file_name.ends_with(".log"));

    let active = active_logging().unwrap();
    assert_eq!(active.format, LogFormat::Compact);
    assert_eq!(active.log_file.as_deref(), Some(log_file.as_path()));

    let second = init_logging(&LoggingConfig::default());
    assert!(matches!(second, Err(LoggingError::AlreadyInitialized)));

    get_logger("ppi_analysis").warn("written to the log file");

    // Dropping the guard flushes the background writer
    drop(guard);

    let content = fs::read_to_string(&log_file).unwrap();
    assert!(content.contains("written to the log file"));
    assert!(content.contains("ppi_analysis"));
}
