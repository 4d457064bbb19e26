//! # labbench-session
//!
//! Timestamped output directories for analysis runs.
//!
//! Every run gets its own directory under an output root:
//!
//! ```text
//! <output_root>/<analysis name>/<YYYY-MM-DD_HH-MM-SS>/
//! ```
//!
//! The directory is created (with all parents) when the session is built,
//! so callers can write figures, tables and summaries straight into it.
//!
//! ## Key Types
//!
//! - [`AnalysisSession`] - One run's output directory
//! - [`SessionConfig`] - Timestamp pattern for directory names
//! - [`SessionStore`] - Lists sessions already on disk
//! - [`SessionError`] - Invalid names, bad patterns and filesystem failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labbench_session::create_analysis_session;
//!
//! let session = create_analysis_session("my_analysis", "output")?;
//! session.save("summary.txt", "Analysis completed with 4 data points")?;
//! std::fs::write(session.path("data.csv"), csv_bytes)?;
//! ```

mod config;
mod error;
mod session;
mod store;

pub use config::{SessionConfig, DEFAULT_TIMESTAMP_FORMAT};
pub use error::SessionError;
pub use session::{
    create_analysis_session, create_analysis_session_with, validate_name, AnalysisSession,
};
pub use store::{SessionEntry, SessionFilter, SessionStore, LOGS_DIR_NAME};
