use std::sync::Arc;

use labbench_logging::{get_logger, ComponentLogger, EventLogger, LogEvent};
use labbench_session::{AnalysisSession, SessionConfig, SessionError};

use crate::paths::ProjectPaths;

/// What a task gets to work with
pub struct TaskContext {
    pub paths: ProjectPaths,
    pub session_config: SessionConfig,
    pub logger: ComponentLogger,
    events: Arc<EventLogger>,
}

impl TaskContext {
    pub fn new(
        task_id: &str,
        paths: ProjectPaths,
        session_config: SessionConfig,
        events: Arc<EventLogger>,
    ) -> Self {
        Self {
            paths,
            session_config,
            logger: get_logger(task_id),
            events,
        }
    }

    /// Start an analysis session under the project's output directory.
    pub fn create_session(&self, name: &str) -> Result<AnalysisSession, SessionError> {
        let session = AnalysisSession::create(name, &self.paths.output, &self.session_config)?;
        self.events.log(&LogEvent::SessionCreated {
            name: session.name().to_string(),
            dir: session.dir().to_path_buf(),
        });
        Ok(session)
    }
}
