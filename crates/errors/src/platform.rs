//! External process and tool lookup errors

use std::borrow::Cow;

use crate::{ErrorKind, UserFacingError};
use thiserror::Error;

/// Errors raised while running external toolchain binaries
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// The tool ran and exited unsuccessfully. `code` is `None` when the
    /// process was terminated by a signal.
    #[error("{program} exited with {}", exit_description(.code))]
    ProcessFailed {
        program: String,
        code: Option<i32>,
        output: String,
    },

    #[error("failed to start {program}: {message}")]
    SpawnFailed { program: String, message: String },

    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },
}

#[allow(clippy::ref_option)]
fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl PlatformError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ProcessFailed { .. } | Self::SpawnFailed { .. } => ErrorKind::ProcessFailed,
            Self::ToolNotFound { .. } => ErrorKind::ConfigInvalid,
        }
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ProcessFailed { .. } => Some("See the tool output above for the cause."),
            Self::SpawnFailed { .. } | Self::ToolNotFound { .. } => {
                Some("Install the Android build-tools or pass --tools-dir.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProcessFailed { .. } => "platform.process_failed",
            Self::SpawnFailed { .. } => "platform.spawn_failed",
            Self::ToolNotFound { .. } => "platform.tool_not_found",
        };
        Some(code)
    }
}
