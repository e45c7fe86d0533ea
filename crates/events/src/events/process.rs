use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// External tool invocation events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProcessEvent {
    /// A tool is about to be spawned. Secret argument values are already
    /// redacted by the emitter.
    CommandStarted { program: PathBuf, args: Vec<String> },

    /// The tool exited with status 0
    CommandCompleted { program: PathBuf, duration_ms: u64 },

    /// The tool exited unsuccessfully or could not be started
    CommandFailed {
        program: PathBuf,
        code: Option<i32>,
        duration_ms: u64,
    },
}
