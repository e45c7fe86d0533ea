use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pipeline lifecycle events emitted by the task manager.
///
/// `index` is 1-based and `total` is the number of stages in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// The pipeline is about to run its first stage
    Started { stages: Vec<String> },

    TaskStarted {
        index: usize,
        total: usize,
        task: String,
    },

    TaskCompleted {
        index: usize,
        total: usize,
        task: String,
        duration_ms: u64,
    },

    TaskFailed {
        index: usize,
        total: usize,
        task: String,
        error: String,
    },

    /// One line of output captured from the tool behind a failed stage
    ToolOutput { task: String, line: String },

    /// Every stage succeeded
    Completed {
        tasks: usize,
        artifact: PathBuf,
        duration_ms: u64,
    },

    /// A stage failed; the remaining stages were not run
    Aborted {
        task: String,
        completed: usize,
        skipped: usize,
    },
}
