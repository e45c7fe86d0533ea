use serde::{Deserialize, Serialize};
use std::fmt;

pub mod general;
pub mod pipeline;
pub mod process;

pub use general::*;
pub use pipeline::*;
pub use process::*;

/// Top-level event enum that aggregates all domain-specific events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, debug output)
    General(GeneralEvent),

    /// Stage sequencing events
    Pipeline(PipelineEvent),

    /// External tool invocations
    Process(ProcessEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. })
            | Self::Pipeline(PipelineEvent::TaskFailed { .. } | PipelineEvent::Aborted { .. })
            | Self::Process(ProcessEvent::CommandFailed { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Pipeline(PipelineEvent::ToolOutput { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. }) | Self::Process(_) => Level::DEBUG,

            Self::Pipeline(_) => Level::INFO,
        }
    }

    /// Whether this event only matters when verbose output was requested
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.log_level() == tracing::Level::DEBUG
    }
}

/// One human-readable line per event, without the trailing newline
impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General(event) => match event {
                GeneralEvent::Warning {
                    message,
                    context: Some(context),
                } => write!(f, "warning: {message} ({context})"),
                GeneralEvent::Warning { message, .. } => write!(f, "warning: {message}"),
                GeneralEvent::Error {
                    message,
                    details: Some(details),
                } => write!(f, "error: {message}: {details}"),
                GeneralEvent::Error { message, .. } => write!(f, "error: {message}"),
                GeneralEvent::DebugLog { message } => write!(f, "debug: {message}"),
            },
            Self::Pipeline(event) => match event {
                PipelineEvent::Started { stages } => {
                    write!(f, "> pipeline: {}", stages.join(" -> "))
                }
                PipelineEvent::TaskStarted { index, total, task } => {
                    write!(f, "[{index}/{total}] {task}")
                }
                PipelineEvent::TaskCompleted {
                    index,
                    total,
                    task,
                    duration_ms,
                } => write!(f, "[{index}/{total}] {task} done in {duration_ms} ms"),
                PipelineEvent::TaskFailed {
                    index,
                    total,
                    task,
                    error,
                } => write!(f, "[{index}/{total}] {task} FAILED: {error}"),
                PipelineEvent::ToolOutput { task, line } => write!(f, "  {task}| {line}"),
                PipelineEvent::Completed {
                    tasks,
                    artifact,
                    duration_ms,
                } => write!(
                    f,
                    "BUILD SUCCESSFUL: {tasks} stages in {duration_ms} ms -> {}",
                    artifact.display()
                ),
                PipelineEvent::Aborted {
                    task,
                    completed,
                    skipped,
                } => write!(
                    f,
                    "BUILD FAILED at {task} ({completed} completed, {skipped} not run)"
                ),
            },
            Self::Process(event) => match event {
                ProcessEvent::CommandStarted { program, args } => {
                    write!(f, "$ {} {}", program.display(), args.join(" "))
                }
                ProcessEvent::CommandCompleted {
                    program,
                    duration_ms,
                } => write!(f, "{} exited 0 after {duration_ms} ms", program.display()),
                ProcessEvent::CommandFailed {
                    program,
                    code: Some(code),
                    duration_ms,
                } => write!(
                    f,
                    "{} exited {code} after {duration_ms} ms",
                    program.display()
                ),
                ProcessEvent::CommandFailed {
                    program,
                    code: None,
                    duration_ms,
                } => write!(
                    f,
                    "{} did not exit normally after {duration_ms} ms",
                    program.display()
                ),
            },
        }
    }
}
