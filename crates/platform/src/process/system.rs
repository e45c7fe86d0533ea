//! Process runner backed by `tokio::process`

use apkb_errors::{Error, PlatformError};
use apkb_events::{AppEvent, EventEmitter, EventSender, ProcessEvent};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;

use super::{display_name, redact_secrets, CommandOutput, ProcessRunner};

/// Spawns real child processes
#[derive(Debug, Clone, Default)]
pub struct SystemProcessRunner {
    event_sender: Option<EventSender>,
}

impl SystemProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Report every invocation as [`ProcessEvent`]s
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }
}

impl EventEmitter for SystemProcessRunner {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn execute(&self, program: &Path, args: &[String]) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let shown_args = redact_secrets(args);

        tracing::debug!(program = %program.display(), args = ?shown_args, "spawning tool");
        self.emit(AppEvent::Process(ProcessEvent::CommandStarted {
            program: program.to_path_buf(),
            args: shown_args,
        }));

        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await;

        let output = match spawned {
            Ok(output) => output,
            Err(e) => {
                self.emit(AppEvent::Process(ProcessEvent::CommandFailed {
                    program: program.to_path_buf(),
                    code: None,
                    duration_ms: duration_to_millis(start.elapsed()),
                }));
                return Err(PlatformError::SpawnFailed {
                    program: display_name(program),
                    message: e.to_string(),
                }
                .into());
            }
        };

        let duration = start.elapsed();
        let captured = CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            program = %program.display(),
            code = ?captured.code,
            duration_ms = duration_to_millis(duration),
            "tool exited"
        );

        if output.status.success() {
            self.emit(AppEvent::Process(ProcessEvent::CommandCompleted {
                program: program.to_path_buf(),
                duration_ms: duration_to_millis(duration),
            }));
            Ok(captured)
        } else {
            self.emit(AppEvent::Process(ProcessEvent::CommandFailed {
                program: program.to_path_buf(),
                code: captured.code,
                duration_ms: duration_to_millis(duration),
            }));
            Err(PlatformError::ProcessFailed {
                program: display_name(program),
                code: captured.code,
                output: captured.combined(),
            }
            .into())
        }
    }
}
