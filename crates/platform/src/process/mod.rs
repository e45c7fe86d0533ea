//! External process execution

mod system;

pub use system::SystemProcessRunner;

use apkb_errors::Error;
use async_trait::async_trait;
use std::path::Path;

/// Prefix apksigner uses for inline passwords
const INLINE_SECRET_PREFIX: &str = "pass:";

/// Output captured from a finished tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Output of a tool that exited with status 0 and printed nothing
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: Some(0),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }

    /// Standard output followed by standard error
    #[must_use]
    pub fn combined(&self) -> String {
        match (self.stdout.is_empty(), self.stderr.is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => {
                let mut text = self.stdout.clone();
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&self.stderr);
                text
            }
        }
    }
}

/// Runs one external program to completion.
///
/// Implementations never go through a shell: `args` reach the program
/// exactly as given. A non-zero exit is an error carrying the exit code and
/// the captured output.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Execute `program` with `args` and wait for it to exit
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::SpawnFailed` if the program could not be
    /// started and `PlatformError::ProcessFailed` if it exited unsuccessfully.
    async fn execute(&self, program: &Path, args: &[String]) -> Result<CommandOutput, Error>;
}

/// Copy of `args` that is safe to log: inline `pass:` secrets are masked
#[must_use]
pub fn redact_secrets(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            if arg.starts_with(INLINE_SECRET_PREFIX) {
                format!("{INLINE_SECRET_PREFIX}******")
            } else {
                arg.clone()
            }
        })
        .collect()
}

/// Short name used in messages (`aapt2` rather than its full path)
pub(crate) fn display_name(program: &Path) -> String {
    program.file_name().map_or_else(
        || program.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
