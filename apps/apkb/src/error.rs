//! CLI error handling

use std::fmt;

use apkb_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Build or library error
    Build(apkb_errors::Error),
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Captured output of the tool that failed, if any
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            CliError::Build(e) => e.tool_output(),
            _ => None,
        }
    }

    /// Stable code for structured output
    pub fn code(&self) -> Option<&'static str> {
        match self {
            CliError::Build(e) => e.user_code(),
            CliError::InvalidArguments(_) => Some("cli.invalid_arguments"),
            CliError::Io(_) => Some("error.io"),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Build(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(task) = e.failed_task() {
                    write!(f, "\n  Stage: {task}")?;
                }
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                Ok(())
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Build(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::InvalidArguments(_) => None,
        }
    }
}

impl From<apkb_errors::Error> for CliError {
    fn from(e: apkb_errors::Error) -> Self {
        CliError::Build(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apkb_errors::{BuildError, PlatformError};

    #[test]
    fn test_build_failure_names_stage() {
        let source = apkb_errors::Error::from(PlatformError::ProcessFailed {
            program: "javac".into(),
            code: Some(1),
            output: "Main.java:3: error\n".into(),
        });
        let err = CliError::from(apkb_errors::Error::from(BuildError::task_failed(
            "compile-java",
            4,
            source,
        )));

        let text = err.to_string();
        assert!(text.starts_with("compile-java failed"));
        assert!(text.contains("\n  Stage: compile-java"));
        assert_eq!(err.tool_output(), Some("Main.java:3: error\n"));
    }
}
