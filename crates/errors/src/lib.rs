#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the apkb build pipeline
//!
//! Errors are organized by domain: configuration, external process
//! execution, and the build pipeline itself. Every error is fatal to the
//! build that raised it; nothing in this crate models retries.

use std::borrow::Cow;
use std::path::PathBuf;

use thiserror::Error;

pub mod build;
pub mod config;
pub mod platform;

pub use build::BuildError;
pub use config::ConfigError;
pub use platform::PlatformError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("build error: {0}")]
    Build(#[from] BuildError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<PathBuf>,
    },
}

/// Coarse classification of a failure, independent of which crate raised it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required path or field was missing or unusable when a stage needed it
    ConfigInvalid,
    /// An external tool exited unsuccessfully or could not be started
    ProcessFailed,
    /// An expected intermediate file was not produced by an earlier stage
    ArtifactMissing,
    /// A filesystem operation failed
    IoFailure,
    /// Anything else (programming errors, joined tasks that panicked)
    Internal,
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create an Io error with an associated path
    pub fn io_with_path(err: &std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: Some(path.into()),
        }
    }

    /// Classify this error.
    ///
    /// A failure wrapped with the identity of the stage that raised it
    /// reports the kind of the wrapped failure.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config(_) => ErrorKind::ConfigInvalid,
            Error::Platform(err) => err.kind(),
            Error::Build(BuildError::TaskFailed { source, .. }) => source.kind(),
            Error::Build(BuildError::ArtifactMissing { .. }) => ErrorKind::ArtifactMissing,
            Error::Build(_) | Error::Internal(_) => ErrorKind::Internal,
            Error::Io { .. } => ErrorKind::IoFailure,
        }
    }

    /// Captured output of the external tool behind this failure, if any
    #[must_use]
    pub fn tool_output(&self) -> Option<&str> {
        match self {
            Error::Platform(PlatformError::ProcessFailed { output, .. }) => Some(output.as_str()),
            Error::Build(BuildError::TaskFailed { source, .. }) => source.tool_output(),
            _ => None,
        }
    }

    /// Name of the pipeline stage that failed, if the failure came from one
    #[must_use]
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            Error::Build(BuildError::TaskFailed { task, .. }) => Some(task.as_str()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

/// Result type alias for apkb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Build(err) => err.user_message(),
            Error::Io {
                message,
                path: Some(path),
                ..
            } => Cow::Owned(format!("{message} ({})", path.display())),
            Error::Io { message, .. } => Cow::Borrowed(message.as_str()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_hint(),
            Error::Build(err) => err.user_hint(),
            Error::Platform(err) => err.user_hint(),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Build(err) => err.user_code(),
            Error::Platform(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
