//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum BuildError {
    #[error("stage '{task}' (#{index}) failed: {source}")]
    TaskFailed {
        task: String,
        /// 1-based position of the stage in the pipeline
        index: usize,
        source: Box<crate::Error>,
    },

    #[error("{stage}: expected artifact not found: {path}")]
    ArtifactMissing { stage: String, path: String },

    #[error("archive repacking failed: {message}")]
    ArchiveFailed { message: String },

    #[error("pipeline has already been run")]
    AlreadyRun,
}

impl BuildError {
    /// Wrap a stage failure with the identity of the stage that raised it
    #[must_use]
    pub fn task_failed(task: impl Into<String>, index: usize, source: crate::Error) -> Self {
        Self::TaskFailed {
            task: task.into(),
            index,
            source: Box::new(source),
        }
    }

    /// Convenience constructor for a missing intermediate file
    #[must_use]
    pub fn artifact_missing(stage: impl Into<String>, path: &std::path::Path) -> Self {
        Self::ArtifactMissing {
            stage: stage.into(),
            path: path.display().to_string(),
        }
    }
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Self::TaskFailed { task, source, .. } => {
                Cow::Owned(format!("{task} failed: {}", source.user_message()))
            }
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::TaskFailed { source, .. } => source.user_hint(),
            Self::ArtifactMissing { .. } => {
                Some("An earlier stage did not produce its output; check its tool log.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::TaskFailed { source, .. } => return source.user_code(),
            Self::ArtifactMissing { .. } => "build.artifact_missing",
            Self::ArchiveFailed { .. } => "build.archive_failed",
            Self::AlreadyRun => "build.already_run",
        };
        Some(code)
    }
}
