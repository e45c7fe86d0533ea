//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    NotFound { path: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    /// A field a stage depends on is empty, missing on disk, or unusable.
    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("failed to write config to {path}: {error}")]
    WriteError { path: String, error: String },
}

impl ConfigError {
    /// Convenience constructor used by stages validating their inputs
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Provide a build.properties file or run `apkb config init` to create one.")
            }
            Self::Invalid { field, .. } => Some(match field.as_str() {
                "androidJarPath" => "Point androidJarPath at the platform android.jar.",
                f if f.starts_with("keyConfig") => {
                    "Fill in the signing fields or set apkSignEnable=false."
                }
                _ => "Fix the property named in the error message and rebuild.",
            }),
            Self::ParseError { .. } => Some("Overrides take the form KEY=VALUE."),
            Self::WriteError { .. } => Some("Ensure the config path is writable and retry."),
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ParseError { .. } => "config.parse_error",
            Self::Invalid { .. } => "config.invalid",
            Self::WriteError { .. } => "config.write_error",
        };
        Some(code)
    }
}
