#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Build configuration for apkb
//!
//! This crate owns the description of a single APK build:
//! - [`BuildConfig`]: immutable paths, identity, feature flags and signing
//! - [`BuildConfigBuilder`]: the only way to assemble one
//! - [`properties`]: mapping to and from the flat `build.properties` format

pub mod builder;
pub mod constants;
pub mod core;
pub mod properties;

pub use builder::BuildConfigBuilder;
pub use crate::core::{configured, AppIdentity, BuildConfig, FeatureFlags, PathSettings, SigningConfig};
pub use properties::Properties;

use apkb_errors::{ConfigError, Error};
use std::io;
use std::path::Path;
use tokio::fs;

/// Read a properties file into a flat property set
///
/// The file may be UTF-8 or ISO-8859-1; see [`properties::decode`].
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist and an I/O
/// error carrying the path for any other read failure.
pub async fn load_properties(path: &Path) -> Result<Properties, Error> {
    let bytes = fs::read(path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.display().to_string(),
            }
            .into()
        } else {
            Error::io_with_path(&e, path)
        }
    })?;
    Ok(properties::parse(&properties::decode(&bytes)))
}

/// Write a property set to a file, replacing its contents
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub async fn save_properties(path: &Path, props: &Properties) -> Result<(), Error> {
    fs::write(path, properties::render(props))
        .await
        .map_err(|e| ConfigError::WriteError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
    Ok(())
}

impl BuildConfig {
    /// Load a configuration from a properties file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read. Absent or malformed
    /// values never fail; they take their documented defaults.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let props = load_properties(path).await?;
        Ok(properties::from_properties(&props))
    }

    /// Save this configuration as a complete properties file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save_to_file(&self, path: &Path) -> Result<(), Error> {
        save_properties(path, &properties::to_properties(self)).await
    }
}
