//! Builder for [`BuildConfig`]

use crate::core::{AppIdentity, BuildConfig, FeatureFlags, PathSettings, SigningConfig};
use std::path::PathBuf;

/// Assembles a [`BuildConfig`] once; the result cannot be changed afterwards
#[derive(Debug, Clone, Default)]
pub struct BuildConfigBuilder {
    paths: PathSettings,
    identity: AppIdentity,
    features: FeatureFlags,
    signing: SigningConfig,
}

impl BuildConfigBuilder {
    /// Replace all path settings
    #[must_use]
    pub fn paths(mut self, paths: PathSettings) -> Self {
        self.paths = paths;
        self
    }

    /// Replace package identity and version metadata
    #[must_use]
    pub fn identity(mut self, identity: AppIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Replace feature flags
    #[must_use]
    pub fn features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    /// Replace the signing configuration
    #[must_use]
    pub fn signing(mut self, signing: SigningConfig) -> Self {
        self.signing = signing;
        self
    }

    /// Set the platform `android.jar`
    #[must_use]
    pub fn android_jar(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.android_jar = path.into();
        self
    }

    /// Set the build output directory
    #[must_use]
    pub fn build_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.build_dir = path.into();
        self
    }

    /// Replace the ordered list of source roots
    #[must_use]
    pub fn java_sources<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths.java_sources = roots.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.identity.package = package.into();
        self
    }

    #[must_use]
    pub fn version(mut self, name: impl Into<String>, code: u32) -> Self {
        self.identity.version_name = name.into();
        self.identity.version_code = code;
        self
    }

    #[must_use]
    pub fn debuggable(mut self, debuggable: bool) -> Self {
        self.features.debuggable = debuggable;
        self
    }

    #[must_use]
    pub fn shrink(mut self, shrink: bool) -> Self {
        self.features.shrink = shrink;
        self
    }

    #[must_use]
    pub fn optimize(mut self, optimize: bool) -> Self {
        self.features.optimize = optimize;
        self
    }

    #[must_use]
    pub fn align(mut self, align: bool) -> Self {
        self.features.align = align;
        self
    }

    #[must_use]
    pub fn sign(mut self, sign: bool) -> Self {
        self.features.sign = sign;
        self
    }

    /// Finish the configuration
    #[must_use]
    pub fn build(self) -> BuildConfig {
        BuildConfig {
            paths: self.paths,
            identity: self.identity,
            features: self.features,
            signing: self.signing,
        }
    }
}
