//! Core build configuration types
//!
//! A [`BuildConfig`] describes exactly one build. It is assembled once through
//! [`crate::BuildConfigBuilder`] (or the properties loader) and is read-only
//! afterwards; stages only ever see it behind a shared reference.

use crate::constants::{
    DEFAULT_AAPT2_OPTIMIZE_ENABLE, DEFAULT_APK_ALIGN_ENABLE, DEFAULT_APK_SIGN_ENABLE,
    DEFAULT_APP_PACKAGE, DEFAULT_ASSETS_DIR, DEFAULT_BUILD_PATH, DEFAULT_DEBUG_MODE,
    DEFAULT_JAVA_SOURCES, DEFAULT_JAVA_VERSION, DEFAULT_MANIFEST_PATH, DEFAULT_MIN_SDK,
    DEFAULT_NATIVE_LIBS_DIR, DEFAULT_PACKAGE_ID, DEFAULT_R8_ENABLED, DEFAULT_RES_DIR,
    DEFAULT_TARGET_SDK, DEFAULT_VERSION_CODE, DEFAULT_VERSION_NAME,
};
use std::path::{Path, PathBuf};

/// Complete, immutable description of a single build
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildConfig {
    pub(crate) paths: PathSettings,
    pub(crate) identity: AppIdentity,
    pub(crate) features: FeatureFlags,
    pub(crate) signing: SigningConfig,
}

impl BuildConfig {
    /// Start building a configuration from documented defaults
    #[must_use]
    pub fn builder() -> crate::BuildConfigBuilder {
        crate::BuildConfigBuilder::default()
    }

    #[must_use]
    pub fn paths(&self) -> &PathSettings {
        &self.paths
    }

    #[must_use]
    pub fn identity(&self) -> &AppIdentity {
        &self.identity
    }

    #[must_use]
    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }

    #[must_use]
    pub fn signing(&self) -> &SigningConfig {
        &self.signing
    }
}

/// Input and output locations. All paths are taken verbatim and resolved
/// against the build's working directory by whoever consumes them; nothing
/// here checks that they exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSettings {
    /// Platform `android.jar`; empty means "not configured"
    pub android_jar: PathBuf,
    pub build_dir: PathBuf,
    /// Ordered source roots; order is the compiler search order and
    /// duplicates are kept
    pub java_sources: Vec<PathBuf>,
    pub manifest: PathBuf,
    pub res_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub native_libs_dir: PathBuf,
    /// Backward-compatibility runtime jar; empty means "not used"
    pub desugar_jdk_libs: PathBuf,
    /// Code-shrinking rules; required only when shrinking is enabled
    pub proguard_rules: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            android_jar: PathBuf::new(),
            build_dir: PathBuf::from(DEFAULT_BUILD_PATH),
            java_sources: vec![PathBuf::from(DEFAULT_JAVA_SOURCES)],
            manifest: PathBuf::from(DEFAULT_MANIFEST_PATH),
            res_dir: PathBuf::from(DEFAULT_RES_DIR),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            native_libs_dir: PathBuf::from(DEFAULT_NATIVE_LIBS_DIR),
            desugar_jdk_libs: PathBuf::new(),
            proguard_rules: PathBuf::new(),
        }
    }
}

/// Returns `None` for an unset (empty) optional path
#[must_use]
pub fn configured(path: &Path) -> Option<&Path> {
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

/// Package identity and version metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    pub package: String,
    /// Resource package id as written in the config (e.g. `0x7f`). Parsed by
    /// the link stage, which is where a malformed value is reported.
    pub package_id: String,
    pub version_name: String,
    pub version_code: u32,
    pub min_sdk: u32,
    pub target_sdk: u32,
    pub java_version: u32,
}

impl Default for AppIdentity {
    fn default() -> Self {
        Self {
            package: DEFAULT_APP_PACKAGE.to_string(),
            package_id: DEFAULT_PACKAGE_ID.to_string(),
            version_name: DEFAULT_VERSION_NAME.to_string(),
            version_code: DEFAULT_VERSION_CODE,
            min_sdk: DEFAULT_MIN_SDK,
            target_sdk: DEFAULT_TARGET_SDK,
            java_version: DEFAULT_JAVA_VERSION,
        }
    }
}

/// Independently toggleable pipeline features
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct FeatureFlags {
    pub debuggable: bool,
    /// Shrink and obfuscate with r8 instead of plain dexing with d8
    pub shrink: bool,
    pub optimize: bool,
    pub align: bool,
    pub sign: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            debuggable: DEFAULT_DEBUG_MODE,
            shrink: DEFAULT_R8_ENABLED,
            optimize: DEFAULT_AAPT2_OPTIMIZE_ENABLE,
            align: DEFAULT_APK_ALIGN_ENABLE,
            sign: DEFAULT_APK_SIGN_ENABLE,
        }
    }
}

/// How the final archive is signed. Exactly one variant applies per build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningConfig {
    Keystore {
        path: PathBuf,
        alias: String,
        store_password: String,
        key_password: String,
    },
    KeyWithCert {
        key_path: PathBuf,
        cert_path: PathBuf,
    },
}

impl SigningConfig {
    #[must_use]
    pub fn uses_keystore(&self) -> bool {
        matches!(self, Self::Keystore { .. })
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self::KeyWithCert {
            key_path: PathBuf::new(),
            cert_path: PathBuf::new(),
        }
    }
}
