//! Flat key/value property mapping
//!
//! The host stores a build's settings as a flat `key=value` file. This module
//! maps such a property set to a [`BuildConfig`] and back. Missing keys take
//! their documented default, unknown keys are ignored, and a value that cannot
//! be interpreted falls back to the default with a warning. Loading a
//! property set never fails.

use crate::constants as keys;
use crate::core::{AppIdentity, BuildConfig, FeatureFlags, PathSettings, SigningConfig};
use apkb_errors::ConfigError;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Flat, ordered property set
pub type Properties = BTreeMap<String, String>;

/// Map a property set to a build configuration
#[must_use]
pub fn from_properties(props: &Properties) -> BuildConfig {
    let paths = PathSettings {
        android_jar: path_or(props, keys::ANDROID_JAR_PATH, ""),
        build_dir: path_or(props, keys::BUILD_PATH, keys::DEFAULT_BUILD_PATH),
        java_sources: split_source_roots(
            props
                .get(keys::JAVA_SOURCES)
                .map_or(keys::DEFAULT_JAVA_SOURCES, String::as_str),
        ),
        manifest: path_or(props, keys::MANIFEST_PATH, keys::DEFAULT_MANIFEST_PATH),
        res_dir: path_or(props, keys::RES_DIR, keys::DEFAULT_RES_DIR),
        assets_dir: path_or(props, keys::ASSETS_DIR, keys::DEFAULT_ASSETS_DIR),
        native_libs_dir: path_or(props, keys::NATIVE_LIBS_DIR, keys::DEFAULT_NATIVE_LIBS_DIR),
        desugar_jdk_libs: path_or(props, keys::DESUGAR_JDK_LIBS_PATH, ""),
        proguard_rules: path_or(props, keys::PROGUARD_RULES_PATH, ""),
    };

    let identity = AppIdentity {
        package: string_or(props, keys::APP_PACKAGE, keys::DEFAULT_APP_PACKAGE),
        package_id: string_or(props, keys::PACKAGE_ID, keys::DEFAULT_PACKAGE_ID),
        version_name: string_or(props, keys::VERSION_NAME, keys::DEFAULT_VERSION_NAME),
        version_code: number_or(props, keys::VERSION_CODE, keys::DEFAULT_VERSION_CODE),
        min_sdk: number_or(props, keys::MIN_SDK, keys::DEFAULT_MIN_SDK),
        target_sdk: number_or(props, keys::TARGET_SDK, keys::DEFAULT_TARGET_SDK),
        java_version: number_or(props, keys::JAVA_VERSION, keys::DEFAULT_JAVA_VERSION),
    };

    let features = FeatureFlags {
        debuggable: bool_or(props, keys::DEBUG_MODE, keys::DEFAULT_DEBUG_MODE),
        shrink: bool_or(props, keys::R8_ENABLED, keys::DEFAULT_R8_ENABLED),
        optimize: bool_or(
            props,
            keys::AAPT2_OPTIMIZE_ENABLE,
            keys::DEFAULT_AAPT2_OPTIMIZE_ENABLE,
        ),
        align: bool_or(props, keys::APK_ALIGN_ENABLE, keys::DEFAULT_APK_ALIGN_ENABLE),
        sign: bool_or(props, keys::APK_SIGN_ENABLE, keys::DEFAULT_APK_SIGN_ENABLE),
    };

    let signing = if bool_or(props, keys::USE_KEYSTORE, keys::DEFAULT_USE_KEYSTORE) {
        SigningConfig::Keystore {
            path: path_or(props, keys::KEYSTORE_PATH, ""),
            alias: string_or(props, keys::KEYSTORE_ALIAS, ""),
            store_password: string_or(props, keys::KEYSTORE_STORE_PASSWORD, ""),
            key_password: string_or(props, keys::KEYSTORE_KEY_PASSWORD, ""),
        }
    } else {
        SigningConfig::KeyWithCert {
            key_path: path_or(props, keys::KEY_WITH_CERT_KEY_PATH, ""),
            cert_path: path_or(props, keys::KEY_WITH_CERT_CERT_PATH, ""),
        }
    };

    BuildConfig::builder()
        .paths(paths)
        .identity(identity)
        .features(features)
        .signing(signing)
        .build()
}

/// Map a build configuration to a complete property set.
///
/// Fields of the signing variant that is not in use are written empty.
#[must_use]
pub fn to_properties(config: &BuildConfig) -> Properties {
    let mut props = Properties::new();
    let mut set = |key: &str, value: String| {
        props.insert(key.to_string(), value);
    };

    let paths = config.paths();
    set(keys::ANDROID_JAR_PATH, path_string(&paths.android_jar));
    set(keys::BUILD_PATH, path_string(&paths.build_dir));
    set(keys::JAVA_SOURCES, join_source_roots(&paths.java_sources));
    set(keys::MANIFEST_PATH, path_string(&paths.manifest));
    set(keys::RES_DIR, path_string(&paths.res_dir));
    set(keys::ASSETS_DIR, path_string(&paths.assets_dir));
    set(keys::NATIVE_LIBS_DIR, path_string(&paths.native_libs_dir));
    set(keys::DESUGAR_JDK_LIBS_PATH, path_string(&paths.desugar_jdk_libs));
    set(keys::PROGUARD_RULES_PATH, path_string(&paths.proguard_rules));

    let identity = config.identity();
    set(keys::APP_PACKAGE, identity.package.clone());
    set(keys::PACKAGE_ID, identity.package_id.clone());
    set(keys::VERSION_NAME, identity.version_name.clone());
    set(keys::VERSION_CODE, identity.version_code.to_string());
    set(keys::MIN_SDK, identity.min_sdk.to_string());
    set(keys::TARGET_SDK, identity.target_sdk.to_string());
    set(keys::JAVA_VERSION, identity.java_version.to_string());

    let features = config.features();
    set(keys::DEBUG_MODE, features.debuggable.to_string());
    set(keys::R8_ENABLED, features.shrink.to_string());
    set(keys::AAPT2_OPTIMIZE_ENABLE, features.optimize.to_string());
    set(keys::APK_ALIGN_ENABLE, features.align.to_string());
    set(keys::APK_SIGN_ENABLE, features.sign.to_string());

    let empty = String::new;
    match config.signing() {
        SigningConfig::Keystore {
            path,
            alias,
            store_password,
            key_password,
        } => {
            set(keys::USE_KEYSTORE, "true".to_string());
            set(keys::KEYSTORE_PATH, path_string(path));
            set(keys::KEYSTORE_ALIAS, alias.clone());
            set(keys::KEYSTORE_STORE_PASSWORD, store_password.clone());
            set(keys::KEYSTORE_KEY_PASSWORD, key_password.clone());
            set(keys::KEY_WITH_CERT_KEY_PATH, empty());
            set(keys::KEY_WITH_CERT_CERT_PATH, empty());
        }
        SigningConfig::KeyWithCert {
            key_path,
            cert_path,
        } => {
            set(keys::USE_KEYSTORE, "false".to_string());
            set(keys::KEYSTORE_PATH, empty());
            set(keys::KEYSTORE_ALIAS, empty());
            set(keys::KEYSTORE_STORE_PASSWORD, empty());
            set(keys::KEYSTORE_KEY_PASSWORD, empty());
            set(keys::KEY_WITH_CERT_KEY_PATH, path_string(key_path));
            set(keys::KEY_WITH_CERT_CERT_PATH, path_string(cert_path));
        }
    }

    props
}

/// Split a delimited source-root list, preserving order and dropping entries
/// that are empty after trimming. Duplicates are kept.
#[must_use]
pub fn split_source_roots(value: &str) -> Vec<PathBuf> {
    value
        .split(keys::SOURCE_ROOT_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn join_source_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|root| path_string(root))
        .collect::<Vec<_>>()
        .join(&keys::SOURCE_ROOT_DELIMITER.to_string())
}

/// Permissive boolean: case-insensitive `true` is true, anything else false
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

/// Parse a single `KEY=VALUE` override as given on the command line
///
/// # Errors
///
/// Returns an error if the argument has no `=` or an empty key.
pub fn parse_override(arg: &str) -> Result<(String, String), ConfigError> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::ParseError {
            message: format!("expected KEY=VALUE, got '{arg}'"),
        }),
    }
}

/// Merge overrides into a property set; later values win
pub fn apply_overrides<I>(props: &mut Properties, overrides: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in overrides {
        props.insert(key, value);
    }
}

/// Parse the text of a flat properties file.
///
/// Lines starting with `#` or `!` are comments. A line ending in an odd
/// number of backslashes continues on the next line, whose leading
/// whitespace is dropped. The first unescaped `=` or `:` separates key from
/// value; a line without one is a key with an empty value. `\\`, `\=`, `\:`,
/// `\t`, `\n` and `\uXXXX` escapes are understood. An entry with a malformed
/// `\u` escape is skipped with a warning, so the key takes its default.
#[must_use]
pub fn parse(text: &str) -> Properties {
    let mut props = Properties::new();
    let mut lines = text.lines();
    while let Some(line) = lines.next() {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }

        let mut logical = line.to_string();
        while continues(&logical) {
            logical.pop();
            match lines.next() {
                Some(next) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(logical.trim());
        match (unescape(key.trim()), unescape(value.trim())) {
            (Some(key), Some(value)) => {
                props.insert(key, value);
            }
            _ => tracing::warn!(entry = %logical, "malformed unicode escape, ignoring entry"),
        }
    }
    props
}

/// Decode the bytes of a properties file.
///
/// UTF-8 is taken as is; anything else is read as ISO-8859-1, the encoding
/// Java writes properties files in.
#[must_use]
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().copied().map(char::from).collect()),
    }
}

/// Render a property set in the format accepted by [`parse`]
#[must_use]
pub fn render(props: &Properties) -> String {
    let mut out = String::new();
    for (key, value) in props {
        out.push_str(&escape(key, true));
        out.push('=');
        out.push_str(&escape(value, false));
        out.push('\n');
    }
    out
}

fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            '=' | ':' if !escaped => return (&line[..idx], &line[idx + 1..]),
            _ => escaped = false,
        }
    }
    (line, "")
}

/// An odd number of trailing backslashes escapes the line break
fn continues(line: &str) -> bool {
    line.bytes().rev().take_while(|&b| b == b'\\').count() % 2 == 1
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    // `\u` escapes are UTF-16 code units; surrogate pairs span two escapes
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' && chars.as_str().starts_with('u') {
            let rest = &chars.as_str()[1..];
            let hex = rest
                .get(..4)
                .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))?;
            units.push(u16::from_str_radix(hex, 16).ok()?);
            chars = rest[4..].chars();
            continue;
        }
        flush_units(&mut units, &mut out)?;
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    flush_units(&mut units, &mut out)?;
    Some(out)
}

fn flush_units(units: &mut Vec<u16>, out: &mut String) -> Option<()> {
    for decoded in char::decode_utf16(units.drain(..)) {
        out.push(decoded.ok()?);
    }
    Some(())
}

fn escape(raw: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '=' | ':' if is_key => {
                out.push('\\');
                out.push(ch);
            }
            _ if !ch.is_ascii() => {
                let mut units = [0; 2];
                for unit in ch.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
            _ => out.push(ch),
        }
    }
    out
}

fn string_or(props: &Properties, key: &str, default: &str) -> String {
    props
        .get(key)
        .map_or_else(|| default.to_string(), Clone::clone)
}

fn path_or(props: &Properties, key: &str, default: &str) -> PathBuf {
    PathBuf::from(props.get(key).map_or(default, |v| v.trim()))
}

fn bool_or(props: &Properties, key: &str, default: bool) -> bool {
    props.get(key).map_or(default, |v| parse_bool(v))
}

fn number_or<T>(props: &Properties, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match props.get(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "invalid number, using default");
            default
        }),
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
