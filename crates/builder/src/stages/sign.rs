//! APK signing with apksigner

use super::{require_input_file, required_path, rewrite_base_apk};
use crate::{BuildContext, OptionsBuilder};
use apkb_config::constants as keys;
use apkb_config::SigningConfig;
use apkb_errors::{ConfigError, Error};
use apkb_platform::Tool;
use std::path::PathBuf;

pub const NAME: &str = "sign";

/// Signer arguments after validation, paths resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signer {
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

impl Signer {
    /// Check the selected signing variant and resolve its files.
    ///
    /// Only the selected variant is consulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the first missing field or file.
    pub async fn from_config(ctx: &BuildContext) -> Result<Self, Error> {
        match ctx.config().signing() {
            SigningConfig::Keystore {
                path,
                alias,
                store_password,
                key_password,
            } => {
                let path = required_path(ctx, keys::KEYSTORE_PATH, path)?;
                require_text(keys::KEYSTORE_ALIAS, alias)?;
                require_text(keys::KEYSTORE_STORE_PASSWORD, store_password)?;
                require_text(keys::KEYSTORE_KEY_PASSWORD, key_password)?;
                require_input_file(keys::KEYSTORE_PATH, &path).await?;
                Ok(Self::Keystore {
                    path,
                    alias: alias.clone(),
                    store_password: store_password.clone(),
                    key_password: key_password.clone(),
                })
            }
            SigningConfig::KeyWithCert {
                key_path,
                cert_path,
            } => {
                let key_path = required_path(ctx, keys::KEY_WITH_CERT_KEY_PATH, key_path)?;
                let cert_path = required_path(ctx, keys::KEY_WITH_CERT_CERT_PATH, cert_path)?;
                require_input_file(keys::KEY_WITH_CERT_KEY_PATH, &key_path).await?;
                require_input_file(keys::KEY_WITH_CERT_CERT_PATH, &cert_path).await?;
                Ok(Self::KeyWithCert {
                    key_path,
                    cert_path,
                })
            }
        }
    }

    /// Stage the signer selection arguments
    pub fn stage(&self, options: &mut OptionsBuilder) {
        match self {
            Self::Keystore {
                path,
                alias,
                store_password,
                key_password,
            } => {
                options
                    .option_path("--ks", path)
                    .option("--ks-key-alias", alias)
                    .option("--ks-pass", format!("pass:{store_password}"))
                    .option("--key-pass", format!("pass:{key_password}"));
            }
            Self::KeyWithCert {
                key_path,
                cert_path,
            } => {
                options
                    .option_path("--key", key_path)
                    .option_path("--cert", cert_path);
            }
        }
    }
}

fn require_text(key: &'static str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        Err(ConfigError::invalid(key, "not configured").into())
    } else {
        Ok(())
    }
}

/// Sign `base.apk` with the configured signer.
///
/// # Errors
///
/// Returns `ConfigInvalid` for incomplete signing settings,
/// `ArtifactMissing` when `base.apk` is absent or apksigner wrote no output
/// and `ProcessFailed` when apksigner fails.
pub async fn run(ctx: &BuildContext) -> Result<(), Error> {
    let signer = Signer::from_config(ctx).await?;
    let min_sdk = ctx.config().identity().min_sdk;

    rewrite_base_apk(ctx, NAME, Tool::Apksigner, |options, input, output| {
        options
            .arg("sign")
            .option_path("--out", output)
            .option("--min-sdk-version", min_sdk);
        signer.stage(options);
        options.path(input);
    })
    .await
}
