//! Resource compilation and linking with aapt2

use super::{require_artifact, require_input_dir, require_input_file, required_path, run_tool};
use crate::{BuildContext, OptionsBuilder};
use apkb_config::constants as keys;
use apkb_errors::{ConfigError, Error};
use apkb_platform::{fs, Tool};

pub const COMPILE_NAME: &str = "compile-resources";
pub const LINK_NAME: &str = "link-resources";

/// First package id outside the range reserved for the framework
const APP_PACKAGE_ID: u8 = 0x7f;

/// Compile the resource directory into a flat archive.
///
/// # Errors
///
/// Returns `ConfigInvalid` when the resource directory is missing and
/// `ProcessFailed` when aapt2 rejects the resources.
pub async fn compile(ctx: &BuildContext) -> Result<(), Error> {
    let layout = ctx.layout();
    let res_dir = ctx.resolve(&ctx.config().paths().res_dir);
    require_input_dir(keys::RES_DIR, &res_dir).await?;

    let output = layout.compiled_resources();
    let mut options = OptionsBuilder::new();
    options
        .arg("compile")
        .option_path("-o", &output)
        .option_path("--dir", &res_dir);
    run_tool(ctx, Tool::Aapt2, &mut options).await?;

    require_artifact(COMPILE_NAME, &output).await
}

/// Link compiled resources and the manifest into the initial `base.apk`.
///
/// # Errors
///
/// Returns `ConfigInvalid` for an unset platform jar, a missing manifest or
/// a malformed package id, `ArtifactMissing` when compiled resources are
/// absent or aapt2 produced no archive.
pub async fn link(ctx: &BuildContext) -> Result<(), Error> {
    let config = ctx.config();
    let layout = ctx.layout();
    let identity = config.identity();

    let android_jar = required_path(ctx, keys::ANDROID_JAR_PATH, &config.paths().android_jar)?;
    let manifest = ctx.resolve(&config.paths().manifest);
    let package_id = parse_package_id(&identity.package_id)?;
    let compiled = layout.compiled_resources();
    let assets = ctx.resolve(&config.paths().assets_dir);

    require_input_file(keys::MANIFEST_PATH, &manifest).await?;
    require_artifact(LINK_NAME, &compiled).await?;

    let mut options = OptionsBuilder::new();
    options
        .arg("link")
        .option_path("-o", &layout.base_apk())
        .option_path("-I", &android_jar)
        .option_path("--manifest", &manifest)
        .option_path("--java", &layout.generated_sources())
        .option("--min-sdk-version", identity.min_sdk)
        .option("--target-sdk-version", identity.target_sdk)
        .option("--version-code", identity.version_code)
        .option("--version-name", &identity.version_name)
        .option("--rename-manifest-package", &identity.package)
        .option("--package-id", format!("0x{package_id:02x}"))
        .flag_if(package_id < APP_PACKAGE_ID, "--allow-reserved-package-id")
        .arg("--auto-add-overlay")
        .flag_if(config.features().debuggable, "--debug-mode");
    if config.features().shrink {
        options.option_path("--proguard", &layout.aapt2_rules());
    }
    if fs::is_dir(&assets).await {
        options.option_path("-A", &assets);
    }
    options.path(&compiled);

    run_tool(ctx, Tool::Aapt2, &mut options).await?;
    require_artifact(LINK_NAME, &layout.base_apk()).await
}

/// Parse a resource package id written as hex (`0x7f`) or decimal (`127`)
///
/// # Errors
///
/// Returns `ConfigInvalid` naming `packageId` when the value is not a byte.
pub fn parse_package_id(value: &str) -> Result<u8, Error> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    match parsed {
        Ok(0) | Err(_) => Err(ConfigError::invalid(
            keys::PACKAGE_ID,
            format!("'{value}' is not a package id between 0x01 and 0xff"),
        )
        .into()),
        Ok(id) => Ok(id),
    }
}
