//! Bytecode to dex conversion, plain (d8) or shrinking (r8)

use super::java::class_files;
use super::{library_jars, optional_path, require_input_file, required_path, run_tool};
use crate::{BuildContext, OptionsBuilder};
use apkb_config::constants as keys;
use apkb_errors::{BuildError, Error};
use apkb_platform::Tool;
use std::path::PathBuf;

pub const DEX_NAME: &str = "dex";
pub const SHRINK_NAME: &str = "shrink";

/// Inputs shared by both dexers
struct DexInputs {
    android_jar: PathBuf,
    desugar: Option<PathBuf>,
    classes: Vec<PathBuf>,
    jars: Vec<PathBuf>,
}

async fn collect_inputs(ctx: &BuildContext, stage: &str) -> Result<DexInputs, Error> {
    let config = ctx.config();
    let layout = ctx.layout();

    let android_jar = required_path(ctx, keys::ANDROID_JAR_PATH, &config.paths().android_jar)?;
    let desugar = optional_path(ctx, &config.paths().desugar_jdk_libs);
    let classes = class_files(&layout.classes_dir()).await?;
    if classes.is_empty() {
        return Err(BuildError::artifact_missing(stage, &layout.classes_dir()).into());
    }
    let jars = library_jars(ctx).await?;

    Ok(DexInputs {
        android_jar,
        desugar,
        classes,
        jars,
    })
}

fn stage_inputs(options: &mut OptionsBuilder, inputs: &DexInputs) {
    if let Some(desugar) = &inputs.desugar {
        options.option_path("--classpath", desugar);
    }
    options.paths(&inputs.classes).paths(&inputs.jars);
}

/// Convert class files and library jars to dex with d8.
///
/// # Errors
///
/// Returns `ArtifactMissing` when javac produced no class files and
/// `ProcessFailed` when d8 fails.
pub async fn dex(ctx: &BuildContext) -> Result<(), Error> {
    let config = ctx.config();
    let inputs = collect_inputs(ctx, DEX_NAME).await?;

    let mut options = OptionsBuilder::new();
    options
        .option_path("--output", &ctx.layout().dex_dir())
        .option_path("--lib", &inputs.android_jar)
        .option("--min-api", config.identity().min_sdk)
        .arg(if config.features().debuggable {
            "--debug"
        } else {
            "--release"
        });
    stage_inputs(&mut options, &inputs);

    run_tool(ctx, Tool::D8, &mut options).await?;
    Ok(())
}

/// Shrink, obfuscate and dex with r8.
///
/// Always a release build. Applies the project rules followed by the keep
/// rules aapt2 generated while linking.
///
/// # Errors
///
/// Returns `ConfigInvalid` when no rules file is configured or it is
/// missing, `ArtifactMissing` when a class or rules input is absent.
pub async fn shrink(ctx: &BuildContext) -> Result<(), Error> {
    let config = ctx.config();
    let layout = ctx.layout();

    let rules = required_path(ctx, keys::PROGUARD_RULES_PATH, &config.paths().proguard_rules)?;
    require_input_file(keys::PROGUARD_RULES_PATH, &rules).await?;
    let aapt2_rules = layout.aapt2_rules();
    super::require_artifact(SHRINK_NAME, &aapt2_rules).await?;
    let inputs = collect_inputs(ctx, SHRINK_NAME).await?;

    let mut options = OptionsBuilder::new();
    options
        .option_path("--output", &layout.dex_dir())
        .option_path("--lib", &inputs.android_jar)
        .option("--min-api", config.identity().min_sdk)
        .arg("--release")
        .option_path("--pg-conf", &rules)
        .option_path("--pg-conf", &aapt2_rules)
        .option_path("--pg-map-output", &layout.mapping());
    stage_inputs(&mut options, &inputs);

    run_tool(ctx, Tool::R8, &mut options).await?;
    Ok(())
}
