//! Concrete pipeline stages
//!
//! Each stage is a plain async function over the shared [`BuildContext`].
//! Stages validate exactly the inputs they need when they run; nothing is
//! checked ahead of time.

pub mod align;
pub mod dex;
pub mod java;
pub mod optimize;
pub mod package;
pub mod prepare;
pub mod resources;
pub mod sign;

use crate::{BuildContext, OptionsBuilder};
use apkb_config::configured;
use apkb_errors::{BuildError, ConfigError, Error};
use apkb_events::EventEmitter;
use apkb_platform::{fs, CommandOutput, Tool};
use std::path::{Path, PathBuf};

/// Resolve a path property that must be set, reporting it by key when empty
pub(crate) fn required_path(
    ctx: &BuildContext,
    key: &'static str,
    value: &Path,
) -> Result<PathBuf, Error> {
    configured(value)
        .map(|path| ctx.resolve(path))
        .ok_or_else(|| ConfigError::invalid(key, "not configured").into())
}

/// Resolve an optional path property
pub(crate) fn optional_path(ctx: &BuildContext, value: &Path) -> Option<PathBuf> {
    configured(value).map(|path| ctx.resolve(path))
}

/// A user-supplied input file must exist
pub(crate) async fn require_input_file(key: &'static str, path: &Path) -> Result<(), Error> {
    if fs::is_file(path).await {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("{} does not exist", path.display())).into())
    }
}

/// A user-supplied input directory must exist
pub(crate) async fn require_input_dir(key: &'static str, path: &Path) -> Result<(), Error> {
    if fs::is_dir(path).await {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, format!("{} is not a directory", path.display())).into())
    }
}

/// An intermediate file produced by an earlier stage (or by this stage's
/// tool) must exist
pub(crate) async fn require_artifact(stage: &str, path: &Path) -> Result<(), Error> {
    if fs::is_file(path).await {
        Ok(())
    } else {
        Err(BuildError::artifact_missing(stage, path).into())
    }
}

/// Run one tool with the staged arguments, draining the builder
pub(crate) async fn run_tool(
    ctx: &BuildContext,
    tool: Tool,
    options: &mut OptionsBuilder,
) -> Result<CommandOutput, Error> {
    let program = ctx.toolchain().require(tool)?;
    tracing::debug!(%tool, args = ?options.redacted(), "invoking");
    let args = options.build()?;
    let output = ctx.runner().execute(program, &args).await?;

    let chatter = output.combined();
    if !chatter.trim().is_empty() {
        ctx.emit_debug(format!("{tool}: {}", chatter.trim_end()));
    }
    Ok(output)
}

/// Swap a stage's finished temporary in for `base.apk`
pub(crate) async fn replace_base_apk(
    ctx: &BuildContext,
    stage: &str,
    temporary: &Path,
) -> Result<(), Error> {
    require_artifact(stage, temporary).await?;
    fs::atomic_replace(temporary, &ctx.layout().base_apk()).await
}

/// Rewrite `base.apk` through a tool that reads it and writes the temporary.
///
/// `stage_args` receives the builder with nothing staged yet plus the input
/// and output paths and must stage the complete argument vector.
pub(crate) async fn rewrite_base_apk<F>(
    ctx: &BuildContext,
    stage: &'static str,
    tool: Tool,
    stage_args: F,
) -> Result<(), Error>
where
    F: FnOnce(&mut OptionsBuilder, &Path, &Path),
{
    let layout = ctx.layout();
    let input = layout.base_apk();
    let temporary = layout.temporary(stage);

    let mut options = OptionsBuilder::new();
    stage_args(&mut options, &input, &temporary);

    require_artifact(stage, &input).await?;
    fs::remove_file_if_exists(&temporary).await?;

    if let Err(e) = run_tool(ctx, tool, &mut options).await {
        discard_temporary(&temporary).await;
        return Err(e);
    }

    replace_base_apk(ctx, stage, &temporary).await
}

/// Remove a failed stage's temporary. Cleanup failures are only logged so
/// the stage's own error reaches the caller.
pub(crate) async fn discard_temporary(temporary: &Path) {
    if let Err(e) = fs::remove_file_if_exists(temporary).await {
        tracing::warn!(path = %temporary.display(), error = %e, "failed to remove temporary");
    }
}

/// Jars shipped in the native-libs directory, sorted
pub(crate) async fn library_jars(ctx: &BuildContext) -> Result<Vec<PathBuf>, Error> {
    let dir = ctx.resolve(&ctx.config().paths().native_libs_dir);
    if !fs::is_dir(&dir).await {
        return Ok(Vec::new());
    }

    let mut jars = Vec::new();
    let mut entries = tokio::fs::read_dir(&dir)
        .await
        .map_err(|e| Error::io_with_path(&e, &dir))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, &dir))?
    {
        let path = entry.path();
        if has_extension(&path, "jar") && fs::is_file(&path).await {
            jars.push(path);
        }
    }
    jars.sort();
    Ok(jars)
}

pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Class path separator of the host platform
pub(crate) const CLASSPATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };
