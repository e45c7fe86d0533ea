//! Build directory preparation

use crate::BuildContext;
use apkb_errors::Error;
use apkb_platform::fs;

pub const NAME: &str = "prepare";

/// Create the build directory and clear whatever an earlier build left.
///
/// Intermediates of a failed build are kept for inspection until this stage
/// runs again, so nothing stale reaches the new archive.
///
/// # Errors
///
/// Returns an error if a directory cannot be created or cleared.
pub async fn run(ctx: &BuildContext) -> Result<(), Error> {
    let layout = ctx.layout();
    fs::create_dir_all(layout.root()).await?;

    for dir in [
        layout.generated_sources(),
        layout.classes_dir(),
        layout.dex_dir(),
    ] {
        fs::recreate_dir(&dir).await?;
    }

    for file in [
        layout.base_apk(),
        layout.compiled_resources(),
        layout.aapt2_rules(),
        layout.mapping(),
    ] {
        fs::remove_file_if_exists(&file).await?;
    }

    let mut entries = tokio::fs::read_dir(layout.root())
        .await
        .map_err(|e| Error::io_with_path(&e, layout.root()))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::io_with_path(&e, layout.root()))?
    {
        let path = entry.path();
        if layout.is_temporary(&path) {
            tracing::debug!(path = %path.display(), "removing stale temporary");
            fs::remove_file_if_exists(&path).await?;
        }
    }

    Ok(())
}
