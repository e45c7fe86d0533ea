//! Resource table optimization with aapt2

use super::rewrite_base_apk;
use crate::BuildContext;
use apkb_errors::Error;
use apkb_platform::Tool;

pub const NAME: &str = "optimize";

/// Rewrite `base.apk` with sparse resource encoding.
///
/// # Errors
///
/// Returns `ArtifactMissing` when `base.apk` is absent or aapt2 wrote no
/// output, `ProcessFailed` when aapt2 fails.
pub async fn run(ctx: &BuildContext) -> Result<(), Error> {
    rewrite_base_apk(ctx, NAME, Tool::Aapt2, |options, input, output| {
        options
            .arg("optimize")
            .option_path("-o", output)
            .arg("--enable-sparse-encoding")
            .path(input);
    })
    .await
}
