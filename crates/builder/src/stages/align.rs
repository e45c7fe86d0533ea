//! Archive alignment with zipalign

use super::rewrite_base_apk;
use crate::BuildContext;
use apkb_errors::Error;
use apkb_platform::Tool;

pub const NAME: &str = "align";

/// Byte boundary for uncompressed entries
const ALIGNMENT: u32 = 4;

/// Align uncompressed entries, page-aligning shared objects.
///
/// Runs before signing: a signed archive must not be realigned.
///
/// # Errors
///
/// Returns `ArtifactMissing` when `base.apk` is absent or zipalign wrote no
/// output, `ProcessFailed` when zipalign fails.
pub async fn run(ctx: &BuildContext) -> Result<(), Error> {
    rewrite_base_apk(ctx, NAME, Tool::Zipalign, |options, input, output| {
        options
            .arg("-f")
            .arg("-p")
            .arg(ALIGNMENT.to_string())
            .path(input)
            .path(output);
    })
    .await
}
