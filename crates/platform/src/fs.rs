//! Filesystem helpers for build artifacts.
//!
//! All functions return `apkb_errors::Error` with the offending path attached.

use apkb_errors::Error;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Result type for filesystem operations
pub type Result<T> = std::result::Result<T, Error>;

/// Replace `dst` with `tmp` in a single rename.
///
/// Both paths must live on the same filesystem (stages keep their
/// temporaries next to the artifact). Readers of `dst` observe either the old
/// or the new content, never a partial file. On success `tmp` no longer
/// exists; on failure it is removed so a retry starts clean.
///
/// # Errors
///
/// Returns an error if the rename fails (permissions, missing `tmp`, ...).
pub async fn atomic_replace(tmp: &Path, dst: &Path) -> Result<()> {
    match fs::rename(tmp, dst).await {
        Ok(()) => {
            tracing::debug!(from = %tmp.display(), to = %dst.display(), "replaced artifact");
            Ok(())
        }
        Err(e) => {
            let _ = fs::remove_file(tmp).await;
            Err(Error::io_with_path(&e, dst))
        }
    }
}

/// Delete `path` and everything below it, then create it empty
///
/// # Errors
///
/// Returns an error if removal or creation fails.
pub async fn recreate_dir(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io_with_path(&e, path)),
    }
    create_dir_all(path).await
}

/// # Errors
///
/// Returns an error if the directory cannot be created.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .map_err(|e| Error::io_with_path(&e, path))
}

/// Remove a file, treating an already-absent file as success
///
/// # Errors
///
/// Returns an error if the file exists but cannot be removed.
pub async fn remove_file_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io_with_path(&e, path)),
    }
}

/// Whether `path` exists as a regular file
pub async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|meta| meta.is_file())
}

/// Whether `path` exists as a directory
pub async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|meta| meta.is_dir())
}
