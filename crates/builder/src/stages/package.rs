//! Repacking dex output and native libraries into `base.apk`

use super::{discard_temporary, has_extension, replace_base_apk, require_artifact};
use crate::BuildContext;
use apkb_errors::{BuildError, Error};
use apkb_platform::fs;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const NAME: &str = "package";

/// Directory native libraries live under inside the archive
const NATIVE_PREFIX: &str = "lib/";

/// One file to add to the archive
#[derive(Debug, Clone)]
struct Addition {
    name: String,
    source: PathBuf,
    method: CompressionMethod,
}

/// Add the dex files and native libraries to the linked archive.
///
/// Every existing entry is copied without recompression except stale
/// `classes*.dex` and `lib/` entries, which the new content replaces.
/// Dex files are deflated; shared objects are stored so the platform can map
/// them directly.
///
/// # Errors
///
/// Returns `ArtifactMissing` when `base.apk` or the dex output is absent and
/// `ArchiveFailed` when the archive cannot be read or written.
pub async fn run(ctx: &BuildContext) -> Result<(), Error> {
    let layout = ctx.layout();
    let input = layout.base_apk();
    let temporary = layout.temporary(NAME);
    let dex_dir = layout.dex_dir();
    let natives_dir = ctx.resolve(&ctx.config().paths().native_libs_dir);

    require_artifact(NAME, &input).await?;
    fs::remove_file_if_exists(&temporary).await?;

    let output = temporary.clone();
    let repacked = tokio::task::spawn_blocking(move || -> Result<(), Error> {
        let mut additions = dex_additions(&dex_dir)?;
        if additions.is_empty() {
            return Err(BuildError::artifact_missing(NAME, &dex_dir.join("classes.dex")).into());
        }
        additions.extend(native_additions(&natives_dir)?);
        repack(&input, &output, &additions)
    })
    .await
    .unwrap_or_else(|e| Err(Error::internal(format!("archive task failed: {e}"))));

    if let Err(e) = repacked {
        discard_temporary(&temporary).await;
        return Err(e);
    }

    replace_base_apk(ctx, NAME, &temporary).await
}

/// `classes*.dex` at the root of an archive
fn is_dex_name(name: &str) -> bool {
    !name.contains('/')
        && name.starts_with("classes")
        && Path::new(name).extension().is_some_and(|ext| ext == "dex")
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut paths = std::fs::read_dir(dir)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()
        })
        .map_err(|e| Error::io_with_path(&e, dir))?;
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(ToString::to_string)
}

fn dex_additions(dex_dir: &Path) -> Result<Vec<Addition>, Error> {
    if !dex_dir.is_dir() {
        return Ok(Vec::new());
    }
    Ok(read_dir_sorted(dex_dir)?
        .into_iter()
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let name = file_name(&path)?;
            is_dex_name(&name).then_some(Addition {
                name,
                source: path,
                method: CompressionMethod::Deflated,
            })
        })
        .collect())
}

/// `<natives>/<abi>/*.so` becomes `lib/<abi>/*.so`
fn native_additions(natives_dir: &Path) -> Result<Vec<Addition>, Error> {
    if !natives_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut additions = Vec::new();
    for abi_dir in read_dir_sorted(natives_dir)?
        .into_iter()
        .filter(|path| path.is_dir())
    {
        let Some(abi) = file_name(&abi_dir) else {
            continue;
        };
        for library in read_dir_sorted(&abi_dir)? {
            if !library.is_file() || !has_extension(&library, "so") {
                continue;
            }
            if let Some(name) = file_name(&library) {
                additions.push(Addition {
                    name: format!("{NATIVE_PREFIX}{abi}/{name}"),
                    source: library,
                    method: CompressionMethod::Stored,
                });
            }
        }
    }
    Ok(additions)
}

fn archive_error(context: &str, error: impl std::fmt::Display) -> Error {
    BuildError::ArchiveFailed {
        message: format!("{context}: {error}"),
    }
    .into()
}

fn repack(input: &Path, output: &Path, additions: &[Addition]) -> Result<(), Error> {
    let reader = File::open(input).map_err(|e| Error::io_with_path(&e, input))?;
    let mut archive =
        ZipArchive::new(BufReader::new(reader)).map_err(|e| archive_error("reading base.apk", e))?;

    let writer = File::create(output).map_err(|e| Error::io_with_path(&e, output))?;
    let mut zip = ZipWriter::new(BufWriter::new(writer));

    for index in 0..archive.len() {
        let entry = archive
            .by_index_raw(index)
            .map_err(|e| archive_error("reading entry", e))?;
        let name = entry.name().to_string();
        if is_dex_name(&name) || name.starts_with(NATIVE_PREFIX) {
            tracing::debug!(entry = %name, "dropping stale entry");
            continue;
        }
        zip.raw_copy_file(entry)
            .map_err(|e| archive_error(&format!("copying {name}"), e))?;
    }

    for addition in additions {
        let options = SimpleFileOptions::default().compression_method(addition.method);
        zip.start_file(addition.name.as_str(), options)
            .map_err(|e| archive_error(&format!("adding {}", addition.name), e))?;
        let mut source =
            File::open(&addition.source).map_err(|e| Error::io_with_path(&e, &addition.source))?;
        io::copy(&mut source, &mut zip).map_err(|e| Error::io_with_path(&e, &addition.source))?;
    }

    zip.finish()
        .map_err(|e| archive_error("finishing archive", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_dex_names() {
        assert!(is_dex_name("classes.dex"));
        assert!(is_dex_name("classes2.dex"));
        assert!(!is_dex_name("assets/classes.dex"));
        assert!(!is_dex_name("resources.arsc"));
    }

    #[test]
    fn test_repack_replaces_stale_entries() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("base.apk");
        let output = dir.path().join("base.package.tmp.apk");
        write_zip(
            &input,
            &[
                ("AndroidManifest.xml", &b"manifest"[..]),
                ("classes.dex", &b"stale"[..]),
                ("lib/x86/libold.so", &b"old"[..]),
                ("res/layout/main.xml", &b"layout"[..]),
            ],
        );

        let dex = dir.path().join("classes.dex");
        let so = dir.path().join("libnative.so");
        std::fs::write(&dex, b"fresh").unwrap();
        std::fs::write(&so, b"elf").unwrap();

        repack(
            &input,
            &output,
            &[
                Addition {
                    name: "classes.dex".into(),
                    source: dex,
                    method: CompressionMethod::Deflated,
                },
                Addition {
                    name: "lib/arm64-v8a/libnative.so".into(),
                    source: so,
                    method: CompressionMethod::Stored,
                },
            ],
        )
        .unwrap();

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(ToString::to_string).collect();
        names.sort();
        assert_eq!(
            names,
            [
                "AndroidManifest.xml",
                "classes.dex",
                "lib/arm64-v8a/libnative.so",
                "res/layout/main.xml"
            ]
        );

        let mut dex_content = String::new();
        archive
            .by_name("classes.dex")
            .unwrap()
            .read_to_string(&mut dex_content)
            .unwrap();
        assert_eq!(dex_content, "fresh");
        assert_eq!(
            archive.by_name("lib/arm64-v8a/libnative.so").unwrap().compression(),
            CompressionMethod::Stored
        );
    }

    #[test]
    fn test_native_additions_map_abi_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("armeabi-v7a")).unwrap();
        std::fs::write(dir.path().join("armeabi-v7a/libfoo.so"), b"").unwrap();
        std::fs::write(dir.path().join("armeabi-v7a/README"), b"").unwrap();
        std::fs::write(dir.path().join("support.jar"), b"").unwrap();

        let additions = native_additions(dir.path()).unwrap();
        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].name, "lib/armeabi-v7a/libfoo.so");
        assert_eq!(additions[0].method, CompressionMethod::Stored);
    }
}
