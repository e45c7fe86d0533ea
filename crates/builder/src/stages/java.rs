//! Java compilation

use super::{library_jars, optional_path, required_path, run_tool, CLASSPATH_SEPARATOR};
use crate::{BuildContext, OptionsBuilder};
use apkb_config::constants as keys;
use apkb_errors::{ConfigError, Error};
use apkb_events::{AppEvent, EventEmitter, GeneralEvent};
use apkb_platform::{fs, Tool};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub const NAME: &str = "compile-java";

/// Compile every configured source root plus the generated `R.java` into
/// class files.
///
/// # Errors
///
/// Returns `ConfigInvalid` when the platform jar is unset or no sources
/// exist, `ProcessFailed` when javac reports errors.
pub async fn run(ctx: &BuildContext) -> Result<(), Error> {
    let config = ctx.config();
    let layout = ctx.layout();
    let identity = config.identity();

    let android_jar = required_path(ctx, keys::ANDROID_JAR_PATH, &config.paths().android_jar)?;

    let mut roots = Vec::new();
    for root in &config.paths().java_sources {
        let resolved = ctx.resolve(root);
        if fs::is_dir(&resolved).await {
            roots.push(resolved);
        } else {
            tracing::warn!(root = %resolved.display(), "source root does not exist");
            ctx.emit(AppEvent::General(GeneralEvent::warning_with_context(
                "source root does not exist, skipping",
                resolved.display().to_string(),
            )));
        }
    }
    let generated = layout.generated_sources();
    if fs::is_dir(&generated).await {
        roots.push(generated);
    }

    let sources = discover_sources(roots).await?;
    if sources.is_empty() {
        return Err(ConfigError::invalid(keys::JAVA_SOURCES, "no .java files found").into());
    }
    tracing::debug!(count = sources.len(), "compiling java sources");

    let mut classpath = vec![android_jar];
    classpath.extend(optional_path(ctx, &config.paths().desugar_jdk_libs));
    classpath.extend(library_jars(ctx).await?);

    let mut options = OptionsBuilder::new();
    options
        .option_path("-d", &layout.classes_dir())
        .option("-source", identity.java_version)
        .option("-target", identity.java_version)
        .option("-encoding", "UTF-8")
        .option_path_list("-classpath", &classpath, CLASSPATH_SEPARATOR)
        .flag_if(config.features().debuggable, "-g")
        .paths(&sources);

    run_tool(ctx, Tool::Javac, &mut options).await?;
    Ok(())
}

/// `.java` files under each root: roots in the given order, files sorted
/// within a root. A root listed twice contributes its files twice.
///
/// # Errors
///
/// Returns an error if the directory walk cannot run to completion.
pub async fn discover_sources(roots: Vec<PathBuf>) -> Result<Vec<PathBuf>, Error> {
    tokio::task::spawn_blocking(move || {
        let mut sources = Vec::new();
        for root in &roots {
            let mut found: Vec<PathBuf> = WalkBuilder::new(root)
                .standard_filters(false)
                .build()
                .flatten()
                .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
                .map(ignore::DirEntry::into_path)
                .filter(|path| super::has_extension(path, "java"))
                .collect();
            found.sort();
            sources.extend(found);
        }
        sources
    })
    .await
    .map_err(|e| Error::internal(format!("source discovery task failed: {e}")))
}

/// Every class file javac wrote, sorted
///
/// # Errors
///
/// Returns an error if the directory walk cannot run to completion.
pub async fn class_files(classes_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let root = classes_dir.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut found: Vec<PathBuf> = WalkBuilder::new(&root)
            .standard_filters(false)
            .build()
            .flatten()
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(ignore::DirEntry::into_path)
            .filter(|path| super::has_extension(path, "class"))
            .collect();
        found.sort();
        found
    })
    .await
    .map_err(|e| Error::internal(format!("class file discovery task failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[tokio::test]
    async fn test_sources_follow_root_order() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        let lib = dir.path().join("lib");
        touch(&app.join("com/example/Main.java"));
        touch(&app.join("com/example/Activity.java"));
        touch(&app.join("com/example/notes.txt"));
        touch(&lib.join("org/util/Strings.java"));

        let forward = discover_sources(vec![app.clone(), lib.clone()]).await.unwrap();
        assert_eq!(
            forward,
            vec![
                app.join("com/example/Activity.java"),
                app.join("com/example/Main.java"),
                lib.join("org/util/Strings.java"),
            ]
        );

        let backward = discover_sources(vec![lib.clone(), app.clone()]).await.unwrap();
        assert_eq!(backward[0], lib.join("org/util/Strings.java"));
        assert_eq!(backward.len(), 3);
    }

    #[tokio::test]
    async fn test_class_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("com/example/Main.class"));
        touch(&dir.path().join("com/example/Main$1.class"));
        touch(&dir.path().join("META-INF/MANIFEST.MF"));

        let classes = class_files(dir.path()).await.unwrap();
        assert_eq!(classes.len(), 2);
        assert!(classes.iter().all(|path| path.extension().unwrap() == "class"));
    }
}
