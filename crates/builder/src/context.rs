//! Shared state every stage closes over

use apkb_config::BuildConfig;
use apkb_events::{EventEmitter, EventSender};
use apkb_platform::{ProcessRunner, Toolchain};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Derived locations under the build directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    root: PathBuf,
}

impl BuildLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Flat archive of compiled resources
    #[must_use]
    pub fn compiled_resources(&self) -> PathBuf {
        self.root.join("compiled_res.zip")
    }

    /// Generated `R.java` sources
    #[must_use]
    pub fn generated_sources(&self) -> PathBuf {
        self.root.join("gen")
    }

    #[must_use]
    pub fn classes_dir(&self) -> PathBuf {
        self.root.join("classes")
    }

    #[must_use]
    pub fn dex_dir(&self) -> PathBuf {
        self.root.join("dex")
    }

    /// The archive every stage from link onwards builds up
    #[must_use]
    pub fn base_apk(&self) -> PathBuf {
        self.root.join("base.apk")
    }

    /// Keep rules aapt2 derives from the manifest and layouts
    #[must_use]
    pub fn aapt2_rules(&self) -> PathBuf {
        self.root.join("aapt2-rules.pro")
    }

    /// Obfuscation map written by r8
    #[must_use]
    pub fn mapping(&self) -> PathBuf {
        self.root.join("mapping.txt")
    }

    /// Scratch output of a stage that rewrites `base.apk`. It sits next to
    /// `base.apk` so the final rename never crosses filesystems.
    #[must_use]
    pub fn temporary(&self, stage: &str) -> PathBuf {
        self.root.join(format!("base.{stage}.tmp.apk"))
    }

    /// Whether `path` is a stage temporary inside this layout
    #[must_use]
    pub fn is_temporary(&self, path: &Path) -> bool {
        path.parent() == Some(self.root.as_path())
            && path.file_name().and_then(|name| name.to_str()).is_some_and(|name| {
                name.starts_with("base.") && name.ends_with(".tmp.apk")
            })
    }
}

/// Read-only context shared by every task of one build
#[derive(Clone)]
pub struct BuildContext {
    config: Arc<BuildConfig>,
    toolchain: Arc<Toolchain>,
    runner: Arc<dyn ProcessRunner>,
    working_dir: PathBuf,
    event_sender: Option<EventSender>,
}

impl EventEmitter for BuildContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("config", &self.config)
            .field("toolchain", &self.toolchain)
            .field("working_dir", &self.working_dir)
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    /// Create a context resolving paths against the current directory with
    /// bare tool names
    #[must_use]
    pub fn new(config: impl Into<Arc<BuildConfig>>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            config: config.into(),
            toolchain: Arc::new(Toolchain::default()),
            runner,
            working_dir: PathBuf::new(),
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = Arc::new(toolchain);
        self
    }

    /// Directory relative config paths are resolved against
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, event_sender: EventSender) -> Self {
        self.event_sender = Some(event_sender);
        self
    }

    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    #[must_use]
    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    #[must_use]
    pub fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Resolve a configured path against the working directory
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.working_dir.join(path)
    }

    #[must_use]
    pub fn layout(&self) -> BuildLayout {
        BuildLayout::new(self.resolve(&self.config.paths().build_dir))
    }
}
