//! Stage selection and pipeline assembly

use crate::stages::{align, dex, java, optimize, package, prepare, resources, sign};
use crate::{BuildContext, PipelineReport, Task, TaskManager};
use apkb_config::BuildConfig;
use apkb_errors::Error;
use apkb_platform::Tool;
use futures::FutureExt;
use std::fmt;

/// One step of the APK pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Prepare,
    CompileResources,
    LinkResources,
    CompileJava,
    Dex,
    Shrink,
    Package,
    Optimize,
    Align,
    Sign,
}

impl Stage {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Stage::Prepare => prepare::NAME,
            Stage::CompileResources => resources::COMPILE_NAME,
            Stage::LinkResources => resources::LINK_NAME,
            Stage::CompileJava => java::NAME,
            Stage::Dex => dex::DEX_NAME,
            Stage::Shrink => dex::SHRINK_NAME,
            Stage::Package => package::NAME,
            Stage::Optimize => optimize::NAME,
            Stage::Align => align::NAME,
            Stage::Sign => sign::NAME,
        }
    }

    /// The external tool this stage drives, if any
    #[must_use]
    pub fn tool(self) -> Option<Tool> {
        match self {
            Stage::Prepare | Stage::Package => None,
            Stage::CompileResources | Stage::LinkResources | Stage::Optimize => Some(Tool::Aapt2),
            Stage::CompileJava => Some(Tool::Javac),
            Stage::Dex => Some(Tool::D8),
            Stage::Shrink => Some(Tool::R8),
            Stage::Align => Some(Tool::Zipalign),
            Stage::Sign => Some(Tool::Apksigner),
        }
    }

    /// One-line summary for listings
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Stage::Prepare => "create the build directory and clear stale outputs",
            Stage::CompileResources => "compile resources into a flat archive",
            Stage::LinkResources => "link resources and manifest into base.apk",
            Stage::CompileJava => "compile Java sources and generated R.java",
            Stage::Dex => "convert class files to dex",
            Stage::Shrink => "shrink, obfuscate and dex with keep rules",
            Stage::Package => "add dex files and native libraries to base.apk",
            Stage::Optimize => "optimize the resource table",
            Stage::Align => "align uncompressed entries",
            Stage::Sign => "sign the archive",
        }
    }

    /// The task that performs this stage
    #[must_use]
    pub fn task(self) -> Task {
        let name = self.name();
        match self {
            Stage::Prepare => Task::new(name, |ctx| prepare::run(ctx).boxed()),
            Stage::CompileResources => Task::new(name, |ctx| resources::compile(ctx).boxed()),
            Stage::LinkResources => Task::new(name, |ctx| resources::link(ctx).boxed()),
            Stage::CompileJava => Task::new(name, |ctx| java::run(ctx).boxed()),
            Stage::Dex => Task::new(name, |ctx| dex::dex(ctx).boxed()),
            Stage::Shrink => Task::new(name, |ctx| dex::shrink(ctx).boxed()),
            Stage::Package => Task::new(name, |ctx| package::run(ctx).boxed()),
            Stage::Optimize => Task::new(name, |ctx| optimize::run(ctx).boxed()),
            Stage::Align => Task::new(name, |ctx| align::run(ctx).boxed()),
            Stage::Sign => Task::new(name, |ctx| sign::run(ctx).boxed()),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Select the stages a configuration asks for, in execution order.
///
/// The core stages always run. Exactly one of dex or shrink runs. Optimize,
/// align and sign follow in that order, each only when enabled; signing
/// comes last because any later rewrite would invalidate the signature.
#[must_use]
pub fn plan(config: &BuildConfig) -> Vec<Stage> {
    let features = config.features();

    let mut stages = vec![
        Stage::Prepare,
        Stage::CompileResources,
        Stage::LinkResources,
        Stage::CompileJava,
    ];
    stages.push(if features.shrink {
        Stage::Shrink
    } else {
        Stage::Dex
    });
    stages.push(Stage::Package);

    if features.optimize {
        stages.push(Stage::Optimize);
    }
    if features.align {
        stages.push(Stage::Align);
    }
    if features.sign {
        stages.push(Stage::Sign);
    }
    stages
}

/// Fill a fresh task manager with the planned stages
#[must_use]
pub fn build_pipeline(config: &BuildConfig) -> TaskManager {
    let mut manager = TaskManager::new();
    for stage in plan(config) {
        manager.add_task(stage.task());
    }
    manager
}

/// Plan and run a complete build
///
/// # Errors
///
/// Returns the first stage failure, wrapped with the stage's identity.
pub async fn build(ctx: &BuildContext) -> Result<PipelineReport, Error> {
    let mut manager = build_pipeline(ctx.config());
    manager.run(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan() {
        let stages = plan(&BuildConfig::default());
        assert_eq!(
            stages,
            [
                Stage::Prepare,
                Stage::CompileResources,
                Stage::LinkResources,
                Stage::CompileJava,
                Stage::Dex,
                Stage::Package,
                Stage::Optimize,
                Stage::Align,
                Stage::Sign,
            ]
        );
    }

    #[test]
    fn test_shrink_replaces_dex() {
        let config = BuildConfig::builder().shrink(true).build();
        let stages = plan(&config);
        assert!(stages.contains(&Stage::Shrink));
        assert!(!stages.contains(&Stage::Dex));
    }

    #[test]
    fn test_sign_without_align() {
        let config = BuildConfig::builder().align(false).sign(true).build();
        let stages = plan(&config);

        assert!(!stages.contains(&Stage::Align));
        assert_eq!(stages.last(), Some(&Stage::Sign));
        let optimize = stages.iter().position(|s| *s == Stage::Optimize).unwrap();
        let sign = stages.iter().position(|s| *s == Stage::Sign).unwrap();
        assert!(optimize < sign);
    }

    #[test]
    fn test_minimal_plan() {
        let config = BuildConfig::builder()
            .optimize(false)
            .align(false)
            .sign(false)
            .build();
        assert_eq!(plan(&config).last(), Some(&Stage::Package));
        assert_eq!(build_pipeline(&config).len(), 6);
    }

    #[test]
    fn test_task_names_match_stages() {
        let config = BuildConfig::default();
        let names: Vec<_> = build_pipeline(&config).task_names().collect();
        let expected: Vec<_> = plan(&config).into_iter().map(Stage::name).collect();
        assert_eq!(names, expected);
    }
}
