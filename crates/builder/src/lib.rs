#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]
//! APK build pipeline for apkb
//!
//! This crate turns a [`apkb_config::BuildConfig`] into a sequence of
//! external tool invocations (aapt2, javac, d8/r8, zipalign, apksigner)
//! and runs them fail-fast through a [`TaskManager`].

mod context;
mod manager;
mod options;
pub mod pipeline;
pub mod stages;
mod task;

pub use context::{BuildContext, BuildLayout};
pub use manager::{PipelineReport, PipelineState, TaskManager};
pub use options::OptionsBuilder;
pub use pipeline::{build, build_pipeline, plan, Stage};
pub use task::{Task, TaskFn, TaskFuture, TaskState};
