#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform boundary for the apkb build pipeline.
//!
//! This crate owns everything that touches the host outside the build
//! directory's file contents:
//! - Process execution behind the injectable [`ProcessRunner`] trait
//! - Resolution of the Android toolchain binaries ([`Toolchain`])
//! - Atomic replacement of build artifacts ([`fs::atomic_replace`])

pub mod fs;
pub mod process;
pub mod tools;

pub use process::{redact_secrets, CommandOutput, ProcessRunner, SystemProcessRunner};
pub use tools::{Tool, Toolchain};
