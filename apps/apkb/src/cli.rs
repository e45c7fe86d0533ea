//! Command line interface definition

use apkb_config::properties::parse_override;
use apkb_config::constants::CONFIG_FILE_NAME;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// apkb - Android application package builder
#[derive(Parser)]
#[command(name = "apkb")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Android application package builder")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to a file next to the configuration
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH", env = "APKB_CONFIG")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    /// The properties file to read, explicit or the default name
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Relative paths in the configuration resolve against its directory
    pub fn working_dir(&self) -> PathBuf {
        self.config_path()
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

/// Property overrides shared by commands that read the configuration
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Override a property, e.g. --set minSdk=24 (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    pub overrides: Vec<(String, String)>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build the APK described by the configuration
    #[command(alias = "b")]
    Build {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Directory holding aapt2, javac, d8, r8, zipalign and apksigner
        #[arg(long, value_name = "DIR", env = "APKB_TOOLS_DIR")]
        tools_dir: Option<PathBuf>,

        /// Build without debug mode (same as --set debugMode=false)
        #[arg(long)]
        release: bool,
    },

    /// Show the stages a build would run
    Plan {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the resolved properties
    Show {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Write a properties file holding every default
    Init {
        /// Where to write the file
        #[arg(short, long, value_name = "PATH", default_value = CONFIG_FILE_NAME)]
        output: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
