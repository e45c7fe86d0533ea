//! apkb - Android application package builder
//!
//! Loads a `build.properties` file, plans the pipeline from its flags and
//! drives the external Android toolchain through the builder crate.

mod cli;
mod display;
mod error;

use crate::cli::{Cli, Commands, ConfigCommands, GlobalArgs};
use crate::display::OutputRenderer;
use crate::error::CliError;
use apkb_builder::BuildContext;
use apkb_config::constants::DEBUG_MODE;
use apkb_config::properties::{self, from_properties, to_properties};
use apkb_config::{BuildConfig, Properties};
use apkb_errors::UserFacingError;
use apkb_events::{LineFormat, LineSink};
use apkb_platform::{SystemProcessRunner, Toolchain};
use clap::Parser;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug, &cli.global.working_dir());

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        report_error(&e, json_mode);
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting apkb v{}", env!("CARGO_PKG_VERSION"));

    let renderer = OutputRenderer::new(cli.global.json, cli.global.color);

    match cli.command {
        Commands::Build {
            overrides,
            tools_dir,
            release,
        } => {
            let mut overrides = overrides.overrides;
            if release {
                overrides.push((DEBUG_MODE.to_string(), "false".to_string()));
            }
            let config = load_config(&cli.global, &renderer, overrides).await?;
            build(&cli.global, &renderer, config, tools_dir.as_deref()).await
        }

        Commands::Plan { overrides } => {
            let config = load_config(&cli.global, &renderer, overrides.overrides).await?;
            renderer.render_plan(&apkb_builder::plan(&config))?;
            Ok(())
        }

        Commands::Config(ConfigCommands::Show { overrides }) => {
            let config = load_config(&cli.global, &renderer, overrides.overrides).await?;
            renderer.render_properties(&to_properties(&config))?;
            Ok(())
        }

        Commands::Config(ConfigCommands::Init { output, force }) => {
            init_config(&renderer, &output, force).await
        }
    }
}

/// Read the properties file and apply command line overrides.
///
/// Without `--config` a missing `build.properties` means all defaults; an
/// explicitly named file must exist.
async fn load_config(
    global: &GlobalArgs,
    renderer: &OutputRenderer,
    overrides: Vec<(String, String)>,
) -> Result<BuildConfig, CliError> {
    let path = global.config_path();

    let mut props = if global.config.is_none() && !exists(&path).await {
        debug!(path = %path.display(), "no configuration file, using defaults");
        renderer.render_missing_config(&path);
        Properties::new()
    } else {
        apkb_config::load_properties(&path).await?
    };

    if !overrides.is_empty() {
        info!(count = overrides.len(), "applying property overrides");
    }
    properties::apply_overrides(&mut props, overrides);
    Ok(from_properties(&props))
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

/// Run the pipeline while streaming progress lines to stdout
async fn build(
    global: &GlobalArgs,
    renderer: &OutputRenderer,
    config: BuildConfig,
    tools_dir: Option<&Path>,
) -> Result<(), CliError> {
    let (event_sender, event_receiver) = apkb_events::channel();

    let format = if global.json {
        LineFormat::Json
    } else {
        LineFormat::Plain
    };
    let sink = LineSink::new(tokio::io::stdout())
        .with_format(format)
        .verbose(global.debug);
    let printer = tokio::spawn(sink.drain(event_receiver));

    let toolchain = Toolchain::resolve(tools_dir);
    for (tool, path) in toolchain.iter() {
        debug!(%tool, path = %path.display(), "resolved tool");
    }
    for tool in toolchain.missing() {
        warn!(%tool, "not found in --tools-dir or on PATH");
    }

    let runner = Arc::new(SystemProcessRunner::new().with_events(event_sender.clone()));
    let ctx = BuildContext::new(config, runner)
        .with_toolchain(toolchain)
        .with_working_dir(global.working_dir())
        .with_event_sender(event_sender);

    let result = apkb_builder::build(&ctx).await;

    // Every sender lives in the context; dropping it lets the printer finish
    drop(ctx);
    match printer.await {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => warn!("Failed to write progress: {}", e),
        Err(e) => warn!("Progress printer stopped: {}", e),
    }

    let report = result?;
    info!(
        artifact = %report.artifact.display(),
        stages = report.completed.len(),
        "build finished"
    );
    renderer.render_build_report(&report)?;
    Ok(())
}

/// Write a properties file holding every default
async fn init_config(renderer: &OutputRenderer, output: &Path, force: bool) -> Result<(), CliError> {
    if !force && exists(output).await {
        return Err(CliError::InvalidArguments(format!(
            "{} already exists; pass --force to overwrite",
            output.display()
        )));
    }
    BuildConfig::default().save_to_file(output).await?;
    renderer.render_success(&format!("Wrote {}", output.display()))?;
    Ok(())
}

/// Print a failure with the captured tool output
fn report_error(e: &CliError, json_mode: bool) {
    if json_mode {
        let mut value = serde_json::json!({
            "error": e.to_string(),
            "code": e.code(),
        });
        if let CliError::Build(inner) = e {
            value["message"] = inner.user_message().into_owned().into();
            value["stage"] = inner.failed_task().into();
            value["output"] = inner.tool_output().into();
        }
        println!("{value}");
        return;
    }

    eprintln!("Error: {e}");
    if let Some(output) = e.tool_output().filter(|output| !output.trim().is_empty()) {
        eprintln!("  Output:");
        for line in output.lines() {
            eprintln!("    {line}");
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled: bool, log_dir: &Path) {
    let filter = |default: &str| {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default))
    };

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let log_file = log_dir.join(format!(
            "apkb-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter("info,apkb=debug"))
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                if !json_mode {
                    eprintln!("Warning: Failed to create log file: {e}");
                }
            }
        }
    }

    if json_mode {
        // JSON mode: keep stdout and stderr free of log lines
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(filter("warn,apkb=info"))
            .init();
    }
}
