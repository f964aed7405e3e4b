use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hkanalytics::config::load_analytics_config;
use hkanalytics::params::params_from_json;
use hkanalytics::{sanitize_parameters, AnalyticsConfiguration, LogBackend, TelemetryClient};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod script;

#[derive(Parser)]
#[command(name = "hkanalytics", version, about = "HKAnalytics telemetry driver")]
struct Cli {
    /// Log diagnostics at debug level (stderr)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Extra config file layered over the discovered ones
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a JSON-lines operation script, printing every backend call
    Replay {
        /// Script file, one JSON operation per line
        script: PathBuf,
    },
    /// Sanitize a JSON parameter object and print the result
    Sanitize {
        /// Parameters as a JSON object
        json: String,
        #[arg(long)]
        max_count: Option<usize>,
        #[arg(long)]
        max_length: Option<usize>,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Serialize)]
struct ConfigFile<'a> {
    analytics: &'a AnalyticsConfiguration,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries command output, diagnostics go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_replay(script_path: &Path, config: AnalyticsConfiguration) -> Result<()> {
    let source = fs::read_to_string(script_path)
        .with_context(|| format!("Failed to read script: {}", script_path.display()))?;
    let ops = script::parse_script(&source)?;

    let backend = Arc::new(LogBackend::stdout());
    let client = TelemetryClient::new(backend.clone(), backend);
    client.configure(config.clone());

    script::run_script(&client, &config, &ops);
    tracing::info!(operations = ops.len(), "replay finished");
    Ok(())
}

fn cmd_sanitize(
    json: &str,
    max_count: Option<usize>,
    max_length: Option<usize>,
    config: AnalyticsConfiguration,
) -> Result<()> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("parameters must be valid JSON")?;
    let parameters =
        params_from_json(value).context("parameters must be a JSON object")?;

    let sanitized = sanitize_parameters(
        Some(&parameters),
        max_count.unwrap_or(config.max_parameters_per_event),
        max_length.unwrap_or(config.max_parameter_value_length),
    );

    // Going through Value sorts the keys
    let output = serde_json::to_value(&sanitized)?;
    println!("{}", serde_json::to_string(&output)?);
    Ok(())
}

fn cmd_config(config: &AnalyticsConfiguration) -> Result<()> {
    let rendered = toml::to_string(&ConfigFile { analytics: config })?;
    print!("{}", rendered);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_analytics_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Replay { script } => cmd_replay(&script, config)?,
        Command::Sanitize {
            json,
            max_count,
            max_length,
        } => cmd_sanitize(&json, max_count, max_length, config)?,
        Command::Config => cmd_config(&config)?,
    }
    Ok(())
}
