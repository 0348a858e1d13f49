//! CLI command definitions.
//!
//! Each subcommand drives one operation of the remedy dispatcher.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use remedy_agents::Dispatcher;
use remedy_core::RemedyConfig;
use remedy_runner::{ShellRunner, ShellRunnerOptions};

pub mod analyze;
pub mod batch;
pub mod doctor;
pub mod fix;
pub mod ports;

/// remedy - classify runtime errors and apply known fixes
#[derive(Parser)]
#[command(name = "remedy")]
#[command(version, about = "remedy - classify runtime errors and apply known fixes")]
#[command(long_about = r#"
remedy reads an error message (argument or stdin), classifies it as a
dependency, network, syntax, hardware or permission problem, suggests a fix
and, when safe or approved, applies it.

COMMANDS:
  analyze   → Classify an error and print the suggested fix
  fix       → Classify an error and apply its fix if authorized
  batch     → Analyze every blank-line separated error in a file
  ports     → Check a port or find a free one
  doctor    → Show host facts, registered agents and configuration

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Fix failed or was refused
  4 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (.toml, .yaml or .yml)
    #[arg(short, long, global = true, env = "REMEDY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Options shared by every command.
    pub fn global(&self) -> GlobalArgs {
        GlobalArgs {
            json: self.json,
            config: self.config.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Classify an error message and suggest a fix
    Analyze(analyze::AnalyzeArgs),

    /// Classify an error message and apply its fix
    Fix(fix::FixArgs),

    /// Analyze a file of blank-line separated error messages
    Batch(batch::BatchArgs),

    /// Check port availability or find a free port
    Ports(ports::PortsArgs),

    /// Show host information, agents and effective configuration
    Doctor(doctor::DoctorArgs),
}

/// Global options, detached from the parsed command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub json: bool,
    pub config: Option<PathBuf>,
}

/// Failures that map to dedicated exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Fix failed: {0}")]
    FixFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GlobalArgs {
    /// Configuration file (if any) with environment overrides applied.
    pub fn load_config(&self) -> Result<RemedyConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => RemedyConfig::default(),
        };
        config
            .apply_env()
            .map_err(|e| CliError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Dispatcher backed by the host shell.
    pub fn dispatcher(&self, config: &RemedyConfig, force_dry_run: bool) -> Result<Dispatcher> {
        let options = ShellRunnerOptions::new()
            .timeout_secs(config.runner.timeout_secs)
            .dry_run(config.runner.dry_run || force_dry_run);
        debug!("Runner options: {:?}", options);

        let runner = Arc::new(ShellRunner::new(options));
        Dispatcher::with_defaults(runner, config).map_err(|e| CliError::Config(e.to_string()).into())
    }
}

fn load_config_file(path: &Path) -> Result<RemedyConfig> {
    if !path.exists() {
        return Err(CliError::Config(format!("Config file not found: {}", path.display())).into());
    }
    RemedyConfig::load(path).map_err(|e| CliError::Config(format!("{}: {}", path.display(), e)).into())
}

/// The error message from the argument, or all of stdin.
pub fn read_message(message: Option<String>) -> Result<String> {
    let message = match message {
        Some(message) => message,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read error message from stdin")?;
            buffer
        }
    };

    if message.trim().is_empty() {
        return Err(CliError::InvalidInput(
            "no error message given; pass it as an argument or on stdin".to_string(),
        )
        .into());
    }
    Ok(message)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `yes` / `no` for human output.
pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
