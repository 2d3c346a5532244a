// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # AMEM CLI
//!
//! The `amem` binary fits Gaussian mixtures and answers associative-memory
//! queries over data files.
//!
//! ## Commands
//!
//! - `amem fit --data FILE --components N` - Run EM and print the fitted mixture
//! - `amem predict --data FILE --components N --query X,Y` - Train and predict
//! - `amem config show|validate|generate` - Configuration management
//!
//! Logs go to stderr so command output stays machine readable.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use amem_cli::commands::{self, ConfigCommand, FitArgs, PredictArgs};

/// AMEM - Gaussian-mixture backed associative memory
#[derive(Parser)]
#[command(name = "amem")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "AMEM_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "AMEM_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit a Gaussian mixture with EM
    #[command(name = "fit")]
    Fit(FitArgs),

    /// Train the memory and predict a value for a query
    #[command(name = "predict")]
    Predict(PredictArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Fit(args) => commands::fit::execute(args, cli.config),
        Commands::Predict(args) => commands::predict::execute(args, cli.config),
        Commands::Config { command } => commands::config::handle_command(command, cli.config),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
