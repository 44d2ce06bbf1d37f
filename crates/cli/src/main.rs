// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! jd - jobdeck CLI

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod error;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, logs};
use error::JdError;
use jd_core::SchedulerConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jd", version, about = "jobdeck - scheduler logs and configuration")]
struct Cli {
    /// Config file (defaults to <config dir>/jobdeck/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log directory (overrides the configured one)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the audit and execution logs
    Logs(logs::LogsArgs),
    /// Inspect configuration
    Config(config::ConfigArgs),
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jobdeck")
        .join("config.toml")
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(default_config_path);
    let mut settings = SchedulerConfig::load_or_default(&path)?;
    if let Some(dir) = cli.log_dir {
        settings.log_dir = dir;
    }
    tracing::debug!(
        config = %path.display(),
        log_dir = %settings.log_dir.display(),
        "loaded config"
    );

    match cli.command {
        Commands::Logs(args) => logs::handle(args.command, &settings.log_dir, settings.page_size),
        Commands::Config(args) => config::handle(args.command, &settings),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics go to stderr, quiet unless RUST_LOG asks
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<JdError>() {
                Some(jd) => eprint!("{}", jd),
                None => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
