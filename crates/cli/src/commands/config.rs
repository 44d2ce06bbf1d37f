// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Config commands

use crate::output::{print_json, OutputFormat};
use clap::{Args, Subcommand};
use jd_core::SchedulerConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

pub fn handle(command: ConfigCommand, config: &SchedulerConfig) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Show { format } => match format {
            OutputFormat::Json => print_json(config)?,
            OutputFormat::Text | OutputFormat::Markdown => {
                print!("{}", toml::to_string_pretty(config)?);
            }
        },
    }
    Ok(())
}
