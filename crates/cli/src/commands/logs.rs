// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log commands

use crate::error::JdError;
use crate::output::{print_json, print_list, OutputFormat};
use clap::{Args, Subcommand};
use jd_logs::{
    available_logs, query, render_markdown, render_plain, LogError, LogKind, LogQuery, LEVELS,
};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct LogsArgs {
    #[command(subcommand)]
    pub command: LogsCommand,
}

#[derive(Subcommand)]
pub enum LogsCommand {
    /// Show records from the audit or execution log
    Show(ShowArgs),
    /// List execution log files, newest first
    Files {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Args)]
pub struct ShowArgs {
    /// Stream to read (audit or execution)
    #[arg(default_value = "audit", value_parser = parse_kind)]
    pub kind: LogKind,
    /// Log file name inside the log directory
    #[arg(long)]
    pub file: Option<String>,
    /// Only records at this level
    #[arg(long, value_parser = parse_level)]
    pub level: Option<String>,
    /// Only records whose source contains this text
    #[arg(long)]
    pub module: Option<String>,
    /// Page to show, starting at 1
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Records per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Show the newest records first
    #[arg(long, conflicts_with = "page")]
    pub tail: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

fn parse_kind(s: &str) -> Result<LogKind, String> {
    s.parse().map_err(|e: LogError| e.to_string())
}

fn parse_level(s: &str) -> Result<String, String> {
    let level = s.to_uppercase();
    if LEVELS.contains(&level.as_str()) {
        Ok(level)
    } else {
        Err(format!("expected one of {}", LEVELS.join(", ")))
    }
}

/// Resolve the file a `show` reads. Named files must sit directly in `dir`.
fn resolve_file(dir: &Path, kind: LogKind, file: Option<&str>) -> Result<PathBuf, JdError> {
    match file {
        None => Ok(kind.default_file(dir)?),
        Some(name) if name.is_empty() || name.contains(['/', '\\']) || name == ".." => {
            Err(JdError::new(format!("Invalid log file name '{}'", name))
                .with_context("Log files are named relative to the log directory"))
        }
        Some(name) => Ok(dir.join(name)),
    }
}

fn show(dir: &Path, default_page_size: usize, args: ShowArgs) -> Result<(), JdError> {
    let path = resolve_file(dir, args.kind, args.file.as_deref())?;
    let page_size = args.page_size.unwrap_or(default_page_size);
    let request = if args.tail {
        LogQuery::tail(page_size)
    } else {
        LogQuery::paged(args.page, page_size)
    };
    let request = request
        .with_level(args.level.unwrap_or_default())
        .with_module(args.module.unwrap_or_default());

    let page = query(&path, &request)?;
    tracing::debug!(kind = %args.kind, path = %path.display(), "showing log");

    match args.format {
        OutputFormat::Json => print_json(&page).map_err(|e| JdError::new(e.to_string()))?,
        OutputFormat::Markdown => println!("{}", render_markdown(&page.entries)),
        OutputFormat::Text => {
            if !page.entries.is_empty() {
                println!("{}", render_plain(&page.entries));
            }
            if !args.tail {
                eprintln!(
                    "page {} of {} ({} records)",
                    page.page,
                    page.page_count(),
                    page.total
                );
            }
        }
    }
    Ok(())
}

pub fn handle(command: LogsCommand, dir: &Path, default_page_size: usize) -> anyhow::Result<()> {
    match command {
        LogsCommand::Show(args) => show(dir, default_page_size, args)?,
        LogsCommand::Files { format } => {
            let files = available_logs(dir).map_err(JdError::from)?;
            print_list(&files, "No execution logs", format)?;
        }
    }
    Ok(())
}
