// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Output formatting for CLI commands

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Markdown,
    Json,
}

/// Print `value` as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a list of names, one per line, or a placeholder when empty
pub fn print_list(items: &[String], empty: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(items),
        OutputFormat::Text | OutputFormat::Markdown => {
            if items.is_empty() {
                println!("{}", empty);
            }
            for item in items {
                match format {
                    OutputFormat::Markdown => println!("- `{}`", item),
                    _ => println!("{}", item),
                }
            }
            Ok(())
        }
    }
}
