// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-facing errors with context and suggestions.

use jd_logs::LogError;
use std::fmt;

/// Error printed to stderr before a non-zero exit
#[derive(Debug)]
pub struct JdError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
}

impl JdError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// A log file that does not exist in the log directory
    pub fn log_not_found(name: &str) -> Self {
        JdError::new(format!("Log file '{}' not found", name))
            .with_context("Nothing has been logged yet, or the file was rotated away")
            .with_suggestion("List execution logs: jd logs files")
            .with_suggestion("Point at another directory: jd --log-dir <DIR> logs show")
    }
}

impl From<LogError> for JdError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::NotFound(name) => JdError::log_not_found(&name),
            other => JdError::new(other.to_string()),
        }
    }
}

impl fmt::Display for JdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for JdError {}
