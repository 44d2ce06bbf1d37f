// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filtering, paging and rendering of parsed log records

use crate::error::LogError;
use crate::format::{format_line, TIME_FORMAT};
use crate::parse::{read_entries, LogEntry};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Audit stream file name
pub const AUDIT_FILE: &str = "scheduler.log";

const EXECUTION_PREFIX: &str = "jobs.";
const LOG_SUFFIX: &str = ".log";

/// Level names as they appear in log files
pub const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

/// Which stream to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Scheduler and management records, `scheduler.log`
    Audit,
    /// Job run records, `jobs.YYYY-MM-DD.log`
    Execution,
}

impl LogKind {
    /// The file read when none is named: the audit file, or the newest
    /// execution file
    pub fn default_file(self, dir: &Path) -> Result<PathBuf, LogError> {
        match self {
            LogKind::Audit => Ok(dir.join(AUDIT_FILE)),
            LogKind::Execution => available_logs(dir)?
                .into_iter()
                .next()
                .map(|name| dir.join(name))
                .ok_or_else(|| LogError::NotFound(format!("{}*{}", EXECUTION_PREFIX, LOG_SUFFIX))),
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogKind::Audit => f.write_str("audit"),
            LogKind::Execution => f.write_str("execution"),
        }
    }
}

impl FromStr for LogKind {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "audit" | "scheduler" => Ok(LogKind::Audit),
            "execution" | "jobs" => Ok(LogKind::Execution),
            other => Err(LogError::InvalidQuery(format!("unknown log kind '{}'", other))),
        }
    }
}

/// Execution log files in `dir`, newest first. A missing directory has
/// no logs.
pub fn available_logs(dir: &Path) -> Result<Vec<String>, LogError> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(LogError::io(dir, e)),
    };
    let mut names: Vec<String> = read_dir
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.starts_with(EXECUTION_PREFIX) && name.ends_with(LOG_SUFFIX))
        .collect();
    // Date-stamped names sort chronologically
    names.sort_by(|a, b| b.cmp(a));
    Ok(names)
}

/// Keep records whose level equals `level` and whose source contains
/// `module`. An empty criterion matches everything.
pub fn filter(entries: Vec<LogEntry>, level: &str, module: &str) -> Vec<LogEntry> {
    entries
        .into_iter()
        .filter(|e| level.is_empty() || e.level == level)
        .filter(|e| module.is_empty() || e.source.contains(module))
        .collect()
}

/// One page of records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub entries: Vec<LogEntry>,
    /// 1-indexed
    pub page: usize,
    pub page_size: usize,
    /// Number of matching records, never reported as zero
    pub total: usize,
}

impl Page {
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.page_size.max(1))
    }
}

/// Slice out 1-indexed `page`. Pages past the end are empty.
pub fn paginate(entries: Vec<LogEntry>, page: usize, page_size: usize) -> Page {
    let total = entries.len().max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    let entries = entries.into_iter().skip(start).take(page_size).collect();
    Page {
        entries,
        page,
        page_size,
        total,
    }
}

/// Ordering and paging of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Oldest first, one numbered page
    Paged { page: usize },
    /// Newest first, the latest `page_size` records
    Tail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub level: String,
    pub module: String,
    pub mode: QueryMode,
    pub page_size: usize,
}

impl LogQuery {
    pub fn paged(page: usize, page_size: usize) -> Self {
        Self {
            level: String::new(),
            module: String::new(),
            mode: QueryMode::Paged { page },
            page_size,
        }
    }

    pub fn tail(page_size: usize) -> Self {
        Self {
            mode: QueryMode::Tail,
            ..Self::paged(1, page_size)
        }
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    fn validate(&self) -> Result<(), LogError> {
        if self.page_size == 0 {
            return Err(LogError::InvalidQuery("page size must be at least 1".to_string()));
        }
        if self.mode == (QueryMode::Paged { page: 0 }) {
            return Err(LogError::InvalidQuery("pages start at 1".to_string()));
        }
        Ok(())
    }
}

/// Read `path` and apply `query`
pub fn query(path: &Path, query: &LogQuery) -> Result<Page, LogError> {
    query.validate()?;
    let entries = filter(read_entries(path)?, &query.level, &query.module);
    let page = match query.mode {
        QueryMode::Paged { page } => paginate(entries, page, query.page_size),
        QueryMode::Tail => {
            let mut entries = entries;
            entries.reverse();
            paginate(entries, 1, query.page_size)
        }
    };
    tracing::debug!(
        path = %path.display(),
        total = page.total,
        shown = page.entries.len(),
        "queried log"
    );
    Ok(page)
}

/// Markdown rendering: a bold header per record, multi-line messages with
/// their tail in a fenced block, records separated by a blank line
pub fn render_markdown(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let message = match e.message.trim().split_once('\n') {
                Some((first, rest)) => format!("{}\n```\n{}\n```", first, rest),
                None => e.message.trim().to_string(),
            };
            format!(
                "**[{}] {}** *{}* `{}`: {}",
                e.pid,
                e.time.format(TIME_FORMAT),
                e.level,
                e.source,
                message
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Records in their on-disk line format
pub fn render_plain(entries: &[LogEntry]) -> String {
    entries
        .iter()
        .map(|e| format_line(e.pid, &e.time, &e.level, &e.source, &e.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
