// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log file parsing

use crate::error::LogError;
use crate::format::TIME_FORMAT;
use chrono::NaiveDateTime;
use regex::Regex;
use serde::Serialize;
use std::io;
use std::path::Path;
use std::sync::LazyLock;

/// One log record. `message` keeps continuation lines joined by `\n`,
/// with trailing whitespace dropped: blank lines after a traceback and
/// the final newline are not part of the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub pid: u32,
    pub time: NaiveDateTime,
    pub level: String,
    /// `module:line`
    pub source: String,
    pub message: String,
}

// Allow expect here as the regex is a constant valid pattern
#[allow(clippy::expect_used)]
static RECORD_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[\s*(?P<pid>\d+)\] (?P<time>\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}) \| (?P<level>\w+)\s*\| (?P<source>\S*?:\d+)\s(?P<message>.*)$",
    )
    .expect("constant regex pattern is valid")
});

fn parse_start(line: &str) -> Option<LogEntry> {
    let caps = RECORD_START.captures(line)?;
    Some(LogEntry {
        pid: caps["pid"].parse().ok()?,
        time: NaiveDateTime::parse_from_str(&caps["time"], TIME_FORMAT).ok()?,
        level: caps["level"].to_string(),
        source: caps["source"].to_string(),
        message: caps["message"].to_string(),
    })
}

/// Split log text into records.
///
/// A record starts at a line matching the record format and runs up to the
/// next such line or the end of the text. Lines before the first record
/// are ignored.
pub fn parse_entries(text: &str) -> Vec<LogEntry> {
    let mut entries: Vec<LogEntry> = Vec::new();
    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(entry) = parse_start(line) {
            entries.push(entry);
        } else if let Some(current) = entries.last_mut() {
            current.message.push('\n');
            current.message.push_str(line);
        }
    }
    for entry in &mut entries {
        let trimmed = entry.message.trim_end().len();
        entry.message.truncate(trimmed);
    }
    entries
}

/// Read and parse a log file. Bytes that are not valid UTF-8, such as a
/// record cut off mid-write, are replaced rather than rejected.
pub fn read_entries(path: &Path) -> Result<Vec<LogEntry>, LogError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            return Err(LogError::NotFound(name));
        }
        Err(e) => return Err(LogError::io(path, e)),
    };
    Ok(parse_entries(&String::from_utf8_lossy(&bytes)))
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod tests;
