// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Log streams: writing them, and reading them back

mod error;
mod format;
mod parse;
mod query;
mod setup;
mod writer;

pub use error::LogError;
pub use format::{format_line, LineFormat};
pub use parse::{parse_entries, read_entries, LogEntry};
pub use query::{
    available_logs, filter, paginate, query, render_markdown, render_plain, LogKind, LogQuery,
    Page, QueryMode, AUDIT_FILE, LEVELS,
};
pub use setup::{init, is_audit_target, LogConfig, LogGuards};
pub use writer::SizeRotatingWriter;
