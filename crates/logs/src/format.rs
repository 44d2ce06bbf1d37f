// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The on-disk line format shared by both streams

use chrono::{Local, NaiveDateTime};
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub(crate) const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `[  pid] YYYY-MM-DD HH:MM:SS | LEVEL    | module:line\tmessage`
pub fn format_line(
    pid: u32,
    time: &NaiveDateTime,
    level: &str,
    source: &str,
    message: &str,
) -> String {
    format!(
        "[{:>5}] {} | {:<8} | {}\t{}",
        pid,
        time.format(TIME_FORMAT),
        level,
        source,
        message
    )
}

/// Event formatter writing [`format_line`] records in local time
#[derive(Debug, Clone)]
pub struct LineFormat {
    pid: u32,
}

impl LineFormat {
    pub fn new() -> Self {
        Self::with_pid(std::process::id())
    }

    pub fn with_pid(pid: u32) -> Self {
        Self { pid }
    }
}

impl Default for LineFormat {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        let source = format!(
            "{}:{}",
            meta.module_path().unwrap_or_else(|| meta.target()),
            meta.line().unwrap_or(0)
        );
        let prefix = format_line(
            self.pid,
            &Local::now().naive_local(),
            meta.level().as_str(),
            &source,
            "",
        );
        write!(writer, "{}", prefix)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
