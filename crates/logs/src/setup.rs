// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscriber setup writing the audit and execution streams

use crate::error::LogError;
use crate::format::LineFormat;
use crate::query::AUDIT_FILE;
use crate::writer::SizeRotatingWriter;
use jd_core::{SchedulerConfig, EXECUTION_TARGET};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::filter_fn, fmt, prelude::*, EnvFilter};

/// Targets whose records belong on the audit stream
const WORKSPACE_TARGETS: [&str; 6] = ["jobdeck", "jd_core", "jd_adapters", "jd_engine", "jd_logs", "jd"];

/// Where and how the streams are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub dir: PathBuf,
    pub audit_rotation_bytes: u64,
    /// Used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl From<&SchedulerConfig> for LogConfig {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            dir: config.log_dir.clone(),
            audit_rotation_bytes: config.audit_rotation_bytes,
            default_filter: "debug".to_string(),
        }
    }
}

/// Flushes buffered records when dropped. Keep alive for the life of the
/// process.
#[must_use]
pub struct LogGuards {
    _audit: WorkerGuard,
    _execution: WorkerGuard,
}

/// True when a record with `target` goes to the audit stream.
///
/// Everything logged by this workspace lands there, except records under
/// the execution target. Records from anywhere else, such as the job
/// functions' own logging, go to the execution stream.
pub fn is_audit_target(target: &str) -> bool {
    if target == EXECUTION_TARGET || target.starts_with("jobdeck::execution::") {
        return false;
    }
    WORKSPACE_TARGETS.iter().any(|prefix| {
        target
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
    })
}

/// Install the global subscriber: `scheduler.log`, rotated by size, and
/// `jobs.YYYY-MM-DD.log`, rotated daily
pub fn init(config: &LogConfig) -> Result<LogGuards, LogError> {
    std::fs::create_dir_all(&config.dir).map_err(|e| LogError::io(&config.dir, e))?;

    let audit = SizeRotatingWriter::open(
        &config.dir,
        AUDIT_FILE.trim_end_matches(".log"),
        config.audit_rotation_bytes,
    )
    .map_err(|e| LogError::io(config.dir.join(AUDIT_FILE), e))?;
    let (audit, audit_guard) = tracing_appender::non_blocking(audit);

    let execution = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("jobs")
        .filename_suffix("log")
        .build(&config.dir)
        .map_err(|e| LogError::Init(e.to_string()))?;
    let (execution, execution_guard) = tracing_appender::non_blocking(execution);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .event_format(LineFormat::new())
                .with_ansi(false)
                .with_writer(audit)
                .with_filter(filter_fn(|meta| is_audit_target(meta.target()))),
        )
        .with(
            fmt::layer()
                .event_format(LineFormat::new())
                .with_ansi(false)
                .with_writer(execution)
                .with_filter(filter_fn(|meta| !is_audit_target(meta.target()))),
        )
        .try_init()
        .map_err(|e| LogError::Init(e.to_string()))?;

    tracing::debug!(dir = %config.dir.display(), "logging initialized");
    Ok(LogGuards {
        _audit: audit_guard,
        _execution: execution_guard,
    })
}
