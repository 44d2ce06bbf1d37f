// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Routes engine events to the audit and execution log streams.
//!
//! The listener registered on the engine snapshots the event's job as it
//! is at dispatch time and enqueues both. A spawned task drains the queue
//! and writes one line per event through `tracing` under the stream's
//! target.

use jd_core::{
    EventMask, Job, SchedulerEngine, SchedulerEvent, AUDIT_TARGET, EXECUTION_TARGET,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::Level;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Log stream a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// Scheduler, resource and job management
    Audit,
    /// Job runs
    Execution,
}

impl Stream {
    pub fn target(self) -> &'static str {
        match self {
            Stream::Audit => AUDIT_TARGET,
            Stream::Execution => EXECUTION_TARGET,
        }
    }
}

/// One routed log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditLine {
    pub stream: Stream,
    pub level: Level,
    pub message: String,
}

impl AuditLine {
    fn audit(message: String) -> Self {
        Self {
            stream: Stream::Audit,
            level: Level::DEBUG,
            message,
        }
    }

    fn execution(level: Level, message: String) -> Self {
        Self {
            stream: Stream::Execution,
            level,
            message,
        }
    }
}

/// `name[id]`, or `[id]` once the job is gone
fn label(job: Option<&Job>, id: &str) -> String {
    format!("{}[{}]", job.map(|j| j.name.as_str()).unwrap_or(""), id)
}

/// Render an event as a log line. `job` is the event's job as it was when
/// the event fired, if it existed then. Returns `None` for events that
/// are not logged.
pub fn describe(event: &SchedulerEvent, job: Option<&Job>) -> Option<AuditLine> {
    let line = match event {
        SchedulerEvent::SchedulerStarted => AuditLine::audit("Scheduler started".to_string()),
        SchedulerEvent::SchedulerShutdown => AuditLine::audit("Scheduler shutdown".to_string()),
        SchedulerEvent::ExecutorAdded { alias, kind } => {
            AuditLine::audit(format!("Add executor {}[{}]", alias, kind))
        }
        SchedulerEvent::ExecutorRemoved { alias, kind } => {
            AuditLine::audit(format!("Remove executor {}[{}]", alias, kind))
        }
        SchedulerEvent::JobstoreAdded { alias, kind } => {
            AuditLine::audit(format!("Add jobstore {}[{}]", alias, kind))
        }
        SchedulerEvent::JobstoreRemoved { alias, kind } => {
            AuditLine::audit(format!("Remove jobstore {}[{}]", alias, kind))
        }
        SchedulerEvent::JobAdded { job_id, .. } => {
            AuditLine::audit(format!("Add job: {}", label(job, job_id)))
        }
        SchedulerEvent::JobRemoved { job_id, .. } => {
            AuditLine::audit(format!("Remove job: {}", label(job, job_id)))
        }
        SchedulerEvent::JobModified { job_id, .. } => {
            AuditLine::audit(format!("Modify job: {}", label(job, job_id)))
        }
        SchedulerEvent::JobSubmitted { job_id, .. } => {
            let job = job?;
            let next = job
                .next_run_time
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "None".to_string());
            AuditLine::execution(
                Level::DEBUG,
                format!(
                    "Submit job: {}, next run at {}",
                    label(Some(job), job_id),
                    next
                ),
            )
        }
        SchedulerEvent::JobExecuted {
            job_id,
            scheduled_run_time,
            retval,
            ..
        } => {
            let mut message = format!(
                "Job executed: {}, scheduled at {}",
                label(job, job_id),
                scheduled_run_time.format(TIME_FORMAT)
            );
            if let Some(retval) = retval {
                message.push_str(&format!(", returned {}", retval));
            }
            AuditLine::execution(Level::DEBUG, message)
        }
        SchedulerEvent::JobMissed {
            job_id,
            scheduled_run_time,
            ..
        } => AuditLine::execution(
            Level::DEBUG,
            format!(
                "Job missed: {}, scheduled at {}",
                label(job, job_id),
                scheduled_run_time.format(TIME_FORMAT)
            ),
        ),
        SchedulerEvent::JobError {
            job_id,
            exception,
            traceback,
            ..
        } => {
            let mut message = format!("Job error: {}: {}", label(job, job_id), exception);
            if let Some(traceback) = traceback {
                message.push('\n');
                message.push_str(traceback.trim_end());
            }
            AuditLine::execution(Level::ERROR, message)
        }
    };
    Some(line)
}

/// Write a line to its stream
pub fn emit(line: &AuditLine) {
    let message = line.message.as_str();
    match (line.stream, line.level) {
        (Stream::Audit, Level::ERROR) => tracing::error!(target: AUDIT_TARGET, "{}", message),
        (Stream::Audit, Level::WARN) => tracing::warn!(target: AUDIT_TARGET, "{}", message),
        (Stream::Audit, Level::INFO) => tracing::info!(target: AUDIT_TARGET, "{}", message),
        (Stream::Audit, _) => tracing::debug!(target: AUDIT_TARGET, "{}", message),
        (Stream::Execution, Level::ERROR) => {
            tracing::error!(target: EXECUTION_TARGET, "{}", message)
        }
        (Stream::Execution, Level::WARN) => tracing::warn!(target: EXECUTION_TARGET, "{}", message),
        (Stream::Execution, Level::INFO) => tracing::info!(target: EXECUTION_TARGET, "{}", message),
        (Stream::Execution, _) => tracing::debug!(target: EXECUTION_TARGET, "{}", message),
    }
}

/// An event paired with its job as it was when the event fired
type Snapshot = (SchedulerEvent, Option<Job>);

#[derive(Default)]
struct Progress {
    queued: AtomicU64,
    routed: AtomicU64,
    closed: AtomicBool,
    notify: Notify,
}

/// Event listener that turns engine events into routed log lines
pub struct AuditPipeline {
    progress: Arc<Progress>,
    task: JoinHandle<()>,
}

impl AuditPipeline {
    /// Subscribe to every event of `engine` and start draining. Must be
    /// called from within a tokio runtime.
    ///
    /// The drain task holds the engine weakly and stops once the engine is
    /// dropped.
    pub fn install<E: SchedulerEngine>(engine: &Arc<E>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Snapshot>();
        let progress = Arc::new(Progress::default());

        let queued = Arc::clone(&progress);
        let source = Arc::downgrade(engine);
        engine.add_listener(
            Arc::new(move |event: &SchedulerEvent| {
                queued.queued.fetch_add(1, Ordering::SeqCst);
                let job = event
                    .job_id()
                    .and_then(|id| source.upgrade().and_then(|engine| engine.peek_job(id)));
                // A closed queue means the drain task is gone; idle() sees that
                let _ = tx.send((event.clone(), job));
            }),
            EventMask::ALL,
        );

        let task = tokio::spawn(drain(Arc::downgrade(engine), rx, Arc::clone(&progress)));
        Self { progress, task }
    }

    /// Wait until every event queued so far has been routed
    pub async fn idle(&self) {
        loop {
            let notified = self.progress.notify.notified();
            let routed = self.progress.routed.load(Ordering::SeqCst);
            if routed >= self.progress.queued.load(Ordering::SeqCst)
                || self.progress.closed.load(Ordering::SeqCst)
            {
                return;
            }
            notified.await;
        }
    }
}

impl Drop for AuditPipeline {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drain<E: SchedulerEngine>(
    engine: Weak<E>,
    mut rx: mpsc::UnboundedReceiver<Snapshot>,
    progress: Arc<Progress>,
) {
    while let Some((event, job)) = rx.recv().await {
        if engine.strong_count() == 0 {
            break;
        }
        let name = event.name();
        // A panicking handler must not take the drain loop down with it
        let handled = tokio::spawn(async move {
            if let Some(line) = describe(&event, job.as_ref()) {
                emit(&line);
            }
        })
        .await;
        if let Err(e) = handled {
            tracing::warn!(event = name, error = %e, "audit handler failed");
        }
        progress.routed.fetch_add(1, Ordering::SeqCst);
        progress.notify.notify_waiters();
    }
    progress.closed.store(true, Ordering::SeqCst);
    progress.notify.notify_waiters();
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
