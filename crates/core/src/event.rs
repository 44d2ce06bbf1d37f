// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine lifecycle and execution events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::BitOr;
use std::sync::Arc;

/// Tracing target of scheduler and resource audit records
pub const AUDIT_TARGET: &str = "jobdeck::audit";

/// Tracing target of job execution records
pub const EXECUTION_TARGET: &str = "jobdeck::execution";

/// Something the engine did
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchedulerEvent {
    SchedulerStarted,
    SchedulerShutdown,
    ExecutorAdded {
        alias: String,
        kind: String,
    },
    ExecutorRemoved {
        alias: String,
        kind: String,
    },
    JobstoreAdded {
        alias: String,
        kind: String,
    },
    JobstoreRemoved {
        alias: String,
        kind: String,
    },
    JobAdded {
        job_id: String,
        jobstore: String,
    },
    JobRemoved {
        job_id: String,
        jobstore: String,
    },
    JobModified {
        job_id: String,
        jobstore: String,
    },
    JobSubmitted {
        job_id: String,
        jobstore: String,
        run_times: Vec<DateTime<Utc>>,
    },
    JobExecuted {
        job_id: String,
        jobstore: String,
        scheduled_run_time: DateTime<Utc>,
        retval: Option<String>,
    },
    JobError {
        job_id: String,
        jobstore: String,
        scheduled_run_time: DateTime<Utc>,
        exception: String,
        traceback: Option<String>,
    },
    JobMissed {
        job_id: String,
        jobstore: String,
        scheduled_run_time: DateTime<Utc>,
    },
}

impl SchedulerEvent {
    /// The mask bit this event belongs to
    pub fn code(&self) -> EventMask {
        match self {
            SchedulerEvent::SchedulerStarted => EventMask::SCHEDULER_STARTED,
            SchedulerEvent::SchedulerShutdown => EventMask::SCHEDULER_SHUTDOWN,
            SchedulerEvent::ExecutorAdded { .. } => EventMask::EXECUTOR_ADDED,
            SchedulerEvent::ExecutorRemoved { .. } => EventMask::EXECUTOR_REMOVED,
            SchedulerEvent::JobstoreAdded { .. } => EventMask::JOBSTORE_ADDED,
            SchedulerEvent::JobstoreRemoved { .. } => EventMask::JOBSTORE_REMOVED,
            SchedulerEvent::JobAdded { .. } => EventMask::JOB_ADDED,
            SchedulerEvent::JobRemoved { .. } => EventMask::JOB_REMOVED,
            SchedulerEvent::JobModified { .. } => EventMask::JOB_MODIFIED,
            SchedulerEvent::JobSubmitted { .. } => EventMask::JOB_SUBMITTED,
            SchedulerEvent::JobExecuted { .. } => EventMask::JOB_EXECUTED,
            SchedulerEvent::JobError { .. } => EventMask::JOB_ERROR,
            SchedulerEvent::JobMissed { .. } => EventMask::JOB_MISSED,
        }
    }

    /// Job the event concerns, if any
    pub fn job_id(&self) -> Option<&str> {
        match self {
            SchedulerEvent::JobAdded { job_id, .. }
            | SchedulerEvent::JobRemoved { job_id, .. }
            | SchedulerEvent::JobModified { job_id, .. }
            | SchedulerEvent::JobSubmitted { job_id, .. }
            | SchedulerEvent::JobExecuted { job_id, .. }
            | SchedulerEvent::JobError { job_id, .. }
            | SchedulerEvent::JobMissed { job_id, .. } => Some(job_id),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SchedulerEvent::SchedulerStarted => "scheduler:started",
            SchedulerEvent::SchedulerShutdown => "scheduler:shutdown",
            SchedulerEvent::ExecutorAdded { .. } => "executor:added",
            SchedulerEvent::ExecutorRemoved { .. } => "executor:removed",
            SchedulerEvent::JobstoreAdded { .. } => "jobstore:added",
            SchedulerEvent::JobstoreRemoved { .. } => "jobstore:removed",
            SchedulerEvent::JobAdded { .. } => "job:added",
            SchedulerEvent::JobRemoved { .. } => "job:removed",
            SchedulerEvent::JobModified { .. } => "job:modified",
            SchedulerEvent::JobSubmitted { .. } => "job:submitted",
            SchedulerEvent::JobExecuted { .. } => "job:executed",
            SchedulerEvent::JobError { .. } => "job:error",
            SchedulerEvent::JobMissed { .. } => "job:missed",
        }
    }
}

/// Set of event kinds a listener subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventMask(u32);

impl EventMask {
    pub const NONE: EventMask = EventMask(0);
    pub const SCHEDULER_STARTED: EventMask = EventMask(1 << 0);
    pub const SCHEDULER_SHUTDOWN: EventMask = EventMask(1 << 1);
    pub const EXECUTOR_ADDED: EventMask = EventMask(1 << 2);
    pub const EXECUTOR_REMOVED: EventMask = EventMask(1 << 3);
    pub const JOBSTORE_ADDED: EventMask = EventMask(1 << 4);
    pub const JOBSTORE_REMOVED: EventMask = EventMask(1 << 5);
    pub const JOB_ADDED: EventMask = EventMask(1 << 6);
    pub const JOB_REMOVED: EventMask = EventMask(1 << 7);
    pub const JOB_MODIFIED: EventMask = EventMask(1 << 8);
    pub const JOB_SUBMITTED: EventMask = EventMask(1 << 9);
    pub const JOB_EXECUTED: EventMask = EventMask(1 << 10);
    pub const JOB_ERROR: EventMask = EventMask(1 << 11);
    pub const JOB_MISSED: EventMask = EventMask(1 << 12);
    pub const ALL: EventMask = EventMask((1 << 13) - 1);

    pub fn contains(self, other: EventMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub fn matches(self, event: &SchedulerEvent) -> bool {
        self.contains(event.code())
    }
}

impl BitOr for EventMask {
    type Output = EventMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        EventMask(self.0 | rhs.0)
    }
}

/// Callback invoked synchronously on the engine's dispatch path
pub type Listener = Arc<dyn Fn(&SchedulerEvent) + Send + Sync>;
