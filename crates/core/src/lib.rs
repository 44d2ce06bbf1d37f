// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! jd-core: data model for the jobdeck scheduler management layer
//!
//! This crate provides:
//! - The trigger model and its flat, user-editable field-set
//! - Jobs, job records, and sparse job updates
//! - Executor and job store descriptions
//! - Engine events and the [`SchedulerEngine`] seam
//! - The shared error taxonomy and configuration

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod id;
pub mod job;
pub mod record;
pub mod resource;
pub mod trigger;

pub use action::JobAction;
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, JobDefaults, SchedulerConfig};
pub use engine::SchedulerEngine;
pub use error::{ErrorBody, ErrorKind, SchedulerError, Status};
pub use event::{EventMask, Listener, SchedulerEvent, AUDIT_TARGET, EXECUTION_TARGET};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::{FuncRef, Job, JobChanges, JobPatch, JobSpec, UpdatePolicy, DEFAULT_ALIAS};
pub use record::JobRecord;
pub use resource::{
    ExecutorConfig, ExecutorKind, JobStoreConfig, ResourceEntry, ResourceOption,
};
pub use trigger::{
    BuildContext, CronExpr, CronField, CronTrigger, DateTrigger, IntervalTrigger, Trigger,
    TriggerKind, TriggerSpec,
};
