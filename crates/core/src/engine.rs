// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduling engine seam

use crate::error::SchedulerError;
use crate::event::{EventMask, Listener};
use crate::job::{Job, JobChanges};
use crate::resource::{ExecutorConfig, JobStoreConfig};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Operations the management layer needs from a scheduling engine.
///
/// Mutating calls fire the matching [`SchedulerEvent`](crate::SchedulerEvent)
/// to listeners registered with [`add_listener`](Self::add_listener).
#[async_trait]
pub trait SchedulerEngine: Send + Sync + 'static {
    async fn start(&self) -> Result<(), SchedulerError>;

    async fn shutdown(&self) -> Result<(), SchedulerError>;

    /// Register a job. The engine computes its first run time.
    async fn add_job(&self, job: Job) -> Result<Job, SchedulerError>;

    async fn get_job(&self, id: &str) -> Option<Job>;

    /// The job as it is right now, without waiting. Safe to call from a
    /// listener while an event is being dispatched.
    fn peek_job(&self, id: &str) -> Option<Job>;

    /// All jobs, soonest run first, paused jobs last
    async fn get_jobs(&self) -> Vec<Job>;

    async fn modify_job(&self, id: &str, changes: JobChanges) -> Result<Job, SchedulerError>;

    async fn pause_job(&self, id: &str) -> Result<Job, SchedulerError>;

    /// Unpause a job. A job whose trigger has no fire time left is removed
    /// and `Ok(None)` is returned.
    async fn resume_job(&self, id: &str) -> Result<Option<Job>, SchedulerError>;

    async fn remove_job(&self, id: &str) -> Result<(), SchedulerError>;

    /// Re-load the named function module
    async fn reload_module(&self, module: &str) -> Result<(), SchedulerError>;

    async fn add_executor(&self, alias: &str, config: ExecutorConfig)
        -> Result<(), SchedulerError>;

    async fn remove_executor(&self, alias: &str) -> Result<(), SchedulerError>;

    async fn add_jobstore(&self, alias: &str, config: JobStoreConfig)
        -> Result<(), SchedulerError>;

    async fn remove_jobstore(&self, alias: &str) -> Result<(), SchedulerError>;

    fn add_listener(&self, listener: Listener, mask: EventMask);

    fn executors(&self) -> BTreeMap<String, ExecutorConfig>;

    fn jobstores(&self) -> BTreeMap<String, JobStoreConfig>;
}
