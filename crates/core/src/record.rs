// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Display/edit form of a job

use crate::job::Job;
use crate::resource::{ExecutorConfig, JobStoreConfig};
use crate::trigger::{TriggerKind, TriggerSpec};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A job as administrators see it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "ser_time")]
    pub next_run_time: Option<DateTime<Utc>>,
    /// `alias(Kind)`, e.g. `default(ThreadPool)`
    pub executor: String,
    /// `alias(Kind)`, same form as [`ResourceOption`](crate::ResourceOption) labels
    pub jobstore: String,
    pub trigger: TriggerKind,
    pub trigger_params: TriggerSpec,
    pub func: String,
    /// JSON array text
    pub args: String,
    /// JSON object text
    pub kwargs: String,
    pub coalesce: bool,
    pub max_instances: u32,
    pub misfire_grace_time: Option<u64>,
}

impl JobRecord {
    pub fn from_job(
        job: &Job,
        executors: &BTreeMap<String, ExecutorConfig>,
        jobstores: &BTreeMap<String, JobStoreConfig>,
    ) -> Self {
        let executor_kind = executors
            .get(&job.executor)
            .map(|e| e.kind.as_str())
            .unwrap_or("Unknown");
        let jobstore_kind = jobstores
            .get(&job.jobstore)
            .map(JobStoreConfig::kind_name)
            .unwrap_or("Unknown");

        Self {
            id: job.id.clone(),
            name: job.name.clone(),
            next_run_time: job.next_run_time,
            executor: format!("{}({})", job.executor, executor_kind),
            jobstore: format!("{}({})", job.jobstore, jobstore_kind),
            trigger: job.trigger.kind(),
            trigger_params: TriggerSpec::parse(&job.trigger),
            func: job.func.to_string(),
            args: serde_json::Value::Array(job.args.clone()).to_string(),
            kwargs: serde_json::Value::Object(job.kwargs.clone()).to_string(),
            coalesce: job.coalesce,
            max_instances: job.max_instances,
            misfire_grace_time: job.misfire_grace_time,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.next_run_time.is_none()
    }
}

fn ser_time<S: serde::Serializer>(
    time: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => serializer.serialize_str(&time.format("%Y-%m-%d %H:%M:%S").to_string()),
        None => serializer.serialize_none(),
    }
}
