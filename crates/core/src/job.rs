// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job identity, create input, and sparse update inputs

use crate::error::SchedulerError;
use crate::trigger::{BuildContext, Trigger, TriggerKind, TriggerSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Alias every scheduler starts with, for both executors and job stores
pub const DEFAULT_ALIAS: &str = "default";

/// Reference to a job function by its module path and qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FuncRef {
    pub module: String,
    pub qualname: String,
}

impl FuncRef {
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
        }
    }
}

impl FromStr for FuncRef {
    type Err = SchedulerError;

    /// Accepts `module:qualname`, or `pkg.module.func` split at the last dot
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (module, qualname) = match s.split_once(':') {
            Some(parts) => parts,
            None => s.rsplit_once('.').ok_or_else(|| {
                SchedulerError::InvalidJob(format!(
                    "function reference '{}' has no module",
                    s
                ))
            })?,
        };
        let (module, qualname) = (module.trim(), qualname.trim());
        if module.is_empty() || qualname.is_empty() {
            return Err(SchedulerError::InvalidJob(format!(
                "function reference '{}' must look like module:function",
                s
            )));
        }
        if qualname.contains("<lambda>") || qualname.contains("<locals>") {
            return Err(SchedulerError::InvalidJob(format!(
                "function '{}' is not reachable by name",
                s
            )));
        }
        Ok(Self::new(module, qualname))
    }
}

impl TryFrom<String> for FuncRef {
    type Error = SchedulerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FuncRef> for String {
    fn from(value: FuncRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for FuncRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.qualname)
    }
}

/// A scheduled job as the engine stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub name: String,
    pub func: FuncRef,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    pub trigger: Trigger,
    pub executor: String,
    pub jobstore: String,
    pub coalesce: bool,
    pub max_instances: u32,
    /// Seconds a run may be late and still execute. `None` means no limit.
    pub misfire_grace_time: Option<u64>,
    /// `None` while paused
    pub next_run_time: Option<DateTime<Utc>>,
}

impl Job {
    pub fn is_paused(&self) -> bool {
        self.next_run_time.is_none()
    }

    pub fn apply(&mut self, changes: JobChanges) {
        let JobChanges {
            name,
            executor,
            jobstore,
            trigger,
            args,
            kwargs,
            coalesce,
            max_instances,
            misfire_grace_time,
        } = changes;
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(executor) = executor {
            self.executor = executor;
        }
        if let Some(jobstore) = jobstore {
            self.jobstore = jobstore;
        }
        if let Some(trigger) = trigger {
            self.trigger = trigger;
        }
        if let Some(args) = args {
            self.args = args;
        }
        if let Some(kwargs) = kwargs {
            self.kwargs = kwargs;
        }
        if let Some(coalesce) = coalesce {
            self.coalesce = coalesce;
        }
        if let Some(max_instances) = max_instances {
            self.max_instances = max_instances;
        }
        if let Some(misfire_grace_time) = misfire_grace_time {
            self.misfire_grace_time = Some(misfire_grace_time);
        }
    }
}

impl BuildContext {
    /// Date fallback for a job: its next run, or the run date of a paused
    /// one-shot job
    pub fn for_job(job: &Job) -> Self {
        let fallback = job.next_run_time.or(match &job.trigger {
            Trigger::Date(date) => Some(date.run_date),
            _ => None,
        });
        Self::with_fallback(fallback)
    }
}

/// Input for creating a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSpec {
    /// Generated when absent
    #[serde(default)]
    pub id: Option<String>,
    /// Defaults to the function's qualified name
    #[serde(default)]
    pub name: Option<String>,
    pub func: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: Map<String, Value>,
    pub trigger: TriggerKind,
    #[serde(default)]
    pub trigger_params: TriggerSpec,
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub jobstore: Option<String>,
    #[serde(default)]
    pub coalesce: Option<bool>,
    #[serde(default)]
    pub max_instances: Option<u32>,
    #[serde(default)]
    pub misfire_grace_time: Option<u64>,
}

impl JobSpec {
    pub fn new(func: impl Into<String>, trigger: TriggerKind, trigger_params: TriggerSpec) -> Self {
        Self {
            id: None,
            name: None,
            func: func.into(),
            args: Vec::new(),
            kwargs: Map::new(),
            trigger,
            trigger_params,
            executor: None,
            jobstore: None,
            coalesce: None,
            max_instances: None,
            misfire_grace_time: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Engine-level field changes. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobChanges {
    pub name: Option<String>,
    pub executor: Option<String>,
    pub jobstore: Option<String>,
    pub trigger: Option<Trigger>,
    pub args: Option<Vec<Value>>,
    pub kwargs: Option<Map<String, Value>>,
    pub coalesce: Option<bool>,
    pub max_instances: Option<u32>,
    pub misfire_grace_time: Option<u64>,
}

impl JobChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Which submitted fields of a [`JobPatch`] count as changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Only present and non-empty, non-zero, true values are applied.
    /// A falsy value keeps the prior one.
    #[default]
    Truthy,
    /// Every present value is applied, so fields can be reset
    Present,
}

/// User-facing partial update for an existing job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPatch {
    pub name: Option<String>,
    pub executor: Option<String>,
    pub jobstore: Option<String>,
    /// Kind of the rebuilt trigger. Defaults to the job's current kind.
    pub trigger: Option<TriggerKind>,
    pub trigger_params: TriggerSpec,
    pub args: Option<Vec<Value>>,
    pub kwargs: Option<Map<String, Value>>,
    pub coalesce: Option<bool>,
    pub max_instances: Option<u32>,
    pub misfire_grace_time: Option<u64>,
}

impl JobPatch {
    /// Resolve the patch against `current` into engine changes.
    ///
    /// The trigger is rebuilt only when the trigger field-set is non-empty.
    pub fn into_changes(
        self,
        current: &Job,
        policy: UpdatePolicy,
    ) -> Result<JobChanges, SchedulerError> {
        let kind = self.trigger.unwrap_or_else(|| current.trigger.kind());
        let trigger = self
            .trigger_params
            .build(kind, &BuildContext::for_job(current))?;

        let keep = |truthy: bool| match policy {
            UpdatePolicy::Truthy => truthy,
            UpdatePolicy::Present => true,
        };
        let changes = JobChanges {
            name: self.name.filter(|v| keep(!v.is_empty())),
            executor: self.executor.filter(|v| keep(!v.is_empty())),
            jobstore: self.jobstore.filter(|v| keep(!v.is_empty())),
            trigger,
            args: self.args.filter(|v| keep(!v.is_empty())),
            kwargs: self.kwargs.filter(|v| keep(!v.is_empty())),
            coalesce: self.coalesce.filter(|v| keep(*v)),
            max_instances: self.max_instances.filter(|v| keep(*v != 0)),
            misfire_grace_time: self.misfire_grace_time.filter(|v| keep(*v != 0)),
        };

        if changes.max_instances == Some(0) {
            return Err(SchedulerError::InvalidJob(
                "max_instances must be at least 1".to_string(),
            ));
        }
        Ok(changes)
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
