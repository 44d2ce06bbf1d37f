// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor and job store descriptions
//!
//! A resource is listed as a [`ResourceEntry`]: its kind name plus a JSON
//! detail whose shape depends on the kind. Entries convert back into the
//! typed config without loss.

use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// How an executor runs job functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExecutorKind {
    /// Cooperative tasks on the scheduler's own runtime
    AsyncTask,
    ThreadPool,
    ProcessPool,
}

impl ExecutorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutorKind::AsyncTask => "AsyncTask",
            ExecutorKind::ThreadPool => "ThreadPool",
            ExecutorKind::ProcessPool => "ProcessPool",
        }
    }
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutorKind {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asynctask" | "async" | "asyncio" => Ok(ExecutorKind::AsyncTask),
            "threadpool" | "thread" => Ok(ExecutorKind::ThreadPool),
            "processpool" | "process" => Ok(ExecutorKind::ProcessPool),
            _ => Err(SchedulerError::InvalidExecutor(s.to_string())),
        }
    }
}

/// Executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    pub kind: ExecutorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<u32>,
}

impl ExecutorConfig {
    /// Build a config. AsyncTask executors have no worker pool, so
    /// `max_workers` is dropped for them.
    pub fn new(kind: ExecutorKind, max_workers: Option<u32>) -> Self {
        let max_workers = match kind {
            ExecutorKind::AsyncTask => None,
            _ => max_workers,
        };
        Self { kind, max_workers }
    }

    pub fn async_task() -> Self {
        Self::new(ExecutorKind::AsyncTask, None)
    }

    pub fn entry(&self) -> ResourceEntry {
        ResourceEntry {
            kind: self.kind.to_string(),
            detail: json!({ "max_workers": self.max_workers }),
        }
    }
}

/// Job store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum JobStoreConfig {
    Memory,
    Sql {
        url: String,
    },
    Document {
        host: String,
        database: String,
        collection: String,
    },
    KeyValue {
        host: String,
        port: u16,
        db: u32,
    },
}

impl JobStoreConfig {
    pub fn kind_name(&self) -> &'static str {
        match self {
            JobStoreConfig::Memory => "Memory",
            JobStoreConfig::Sql { .. } => "Sql",
            JobStoreConfig::Document { .. } => "Document",
            JobStoreConfig::KeyValue { .. } => "KeyValue",
        }
    }

    pub fn entry(&self) -> ResourceEntry {
        let detail = match self {
            JobStoreConfig::Memory => Value::Null,
            JobStoreConfig::Sql { url } => Value::String(url.clone()),
            JobStoreConfig::Document {
                host,
                database,
                collection,
            } => json!({ "host": host, "database": database, "collection": collection }),
            JobStoreConfig::KeyValue { host, port, db } => {
                json!({ "host": host, "port": port, "db": db })
            }
        };
        ResourceEntry {
            kind: self.kind_name().to_string(),
            detail,
        }
    }
}

/// Listing form of an executor or job store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub kind: String,
    pub detail: Value,
}

impl ResourceEntry {
    pub fn to_executor(&self) -> Result<ExecutorConfig, SchedulerError> {
        let kind: ExecutorKind = self.kind.parse()?;
        let max_workers = match self.detail.get("max_workers") {
            None | Some(Value::Null) => None,
            Some(value) => Some(
                value
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| {
                        SchedulerError::InvalidExecutor(format!(
                            "{} (max_workers {} is not a worker count)",
                            self.kind, value
                        ))
                    })?,
            ),
        };
        Ok(ExecutorConfig::new(kind, max_workers))
    }

    pub fn to_jobstore(&self) -> Result<JobStoreConfig, SchedulerError> {
        let invalid = || SchedulerError::InvalidJobStore(format!("{} {}", self.kind, self.detail));
        let text = |key: &str| {
            self.detail
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(invalid)
        };
        let number = |key: &str| self.detail.get(key).and_then(Value::as_u64).ok_or_else(invalid);

        match self.kind.as_str() {
            "Memory" => Ok(JobStoreConfig::Memory),
            "Sql" => self
                .detail
                .as_str()
                .map(|url| JobStoreConfig::Sql {
                    url: url.to_string(),
                })
                .ok_or_else(invalid),
            "Document" => Ok(JobStoreConfig::Document {
                host: text("host")?,
                database: text("database")?,
                collection: text("collection")?,
            }),
            "KeyValue" => Ok(JobStoreConfig::KeyValue {
                host: text("host")?,
                port: u16::try_from(number("port")?).map_err(|_| invalid())?,
                db: u32::try_from(number("db")?).map_err(|_| invalid())?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// A `{value, label}` pair for pick lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceOption {
    pub value: String,
    pub label: String,
}

impl ResourceOption {
    pub fn new(alias: &str, kind: &str) -> Self {
        Self {
            value: alias.to_string(),
            label: format!("{}({})", alias, kind),
        }
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
