// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler configuration
//!
//! Read from a TOML file:
//!
//! ```toml
//! log_dir = "/var/log/jobdeck"
//!
//! [job_defaults]
//! coalesce = true
//! max_instances = 3
//! misfire_grace_time = "30s"
//!
//! [executors.pool]
//! kind = "ThreadPool"
//! max_workers = 8
//!
//! [jobstores.archive]
//! kind = "Sql"
//! url = "sqlite:///jobs.db"
//! ```

use crate::job::DEFAULT_ALIAS;
use crate::resource::{ExecutorConfig, JobStoreConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Audit log size at which it is rotated
pub const DEFAULT_AUDIT_ROTATION_BYTES: u64 = 100 * 1024 * 1024;

/// Entries per page of a log query
pub const DEFAULT_PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Values applied to jobs created without explicit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDefaults {
    pub coalesce: bool,
    pub max_instances: u32,
    #[serde(with = "humantime_serde")]
    pub misfire_grace_time: Option<Duration>,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            coalesce: true,
            max_instances: 1,
            misfire_grace_time: None,
        }
    }
}

impl JobDefaults {
    /// Grace time in whole seconds
    pub fn misfire_grace_secs(&self) -> Option<u64> {
        self.misfire_grace_time.map(|d| d.as_secs())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub log_dir: PathBuf,
    pub audit_rotation_bytes: u64,
    pub page_size: usize,
    pub job_defaults: JobDefaults,
    pub executors: BTreeMap<String, ExecutorConfig>,
    pub jobstores: BTreeMap<String, JobStoreConfig>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let mut config = Self {
            log_dir: PathBuf::from("logs"),
            audit_rotation_bytes: DEFAULT_AUDIT_ROTATION_BYTES,
            page_size: DEFAULT_PAGE_SIZE,
            job_defaults: JobDefaults::default(),
            executors: BTreeMap::new(),
            jobstores: BTreeMap::new(),
        };
        config.ensure_defaults();
        config
    }
}

impl SchedulerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.ensure_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn ensure_defaults(&mut self) {
        self.executors
            .entry(DEFAULT_ALIAS.to_string())
            .or_insert_with(ExecutorConfig::async_task);
        self.jobstores
            .entry(DEFAULT_ALIAS.to_string())
            .or_insert(JobStoreConfig::Memory);
        for executor in self.executors.values_mut() {
            *executor = ExecutorConfig::new(executor.kind, executor.max_workers);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.job_defaults.max_instances == 0 {
            return Err(ConfigError::Invalid(
                "job_defaults.max_instances must be at least 1".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid(
                "page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
