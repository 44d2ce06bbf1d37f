// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Executor and job store registry

use crate::context::SchedulerContext;
use jd_core::{
    ExecutorConfig, JobStoreConfig, ResourceEntry, ResourceOption, SchedulerEngine,
    SchedulerError, DEFAULT_ALIAS,
};
use std::collections::BTreeMap;

/// Alias-keyed executors and job stores. Aliases are unique per kind of
/// resource and the `default` entries cannot be removed.
pub struct ResourceRegistry<E> {
    ctx: SchedulerContext<E>,
}

impl<E: SchedulerEngine> ResourceRegistry<E> {
    pub fn new(ctx: SchedulerContext<E>) -> Self {
        Self { ctx }
    }

    pub async fn add_executor(
        &self,
        alias: &str,
        config: ExecutorConfig,
    ) -> Result<(), SchedulerError> {
        let _gate = self.ctx.write().await;
        if self.ctx.engine().executors().contains_key(alias) {
            return Err(SchedulerError::AlreadyExists {
                what: "Executor",
                id: alias.to_string(),
            });
        }
        // AsyncTask executors carry no worker count
        let config = ExecutorConfig::new(config.kind, config.max_workers);
        self.ctx.engine().add_executor(alias, config).await
    }

    pub async fn remove_executor(&self, alias: &str) -> Result<(), SchedulerError> {
        if alias == DEFAULT_ALIAS {
            return Err(SchedulerError::Forbidden(
                "Cannot remove default executor.".to_string(),
            ));
        }
        let _gate = self.ctx.write().await;
        if !self.ctx.engine().executors().contains_key(alias) {
            return Err(SchedulerError::executor_not_found(alias));
        }
        self.ctx.engine().remove_executor(alias).await
    }

    pub async fn add_jobstore(
        &self,
        alias: &str,
        config: JobStoreConfig,
    ) -> Result<(), SchedulerError> {
        let _gate = self.ctx.write().await;
        if self.ctx.engine().jobstores().contains_key(alias) {
            return Err(SchedulerError::AlreadyExists {
                what: "JobStore",
                id: alias.to_string(),
            });
        }
        self.ctx.engine().add_jobstore(alias, config).await
    }

    /// Remove a job store. Jobs kept in it go with it.
    pub async fn remove_jobstore(&self, alias: &str) -> Result<(), SchedulerError> {
        if alias == DEFAULT_ALIAS {
            return Err(SchedulerError::Forbidden(
                "Cannot remove default jobstore.".to_string(),
            ));
        }
        let _gate = self.ctx.write().await;
        if !self.ctx.engine().jobstores().contains_key(alias) {
            return Err(SchedulerError::jobstore_not_found(alias));
        }
        self.ctx.engine().remove_jobstore(alias).await
    }

    pub async fn executors(&self) -> BTreeMap<String, ResourceEntry> {
        let _gate = self.ctx.read().await;
        self.ctx
            .engine()
            .executors()
            .into_iter()
            .map(|(alias, config)| (alias, config.entry()))
            .collect()
    }

    pub async fn jobstores(&self) -> BTreeMap<String, ResourceEntry> {
        let _gate = self.ctx.read().await;
        self.ctx
            .engine()
            .jobstores()
            .into_iter()
            .map(|(alias, config)| (alias, config.entry()))
            .collect()
    }

    /// Rebuild an executor's configuration from its listed entry
    pub async fn executor(&self, alias: &str) -> Result<ExecutorConfig, SchedulerError> {
        self.executors()
            .await
            .get(alias)
            .ok_or_else(|| SchedulerError::executor_not_found(alias))?
            .to_executor()
    }

    /// Rebuild a job store's configuration from its listed entry
    pub async fn jobstore(&self, alias: &str) -> Result<JobStoreConfig, SchedulerError> {
        self.jobstores()
            .await
            .get(alias)
            .ok_or_else(|| SchedulerError::jobstore_not_found(alias))?
            .to_jobstore()
    }

    pub async fn executor_options(&self) -> Vec<ResourceOption> {
        options(self.executors().await)
    }

    pub async fn jobstore_options(&self) -> Vec<ResourceOption> {
        options(self.jobstores().await)
    }
}

fn options(entries: BTreeMap<String, ResourceEntry>) -> Vec<ResourceOption> {
    entries
        .iter()
        .map(|(alias, entry)| ResourceOption::new(alias, &entry.kind))
        .collect()
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
