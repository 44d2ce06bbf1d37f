// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced engine wrapper for consistent observability

use async_trait::async_trait;
use jd_core::{
    EventMask, ExecutorConfig, Job, JobChanges, JobStoreConfig, Listener, SchedulerEngine,
    SchedulerError,
};
use std::collections::BTreeMap;
use tracing::Instrument;

/// Wrapper that adds spans and outcome logging to any SchedulerEngine
#[derive(Clone)]
pub struct TracedEngine<E> {
    inner: E,
}

impl<E> TracedEngine<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

fn log_outcome<T>(result: &Result<T, SchedulerError>, elapsed: std::time::Duration, ok: &str) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match result {
        Ok(_) => tracing::info!(elapsed_ms, "{}", ok),
        Err(e @ SchedulerError::Engine(_)) => tracing::error!(elapsed_ms, error = %e, "failed"),
        Err(e) => tracing::warn!(elapsed_ms, error = %e, "rejected"),
    }
}

#[async_trait]
impl<E: SchedulerEngine> SchedulerEngine for TracedEngine<E> {
    async fn start(&self) -> Result<(), SchedulerError> {
        let result = self
            .inner
            .start()
            .instrument(tracing::info_span!("engine.start"))
            .await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "start failed");
        }
        result
    }

    async fn shutdown(&self) -> Result<(), SchedulerError> {
        let result = self
            .inner
            .shutdown()
            .instrument(tracing::info_span!("engine.shutdown"))
            .await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "shutdown failed");
        }
        result
    }

    async fn add_job(&self, job: Job) -> Result<Job, SchedulerError> {
        let span = tracing::info_span!("engine.add_job", job_id = %job.id, func = %job.func);
        async {
            tracing::debug!(trigger = %job.trigger, executor = %job.executor, "adding");
            let start = std::time::Instant::now();
            let result = self.inner.add_job(job).await;
            log_outcome(&result, start.elapsed(), "job added");
            result
        }
        .instrument(span)
        .await
    }

    async fn get_job(&self, id: &str) -> Option<Job> {
        let job = self.inner.get_job(id).await;
        tracing::trace!(id, found = job.is_some(), "looked up job");
        job
    }

    fn peek_job(&self, id: &str) -> Option<Job> {
        self.inner.peek_job(id)
    }

    async fn get_jobs(&self) -> Vec<Job> {
        let jobs = self.inner.get_jobs().await;
        tracing::trace!(count = jobs.len(), "listed jobs");
        jobs
    }

    async fn modify_job(&self, id: &str, changes: JobChanges) -> Result<Job, SchedulerError> {
        let span = tracing::info_span!("engine.modify_job", id);
        async {
            tracing::debug!(new_trigger = changes.trigger.is_some(), "modifying");
            let start = std::time::Instant::now();
            let result = self.inner.modify_job(id, changes).await;
            log_outcome(&result, start.elapsed(), "job modified");
            result
        }
        .instrument(span)
        .await
    }

    async fn pause_job(&self, id: &str) -> Result<Job, SchedulerError> {
        let result = self
            .inner
            .pause_job(id)
            .instrument(tracing::info_span!("engine.pause_job", id))
            .await;
        if let Err(e) = &result {
            tracing::warn!(id, error = %e, "pause failed");
        }
        result
    }

    async fn resume_job(&self, id: &str) -> Result<Option<Job>, SchedulerError> {
        let result = self
            .inner
            .resume_job(id)
            .instrument(tracing::info_span!("engine.resume_job", id))
            .await;
        match &result {
            Ok(None) => tracing::info!(id, "job has no fire time left, removed on resume"),
            Ok(Some(_)) => {}
            Err(e) => tracing::warn!(id, error = %e, "resume failed"),
        }
        result
    }

    async fn remove_job(&self, id: &str) -> Result<(), SchedulerError> {
        let span = tracing::info_span!("engine.remove_job", id);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.remove_job(id).await;
            log_outcome(&result, start.elapsed(), "job removed");
            result
        }
        .instrument(span)
        .await
    }

    async fn reload_module(&self, module: &str) -> Result<(), SchedulerError> {
        let span = tracing::info_span!("engine.reload_module", module);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.reload_module(module).await;
            log_outcome(&result, start.elapsed(), "module reloaded");
            result
        }
        .instrument(span)
        .await
    }

    async fn add_executor(
        &self,
        alias: &str,
        config: ExecutorConfig,
    ) -> Result<(), SchedulerError> {
        let span = tracing::info_span!("engine.add_executor", alias, kind = %config.kind);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.add_executor(alias, config).await;
            log_outcome(&result, start.elapsed(), "executor added");
            result
        }
        .instrument(span)
        .await
    }

    async fn remove_executor(&self, alias: &str) -> Result<(), SchedulerError> {
        let span = tracing::info_span!("engine.remove_executor", alias);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.remove_executor(alias).await;
            log_outcome(&result, start.elapsed(), "executor removed");
            result
        }
        .instrument(span)
        .await
    }

    async fn add_jobstore(
        &self,
        alias: &str,
        config: JobStoreConfig,
    ) -> Result<(), SchedulerError> {
        let span = tracing::info_span!("engine.add_jobstore", alias, kind = config.kind_name());
        async {
            let start = std::time::Instant::now();
            let result = self.inner.add_jobstore(alias, config).await;
            log_outcome(&result, start.elapsed(), "jobstore added");
            result
        }
        .instrument(span)
        .await
    }

    async fn remove_jobstore(&self, alias: &str) -> Result<(), SchedulerError> {
        let span = tracing::info_span!("engine.remove_jobstore", alias);
        async {
            let start = std::time::Instant::now();
            let result = self.inner.remove_jobstore(alias).await;
            log_outcome(&result, start.elapsed(), "jobstore removed");
            result
        }
        .instrument(span)
        .await
    }

    fn add_listener(&self, listener: Listener, mask: EventMask) {
        tracing::debug!(?mask, "listener added");
        self.inner.add_listener(listener, mask);
    }

    fn executors(&self) -> BTreeMap<String, ExecutorConfig> {
        self.inner.executors()
    }

    fn jobstores(&self) -> BTreeMap<String, JobStoreConfig> {
        self.inner.jobstores()
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
