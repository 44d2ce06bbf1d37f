// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared handle to the engine plus the management write gate

use crate::manager::JobManager;
use crate::registry::ResourceRegistry;
use jd_core::{JobDefaults, SchedulerConfig, SchedulerEngine, SchedulerError};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Engine handle shared by the job manager and the resource registry.
///
/// Mutations go through [`write`](Self::write), lookups through
/// [`read`](Self::read): one writer at a time, readers never observe a
/// half-applied change.
pub struct SchedulerContext<E> {
    engine: Arc<E>,
    gate: Arc<RwLock<()>>,
    defaults: Arc<JobDefaults>,
}

impl<E> Clone for SchedulerContext<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            gate: Arc::clone(&self.gate),
            defaults: Arc::clone(&self.defaults),
        }
    }
}

impl<E: SchedulerEngine> SchedulerContext<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
            gate: Arc::new(RwLock::new(())),
            defaults: Arc::new(JobDefaults::default()),
        }
    }

    pub fn with_defaults(mut self, defaults: JobDefaults) -> Self {
        self.defaults = Arc::new(defaults);
        self
    }

    /// Wrap `engine` and register the executors and job stores named in
    /// `config`. An alias the engine already carries with a different
    /// configuration is replaced.
    pub async fn from_config(engine: E, config: &SchedulerConfig) -> Result<Self, SchedulerError> {
        let ctx = Self::new(engine).with_defaults(config.job_defaults.clone());

        let executors = ctx.engine.executors();
        for (alias, executor) in &config.executors {
            match executors.get(alias) {
                Some(current) if current == executor => continue,
                Some(_) => ctx.engine.remove_executor(alias).await?,
                None => {}
            }
            ctx.engine.add_executor(alias, executor.clone()).await?;
        }

        let jobstores = ctx.engine.jobstores();
        for (alias, store) in &config.jobstores {
            match jobstores.get(alias) {
                Some(current) if current == store => continue,
                Some(_) => ctx.engine.remove_jobstore(alias).await?,
                None => {}
            }
            ctx.engine.add_jobstore(alias, store.clone()).await?;
        }

        tracing::debug!(
            executors = config.executors.len(),
            jobstores = config.jobstores.len(),
            "registered configured resources"
        );
        Ok(ctx)
    }

    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    pub fn defaults(&self) -> &JobDefaults {
        &self.defaults
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.gate.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.gate.write().await
    }

    pub async fn start(&self) -> Result<(), SchedulerError> {
        self.engine.start().await
    }

    pub async fn shutdown(&self) -> Result<(), SchedulerError> {
        let _gate = self.write().await;
        self.engine.shutdown().await
    }

    pub fn jobs(&self) -> JobManager<E> {
        JobManager::new(self.clone())
    }

    pub fn resources(&self) -> ResourceRegistry<E> {
        ResourceRegistry::new(self.clone())
    }
}
