// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle management

use crate::context::SchedulerContext;
use jd_core::{
    BuildContext, FuncRef, IdGen, Job, JobAction, JobPatch, JobRecord, JobSpec, SchedulerEngine,
    SchedulerError, UpdatePolicy, UuidIdGen, DEFAULT_ALIAS,
};
use serde::Serialize;

/// Result of [`JobManager::dispatch`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome {
    pub action: JobAction,
    pub id: String,
    pub name: String,
    /// The job after the action. `None` once it is gone.
    pub job: Option<JobRecord>,
}

impl ActionOutcome {
    pub fn message(&self) -> String {
        format!(
            "Job(id='{}', name='{}'), action={} success.",
            self.id, self.name, self.action
        )
    }
}

/// Validates and applies job lifecycle changes against the engine
pub struct JobManager<E, I = UuidIdGen> {
    ctx: SchedulerContext<E>,
    id_gen: I,
}

impl<E: SchedulerEngine> JobManager<E, UuidIdGen> {
    pub fn new(ctx: SchedulerContext<E>) -> Self {
        Self::with_id_gen(ctx, UuidIdGen)
    }
}

impl<E: SchedulerEngine, I: IdGen> JobManager<E, I> {
    pub fn with_id_gen(ctx: SchedulerContext<E>, id_gen: I) -> Self {
        Self { ctx, id_gen }
    }

    /// Register a new job
    pub async fn create(&self, spec: JobSpec) -> Result<JobRecord, SchedulerError> {
        let defaults = self.ctx.defaults();
        let max_instances = spec.max_instances.unwrap_or(defaults.max_instances);
        if max_instances == 0 {
            return Err(SchedulerError::InvalidJob(
                "max_instances must be at least 1".to_string(),
            ));
        }
        let func: FuncRef = spec.func.parse()?;
        let trigger = spec
            .trigger_params
            .build_required(spec.trigger, &BuildContext::default())?;

        let job = Job {
            id: spec
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| self.id_gen.next()),
            name: spec
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| func.qualname.clone()),
            func,
            args: spec.args,
            kwargs: spec.kwargs,
            trigger,
            executor: spec.executor.unwrap_or_else(|| DEFAULT_ALIAS.to_string()),
            jobstore: spec.jobstore.unwrap_or_else(|| DEFAULT_ALIAS.to_string()),
            coalesce: spec.coalesce.unwrap_or(defaults.coalesce),
            max_instances,
            misfire_grace_time: spec
                .misfire_grace_time
                .or_else(|| defaults.misfire_grace_secs()),
            next_run_time: None,
        };

        let _gate = self.ctx.write().await;
        self.check_resources(Some(&job.executor), Some(&job.jobstore))?;
        let job = self.ctx.engine().add_job(job).await?;
        tracing::debug!(id = %job.id, trigger = %job.trigger, "created job");
        Ok(self.record(&job))
    }

    /// All jobs, soonest first, paused last
    pub async fn list(&self) -> Vec<JobRecord> {
        let _gate = self.ctx.read().await;
        let jobs = self.ctx.engine().get_jobs().await;
        jobs.iter().map(|job| self.record(job)).collect()
    }

    pub async fn get(&self, id: &str) -> Result<JobRecord, SchedulerError> {
        let _gate = self.ctx.read().await;
        let job = self.find(id).await?;
        Ok(self.record(&job))
    }

    /// Stop scheduling the job. Pausing a paused job is a no-op.
    pub async fn pause(&self, id: &str) -> Result<JobRecord, SchedulerError> {
        let _gate = self.ctx.write().await;
        self.find(id).await?;
        let job = self.ctx.engine().pause_job(id).await?;
        Ok(self.record(&job))
    }

    /// Schedule a paused job again from now. Resuming an active job is a
    /// no-op. Returns `None` when the job had no fire time left and the
    /// engine removed it.
    pub async fn resume(&self, id: &str) -> Result<Option<JobRecord>, SchedulerError> {
        let _gate = self.ctx.write().await;
        self.find(id).await?;
        let job = self.ctx.engine().resume_job(id).await?;
        Ok(job.map(|job| self.record(&job)))
    }

    /// Apply a sparse update. See [`UpdatePolicy`] for which submitted
    /// fields count.
    pub async fn modify(
        &self,
        id: &str,
        patch: JobPatch,
        policy: UpdatePolicy,
    ) -> Result<JobRecord, SchedulerError> {
        let _gate = self.ctx.write().await;
        let current = self.find(id).await?;
        let changes = patch.into_changes(&current, policy)?;
        if changes.is_empty() {
            tracing::debug!(id, "modify carried no changes");
            return Ok(self.record(&current));
        }
        self.check_resources(changes.executor.as_deref(), changes.jobstore.as_deref())?;
        let job = self.ctx.engine().modify_job(id, changes).await?;
        Ok(self.record(&job))
    }

    pub async fn remove(&self, id: &str) -> Result<(), SchedulerError> {
        let _gate = self.ctx.write().await;
        self.find(id).await?;
        self.ctx.engine().remove_job(id).await
    }

    /// Re-load the module that defines the job's function
    pub async fn reload(&self, id: &str) -> Result<JobRecord, SchedulerError> {
        let _gate = self.ctx.write().await;
        let job = self.find(id).await?;
        self.ctx.engine().reload_module(&job.func.module).await?;
        Ok(self.record(&job))
    }

    /// Run a named action. The action is validated before the job is
    /// touched.
    pub async fn dispatch(
        &self,
        action: &str,
        id: &str,
        patch: Option<JobPatch>,
    ) -> Result<ActionOutcome, SchedulerError> {
        let action: JobAction = action.parse()?;
        let name = self.get(id).await?.name;

        let job = match action {
            JobAction::Pause => Some(self.pause(id).await?),
            JobAction::Resume => self.resume(id).await?,
            JobAction::Modify => Some(
                self.modify(id, patch.unwrap_or_default(), UpdatePolicy::default())
                    .await?,
            ),
            JobAction::Reload => Some(self.reload(id).await?),
            JobAction::Remove => {
                self.remove(id).await?;
                None
            }
        };

        let outcome = ActionOutcome {
            action,
            id: id.to_string(),
            name: job.as_ref().map(|j| j.name.clone()).unwrap_or(name),
            job,
        };
        tracing::info!("{}", outcome.message());
        Ok(outcome)
    }

    async fn find(&self, id: &str) -> Result<Job, SchedulerError> {
        self.ctx
            .engine()
            .get_job(id)
            .await
            .ok_or_else(|| SchedulerError::job_not_found(id))
    }

    fn check_resources(
        &self,
        executor: Option<&str>,
        jobstore: Option<&str>,
    ) -> Result<(), SchedulerError> {
        let engine = self.ctx.engine();
        if let Some(alias) = executor {
            if !engine.executors().contains_key(alias) {
                return Err(SchedulerError::InvalidExecutor(alias.to_string()));
            }
        }
        if let Some(alias) = jobstore {
            if !engine.jobstores().contains_key(alias) {
                return Err(SchedulerError::InvalidJobStore(alias.to_string()));
            }
        }
        Ok(())
    }

    fn record(&self, job: &Job) -> JobRecord {
        let engine = self.ctx.engine();
        JobRecord::from_job(job, &engine.executors(), &engine.jobstores())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
