// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process scheduling engine
//!
//! Jobs live in memory whatever store alias they belong to. There is no
//! timer loop: callers drive execution with [`MemoryEngine::run_pending`].

use crate::funcs::{FuncRegistry, JobFailure};
use crate::schedule::next_fire_time;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jd_core::{
    Clock, EventMask, ExecutorConfig, Job, JobChanges, JobStoreConfig, Listener, SchedulerEngine,
    SchedulerError, SchedulerEvent, SystemClock, DEFAULT_ALIAS,
};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

/// Upper bound on overdue fire times collected for one job in one pass
const MAX_CATCH_UP_RUNS: usize = 1_000;

#[derive(Default)]
struct EngineState {
    running: bool,
    jobs: HashMap<String, Job>,
    executors: BTreeMap<String, ExecutorConfig>,
    jobstores: BTreeMap<String, JobStoreConfig>,
}

/// A due job, taken out of the state for running
struct DueJob {
    job: Job,
    run_times: Vec<DateTime<Utc>>,
    missed: Vec<DateTime<Utc>>,
}

/// Reference [`SchedulerEngine`] keeping everything in memory
pub struct MemoryEngine<C: Clock = SystemClock> {
    clock: C,
    funcs: FuncRegistry,
    state: Mutex<EngineState>,
    listeners: Mutex<Vec<(Listener, EventMask)>>,
    backends: BTreeSet<&'static str>,
}

impl MemoryEngine<SystemClock> {
    pub fn new(funcs: FuncRegistry) -> Self {
        Self::with_clock(funcs, SystemClock)
    }
}

impl<C: Clock + 'static> MemoryEngine<C> {
    /// An engine with the `default` AsyncTask executor and `default`
    /// Memory store
    pub fn with_clock(funcs: FuncRegistry, clock: C) -> Self {
        let state = EngineState {
            executors: BTreeMap::from([(DEFAULT_ALIAS.to_string(), ExecutorConfig::async_task())]),
            jobstores: BTreeMap::from([(DEFAULT_ALIAS.to_string(), JobStoreConfig::Memory)]),
            ..EngineState::default()
        };
        Self {
            clock,
            funcs,
            state: Mutex::new(state),
            listeners: Mutex::new(Vec::new()),
            backends: BTreeSet::from(["Memory", "Sql", "Document", "KeyValue"]),
        }
    }

    /// Refuse job stores of the given kind, as an engine built without
    /// that backend would
    pub fn without_backend(mut self, kind: &str) -> Self {
        self.backends.retain(|k| *k != kind);
        self
    }

    pub fn funcs(&self) -> &FuncRegistry {
        &self.funcs
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Deliver an event to subscribed listeners. Never called with the
    /// state lock held.
    fn dispatch(&self, event: SchedulerEvent) {
        let listeners: Vec<Listener> = {
            let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
            listeners
                .iter()
                .filter(|(_, mask)| mask.matches(&event))
                .map(|(listener, _)| listener.clone())
                .collect()
        };
        for listener in listeners {
            listener(&event);
        }
    }

    fn check_job(&self, state: &EngineState, job: &Job) -> Result<(), SchedulerError> {
        if !state.executors.contains_key(&job.executor) {
            return Err(SchedulerError::InvalidExecutor(job.executor.clone()));
        }
        if !state.jobstores.contains_key(&job.jobstore) {
            return Err(SchedulerError::InvalidJobStore(job.jobstore.clone()));
        }
        if job.max_instances == 0 {
            return Err(SchedulerError::InvalidJob(
                "max_instances must be at least 1".to_string(),
            ));
        }
        if !self.funcs.contains(&job.func) {
            return Err(SchedulerError::InvalidJob(format!(
                "function '{}' is not registered",
                job.func
            )));
        }
        Ok(())
    }

    /// Run every job whose next run time has passed. Returns the number
    /// of runs attempted.
    pub async fn run_pending(&self) -> usize {
        let now = self.clock.now();
        let due = self.take_due(now);

        let mut attempted = 0;
        for DueJob {
            job,
            run_times,
            missed,
        } in due
        {
            for scheduled_run_time in &missed {
                tracing::debug!(job_id = %job.id, %scheduled_run_time, "run missed");
                self.dispatch(SchedulerEvent::JobMissed {
                    job_id: job.id.clone(),
                    jobstore: job.jobstore.clone(),
                    scheduled_run_time: *scheduled_run_time,
                });
            }
            if run_times.is_empty() {
                if self.reschedule(&job, missed.last().copied(), now) {
                    self.remove_exhausted(&job);
                }
                continue;
            }
            // Reschedule before submitting so listeners see the run after
            // this one. An exhausted job stays until its runs are reported.
            let exhausted = self.reschedule(&job, run_times.last().copied(), now);
            self.dispatch(SchedulerEvent::JobSubmitted {
                job_id: job.id.clone(),
                jobstore: job.jobstore.clone(),
                run_times: run_times.clone(),
            });

            for scheduled_run_time in run_times {
                attempted += 1;
                self.execute(&job, scheduled_run_time);
            }
            if exhausted {
                self.remove_exhausted(&job);
            }
        }
        attempted
    }

    fn take_due(&self, now: DateTime<Utc>) -> Vec<DueJob> {
        let state = self.lock();
        if !state.running {
            return Vec::new();
        }
        let mut jobs: Vec<&Job> = state
            .jobs
            .values()
            .filter(|job| job.next_run_time.is_some_and(|t| t <= now))
            .collect();
        jobs.sort_by(|a, b| a.id.cmp(&b.id));

        jobs.into_iter()
            .map(|job| {
                let mut all = Vec::new();
                let mut next = job.next_run_time;
                while let Some(t) = next {
                    if t > now || all.len() >= MAX_CATCH_UP_RUNS {
                        break;
                    }
                    all.push(t);
                    next = next_fire_time(&job.trigger, Some(t), now);
                }

                let grace = job
                    .misfire_grace_time
                    .map(|secs| Duration::seconds(secs.min(u64::from(u32::MAX)) as i64));
                let (run_times, missed): (Vec<_>, Vec<_>) = all
                    .into_iter()
                    .partition(|t| grace.map_or(true, |g| now - *t <= g));
                let run_times = if job.coalesce {
                    run_times.last().copied().into_iter().collect()
                } else {
                    run_times
                };
                DueJob {
                    job: job.clone(),
                    run_times,
                    missed,
                }
            })
            .collect()
    }

    /// Move a job past its last submitted run. Returns true when the
    /// trigger has no fire time left; the job is then left in place with
    /// no next run time.
    fn reschedule(&self, job: &Job, last_run: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        let mut state = self.lock();
        let Some(stored) = state.jobs.get_mut(&job.id) else {
            return false;
        };
        stored.next_run_time = next_fire_time(&stored.trigger, last_run, now);
        stored.next_run_time.is_none()
    }

    fn remove_exhausted(&self, job: &Job) {
        let removed = {
            let mut state = self.lock();
            // Given a new run time in the meantime: keep it
            match state.jobs.get(&job.id) {
                Some(stored) if stored.next_run_time.is_none() => state.jobs.remove(&job.id),
                _ => None,
            }
        };
        if let Some(removed) = removed {
            self.dispatch(SchedulerEvent::JobRemoved {
                job_id: removed.id,
                jobstore: removed.jobstore,
            });
        }
    }

    fn execute(&self, job: &Job, scheduled_run_time: DateTime<Utc>) {
        let result = match self.funcs.resolve(&job.func) {
            Some(func) => func(&job.args, &job.kwargs),
            None => Err(JobFailure::new(format!(
                "function '{}' is not registered",
                job.func
            ))),
        };
        let event = match result {
            Ok(retval) => SchedulerEvent::JobExecuted {
                job_id: job.id.clone(),
                jobstore: job.jobstore.clone(),
                scheduled_run_time,
                retval: match retval {
                    Value::Null => None,
                    other => Some(other.to_string()),
                },
            },
            Err(failure) => SchedulerEvent::JobError {
                job_id: job.id.clone(),
                jobstore: job.jobstore.clone(),
                scheduled_run_time,
                exception: failure.exception,
                traceback: failure.traceback,
            },
        };
        self.dispatch(event);
    }
}

#[async_trait]
impl<C: Clock + 'static> SchedulerEngine for MemoryEngine<C> {
    async fn start(&self) -> Result<(), SchedulerError> {
        {
            let mut state = self.lock();
            if state.running {
                return Err(SchedulerError::Engine(
                    "scheduler is already running".to_string(),
                ));
            }
            state.running = true;
        }
        self.dispatch(SchedulerEvent::SchedulerStarted);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), SchedulerError> {
        {
            let mut state = self.lock();
            if !state.running {
                return Err(SchedulerError::Engine(
                    "scheduler is not running".to_string(),
                ));
            }
            state.running = false;
        }
        self.dispatch(SchedulerEvent::SchedulerShutdown);
        Ok(())
    }

    async fn add_job(&self, mut job: Job) -> Result<Job, SchedulerError> {
        {
            let mut state = self.lock();
            if state.jobs.contains_key(&job.id) {
                return Err(SchedulerError::AlreadyExists {
                    what: "Job",
                    id: job.id,
                });
            }
            self.check_job(&state, &job)?;
            job.next_run_time = next_fire_time(&job.trigger, None, self.clock.now());
            state.jobs.insert(job.id.clone(), job.clone());
        }
        self.dispatch(SchedulerEvent::JobAdded {
            job_id: job.id.clone(),
            jobstore: job.jobstore.clone(),
        });
        Ok(job)
    }

    async fn get_job(&self, id: &str) -> Option<Job> {
        self.peek_job(id)
    }

    fn peek_job(&self, id: &str) -> Option<Job> {
        self.lock().jobs.get(id).cloned()
    }

    async fn get_jobs(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.lock().jobs.values().cloned().collect();
        jobs.sort_by(|a, b| match (a.next_run_time, b.next_run_time) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        jobs
    }

    async fn modify_job(&self, id: &str, changes: JobChanges) -> Result<Job, SchedulerError> {
        let job = {
            let mut state = self.lock();
            let current = state
                .jobs
                .get(id)
                .cloned()
                .ok_or_else(|| SchedulerError::job_not_found(id))?;

            let trigger_changed = changes.trigger.is_some();
            let mut job = current;
            job.apply(changes);
            self.check_job(&state, &job)?;
            if trigger_changed && !job.is_paused() {
                job.next_run_time = next_fire_time(&job.trigger, None, self.clock.now());
            }
            state.jobs.insert(job.id.clone(), job.clone());
            job
        };
        self.dispatch(SchedulerEvent::JobModified {
            job_id: job.id.clone(),
            jobstore: job.jobstore.clone(),
        });
        Ok(job)
    }

    async fn pause_job(&self, id: &str) -> Result<Job, SchedulerError> {
        let (job, changed) = {
            let mut state = self.lock();
            let job = state
                .jobs
                .get_mut(id)
                .ok_or_else(|| SchedulerError::job_not_found(id))?;
            let changed = job.next_run_time.take().is_some();
            (job.clone(), changed)
        };
        if changed {
            self.dispatch(SchedulerEvent::JobModified {
                job_id: job.id.clone(),
                jobstore: job.jobstore.clone(),
            });
        }
        Ok(job)
    }

    async fn resume_job(&self, id: &str) -> Result<Option<Job>, SchedulerError> {
        let now = self.clock.now();
        let (job, event) = {
            let mut state = self.lock();
            let job = state
                .jobs
                .get_mut(id)
                .ok_or_else(|| SchedulerError::job_not_found(id))?;
            if !job.is_paused() {
                return Ok(Some(job.clone()));
            }
            match next_fire_time(&job.trigger, None, now) {
                Some(next) => {
                    job.next_run_time = Some(next);
                    let job = job.clone();
                    let event = SchedulerEvent::JobModified {
                        job_id: job.id.clone(),
                        jobstore: job.jobstore.clone(),
                    };
                    (Some(job), event)
                }
                None => {
                    let jobstore = job.jobstore.clone();
                    state.jobs.remove(id);
                    let event = SchedulerEvent::JobRemoved {
                        job_id: id.to_string(),
                        jobstore,
                    };
                    (None, event)
                }
            }
        };
        self.dispatch(event);
        Ok(job)
    }

    async fn remove_job(&self, id: &str) -> Result<(), SchedulerError> {
        let job = self
            .lock()
            .jobs
            .remove(id)
            .ok_or_else(|| SchedulerError::job_not_found(id))?;
        self.dispatch(SchedulerEvent::JobRemoved {
            job_id: job.id,
            jobstore: job.jobstore,
        });
        Ok(())
    }

    async fn reload_module(&self, module: &str) -> Result<(), SchedulerError> {
        self.funcs.reload(module)
    }

    async fn add_executor(
        &self,
        alias: &str,
        config: ExecutorConfig,
    ) -> Result<(), SchedulerError> {
        let config = ExecutorConfig::new(config.kind, config.max_workers);
        {
            let mut state = self.lock();
            if state.executors.contains_key(alias) {
                return Err(SchedulerError::AlreadyExists {
                    what: "Executor",
                    id: alias.to_string(),
                });
            }
            state.executors.insert(alias.to_string(), config.clone());
        }
        self.dispatch(SchedulerEvent::ExecutorAdded {
            alias: alias.to_string(),
            kind: config.kind.to_string(),
        });
        Ok(())
    }

    async fn remove_executor(&self, alias: &str) -> Result<(), SchedulerError> {
        let config = self
            .lock()
            .executors
            .remove(alias)
            .ok_or_else(|| SchedulerError::executor_not_found(alias))?;
        self.dispatch(SchedulerEvent::ExecutorRemoved {
            alias: alias.to_string(),
            kind: config.kind.to_string(),
        });
        Ok(())
    }

    async fn add_jobstore(
        &self,
        alias: &str,
        config: JobStoreConfig,
    ) -> Result<(), SchedulerError> {
        if !self.backends.contains(config.kind_name()) {
            return Err(SchedulerError::InvalidJobStore(config.kind_name().to_string()));
        }
        {
            let mut state = self.lock();
            if state.jobstores.contains_key(alias) {
                return Err(SchedulerError::AlreadyExists {
                    what: "JobStore",
                    id: alias.to_string(),
                });
            }
            state.jobstores.insert(alias.to_string(), config.clone());
        }
        self.dispatch(SchedulerEvent::JobstoreAdded {
            alias: alias.to_string(),
            kind: config.kind_name().to_string(),
        });
        Ok(())
    }

    async fn remove_jobstore(&self, alias: &str) -> Result<(), SchedulerError> {
        let (config, mut dropped) = {
            let mut state = self.lock();
            let config = state
                .jobstores
                .remove(alias)
                .ok_or_else(|| SchedulerError::jobstore_not_found(alias))?;
            // The store's jobs go with it
            let ids: Vec<String> = state
                .jobs
                .values()
                .filter(|job| job.jobstore == alias)
                .map(|job| job.id.clone())
                .collect();
            for id in &ids {
                state.jobs.remove(id);
            }
            (config, ids)
        };
        dropped.sort();
        for job_id in dropped {
            self.dispatch(SchedulerEvent::JobRemoved {
                job_id,
                jobstore: alias.to_string(),
            });
        }
        self.dispatch(SchedulerEvent::JobstoreRemoved {
            alias: alias.to_string(),
            kind: config.kind_name().to_string(),
        });
        Ok(())
    }

    fn add_listener(&self, listener: Listener, mask: EventMask) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((listener, mask));
    }

    fn executors(&self) -> BTreeMap<String, ExecutorConfig> {
        self.lock().executors.clone()
    }

    fn jobstores(&self) -> BTreeMap<String, JobStoreConfig> {
        self.lock().jobstores.clone()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
