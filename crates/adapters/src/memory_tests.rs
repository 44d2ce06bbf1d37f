// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::funcs::{job_fn, JobFailure};
use chrono::TimeZone;
use jd_core::{
    DateTrigger, ExecutorKind, FakeClock, FuncRef, IntervalTrigger, Trigger,
};
use serde_json::{json, Map};
use std::sync::{Arc, Mutex};

fn registry() -> FuncRegistry {
    let funcs = FuncRegistry::new();
    funcs.register_module("jobs", || {
        std::collections::HashMap::from([
            ("ok".to_string(), job_fn(|args, _| Ok(json!(args.len())))),
            ("quiet".to_string(), job_fn(|_, _| Ok(Value::Null))),
            (
                "boom".to_string(),
                job_fn(|_, _| {
                    Err(JobFailure::new("ValueError: boom").with_traceback("at jobs:boom"))
                }),
            ),
        ])
    });
    funcs
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
}

struct Harness {
    engine: MemoryEngine<FakeClock>,
    clock: FakeClock,
    events: Arc<Mutex<Vec<SchedulerEvent>>>,
}

impl Harness {
    async fn new() -> Self {
        let clock = FakeClock::at(start_time());
        let engine = MemoryEngine::with_clock(registry(), clock.clone());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        engine.add_listener(
            Arc::new(move |event: &SchedulerEvent| sink.lock().unwrap().push(event.clone())),
            EventMask::ALL,
        );
        engine.start().await.unwrap();
        Self {
            engine,
            clock,
            events,
        }
    }

    fn take_events(&self) -> Vec<SchedulerEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

fn job(id: &str, func: &str, trigger: Trigger) -> Job {
    Job {
        id: id.to_string(),
        name: id.to_string(),
        func: func.parse::<FuncRef>().unwrap(),
        args: vec![json!(1)],
        kwargs: Map::new(),
        trigger,
        executor: DEFAULT_ALIAS.to_string(),
        jobstore: DEFAULT_ALIAS.to_string(),
        coalesce: true,
        max_instances: 1,
        misfire_grace_time: None,
        next_run_time: None,
    }
}

fn every(seconds: u64) -> Trigger {
    Trigger::Interval(IntervalTrigger {
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 0,
        seconds,
        start_date: None,
        end_date: None,
    })
}

fn once_at(run_date: DateTime<Utc>) -> Trigger {
    Trigger::Date(DateTrigger { run_date })
}

#[tokio::test]
async fn add_job_computes_next_run_and_emits_added() {
    let h = Harness::new().await;
    h.take_events();

    let added = h.engine.add_job(job("a", "jobs:ok", every(60))).await.unwrap();
    assert_eq!(
        added.next_run_time,
        Some(start_time() + Duration::seconds(60))
    );
    assert_eq!(
        h.take_events(),
        vec![SchedulerEvent::JobAdded {
            job_id: "a".into(),
            jobstore: DEFAULT_ALIAS.into()
        }]
    );
}

#[tokio::test]
async fn add_job_validates_references() {
    let h = Harness::new().await;

    let mut bad_executor = job("a", "jobs:ok", every(60));
    bad_executor.executor = "nope".into();
    assert_eq!(
        h.engine.add_job(bad_executor).await.unwrap_err(),
        SchedulerError::InvalidExecutor("nope".into())
    );

    let mut bad_store = job("a", "jobs:ok", every(60));
    bad_store.jobstore = "nope".into();
    assert!(matches!(
        h.engine.add_job(bad_store).await.unwrap_err(),
        SchedulerError::InvalidJobStore(_)
    ));

    assert!(matches!(
        h.engine
            .add_job(job("a", "jobs:missing", every(60)))
            .await
            .unwrap_err(),
        SchedulerError::InvalidJob(_)
    ));

    h.engine.add_job(job("a", "jobs:ok", every(60))).await.unwrap();
    assert!(matches!(
        h.engine
            .add_job(job("a", "jobs:ok", every(60)))
            .await
            .unwrap_err(),
        SchedulerError::AlreadyExists { what: "Job", .. }
    ));
}

#[tokio::test]
async fn jobs_are_listed_soonest_first_paused_last() {
    let h = Harness::new().await;
    h.engine.add_job(job("slow", "jobs:ok", every(600))).await.unwrap();
    h.engine.add_job(job("fast", "jobs:ok", every(10))).await.unwrap();
    h.engine.add_job(job("idle", "jobs:ok", every(1))).await.unwrap();
    h.engine.pause_job("idle").await.unwrap();

    let ids: Vec<String> = h.engine.get_jobs().await.into_iter().map(|j| j.id).collect();
    assert_eq!(ids, vec!["fast", "slow", "idle"]);
}

#[tokio::test]
async fn pause_and_resume_are_idempotent() {
    let h = Harness::new().await;
    h.engine.add_job(job("a", "jobs:ok", every(60))).await.unwrap();
    h.take_events();

    let paused = h.engine.pause_job("a").await.unwrap();
    assert!(paused.is_paused());
    let again = h.engine.pause_job("a").await.unwrap();
    assert_eq!(again, paused);
    assert_eq!(h.take_events().len(), 1);

    h.clock.advance(Duration::seconds(5));
    let resumed = h.engine.resume_job("a").await.unwrap().unwrap();
    assert_eq!(
        resumed.next_run_time,
        Some(start_time() + Duration::seconds(65))
    );
    let again = h.engine.resume_job("a").await.unwrap().unwrap();
    assert_eq!(again, resumed);
    assert_eq!(h.take_events().len(), 1);
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let h = Harness::new().await;
    for err in [
        h.engine.pause_job("ghost").await.unwrap_err(),
        h.engine.resume_job("ghost").await.unwrap_err(),
        h.engine.remove_job("ghost").await.unwrap_err(),
        h.engine
            .modify_job("ghost", JobChanges::default())
            .await
            .unwrap_err(),
    ] {
        assert_eq!(err, SchedulerError::job_not_found("ghost"));
    }
}

#[tokio::test]
async fn modify_with_new_trigger_recomputes_next_run_unless_paused() {
    let h = Harness::new().await;
    h.engine.add_job(job("a", "jobs:ok", every(60))).await.unwrap();

    let changes = JobChanges {
        trigger: Some(every(300)),
        ..JobChanges::default()
    };
    let modified = h.engine.modify_job("a", changes.clone()).await.unwrap();
    assert_eq!(
        modified.next_run_time,
        Some(start_time() + Duration::seconds(300))
    );

    h.engine.pause_job("a").await.unwrap();
    let modified = h.engine.modify_job("a", changes).await.unwrap();
    assert_eq!(modified.next_run_time, None);
}

#[tokio::test]
async fn run_pending_executes_due_jobs() {
    let h = Harness::new().await;
    h.engine.add_job(job("a", "jobs:ok", every(60))).await.unwrap();
    h.take_events();

    assert_eq!(h.engine.run_pending().await, 0);
    h.clock.advance(Duration::seconds(60));
    assert_eq!(h.engine.run_pending().await, 1);

    let events = h.take_events();
    assert!(matches!(&events[0], SchedulerEvent::JobSubmitted { run_times, .. } if run_times.len() == 1));
    assert!(matches!(
        &events[1],
        SchedulerEvent::JobExecuted { retval: Some(v), .. } if v == "1"
    ));
    let next = h.engine.get_job("a").await.unwrap().next_run_time;
    assert_eq!(next, Some(start_time() + Duration::seconds(120)));
}

#[tokio::test]
async fn job_failure_is_reported_as_event() {
    let h = Harness::new().await;
    h.engine.add_job(job("b", "jobs:boom", every(10))).await.unwrap();
    h.clock.advance(Duration::seconds(10));
    h.take_events();

    h.engine.run_pending().await;
    let events = h.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        SchedulerEvent::JobError { exception, traceback: Some(tb), .. }
            if exception == "ValueError: boom" && tb == "at jobs:boom"
    )));
}

#[tokio::test]
async fn coalesce_collapses_overdue_runs() {
    let h = Harness::new().await;
    h.engine.add_job(job("c", "jobs:ok", every(10))).await.unwrap();
    let mut many = job("m", "jobs:ok", every(10));
    many.coalesce = false;
    h.engine.add_job(many).await.unwrap();

    h.clock.advance(Duration::seconds(35));
    // c runs once for three overdue times, m runs for each
    assert_eq!(h.engine.run_pending().await, 4);
}

#[tokio::test]
async fn runs_beyond_grace_time_are_missed() {
    let h = Harness::new().await;
    let mut late = job("late", "jobs:ok", every(60));
    late.misfire_grace_time = Some(5);
    h.engine.add_job(late).await.unwrap();
    h.take_events();

    h.clock.advance(Duration::seconds(90));
    assert_eq!(h.engine.run_pending().await, 0);
    let events = h.take_events();
    assert!(matches!(&events[0], SchedulerEvent::JobMissed { job_id, .. } if job_id == "late"));
    let next = h.engine.get_job("late").await.unwrap().next_run_time;
    assert_eq!(next, Some(start_time() + Duration::seconds(120)));
}

#[tokio::test]
async fn one_shot_job_is_removed_after_running() {
    let h = Harness::new().await;
    let run_date = start_time() + Duration::seconds(30);
    h.engine.add_job(job("once", "jobs:quiet", once_at(run_date))).await.unwrap();
    h.take_events();

    h.clock.advance(Duration::seconds(30));
    assert_eq!(h.engine.run_pending().await, 1);
    assert!(h.engine.get_job("once").await.is_none());

    // Submitted and executed while the job still exists, removed after
    let events = h.take_events();
    assert_eq!(events.len(), 3);
    assert!(matches!(
        &events[0],
        SchedulerEvent::JobSubmitted { job_id, run_times, .. }
            if job_id == "once" && *run_times == vec![run_date]
    ));
    assert!(matches!(&events[1], SchedulerEvent::JobExecuted { retval: None, .. }));
    assert!(matches!(&events[2], SchedulerEvent::JobRemoved { job_id, .. } if job_id == "once"));
}

#[tokio::test]
async fn exhausted_job_is_visible_to_submit_listeners() {
    let clock = FakeClock::at(start_time());
    let engine = Arc::new(MemoryEngine::with_clock(registry(), clock.clone()));
    engine.start().await.unwrap();
    let run_date = start_time() + Duration::seconds(30);
    engine.add_job(job("once", "jobs:quiet", once_at(run_date))).await.unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let weak = Arc::downgrade(&engine);
    engine.add_listener(
        Arc::new(move |event: &SchedulerEvent| {
            if let (SchedulerEvent::JobSubmitted { job_id, .. }, Some(engine)) = (event, weak.upgrade()) {
                let job = engine.peek_job(job_id);
                sink.lock().unwrap().push(job.map(|j| (j.name, j.next_run_time)));
            }
        }),
        EventMask::JOB_SUBMITTED,
    );

    clock.advance(Duration::seconds(30));
    engine.run_pending().await;
    assert_eq!(*seen.lock().unwrap(), vec![Some(("once".to_string(), None))]);
    assert!(engine.peek_job("once").is_none());
}

#[tokio::test]
async fn resuming_exhausted_job_removes_it() {
    let h = Harness::new().await;
    let trigger = IntervalTrigger {
        weeks: 0,
        days: 0,
        hours: 0,
        minutes: 1,
        seconds: 0,
        start_date: None,
        end_date: Some(start_time() + Duration::seconds(90)),
    };
    h.engine
        .add_job(job("e", "jobs:ok", Trigger::Interval(trigger)))
        .await
        .unwrap();
    h.engine.pause_job("e").await.unwrap();

    h.clock.advance(Duration::seconds(60));
    assert_eq!(h.engine.resume_job("e").await.unwrap(), None);
    assert!(h.engine.get_job("e").await.is_none());
}

#[tokio::test]
async fn resources_are_unique_and_removable() {
    let h = Harness::new().await;
    h.take_events();

    let pool = ExecutorConfig::new(ExecutorKind::ThreadPool, Some(4));
    h.engine.add_executor("pool", pool.clone()).await.unwrap();
    assert!(matches!(
        h.engine.add_executor("pool", pool).await.unwrap_err(),
        SchedulerError::AlreadyExists { what: "Executor", .. }
    ));
    assert_eq!(h.engine.executors().len(), 2);

    h.engine.remove_executor("pool").await.unwrap();
    assert_eq!(
        h.engine.remove_executor("pool").await.unwrap_err(),
        SchedulerError::executor_not_found("pool")
    );

    let events = h.take_events();
    assert_eq!(
        events,
        vec![
            SchedulerEvent::ExecutorAdded {
                alias: "pool".into(),
                kind: "ThreadPool".into()
            },
            SchedulerEvent::ExecutorRemoved {
                alias: "pool".into(),
                kind: "ThreadPool".into()
            },
        ]
    );
}

#[tokio::test]
async fn removing_jobstore_drops_its_jobs() {
    let h = Harness::new().await;
    h.engine
        .add_jobstore("archive", JobStoreConfig::Memory)
        .await
        .unwrap();
    let mut archived = job("old", "jobs:ok", every(60));
    archived.jobstore = "archive".into();
    h.engine.add_job(archived).await.unwrap();
    h.engine.add_job(job("new", "jobs:ok", every(60))).await.unwrap();

    let mut older = job("older", "jobs:ok", every(60));
    older.jobstore = "archive".into();
    h.engine.add_job(older).await.unwrap();
    h.take_events();

    h.engine.remove_jobstore("archive").await.unwrap();
    assert!(h.engine.get_job("old").await.is_none());
    assert!(h.engine.get_job("older").await.is_none());
    assert!(h.engine.get_job("new").await.is_some());

    assert_eq!(
        h.take_events(),
        vec![
            SchedulerEvent::JobRemoved {
                job_id: "old".into(),
                jobstore: "archive".into()
            },
            SchedulerEvent::JobRemoved {
                job_id: "older".into(),
                jobstore: "archive".into()
            },
            SchedulerEvent::JobstoreRemoved {
                alias: "archive".into(),
                kind: "Memory".into()
            },
        ]
    );
}

#[tokio::test]
async fn missing_backend_rejects_store_kind() {
    let engine = MemoryEngine::with_clock(registry(), FakeClock::new()).without_backend("Sql");
    let err = engine
        .add_jobstore(
            "db",
            JobStoreConfig::Sql {
                url: "sqlite:///jobs.db".into(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, SchedulerError::InvalidJobStore("Sql".into()));
    assert_eq!(engine.jobstores().len(), 1);
}

#[tokio::test]
async fn start_and_shutdown_toggle_running() {
    let h = Harness::new().await;
    assert!(h.engine.is_running());
    assert!(h.engine.start().await.is_err());
    h.engine.shutdown().await.unwrap();
    assert!(!h.engine.is_running());
    assert!(h.engine.shutdown().await.is_err());

    let events = h.take_events();
    assert_eq!(events.first(), Some(&SchedulerEvent::SchedulerStarted));
    assert_eq!(events.last(), Some(&SchedulerEvent::SchedulerShutdown));
}

#[tokio::test]
async fn listener_mask_filters_events() {
    let engine = MemoryEngine::with_clock(registry(), FakeClock::at(start_time()));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.add_listener(
        Arc::new(move |event: &SchedulerEvent| sink.lock().unwrap().push(event.name())),
        EventMask::JOB_ADDED | EventMask::JOB_REMOVED,
    );
    engine.start().await.unwrap();
    engine.add_job(job("a", "jobs:ok", every(60))).await.unwrap();
    engine.pause_job("a").await.unwrap();
    engine.remove_job("a").await.unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["job:added", "job:removed"]);
}
