// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::trigger::{CronTrigger, DateTrigger, IntervalTrigger};
use chrono::TimeZone;
use serde_json::json;
use yare::parameterized;

fn interval_job() -> Job {
    Job {
        id: "job-1".to_string(),
        name: "tick".to_string(),
        func: FuncRef::new("jobs.report", "tick"),
        args: vec![json!(1)],
        kwargs: Map::new(),
        trigger: Trigger::Interval(IntervalTrigger {
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 5,
            seconds: 0,
            start_date: None,
            end_date: None,
        }),
        executor: DEFAULT_ALIAS.to_string(),
        jobstore: DEFAULT_ALIAS.to_string(),
        coalesce: true,
        max_instances: 3,
        misfire_grace_time: Some(30),
        next_run_time: Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 5, 0).unwrap()),
    }
}

#[parameterized(
    colon = { "jobs.report:tick", "jobs.report", "tick" },
    dotted = { "jobs.report.tick", "jobs.report", "tick" },
    nested_qualname = { "jobs.report:Reporter.run", "jobs.report", "Reporter.run" },
)]
fn func_ref_parses(raw: &str, module: &str, qualname: &str) {
    let func: FuncRef = raw.parse().unwrap();
    assert_eq!(func.module, module);
    assert_eq!(func.qualname, qualname);
}

#[parameterized(
    no_module = { "tick" },
    empty_qualname = { "jobs:" },
    lambda = { "jobs:<lambda>" },
    closure = { "jobs:outer.<locals>.inner" },
)]
fn func_ref_rejects_unnameable(raw: &str) {
    let err = raw.parse::<FuncRef>().unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidJob(_)), "{err}");
}

#[test]
fn func_ref_serializes_as_string() {
    let func = FuncRef::new("jobs.report", "tick");
    assert_eq!(serde_json::to_value(&func).unwrap(), json!("jobs.report:tick"));
    let back: FuncRef = serde_json::from_value(json!("jobs.report:tick")).unwrap();
    assert_eq!(back, func);
}

#[test]
fn truthy_patch_drops_falsy_values() {
    let job = interval_job();
    let patch = JobPatch {
        name: Some(String::new()),
        args: Some(Vec::new()),
        coalesce: Some(false),
        max_instances: Some(0),
        misfire_grace_time: Some(0),
        ..JobPatch::default()
    };
    let changes = patch.into_changes(&job, UpdatePolicy::Truthy).unwrap();
    assert!(changes.is_empty());

    let mut updated = job.clone();
    updated.apply(changes);
    assert_eq!(updated, job);
}

#[test]
fn truthy_patch_applies_non_empty_values() {
    let job = interval_job();
    let patch = JobPatch {
        name: Some("nightly".to_string()),
        max_instances: Some(5),
        ..JobPatch::default()
    };
    let mut updated = job.clone();
    updated.apply(patch.into_changes(&job, UpdatePolicy::Truthy).unwrap());

    assert_eq!(updated.name, "nightly");
    assert_eq!(updated.max_instances, 5);
    assert_eq!(updated.coalesce, job.coalesce);
    assert_eq!(updated.args, job.args);
    assert_eq!(updated.trigger, job.trigger);
}

#[test]
fn present_patch_allows_resets() {
    let job = interval_job();
    let patch = JobPatch {
        coalesce: Some(false),
        args: Some(Vec::new()),
        ..JobPatch::default()
    };
    let mut updated = job.clone();
    updated.apply(patch.into_changes(&job, UpdatePolicy::Present).unwrap());
    assert!(!updated.coalesce);
    assert!(updated.args.is_empty());
}

#[test]
fn present_patch_rejects_zero_max_instances() {
    let patch = JobPatch {
        max_instances: Some(0),
        ..JobPatch::default()
    };
    let err = patch
        .into_changes(&interval_job(), UpdatePolicy::Present)
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidJob(_)));
}

#[test]
fn trigger_rebuilt_with_current_kind() {
    let job = interval_job();
    let patch = JobPatch {
        trigger_params: TriggerSpec {
            minute: Some("10".to_string()),
            ..TriggerSpec::default()
        },
        ..JobPatch::default()
    };
    let changes = patch.into_changes(&job, UpdatePolicy::Truthy).unwrap();
    let Some(Trigger::Interval(interval)) = changes.trigger else {
        panic!("expected interval trigger");
    };
    assert_eq!(interval.minutes, 10);
}

#[test]
fn trigger_kind_switch_uses_next_run_as_date_fallback() {
    let job = interval_job();
    let patch = JobPatch {
        trigger: Some(TriggerKind::Date),
        trigger_params: TriggerSpec {
            hour: Some("6".to_string()),
            ..TriggerSpec::default()
        },
        ..JobPatch::default()
    };
    let changes = patch.into_changes(&job, UpdatePolicy::Truthy).unwrap();
    assert_eq!(
        changes.trigger,
        Some(Trigger::Date(DateTrigger {
            run_date: Utc.with_ymd_and_hms(2026, 1, 1, 6, 5, 0).unwrap()
        }))
    );
}

#[test]
fn paused_date_job_falls_back_to_run_date() {
    let run_date = Utc.with_ymd_and_hms(2026, 7, 4, 12, 0, 0).unwrap();
    let mut job = interval_job();
    job.trigger = Trigger::Date(DateTrigger { run_date });
    job.next_run_time = None;
    assert_eq!(BuildContext::for_job(&job).fallback, Some(run_date));

    job.trigger = Trigger::Cron(CronTrigger {
        year: "*".into(),
        month: "*".into(),
        week: "*".into(),
        day: "*".into(),
        day_of_week: "*".into(),
        hour: "1".into(),
        minute: "0".into(),
        second: "0".into(),
        start_date: None,
        end_date: None,
    });
    assert_eq!(BuildContext::for_job(&job).fallback, None);
}

#[test]
fn invalid_trigger_params_fail_the_whole_patch() {
    let patch = JobPatch {
        name: Some("renamed".to_string()),
        trigger_params: TriggerSpec {
            hour: Some("-2".to_string()),
            ..TriggerSpec::default()
        },
        ..JobPatch::default()
    };
    let err = patch
        .into_changes(&interval_job(), UpdatePolicy::Truthy)
        .unwrap_err();
    assert!(matches!(err, SchedulerError::InvalidTrigger(_)));
}
