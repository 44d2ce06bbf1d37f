// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[test]
fn async_task_drops_max_workers() {
    let config = ExecutorConfig::new(ExecutorKind::AsyncTask, Some(8));
    assert_eq!(config.max_workers, None);
    assert_eq!(config.entry().detail, json!({ "max_workers": null }));
}

#[test]
fn pool_executor_keeps_max_workers() {
    let config = ExecutorConfig::new(ExecutorKind::ThreadPool, Some(8));
    let entry = config.entry();
    assert_eq!(entry.kind, "ThreadPool");
    assert_eq!(entry.detail, json!({ "max_workers": 8 }));
    assert_eq!(entry.to_executor().unwrap(), config);
}

#[parameterized(
    memory = { JobStoreConfig::Memory, Value::Null },
    sql = {
        JobStoreConfig::Sql { url: "sqlite:///jobs.db".into() },
        json!("sqlite:///jobs.db")
    },
    document = {
        JobStoreConfig::Document {
            host: "localhost".into(),
            database: "sched".into(),
            collection: "jobs".into(),
        },
        json!({ "host": "localhost", "database": "sched", "collection": "jobs" })
    },
    key_value = {
        JobStoreConfig::KeyValue { host: "cache".into(), port: 6379, db: 2 },
        json!({ "host": "cache", "port": 6379, "db": 2 })
    },
)]
fn jobstore_detail_shape_and_round_trip(config: JobStoreConfig, detail: Value) {
    let entry = config.entry();
    assert_eq!(entry.detail, detail);
    assert_eq!(entry.to_jobstore().unwrap(), config);
}

#[test]
fn unknown_kinds_are_rejected() {
    let executor = ResourceEntry {
        kind: "Gpu".into(),
        detail: Value::Null,
    };
    assert_eq!(
        executor.to_executor().unwrap_err(),
        SchedulerError::InvalidExecutor("Gpu".into())
    );

    let store = ResourceEntry {
        kind: "Tape".into(),
        detail: Value::Null,
    };
    assert!(matches!(
        store.to_jobstore().unwrap_err(),
        SchedulerError::InvalidJobStore(_)
    ));
}

#[test]
fn malformed_detail_is_rejected() {
    let store = ResourceEntry {
        kind: "KeyValue".into(),
        detail: json!({ "host": "cache", "port": 70000, "db": 0 }),
    };
    assert!(store.to_jobstore().is_err());
}

#[test]
fn option_label_names_alias_and_kind() {
    let option = ResourceOption::new("reports", "ThreadPool");
    assert_eq!(option.value, "reports");
    assert_eq!(option.label, "reports(ThreadPool)");
}

#[test]
fn jobstore_config_reads_tagged_toml() {
    let config: JobStoreConfig =
        toml::from_str("kind = \"Sql\"\nurl = \"postgres://db/jobs\"\n").unwrap();
    assert_eq!(
        config,
        JobStoreConfig::Sql {
            url: "postgres://db/jobs".into()
        }
    );
}
