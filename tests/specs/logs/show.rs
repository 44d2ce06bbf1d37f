// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jd logs show` specs

use crate::prelude::*;

fn with_audit_log() -> Project {
    let temp = Project::empty();
    temp.file("logs/scheduler.log", AUDIT_LOG);
    temp
}

#[test]
fn shows_audit_log_oldest_first() {
    let temp = with_audit_log();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show"])
        .passes()
        .stdout_eq(AUDIT_LOG)
        .stderr_has("page 1 of 1 (3 records)");
}

#[test]
fn tail_shows_newest_first() {
    let temp = with_audit_log();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "--tail", "--page-size", "2"])
        .passes()
        .stdout_eq(
            "[  123] 2024-01-01 00:01:00 | ERROR    | jd_engine::audit:152\tJob error: tick[abc]: RuntimeError: boom\n\
             at jobs:tick\n\
             [  123] 2024-01-01 00:00:05 | INFO     | jd_engine::manager:180\tJob(id='abc', name='tick'), action=pause success.\n",
        );
}

#[test]
fn filters_by_level_case_insensitively() {
    let temp = with_audit_log();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "--level", "error"])
        .passes()
        .stdout_has("Job error: tick[abc]")
        .stdout_lacks("Add job")
        .stderr_has("(1 records)");
}

#[test]
fn filters_by_module() {
    let temp = with_audit_log();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "--module", "manager"])
        .passes()
        .stdout_has("action=pause success.")
        .stdout_lacks("Job error");
}

#[test]
fn pages_past_the_end_are_empty() {
    let temp = with_audit_log();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "--page", "2", "--page-size", "3"])
        .passes()
        .stdout_eq("")
        .stderr_has("page 2 of 1 (3 records)");
}

#[test]
fn page_zero_is_invalid() {
    let temp = with_audit_log();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "--page", "0"])
        .fails()
        .stderr_starts_with("error: invalid log query: pages start at 1");
}

#[test]
fn markdown_fences_multi_line_messages() {
    let temp = with_audit_log();

    temp.jd()
        .args(&[
            "--log-dir", "logs", "logs", "show", "--level", "ERROR", "--format", "markdown",
        ])
        .passes()
        .stdout_eq(
            "**[123] 2024-01-01 00:01:00** *ERROR* `jd_engine::audit:152`: \
             Job error: tick[abc]: RuntimeError: boom\n```\nat jobs:tick\n```\n",
        );
}

#[test]
fn json_includes_paging() {
    let temp = with_audit_log();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "--format", "json"])
        .passes()
        .stdout_has("\"total\": 3")
        .stdout_has("\"page_size\": 1000")
        .stdout_has("\"source\": \"jd_engine::audit:90\"");
}

#[test]
fn missing_audit_log_fails() {
    let temp = Project::empty();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show"])
        .fails()
        .stderr_starts_with("error: Log file 'scheduler.log' not found");
}

#[test]
fn missing_named_file_fails() {
    let temp = with_audit_log();

    temp.jd()
        .args(&[
            "--log-dir", "logs", "logs", "show", "execution", "--file", "jobs.2023-12-31.log",
        ])
        .fails()
        .stderr_starts_with("error: Log file 'jobs.2023-12-31.log' not found");
}

#[test]
fn execution_defaults_to_newest_file() {
    let temp = Project::empty();
    temp.file(
        "logs/jobs.2024-01-01.log",
        "[    7] 2024-01-01 09:00:00 | INFO     | reports:3\tfirst day\n",
    );
    temp.file(
        "logs/jobs.2024-01-02.log",
        "[    7] 2024-01-02 09:00:00 | INFO     | reports:3\tsecond day\n",
    );

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "execution"])
        .passes()
        .stdout_has("second day")
        .stdout_lacks("first day");
}

#[test]
fn named_execution_file_is_read() {
    let temp = Project::empty();
    temp.file(
        "logs/jobs.2024-01-01.log",
        "[    7] 2024-01-01 09:00:00 | INFO     | reports:3\tfirst day\n",
    );
    temp.file(
        "logs/jobs.2024-01-02.log",
        "[    7] 2024-01-02 09:00:00 | INFO     | reports:3\tsecond day\n",
    );

    temp.jd()
        .args(&[
            "--log-dir", "logs", "logs", "show", "jobs", "--file", "jobs.2024-01-01.log",
        ])
        .passes()
        .stdout_has("first day");
}

#[test]
fn no_execution_logs_fails() {
    let temp = Project::empty();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "show", "execution"])
        .fails()
        .stderr_starts_with("error: Log file 'jobs.*.log' not found");
}

#[test]
fn log_dir_and_page_size_come_from_config() {
    let temp = Project::empty();
    temp.file("config.toml", "log_dir = \"var/log\"\npage_size = 2\n");
    temp.file("var/log/scheduler.log", AUDIT_LOG);

    temp.jd()
        .args(&["logs", "show"])
        .passes()
        .stdout_has("Add job: tick[abc]")
        .stdout_lacks("Job error")
        .stderr_has("page 1 of 2 (3 records)");
}
