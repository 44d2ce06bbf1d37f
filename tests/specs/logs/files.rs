// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jd logs files` specs

use crate::prelude::*;

#[test]
fn lists_execution_logs_newest_first() {
    let temp = Project::empty();
    temp.file("logs/jobs.2024-01-01.log", "");
    temp.file("logs/jobs.2024-01-03.log", "");
    temp.file("logs/jobs.2024-01-02.log", "");
    temp.file("logs/scheduler.log", AUDIT_LOG);

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "files"])
        .passes()
        .stdout_eq("jobs.2024-01-03.log\njobs.2024-01-02.log\njobs.2024-01-01.log\n");
}

#[test]
fn empty_directory_has_no_logs() {
    let temp = Project::empty();

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "files"])
        .passes()
        .stdout_eq("No execution logs\n");
}

#[test]
fn json_lists_names() {
    let temp = Project::empty();
    temp.file("logs/jobs.2024-01-01.log", "");

    temp.jd()
        .args(&["--log-dir", "logs", "logs", "files", "--format", "json"])
        .passes()
        .stdout_eq("[\n  \"jobs.2024-01-01.log\"\n]\n");
}
