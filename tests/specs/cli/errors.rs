// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error reporting specs

use crate::prelude::*;

#[test]
fn unknown_log_kind_is_rejected() {
    let temp = Project::empty();

    temp.jd()
        .args(&["logs", "show", "daemon"])
        .fails()
        .stderr_has("unknown log kind 'daemon'");
}

#[test]
fn unknown_level_is_rejected() {
    let temp = Project::empty();

    temp.jd()
        .args(&["logs", "show", "--level", "loud"])
        .fails()
        .stderr_has("expected one of TRACE, DEBUG, INFO, WARN, ERROR");
}

#[test]
fn tail_and_page_conflict() {
    let temp = Project::empty();

    temp.jd()
        .args(&["logs", "show", "--tail", "--page", "2"])
        .fails()
        .stderr_has("cannot be used with");
}

#[test]
fn invalid_config_is_reported() {
    let temp = Project::empty();
    temp.file("config.toml", "[job_defaults]\nmax_instances = 0\n");

    temp.jd()
        .args(&["config", "show"])
        .fails()
        .stderr_starts_with(
            "error: invalid config: job_defaults.max_instances must be at least 1",
        );
}

#[test]
fn unparsable_config_names_the_file() {
    let temp = Project::empty();
    temp.file("config.toml", "log_dir = [\n");

    temp.jd()
        .args(&["config", "show"])
        .fails()
        .stderr_starts_with("error: invalid config ")
        .stderr_has("config.toml");
}
