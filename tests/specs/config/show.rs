// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `jd config show` specs

use crate::prelude::*;

#[test]
fn defaults_without_a_config_file() {
    let temp = Project::empty();

    temp.jd()
        .args(&["config", "show"])
        .passes()
        .stdout_has("log_dir = \"logs\"")
        .stdout_has("page_size = 1000")
        .stdout_has("[executors.default]")
        .stdout_has("kind = \"AsyncTask\"")
        .stdout_has("[jobstores.default]")
        .stdout_has("kind = \"Memory\"");
}

#[test]
fn shows_configured_resources() {
    let temp = Project::empty();
    temp.file(
        "config.toml",
        r#"
[job_defaults]
max_instances = 3

[executors.pool]
kind = "ThreadPool"
max_workers = 8
"#,
    );

    temp.jd()
        .args(&["config", "show"])
        .passes()
        .stdout_has("max_instances = 3")
        .stdout_has("[executors.pool]")
        .stdout_has("max_workers = 8")
        .stdout_has("[executors.default]");
}

#[test]
fn log_dir_flag_overrides_config() {
    let temp = Project::empty();
    temp.file("config.toml", "log_dir = \"var/log\"\n");

    temp.jd()
        .args(&["--log-dir", "elsewhere", "config", "show"])
        .passes()
        .stdout_has("log_dir = \"elsewhere\"")
        .stdout_lacks("var/log");
}

#[test]
fn json_format() {
    let temp = Project::empty();

    temp.jd()
        .args(&["config", "show", "--format", "json"])
        .passes()
        .stdout_has("\"page_size\": 1000")
        .stdout_has("\"kind\": \"Memory\"");
}
