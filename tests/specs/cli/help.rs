// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help output specs

use crate::prelude::*;

#[test]
fn help_lists_commands() {
    let temp = Project::empty();

    temp.jd()
        .args(&["--help"])
        .passes()
        .stdout_has("logs")
        .stdout_has("config")
        .stdout_has("--log-dir");
}

#[test]
fn logs_show_help_lists_query_options() {
    let temp = Project::empty();

    temp.jd()
        .args(&["logs", "show", "--help"])
        .passes()
        .stdout_has("--level")
        .stdout_has("--module")
        .stdout_has("--page-size")
        .stdout_has("--tail")
        .stdout_has("markdown");
}
