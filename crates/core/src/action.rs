// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Administrative action on one job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobAction {
    Pause,
    Resume,
    Modify,
    Reload,
    Remove,
}

impl JobAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobAction::Pause => "pause",
            JobAction::Resume => "resume",
            JobAction::Modify => "modify",
            JobAction::Reload => "reload",
            JobAction::Remove => "remove",
        }
    }
}

impl fmt::Display for JobAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobAction {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pause" => Ok(JobAction::Pause),
            "resume" => Ok(JobAction::Resume),
            "modify" => Ok(JobAction::Modify),
            "reload" => Ok(JobAction::Reload),
            "remove" => Ok(JobAction::Remove),
            other => Err(SchedulerError::InvalidAction(other.to_string())),
        }
    }
}
