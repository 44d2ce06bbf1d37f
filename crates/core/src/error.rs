// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy shared by the management layer and engines

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by job, trigger and resource operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("Invalid trigger: {0}")]
    InvalidTrigger(String),
    #[error("Executor type {0} not supported")]
    InvalidExecutor(String),
    #[error("Invalid job store: {0}")]
    InvalidJobStore(String),
    #[error("Invalid action: {0}")]
    InvalidAction(String),
    #[error("Invalid job: {0}")]
    InvalidJob(String),
    #[error("{what}({id}) not found")]
    NotFound { what: &'static str, id: String },
    #[error("{0}")]
    Forbidden(String),
    #[error("{what}({id}) already exists")]
    AlreadyExists { what: &'static str, id: String },
    #[error("engine error: {0}")]
    Engine(String),
}

impl SchedulerError {
    pub fn job_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            what: "Job",
            id: id.into(),
        }
    }

    pub fn executor_not_found(alias: impl Into<String>) -> Self {
        Self::NotFound {
            what: "Executor",
            id: alias.into(),
        }
    }

    pub fn jobstore_not_found(alias: impl Into<String>) -> Self {
        Self::NotFound {
            what: "JobStore",
            id: alias.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTrigger(_) => ErrorKind::InvalidTrigger,
            Self::InvalidExecutor(_) => ErrorKind::InvalidExecutor,
            Self::InvalidJobStore(_) => ErrorKind::InvalidJobStore,
            Self::InvalidAction(_) => ErrorKind::InvalidAction,
            Self::InvalidJob(_) => ErrorKind::InvalidJob,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Engine(_) => ErrorKind::Engine,
        }
    }

    /// Status class used when the error crosses an outer boundary
    pub fn status(&self) -> Status {
        match self.kind() {
            ErrorKind::InvalidTrigger
            | ErrorKind::InvalidExecutor
            | ErrorKind::InvalidJobStore
            | ErrorKind::InvalidAction
            | ErrorKind::InvalidJob => Status::ClientError,
            ErrorKind::NotFound => Status::NotFound,
            ErrorKind::Forbidden => Status::Forbidden,
            ErrorKind::AlreadyExists => Status::Conflict,
            ErrorKind::Engine => Status::Internal,
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

/// Discriminant of a [`SchedulerError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    InvalidTrigger,
    InvalidExecutor,
    InvalidJobStore,
    InvalidAction,
    InvalidJob,
    NotFound,
    Forbidden,
    AlreadyExists,
    Engine,
}

/// Boundary status class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    ClientError,
    NotFound,
    Forbidden,
    Conflict,
    Internal,
}

impl Status {
    /// Equivalent HTTP status code
    pub fn code(self) -> u16 {
        match self {
            Status::ClientError => 400,
            Status::NotFound => 404,
            Status::Forbidden => 403,
            Status::Conflict => 409,
            Status::Internal => 500,
        }
    }
}

/// User-visible failure: kind plus human message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}
