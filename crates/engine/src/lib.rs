// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Job management layer over a scheduling engine

mod audit;
mod context;
mod manager;
mod registry;

pub use audit::{describe, emit, AuditLine, AuditPipeline, Stream};
pub use context::SchedulerContext;
pub use manager::{ActionOutcome, JobManager};
pub use registry::ResourceRegistry;
