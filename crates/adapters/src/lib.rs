// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Scheduling engine implementations

pub mod funcs;
pub mod memory;
pub mod schedule;
pub mod traced;

pub use funcs::{job_fn, FuncRegistry, JobFailure, JobFn, ModuleLoader};
pub use memory::MemoryEngine;
pub use schedule::next_fire_time;
pub use traced::TracedEngine;
