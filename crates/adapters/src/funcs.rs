// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named job functions, grouped into reloadable modules

use jd_core::{FuncRef, SchedulerError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// A failed job run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFailure {
    pub exception: String,
    pub traceback: Option<String>,
}

impl JobFailure {
    pub fn new(exception: impl Into<String>) -> Self {
        Self {
            exception: exception.into(),
            traceback: None,
        }
    }

    pub fn with_traceback(mut self, traceback: impl Into<String>) -> Self {
        self.traceback = Some(traceback.into());
        self
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.exception)
    }
}

/// A job function: positional and keyword arguments in, return value out
pub type JobFn = Arc<dyn Fn(&[Value], &Map<String, Value>) -> Result<Value, JobFailure> + Send + Sync>;

/// Produces the functions of one module. Called again on reload.
pub type ModuleLoader = Arc<dyn Fn() -> HashMap<String, JobFn> + Send + Sync>;

struct Module {
    loader: ModuleLoader,
    funcs: HashMap<String, JobFn>,
}

/// Registry of job function modules
#[derive(Clone, Default)]
pub struct FuncRegistry {
    modules: Arc<Mutex<HashMap<String, Module>>>,
}

impl FuncRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a module and load it
    pub fn register_module<F>(&self, name: impl Into<String>, loader: F)
    where
        F: Fn() -> HashMap<String, JobFn> + Send + Sync + 'static,
    {
        let loader: ModuleLoader = Arc::new(loader);
        let funcs = loader();
        let mut modules = self.modules.lock().unwrap_or_else(|e| e.into_inner());
        modules.insert(name.into(), Module { loader, funcs });
    }

    /// Re-run a module's loader so later runs see the new functions
    pub fn reload(&self, module: &str) -> Result<(), SchedulerError> {
        let loader = {
            let modules = self.modules.lock().unwrap_or_else(|e| e.into_inner());
            let entry = modules.get(module).ok_or_else(|| SchedulerError::NotFound {
                what: "Module",
                id: module.to_string(),
            })?;
            Arc::clone(&entry.loader)
        };
        // Loader runs unlocked; it may be arbitrary user code
        let funcs = loader();
        let mut modules = self.modules.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = modules.get_mut(module) {
            entry.funcs = funcs;
        }
        tracing::debug!(module, "module reloaded");
        Ok(())
    }

    pub fn resolve(&self, func: &FuncRef) -> Option<JobFn> {
        let modules = self.modules.lock().unwrap_or_else(|e| e.into_inner());
        modules
            .get(&func.module)
            .and_then(|m| m.funcs.get(&func.qualname))
            .cloned()
    }

    pub fn contains(&self, func: &FuncRef) -> bool {
        self.resolve(func).is_some()
    }
}

/// Wrap a closure as a [`JobFn`]
pub fn job_fn<F>(f: F) -> JobFn
where
    F: Fn(&[Value], &Map<String, Value>) -> Result<Value, JobFailure> + Send + Sync + 'static,
{
    Arc::new(f)
}
