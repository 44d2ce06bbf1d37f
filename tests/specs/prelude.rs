// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for CLI specs

use assert_cmd::assert::Assert;
use assert_cmd::Command;
use predicates::Predicate;
use std::path::Path;
use tempfile::TempDir;

/// Three audit records, the last with a multi-line message
pub const AUDIT_LOG: &str = "\
[  123] 2024-01-01 00:00:00 | DEBUG    | jd_engine::audit:90\tAdd job: tick[abc]
[  123] 2024-01-01 00:00:05 | INFO     | jd_engine::manager:180\tJob(id='abc', name='tick'), action=pause success.
[  123] 2024-01-01 00:01:00 | ERROR    | jd_engine::audit:152\tJob error: tick[abc]: RuntimeError: boom
at jobs:tick
";

/// A scratch directory with its own config file location and log directory
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn empty() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `rel`, creating parent directories
    pub fn file(&self, rel: &str, content: &str) {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    /// `jd` run inside the project with `config.toml` as its config file
    pub fn jd(&self) -> Cli {
        let mut cmd = Command::cargo_bin("jd").unwrap();
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.path().join("config.toml"));
        Cli { cmd }
    }
}

pub struct Cli {
    cmd: Command,
}

impl Cli {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.cmd.args(args);
        self
    }

    pub fn passes(mut self) -> Run {
        Run {
            assert: self.cmd.assert().success(),
        }
    }

    pub fn fails(mut self) -> Run {
        Run {
            assert: self.cmd.assert().failure(),
        }
    }
}

pub struct Run {
    assert: Assert,
}

impl Run {
    fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stdout).to_string()
    }

    fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.assert.get_output().stderr).to_string()
    }

    pub fn stdout_has(self, expected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            stdout.contains(expected),
            "stdout missing {:?}:\n{}",
            expected,
            stdout
        );
        self
    }

    pub fn stdout_lacks(self, unexpected: &str) -> Self {
        let stdout = self.stdout();
        assert!(
            !stdout.contains(unexpected),
            "stdout unexpectedly has {:?}:\n{}",
            unexpected,
            stdout
        );
        self
    }

    pub fn stdout_eq(self, expected: &str) -> Self {
        similar_asserts::assert_eq!(self.stdout(), expected);
        self
    }

    pub fn stderr_has(self, expected: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            predicates::str::contains(expected).eval(stderr.as_str()),
            "stderr missing {:?}:\n{}",
            expected,
            stderr
        );
        self
    }

    pub fn stderr_starts_with(self, prefix: &str) -> Self {
        let stderr = self.stderr();
        assert!(
            stderr.starts_with(prefix),
            "stderr does not start with {:?}:\n{}",
            prefix,
            stderr
        );
        self
    }
}
