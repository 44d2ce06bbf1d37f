// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Size-rotated log file

use chrono::Local;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Appends to `<dir>/<stem>.log` and, once the file would grow past
/// `max_bytes`, renames it to `<stem>.<YYYY-MM-DD_HH-MM-SS_micros>.log`
/// and starts a fresh one.
#[derive(Debug)]
pub struct SizeRotatingWriter {
    dir: PathBuf,
    stem: String,
    max_bytes: u64,
    file: File,
    written: u64,
}

impl SizeRotatingWriter {
    pub fn open(dir: &Path, stem: &str, max_bytes: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.log", stem));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            stem: stem.to_string(),
            max_bytes,
            file,
            written,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.stem))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S_%6f");
        let rotated = self.dir.join(format!("{}.{}.log", self.stem, stamp));
        fs::rename(self.path(), &rotated)?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path())?;
        self.written = 0;
        Ok(())
    }
}

impl Write for SizeRotatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // A record larger than the limit still lands whole in its own file
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
