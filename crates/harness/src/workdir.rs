// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped change of the process working directory.
//!
//! The harness itself never needs this: sessions get an absolute working
//! directory. It exists for callers whose own code resolves paths against
//! the current directory. The working directory is process-wide, so every
//! guard holds a global lock for its whole lifetime.

use std::path::{Path, PathBuf};

use parking_lot::{const_mutex, Mutex, MutexGuard};

use crate::error::{HarnessError, Result};

static CWD_LOCK: Mutex<()> = const_mutex(());

/// Restores the previous working directory on drop.
#[derive(Debug)]
#[must_use = "the previous directory is restored when the guard is dropped"]
pub struct WorkdirGuard {
    previous: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl WorkdirGuard {
    /// Change into `dir`, blocking while another guard is alive.
    pub fn enter(dir: &Path) -> Result<Self> {
        let lock = CWD_LOCK.lock();
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir).map_err(|e| HarnessError::filesystem(dir, e))?;
        tracing::debug!(from = %previous.display(), to = %dir.display(), "entered directory");
        Ok(Self {
            previous,
            _lock: lock,
        })
    }

    /// Directory restored on drop.
    pub fn previous(&self) -> &Path {
        &self.previous
    }
}

impl Drop for WorkdirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            tracing::warn!(dir = %self.previous.display(), error = %e, "failed to restore working directory");
        }
    }
}

#[cfg(test)]
#[path = "workdir_tests.rs"]
mod tests;
