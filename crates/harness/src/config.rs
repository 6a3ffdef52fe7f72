// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Harness configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::env;

/// Default bound on every `expect` / `expect_eof` wait.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default terminal width for PTY sessions.
pub const DEFAULT_COLS: u16 = 80;
/// Default terminal height for PTY sessions.
pub const DEFAULT_ROWS: u16 = 24;
/// Build tools colourise less under a dumb terminal.
pub const DEFAULT_TERM: &str = "dumb";

/// How the child's output is attached to the harness.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpawnMode {
    /// Child runs on a pseudo-terminal; stdout and stderr arrive interleaved
    /// exactly as a user would see them.
    #[default]
    Pty,
    /// stdout and stderr are piped and merged by the harness.
    Pipes,
}

#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Bound on each wait. `None` waits until the stream closes; the session
    /// can still be cancelled by dropping it.
    pub timeout: Option<Duration>,
    pub spawn_mode: SpawnMode,
    pub cols: u16,
    pub rows: u16,
    /// `TERM` exported to PTY children.
    pub term: String,
    /// Extra environment for every child.
    pub env: Vec<(String, String)>,
    /// Bytes of unmatched output tolerated by `expect_eof`. `None` drains
    /// whatever is left.
    pub max_trailing_output: Option<usize>,
    /// Keep temporary scaffolds on disk after the test finishes.
    pub keep_scaffold: bool,
    /// Write per-session transcripts here.
    pub record_dir: Option<PathBuf>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            spawn_mode: SpawnMode::default(),
            cols: DEFAULT_COLS,
            rows: DEFAULT_ROWS,
            term: DEFAULT_TERM.to_string(),
            env: Vec::new(),
            max_trailing_output: None,
            keep_scaffold: false,
            record_dir: None,
        }
    }
}

impl HarnessConfig {
    /// Defaults with `SMOKE_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(ms) = env::timeout_ms() {
            config.timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        config.keep_scaffold = env::keep_scaffold();
        config.record_dir = env::record_dir();
        config
    }

    /// Set the wait bound
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set spawn mode
    pub fn with_spawn_mode(mut self, mode: SpawnMode) -> Self {
        self.spawn_mode = mode;
        self
    }

    /// Set terminal size
    pub fn with_size(mut self, cols: u16, rows: u16) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Add an environment variable for children
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Bound the output `expect_eof` may skip
    pub fn with_max_trailing_output(mut self, bytes: Option<usize>) -> Self {
        self.max_trailing_output = bytes;
        self
    }

    /// Keep temporary scaffolds
    pub fn with_keep_scaffold(mut self, keep: bool) -> Self {
        self.keep_scaffold = keep;
        self
    }

    /// Record transcripts into `dir`
    pub fn with_record_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.record_dir = dir;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
