// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All environment variables read by the harness are defined here.
//! Use these accessors instead of calling `std::env::var()` directly.

/// Generated env var name constants.
mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

// Re-export name constants for callers that need the raw name string.
pub use names::*;

use std::path::PathBuf;

/// `SMOKE_TOOL`: Executable of the tool under test.
pub fn tool() -> Option<PathBuf> {
    non_empty(names::SMOKE_TOOL).map(PathBuf::from)
}

/// `SMOKE_TIMEOUT_MS`: Bound on every wait. `0` waits indefinitely.
pub fn timeout_ms() -> Option<u64> {
    non_empty(names::SMOKE_TIMEOUT_MS).and_then(|v| v.parse().ok())
}

/// `SMOKE_KEEP_SCAFFOLD`: Keep temporary scaffolds after the test.
pub fn keep_scaffold() -> bool {
    non_empty(names::SMOKE_KEEP_SCAFFOLD)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// `SMOKE_RECORD_DIR`: Directory for session transcripts.
pub fn record_dir() -> Option<PathBuf> {
    non_empty(names::SMOKE_RECORD_DIR).map(PathBuf::from)
}

/// `SMOKE_LOG`: `tracing` filter directives for the `smoke` binary.
pub fn log_filter() -> Option<String> {
    non_empty(names::SMOKE_LOG)
}

fn non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
