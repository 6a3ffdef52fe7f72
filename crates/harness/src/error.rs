// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for the harness.
//!
//! Every variant is fatal to the enclosing smoke test. Nothing here is
//! retried; messages carry enough context (pattern, invocation, unconsumed
//! output) to diagnose a failure without rerunning it.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::process::ExitState;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("invalid project descriptor: {0}")]
    Validation(String),

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` closed its output before {pattern} appeared\n--- unconsumed output ---\n{tail}")]
    PatternNotFound {
        command: String,
        pattern: String,
        tail: String,
    },

    #[error("`{command}` timed out after {after:?} waiting for {pattern}\n--- unconsumed output ---\n{tail}")]
    Timeout {
        command: String,
        pattern: String,
        after: Duration,
        tail: String,
    },

    #[error("`{command}` produced unexpected output before end of stream\n--- unexpected output ---\n{output}")]
    UnexpectedOutput { command: String, output: String },

    #[error("`{command}` finished with {actual}, expected exit code {expected}")]
    UnexpectedExit {
        command: String,
        expected: i32,
        actual: ExitState,
    },

    #[error("failed to scaffold project `{project}`: {source}")]
    Scaffold {
        project: String,
        #[source]
        source: Box<HarnessError>,
    },

    #[error("no project has been scaffolded yet")]
    NotScaffolded,

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid scenario: {0}")]
    Scenario(String),

    #[error("failed to parse scenario TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    pub(crate) fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Convenience Result type for harness operations.
pub type Result<T> = std::result::Result<T, HarnessError>;
