// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line interface of the `smoke` binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::{HarnessConfig, SpawnMode};

/// Process-driven smoke tests for command-line build tools
#[derive(Parser, Debug)]
#[command(name = "smoke", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scaffold the scenario's project and run its steps
    Run(RunArgs),
    /// Only scaffold the scenario's project and print where it went
    Scaffold(ScaffoldArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Scenario file (TOML)
    pub scenario: PathBuf,

    /// Tool executable, overriding the scenario and SMOKE_TOOL
    #[arg(long)]
    pub tool: Option<PathBuf>,

    /// Bound on each wait in milliseconds; 0 waits indefinitely
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Keep the scaffolded project after the run
    #[arg(long)]
    pub keep: bool,

    /// Attach the tool through pipes instead of a pseudo-terminal
    #[arg(long)]
    pub pipes: bool,

    /// Write session transcripts to this directory
    #[arg(long, value_name = "DIR")]
    pub record: Option<PathBuf>,
}

impl RunArgs {
    /// Command-line overrides on top of `base`.
    pub fn apply(&self, mut base: HarnessConfig) -> HarnessConfig {
        if let Some(ms) = self.timeout_ms {
            base = base.with_timeout((ms > 0).then(|| Duration::from_millis(ms)));
        }
        if self.keep {
            base = base.with_keep_scaffold(true);
        }
        if self.pipes {
            base = base.with_spawn_mode(SpawnMode::Pipes);
        }
        if self.record.is_some() {
            base = base.with_record_dir(self.record.clone());
        }
        base
    }
}

#[derive(Args, Debug)]
pub struct ScaffoldArgs {
    /// Scenario file (TOML)
    pub scenario: PathBuf,

    /// Parent directory for the project; a kept temporary directory if unset
    #[arg(long)]
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
