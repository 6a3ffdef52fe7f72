// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Smoke Harness
//!
//! Process-driven smoke tests for command-line build tools. A test describes
//! a project, scaffolds it into a scratch directory, runs a subcommand of the
//! tool inside the project's build directory and waits for expected output
//! cues in order, then for the child to close its output.
//!
//! Start from [`SmokeTest`]; the `smoke` binary runs the same flow from a
//! TOML scenario file.

pub mod config;
pub mod descriptor;
pub mod driver;
pub mod env;
pub mod error;
pub mod fixture;
pub mod invoke;
pub mod pattern;
pub mod process;
pub mod recording;
pub mod runner;
pub mod scaffold;
pub mod scenario;
pub mod workdir;

#[doc(hidden)]
pub mod cli;

mod pty;

pub use config::{HarnessConfig, SpawnMode};
pub use descriptor::{DescriptorSpec, ProjectDescriptor, ProjectDescriptorBuilder};
pub use driver::{Match, Session};
pub use error::{HarnessError, Result};
pub use fixture::{SmokeTest, Stage};
pub use invoke::Tool;
pub use pattern::{Pattern, PatternSpec};
pub use process::{CommandLine, ExitState};
pub use runner::{Report, StepOutcome};
pub use scaffold::{OtpLayout, ScaffoldGenerator, ScaffoldLayout};
pub use scenario::{Scenario, Step};
pub use workdir::WorkdirGuard;
