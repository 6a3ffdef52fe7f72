// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Runs a [`Scenario`] as one smoke test.
//!
//! Steps run in order against a single scaffold and stop at the first
//! failure. A scaffold failure aborts the run before any step.

use std::path::{Path, PathBuf};

use crate::config::HarnessConfig;
use crate::driver::Session;
use crate::env;
use crate::error::{HarnessError, Result};
use crate::fixture::SmokeTest;
use crate::invoke::Tool;
use crate::process::ExitState;
use crate::scenario::{Scenario, Step};

/// Tool used when neither the caller, the scenario nor `SMOKE_TOOL` name one.
pub const DEFAULT_TOOL: &str = "sinan";

/// Result of one step.
#[derive(Debug)]
pub struct StepOutcome {
    pub name: String,
    pub result: Result<ExitState>,
}

impl StepOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct Report {
    /// Where the project was scaffolded.
    pub project_dir: PathBuf,
    /// Steps that ran, in order.
    pub steps: Vec<StepOutcome>,
    /// Steps not run because an earlier one failed.
    pub skipped: Vec<String>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.skipped.is_empty() && self.steps.iter().all(StepOutcome::passed)
    }
}

/// Pick the tool: `explicit`, then the scenario's, then `SMOKE_TOOL`, then
/// [`DEFAULT_TOOL`].
pub fn resolve_tool(explicit: Option<&Path>, scenario: &Scenario) -> Tool {
    match explicit.or(scenario.tool.as_deref()) {
        Some(program) => Tool::new(program),
        None => Tool::new(env::tool().unwrap_or_else(|| PathBuf::from(DEFAULT_TOOL))),
    }
}

/// Apply the scenario's own settings on top of `base`.
pub fn configure(scenario: &Scenario, base: HarnessConfig) -> HarnessConfig {
    match scenario.timeout {
        Some(timeout) => base.with_timeout(timeout),
        None => base,
    }
}

/// Scaffold the scenario's project under a fresh temporary root and run its
/// steps.
pub async fn run(scenario: &Scenario, tool: Tool, config: HarnessConfig) -> Result<Report> {
    let test = SmokeTest::new(tool)?.with_config(config);
    run_in(test, scenario).await
}

/// [`run`] with a prepared [`SmokeTest`].
pub async fn run_in(mut test: SmokeTest, scenario: &Scenario) -> Result<Report> {
    let project_dir = test.do_run(&scenario.project)?.project_dir().to_path_buf();

    let mut steps = Vec::with_capacity(scenario.steps.len());
    let mut remaining = scenario.steps.iter();
    for step in remaining.by_ref() {
        tracing::info!(step = %step.name, "running step");
        let result = run_step(&mut test, step).await;
        let failed = result.is_err();
        steps.push(StepOutcome {
            name: step.name.clone(),
            result,
        });
        if failed {
            break;
        }
    }

    Ok(Report {
        project_dir,
        steps,
        skipped: remaining.map(|step| step.name.clone()).collect(),
    })
}

async fn run_step(test: &mut SmokeTest, step: &Step) -> Result<ExitState> {
    test.invoke_with_args(
        &step.subcommand,
        step.args.iter().cloned(),
        async |session: &mut Session| {
            for pattern in &step.expect {
                session.expect(pattern).await?;
            }
            if !step.eof {
                return session.exit_state();
            }

            let exit = session.expect_eof().await?;
            match step.exit_code {
                Some(expected) if exit.code() != Some(expected) => {
                    Err(HarnessError::UnexpectedExit {
                        command: session.label().to_string(),
                        expected,
                        actual: exit,
                    })
                }
                _ => Ok(exit),
            }
        },
    )
    .await
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
