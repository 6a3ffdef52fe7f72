// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scenario files for the `smoke` binary.
//!
//! A scenario names a project to scaffold and the subcommands to run against
//! it, each with the output cues to wait for:
//!
//! ```toml
//! tool = "sinan"
//! timeout_ms = 30000
//!
//! [project]
//! name = "smprj"
//! version = "0.21.0.0"
//! apps = ["app1", "app2", "app3"]
//!
//! [[steps]]
//! subcommand = "xref"
//! expect = ["Looking for Calls to Deprecated Functions"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::descriptor::ProjectDescriptor;
use crate::error::{HarnessError, Result};
use crate::pattern::{Pattern, PatternSpec};

/// Scenario file as written on disk.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioFile {
    /// Tool executable. Relative paths with a directory part are resolved
    /// against the scenario file's directory; bare names go through `PATH`.
    #[serde(default)]
    pub tool: Option<PathBuf>,
    /// Wait bound per step; `0` waits indefinitely.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    pub project: ProjectDescriptor,
    #[serde(default)]
    pub steps: Vec<StepSpec>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StepSpec {
    /// Defaults to the subcommand and its arguments.
    #[serde(default)]
    pub name: Option<String>,
    pub subcommand: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub expect: Vec<PatternSpec>,
    /// Wait for end of stream after the last cue.
    #[serde(default = "default_eof")]
    pub eof: bool,
    #[serde(default)]
    pub exit_code: Option<i32>,
}

fn default_eof() -> bool {
    true
}

/// A validated step with compiled patterns.
#[derive(Clone, Debug)]
pub struct Step {
    pub name: String,
    pub subcommand: String,
    pub args: Vec<String>,
    pub expect: Vec<Pattern>,
    pub eof: bool,
    pub exit_code: Option<i32>,
}

/// A loaded, validated scenario.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub tool: Option<PathBuf>,
    /// `Some(None)` means the file asked for no bound at all.
    pub timeout: Option<Option<Duration>>,
    pub project: ProjectDescriptor,
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| HarnessError::filesystem(path, e))?;
        let mut scenario = Self::from_toml(&content)?;

        let scenario_dir = path.parent().unwrap_or(Path::new("."));
        if let Some(tool) = scenario.tool.take() {
            scenario.tool = Some(resolve_tool_path(tool, scenario_dir));
        }
        Ok(scenario)
    }

    /// Parse and validate scenario TOML. Tool paths are left as written.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(content)?;
        Self::from_file(file)
    }

    pub fn from_file(file: ScenarioFile) -> Result<Self> {
        if file.steps.is_empty() {
            return Err(HarnessError::Scenario(
                "scenario has no steps".to_string(),
            ));
        }

        let steps = file
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, spec)| compile_step(index, spec))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            tool: file.tool,
            timeout: file
                .timeout_ms
                .map(|ms| (ms > 0).then(|| Duration::from_millis(ms))),
            project: file.project,
            steps,
        })
    }
}

fn compile_step(index: usize, spec: StepSpec) -> Result<Step> {
    let subcommand = spec.subcommand.trim();
    if subcommand.is_empty() {
        return Err(HarnessError::Scenario(format!(
            "step {} has an empty subcommand",
            index + 1
        )));
    }
    if spec.exit_code.is_some() && !spec.eof {
        return Err(HarnessError::Scenario(format!(
            "step {} checks exit_code but sets eof = false",
            index + 1
        )));
    }

    let expect = spec
        .expect
        .iter()
        .map(PatternSpec::compile)
        .collect::<Result<Vec<_>>>()?;
    let name = spec.name.unwrap_or_else(|| {
        std::iter::once(subcommand)
            .chain(spec.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    });

    Ok(Step {
        name,
        subcommand: subcommand.to_string(),
        args: spec.args,
        expect,
        eof: spec.eof,
        exit_code: spec.exit_code,
    })
}

fn resolve_tool_path(tool: PathBuf, scenario_dir: &Path) -> PathBuf {
    if tool.is_relative() && tool.components().count() > 1 {
        scenario_dir.join(tool)
    } else {
        tool
    }
}

#[cfg(test)]
#[path = "scenario_tests.rs"]
mod tests;
