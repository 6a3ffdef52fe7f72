// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation wrapper: run one subcommand of the tool under test and hand
//! the live session to an assertion body.

use std::ops::AsyncFnOnce;
use std::path::{Path, PathBuf};

use crate::config::HarnessConfig;
use crate::driver::Session;
use crate::env;
use crate::error::Result;
use crate::process::CommandLine;

/// The tool under test: an executable plus any fixed leading arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tool {
    name: String,
    program: PathBuf,
    base_args: Vec<String>,
}

impl Tool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            name,
            program,
            base_args: Vec::new(),
        }
    }

    /// `SMOKE_TOOL` if set, otherwise `default`.
    pub fn from_env(default: impl Into<PathBuf>) -> Self {
        Self::new(env::tool().unwrap_or_else(|| default.into()))
    }

    /// Add a fixed argument placed before every subcommand
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.base_args.push(arg.into());
        self
    }

    /// Name used in invocation labels
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// `<tool> [base args] <subcommand> [args]`, run in `cwd`.
    pub fn command<I, S>(&self, subcommand: &str, args: I, cwd: &Path) -> CommandLine
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CommandLine::new(&self.program, cwd)
            .args(self.base_args.iter().cloned())
            .arg(subcommand)
            .args(args)
            .label(format!("{} {subcommand}", self.name))
    }

    /// Spawn `subcommand`, run `body` against the session, then close it.
    ///
    /// The child is released on every path: after `body` returns (either
    /// way) through [`Session::close`], and on panic through `Drop`. An error
    /// from `body` takes precedence over one from closing.
    pub async fn run<T, I, S, F>(
        &self,
        subcommand: &str,
        args: I,
        cwd: &Path,
        config: &HarnessConfig,
        body: F,
    ) -> Result<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: AsyncFnOnce(&mut Session) -> Result<T>,
    {
        let command = self.command(subcommand, args, cwd);
        let mut session = Session::spawn(&command, config)?;
        let outcome = body(&mut session).await;
        let closed = session.close().await;
        let value = outcome?;
        closed?;
        Ok(value)
    }
}

#[cfg(test)]
#[path = "invoke_tests.rs"]
mod tests;
