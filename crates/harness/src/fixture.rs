// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Test lifecycle base.
//!
//! A [`SmokeTest`] ties the pieces together for one test case: scaffold a
//! project with [`SmokeTest::do_run`], then drive one or more subcommands of
//! the tool with [`SmokeTest::invoke`], each inside the project's build
//! directory. The scaffold root is a temporary directory unless one is given.
//!
//! ```no_run
//! # async fn xref() -> smoke_harness::Result<()> {
//! use smoke_harness::{ProjectDescriptor, Session, SmokeTest, Tool};
//!
//! let mut test = SmokeTest::new(Tool::from_env("sinan"))?;
//! let project = ProjectDescriptor::builder("smprj")
//!     .version("0.21.0.0")
//!     .apps(["app1", "app2", "app3"])
//!     .build()?;
//! test.do_run(&project)?;
//! test.invoke("xref", async |child: &mut Session| {
//!     child.expect("Looking for Calls to Deprecated Functions").await?;
//!     child.expect_eof().await
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

use std::ops::AsyncFnOnce;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::HarnessConfig;
use crate::descriptor::ProjectDescriptor;
use crate::driver::Session;
use crate::error::{HarnessError, Result};
use crate::invoke::Tool;
use crate::scaffold::{OtpLayout, ScaffoldGenerator, ScaffoldLayout};
use crate::workdir::WorkdirGuard;

/// Where a test case is in its lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Init,
    Scaffolded,
    /// A subcommand is running.
    Invoking(String),
    /// The last scaffold or invocation failed.
    Failed,
}

enum Root {
    Temp(TempDir),
    Dir(PathBuf),
}

impl Root {
    fn path(&self) -> &Path {
        match self {
            Self::Temp(dir) => dir.path(),
            Self::Dir(path) => path,
        }
    }
}

pub struct SmokeTest {
    tool: Tool,
    config: HarnessConfig,
    generator: Box<dyn ScaffoldGenerator>,
    root: Root,
    layout: Option<ScaffoldLayout>,
    stage: Stage,
}

impl SmokeTest {
    /// Scaffold into a fresh temporary directory, with configuration from
    /// the environment.
    pub fn new(tool: Tool) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix("smoke-")
            .tempdir()
            .map_err(|e| HarnessError::filesystem(std::env::temp_dir(), e))?;
        Ok(Self::with_root(tool, Root::Temp(root)))
    }

    /// Scaffold into `parent`, which is left in place afterwards.
    pub fn in_dir(tool: Tool, parent: impl Into<PathBuf>) -> Self {
        Self::with_root(tool, Root::Dir(parent.into()))
    }

    fn with_root(tool: Tool, root: Root) -> Self {
        Self {
            tool,
            config: HarnessConfig::from_env(),
            generator: Box::new(OtpLayout),
            root,
            layout: None,
            stage: Stage::Init,
        }
    }

    /// Replace the configuration
    pub fn with_config(mut self, config: HarnessConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the scaffold generator
    pub fn with_generator(mut self, generator: impl ScaffoldGenerator + 'static) -> Self {
        self.generator = Box::new(generator);
        self
    }

    pub fn tool(&self) -> &Tool {
        &self.tool
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Directory projects are scaffolded into.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn layout(&self) -> Option<&ScaffoldLayout> {
        self.layout.as_ref()
    }

    /// Generate the project described by `descriptor` and make it the
    /// target of later invocations.
    pub fn do_run(&mut self, descriptor: &ProjectDescriptor) -> Result<&ScaffoldLayout> {
        match self.scaffold(descriptor) {
            Ok(layout) => {
                self.stage = Stage::Scaffolded;
                Ok(self.layout.insert(layout))
            }
            Err(source) => {
                self.stage = Stage::Failed;
                Err(HarnessError::Scaffold {
                    project: descriptor.name().to_string(),
                    source: Box::new(source),
                })
            }
        }
    }

    fn scaffold(&self, descriptor: &ProjectDescriptor) -> Result<ScaffoldLayout> {
        let project_dir = self.generator.generate(descriptor, self.root.path())?;
        if !project_dir.is_dir() {
            return Err(HarnessError::filesystem(
                &project_dir,
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "generator reported success but the project directory is missing",
                ),
            ));
        }
        let layout = ScaffoldLayout::new(project_dir);
        std::fs::create_dir_all(layout.build_dir())
            .map_err(|e| HarnessError::filesystem(layout.build_dir(), e))?;
        Ok(layout)
    }

    /// Run `subcommand` in the build directory and hand the session to `body`.
    pub async fn invoke<T, F>(&mut self, subcommand: &str, body: F) -> Result<T>
    where
        F: AsyncFnOnce(&mut Session) -> Result<T>,
    {
        self.invoke_with_args(subcommand, std::iter::empty::<String>(), body)
            .await
    }

    /// [`invoke`](Self::invoke) with extra subcommand arguments.
    pub async fn invoke_with_args<T, I, S, F>(
        &mut self,
        subcommand: &str,
        args: I,
        body: F,
    ) -> Result<T>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: AsyncFnOnce(&mut Session) -> Result<T>,
    {
        let cwd = self
            .layout
            .as_ref()
            .ok_or(HarnessError::NotScaffolded)?
            .build_dir()
            .to_path_buf();

        self.stage = Stage::Invoking(subcommand.to_string());
        let outcome = self
            .tool
            .run(subcommand, args, &cwd, &self.config, body)
            .await;
        self.stage = match outcome {
            Ok(_) => Stage::Scaffolded,
            Err(ref e) => {
                tracing::warn!(tool = %self.tool.name(), subcommand, error = %e, "invocation failed");
                Stage::Failed
            }
        };
        outcome
    }

    /// Change the process working directory to the build directory until the
    /// guard is dropped.
    pub fn enter_build_dir(&self) -> Result<WorkdirGuard> {
        let layout = self.layout.as_ref().ok_or(HarnessError::NotScaffolded)?;
        WorkdirGuard::enter(layout.build_dir())
    }
}

impl Drop for SmokeTest {
    fn drop(&mut self) {
        if !self.config.keep_scaffold {
            return;
        }
        if let Root::Temp(dir) = std::mem::replace(&mut self.root, Root::Dir(PathBuf::new())) {
            let kept = dir.keep();
            tracing::info!(path = %kept.display(), "kept scaffold");
        }
    }
}

impl std::fmt::Debug for SmokeTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmokeTest")
            .field("tool", &self.tool)
            .field("root", &self.root.path())
            .field("layout", &self.layout)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "fixture_tests.rs"]
mod tests;
