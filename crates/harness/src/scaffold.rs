// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scaffold generation.
//!
//! A generator turns a [`ProjectDescriptor`] into a project tree under a
//! parent directory. [`OtpLayout`] writes the multi-application layout the
//! Erlang/OTP build tool under test expects; anything else can plug in
//! through [`ScaffoldGenerator`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::descriptor::ProjectDescriptor;
use crate::error::{HarnessError, Result};

/// Build output directory, relative to the project root.
pub const BUILD_DIR: &str = "_build/development";

pub trait ScaffoldGenerator {
    /// Create `parent/<descriptor.name()>` and return its path.
    fn generate(&self, descriptor: &ProjectDescriptor, parent: &Path) -> Result<PathBuf>;
}

impl<F> ScaffoldGenerator for F
where
    F: Fn(&ProjectDescriptor, &Path) -> Result<PathBuf>,
{
    fn generate(&self, descriptor: &ProjectDescriptor, parent: &Path) -> Result<PathBuf> {
        self(descriptor, parent)
    }
}

/// Paths inside a generated project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScaffoldLayout {
    project_dir: PathBuf,
    build_dir: PathBuf,
}

impl ScaffoldLayout {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let build_dir = project_dir.join(BUILD_DIR);
        Self {
            project_dir,
            build_dir,
        }
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// `lib/<app>` for one sub-application.
    pub fn app_dir(&self, app: &str) -> PathBuf {
        self.project_dir.join("lib").join(app)
    }
}

/// Multi-application OTP project layout.
#[derive(Clone, Copy, Debug, Default)]
pub struct OtpLayout;

impl ScaffoldGenerator for OtpLayout {
    fn generate(&self, descriptor: &ProjectDescriptor, parent: &Path) -> Result<PathBuf> {
        let meta = fs::metadata(parent).map_err(|e| HarnessError::filesystem(parent, e))?;
        if !meta.is_dir() {
            return Err(HarnessError::filesystem(
                parent,
                std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        let project_dir = parent.join(descriptor.name());
        // create_dir, not create_dir_all: an existing entry is a conflict
        fs::create_dir(&project_dir).map_err(|e| HarnessError::filesystem(&project_dir, e))?;

        let layout = ScaffoldLayout::new(&project_dir);
        if let Err(e) = write_tree(descriptor, &layout) {
            if let Err(cleanup) = fs::remove_dir_all(&project_dir) {
                tracing::warn!(path = %project_dir.display(), error = %cleanup, "failed to remove partial scaffold");
            }
            return Err(e);
        }

        tracing::info!(
            project = descriptor.name(),
            apps = descriptor.apps().len(),
            path = %project_dir.display(),
            "scaffolded project"
        );
        Ok(project_dir)
    }
}

fn write_tree(descriptor: &ProjectDescriptor, layout: &ScaffoldLayout) -> Result<()> {
    let root = layout.project_dir();
    for dir in ["bin", "config", "doc", BUILD_DIR] {
        create_dir(&root.join(dir))?;
    }
    write_file(&root.join("sinan.config"), &project_config(descriptor))?;
    write_file(&root.join("config").join("sys.config"), "[].\n")?;

    for app in descriptor.apps() {
        let app_dir = layout.app_dir(app);
        for dir in ["src", "include", "doc", "ebin"] {
            create_dir(&app_dir.join(dir))?;
        }
        let src = app_dir.join("src");
        write_file(&src.join(format!("{app}.app.src")), &app_resource(descriptor, app))?;
        write_file(&src.join(format!("{app}_app.erl")), &app_module(descriptor, app))?;
        write_file(&src.join(format!("{app}_sup.erl")), &sup_module(descriptor, app))?;
    }
    Ok(())
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| HarnessError::filesystem(path, e))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|e| HarnessError::filesystem(path, e))
}

fn header(descriptor: &ProjectDescriptor, doc: &str) -> String {
    format!(
        "%%%-------------------------------------------------------------------\n\
         %%% @author {user} <{email}>\n\
         %%% @copyright {holder}\n\
         %%% @doc\n\
         %%%  {doc}\n\
         %%% @end\n\
         %%%-------------------------------------------------------------------\n",
        user = descriptor.user_name(),
        email = descriptor.email(),
        holder = descriptor.copyright_holder(),
    )
}

fn project_config(descriptor: &ProjectDescriptor) -> String {
    format!(
        "%% -*- mode: Erlang; fill-column: 80; comment-column: 75; -*-\n\
         {{project_name, {name}}}.\n\
         {{project_vsn, \"{vsn}\"}}.\n\
         \n\
         {{build_dir, \"_build\"}}.\n\
         {{ignore_dirs, [\"_\", \".\"]}}.\n\
         {{ignore_apps, []}}.\n",
        name = descriptor.name(),
        vsn = descriptor.version(),
    )
}

fn app_resource(descriptor: &ProjectDescriptor, app: &str) -> String {
    format!(
        "%% -*- mode: Erlang; fill-column: 80; comment-column: 75; -*-\n\
         {{application, {app},\n \
         [{{description, \"{app} application\"}},\n  \
         {{vsn, \"{vsn}\"}},\n  \
         {{modules, [{app}_app, {app}_sup]}},\n  \
         {{registered, [{app}_sup]}},\n  \
         {{applications, [kernel, stdlib]}},\n  \
         {{mod, {{{app}_app, []}}}}]}}.\n",
        vsn = descriptor.version(),
    )
}

fn app_module(descriptor: &ProjectDescriptor, app: &str) -> String {
    format!(
        "{header}-module({app}_app).\n\
         \n\
         -behaviour(application).\n\
         \n\
         -export([start/2, stop/1]).\n\
         \n\
         start(_StartType, _StartArgs) ->\n    \
         {app}_sup:start_link().\n\
         \n\
         stop(_State) ->\n    \
         ok.\n",
        header = header(descriptor, &format!("Application callback module for {app}.")),
    )
}

fn sup_module(descriptor: &ProjectDescriptor, app: &str) -> String {
    format!(
        "{header}-module({app}_sup).\n\
         \n\
         -behaviour(supervisor).\n\
         \n\
         -export([start_link/0, init/1]).\n\
         \n\
         -define(SERVER, ?MODULE).\n\
         \n\
         start_link() ->\n    \
         supervisor:start_link({{local, ?SERVER}}, ?MODULE, []).\n\
         \n\
         init([]) ->\n    \
         {{ok, {{{{one_for_one, 1000, 3600}}, []}}}}.\n",
        header = header(descriptor, &format!("Top-level supervisor for {app}.")),
    )
}

#[cfg(test)]
#[path = "scaffold_tests.rs"]
mod tests;
