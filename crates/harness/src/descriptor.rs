// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project descriptor: the metadata a scaffold is generated from.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

/// Default owner display name
pub const DEFAULT_USER_NAME: &str = "Smoke Test User";
/// Default owner contact
pub const DEFAULT_EMAIL: &str = "noreply@erlware.org";
/// Default copyright holder
pub const DEFAULT_COPYRIGHT_HOLDER: &str = "Smoke Test Copy, LLC.";
/// Default project version
pub const DEFAULT_VERSION: &str = "0.1.0";

fn default_user_name() -> String {
    DEFAULT_USER_NAME.to_string()
}

fn default_email() -> String {
    DEFAULT_EMAIL.to_string()
}

fn default_copyright_holder() -> String {
    DEFAULT_COPYRIGHT_HOLDER.to_string()
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

/// Unvalidated descriptor fields, as written in a scenario's `[project]` table.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DescriptorSpec {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub apps: Vec<String>,
    #[serde(default = "default_user_name")]
    pub user_name: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_copyright_holder")]
    pub copyright_holder: String,
}

/// Validated, immutable description of a project to scaffold.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(try_from = "DescriptorSpec", into = "DescriptorSpec")]
pub struct ProjectDescriptor {
    name: String,
    version: String,
    version_tuple: Vec<u64>,
    apps: Vec<String>,
    user_name: String,
    email: String,
    copyright_holder: String,
}

impl ProjectDescriptor {
    pub fn builder(name: impl Into<String>) -> ProjectDescriptorBuilder {
        ProjectDescriptorBuilder {
            spec: DescriptorSpec {
                name: name.into(),
                version: default_version(),
                apps: Vec::new(),
                user_name: default_user_name(),
                email: default_email(),
                copyright_holder: default_copyright_holder(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Numeric components of the version, e.g. `[0, 21, 0, 0]`.
    pub fn version_tuple(&self) -> &[u64] {
        &self.version_tuple
    }

    /// Sub-application names, in declaration order.
    pub fn apps(&self) -> &[String] {
        &self.apps
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn copyright_holder(&self) -> &str {
        &self.copyright_holder
    }
}

impl TryFrom<DescriptorSpec> for ProjectDescriptor {
    type Error = HarnessError;

    fn try_from(spec: DescriptorSpec) -> Result<Self> {
        validate_token("project name", &spec.name)?;

        if spec.apps.is_empty() {
            return Err(invalid("at least one application name is required"));
        }
        let mut seen = HashSet::new();
        for app in &spec.apps {
            validate_token("application name", app)?;
            if !seen.insert(app.as_str()) {
                return Err(invalid(format!("duplicate application name `{app}`")));
            }
        }

        let version_tuple = parse_version(&spec.version).ok_or_else(|| {
            invalid(format!(
                "version `{}` is not a dotted numeric tuple such as 0.1.0",
                spec.version
            ))
        })?;

        for (field, value) in [
            ("user name", &spec.user_name),
            ("email", &spec.email),
            ("copyright holder", &spec.copyright_holder),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(format!("{field} must not be empty")));
            }
        }
        if !spec.email.contains('@') {
            return Err(invalid(format!("email `{}` has no `@`", spec.email)));
        }

        Ok(Self {
            name: spec.name,
            version: spec.version,
            version_tuple,
            apps: spec.apps,
            user_name: spec.user_name,
            email: spec.email,
            copyright_holder: spec.copyright_holder,
        })
    }
}

impl From<ProjectDescriptor> for DescriptorSpec {
    fn from(desc: ProjectDescriptor) -> Self {
        Self {
            name: desc.name,
            version: desc.version,
            apps: desc.apps,
            user_name: desc.user_name,
            email: desc.email,
            copyright_holder: desc.copyright_holder,
        }
    }
}

/// Builder for [`ProjectDescriptor`]; owner fields default to a smoke-test identity.
#[derive(Clone, Debug)]
pub struct ProjectDescriptorBuilder {
    spec: DescriptorSpec,
}

impl ProjectDescriptorBuilder {
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.spec.version = version.into();
        self
    }

    /// Append one application
    pub fn app(mut self, app: impl Into<String>) -> Self {
        self.spec.apps.push(app.into());
        self
    }

    /// Replace the application list
    pub fn apps<I, S>(mut self, apps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec.apps = apps.into_iter().map(Into::into).collect();
        self
    }

    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.spec.user_name = user_name.into();
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.spec.email = email.into();
        self
    }

    pub fn copyright_holder(mut self, holder: impl Into<String>) -> Self {
        self.spec.copyright_holder = holder.into();
        self
    }

    pub fn build(self) -> Result<ProjectDescriptor> {
        ProjectDescriptor::try_from(self.spec)
    }
}

fn invalid(message: impl Into<String>) -> HarnessError {
    HarnessError::Validation(message.into())
}

/// Names become directories and Erlang atoms: lowercase letter first, then
/// lowercase letters, digits or underscores.
fn validate_token(what: &str, token: &str) -> Result<()> {
    let mut chars = token.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(invalid(format!(
            "{what} `{token}` must start with a lowercase letter and contain only [a-z0-9_]"
        )))
    }
}

/// `0.21.0.0` -> `[0, 21, 0, 0]`; needs at least two components.
fn parse_version(version: &str) -> Option<Vec<u64>> {
    let parts = version
        .split('.')
        .map(|part| {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                part.parse().ok()
            } else {
                None
            }
        })
        .collect::<Option<Vec<u64>>>()?;
    (parts.len() >= 2).then_some(parts)
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
