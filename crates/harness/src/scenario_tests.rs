// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;

const XREF: &str = r#"
tool = "sinan"
timeout_ms = 5000

[project]
name = "smprj"
version = "0.21.0.0"
apps = ["app1", "app2", "app3"]

[[steps]]
subcommand = "xref"
expect = [
    "Looking for Calls to Deprecated Functions",
    { type = "regex", pattern = "Undefined \\w+" },
]
exit_code = 0
"#;

#[test]
fn parses_full_scenario() {
    let scenario = Scenario::from_toml(XREF).unwrap();

    assert_eq!(scenario.tool, Some(PathBuf::from("sinan")));
    assert_eq!(scenario.timeout, Some(Some(Duration::from_millis(5000))));
    assert_eq!(scenario.project.name(), "smprj");
    assert_eq!(scenario.project.apps(), ["app1", "app2", "app3"]);

    let step = &scenario.steps[0];
    assert_eq!(step.name, "xref");
    assert_eq!(step.expect.len(), 2);
    assert!(matches!(step.expect[1], Pattern::Regex(_)));
    assert!(step.eof);
    assert_eq!(step.exit_code, Some(0));
}

#[test]
fn project_defaults_apply() {
    let scenario = Scenario::from_toml(
        r#"
[project]
name = "tiny"
apps = ["tiny"]

[[steps]]
subcommand = "build"
"#,
    )
    .unwrap();

    assert_eq!(scenario.tool, None);
    assert_eq!(scenario.timeout, None);
    assert_eq!(scenario.project.version(), crate::descriptor::DEFAULT_VERSION);
    assert_eq!(scenario.project.email(), crate::descriptor::DEFAULT_EMAIL);
}

#[test]
fn zero_timeout_means_unbounded() {
    let scenario = Scenario::from_toml(
        r#"
timeout_ms = 0
[project]
name = "p"
apps = ["p"]
[[steps]]
subcommand = "build"
"#,
    )
    .unwrap();
    assert_eq!(scenario.timeout, Some(None));
}

#[test]
fn step_name_defaults_to_command_line() {
    let scenario = Scenario::from_toml(
        r#"
[project]
name = "p"
apps = ["p"]
[[steps]]
subcommand = "build"
args = ["app1", "app2"]
[[steps]]
name = "second build"
subcommand = "build"
"#,
    )
    .unwrap();
    assert_eq!(scenario.steps[0].name, "build app1 app2");
    assert_eq!(scenario.steps[1].name, "second build");
}

#[test]
fn invalid_project_is_rejected() {
    let err = Scenario::from_toml(
        r#"
[project]
name = "Bad-Name"
apps = ["app1"]
[[steps]]
subcommand = "xref"
"#,
    )
    .unwrap_err();
    assert!(matches!(err, HarnessError::Toml(_)), "got {err:?}");
    assert!(err.to_string().contains("Bad-Name"));
}

#[test]
fn missing_steps_is_rejected() {
    let err = Scenario::from_toml("[project]\nname = \"p\"\napps = [\"p\"]\n").unwrap_err();
    assert!(matches!(err, HarnessError::Scenario(_)));
}

#[test]
fn exit_code_without_eof_is_rejected() {
    let err = Scenario::from_toml(
        r#"
[project]
name = "p"
apps = ["p"]
[[steps]]
subcommand = "hang"
eof = false
exit_code = 0
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("step 1"));
}

#[test]
fn bad_regex_is_rejected() {
    let err = Scenario::from_toml(
        r#"
[project]
name = "p"
apps = ["p"]
[[steps]]
subcommand = "xref"
expect = [{ type = "regex", pattern = "(" }]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, HarnessError::InvalidPattern(_)));
}

#[test]
fn unknown_field_is_rejected() {
    let err = Scenario::from_toml(
        r#"
[project]
name = "p"
apps = ["p"]
[[steps]]
subcommand = "xref"
expects = ["typo"]
"#,
    )
    .unwrap_err();
    assert!(matches!(err, HarnessError::Toml(_)));
}

#[test]
fn load_resolves_tool_relative_to_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("xref.toml");
    std::fs::write(&path, XREF.replace("tool = \"sinan\"", "tool = \"./bin/sinan\"")).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.tool, Some(dir.path().join("./bin/sinan")));
}

#[test]
fn load_keeps_bare_tool_name() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("xref.toml");
    std::fs::write(&path, XREF).unwrap();

    let scenario = Scenario::load(&path).unwrap();
    assert_eq!(scenario.tool, Some(PathBuf::from("sinan")));
}

#[test]
fn load_missing_file_is_filesystem_error() {
    let err = Scenario::load(Path::new("/nonexistent/scenario.toml")).unwrap_err();
    assert!(matches!(err, HarnessError::Filesystem { .. }));
}
