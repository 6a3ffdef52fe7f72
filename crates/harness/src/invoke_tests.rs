// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::error::HarnessError;
use crate::process::ExitState;
use tempfile::TempDir;

fn fake_tool() -> Tool {
    Tool::new("sh")
        .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fake-sinan"))
        .named("sinan")
}

#[test]
fn command_places_subcommand_after_base_args() {
    let tool = Tool::new("/usr/bin/env").arg("sinan");
    let command = tool.command("build", ["--verbose"], Path::new("/work"));

    assert_eq!(command.program, PathBuf::from("/usr/bin/env"));
    assert_eq!(command.args, vec!["sinan", "build", "--verbose"]);
    assert_eq!(command.cwd, PathBuf::from("/work"));
    assert_eq!(command.label, "env build");
}

#[test]
fn name_defaults_to_file_name() {
    assert_eq!(Tool::new("/opt/sinan/bin/sinan").name(), "sinan");
    assert_eq!(Tool::new("sinan").named("sinan-dev").name(), "sinan-dev");
}

#[tokio::test]
async fn run_hands_session_to_body() {
    let dir = TempDir::new().unwrap();
    let config = HarnessConfig::default();

    let exit = fake_tool()
        .run(
            "xref",
            std::iter::empty::<String>(),
            dir.path(),
            &config,
            async |session: &mut Session| {
                assert_eq!(session.label(), "sinan xref");
                session
                    .expect("Looking for Calls to Deprecated Functions")
                    .await?;
                session.expect_eof().await
            },
        )
        .await
        .unwrap();

    assert_eq!(exit, ExitState::Exited(0));
}

#[tokio::test]
async fn body_error_wins_and_child_is_released() {
    let dir = TempDir::new().unwrap();
    let config = HarnessConfig::default().with_timeout(Some(std::time::Duration::from_secs(10)));

    let err = fake_tool()
        .run(
            "crash",
            std::iter::empty::<String>(),
            dir.path(),
            &config,
            async |session: &mut Session| session.expect("never printed").await,
        )
        .await
        .unwrap_err();

    match err {
        HarnessError::PatternNotFound { command, pattern, .. } => {
            assert_eq!(command, "sinan crash");
            assert_eq!(pattern, "\"never printed\"");
        }
        other => panic!("expected PatternNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_tool_is_a_spawn_error() {
    let dir = TempDir::new().unwrap();
    let err = Tool::new("definitely-not-a-build-tool-7f3a")
        .run(
            "xref",
            std::iter::empty::<String>(),
            dir.path(),
            &HarnessConfig::default(),
            async |session: &mut Session| session.expect_eof().await,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::Spawn { .. }), "got {err:?}");
}
