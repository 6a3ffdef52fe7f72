// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use crate::process::ExitState;
use serial_test::serial;
use std::time::Duration;

fn fake_tool() -> Tool {
    Tool::new("sh")
        .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/fake-sinan"))
        .named("sinan")
}

fn smprj() -> ProjectDescriptor {
    ProjectDescriptor::builder("smprj")
        .version("0.21.0.0")
        .apps(["app1", "app2", "app3"])
        .build()
        .unwrap()
}

fn smoke_test() -> SmokeTest {
    SmokeTest::new(fake_tool())
        .unwrap()
        .with_config(HarnessConfig::default().with_timeout(Some(Duration::from_secs(10))))
}

#[test]
fn do_run_creates_build_dir() {
    let mut test = smoke_test();
    assert_eq!(test.stage(), &Stage::Init);

    let layout = test.do_run(&smprj()).unwrap().clone();

    assert_eq!(layout.project_dir(), test.root().join("smprj"));
    assert!(layout.build_dir().ends_with("smprj/_build/development"));
    assert!(layout.build_dir().is_dir());
    assert_eq!(test.stage(), &Stage::Scaffolded);
}

#[test]
fn temporary_root_is_removed_on_drop() {
    let root = {
        let mut test = smoke_test();
        test.do_run(&smprj()).unwrap();
        test.root().to_path_buf()
    };
    assert!(!root.exists());
}

#[test]
fn keep_scaffold_leaves_root_behind() {
    let root = {
        let mut test = SmokeTest::new(fake_tool())
            .unwrap()
            .with_config(HarnessConfig::default().with_keep_scaffold(true));
        test.do_run(&smprj()).unwrap();
        test.root().to_path_buf()
    };
    assert!(root.join("smprj").is_dir());
    std::fs::remove_dir_all(root).unwrap();
}

#[test]
fn scaffold_failure_is_reported_and_staged() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir(dir.path().join("smprj")).unwrap();
    let mut test = SmokeTest::in_dir(fake_tool(), dir.path());

    let err = test.do_run(&smprj()).unwrap_err();

    match err {
        HarnessError::Scaffold { project, source } => {
            assert_eq!(project, "smprj");
            assert!(matches!(*source, HarnessError::Filesystem { .. }));
        }
        other => panic!("expected Scaffold error, got {other:?}"),
    }
    assert_eq!(test.stage(), &Stage::Failed);
}

#[test]
fn generator_that_lies_is_a_scaffold_error() {
    let mut test = smoke_test().with_generator(
        |desc: &ProjectDescriptor, parent: &Path| -> Result<PathBuf> { Ok(parent.join(desc.name())) },
    );

    let err = test.do_run(&smprj()).unwrap_err();
    assert!(matches!(err, HarnessError::Scaffold { .. }));
}

#[test]
fn custom_generator_still_gets_a_build_dir() {
    let mut test = smoke_test().with_generator(
        |desc: &ProjectDescriptor, parent: &Path| -> Result<PathBuf> {
            let path = parent.join(desc.name());
            std::fs::create_dir(&path).map_err(|e| HarnessError::filesystem(&path, e))?;
            Ok(path)
        },
    );

    let layout = test.do_run(&smprj()).unwrap();
    assert!(layout.build_dir().is_dir());
}

#[tokio::test]
async fn invoke_before_do_run_fails() {
    let mut test = smoke_test();
    let err = test
        .invoke("xref", async |session: &mut Session| session.expect_eof().await)
        .await
        .unwrap_err();
    assert!(matches!(err, HarnessError::NotScaffolded));
}

#[tokio::test]
async fn invoke_runs_in_build_dir() {
    let mut test = smoke_test();
    let build_dir = test.do_run(&smprj()).unwrap().build_dir().canonicalize().unwrap();

    let expected = format!("cwd={}", build_dir.display());
    test.invoke("pwd", async |session: &mut Session| {
        session.expect(expected.as_str()).await?;
        session.expect_eof().await
    })
    .await
    .unwrap();

    assert_eq!(test.stage(), &Stage::Scaffolded);
}

#[tokio::test]
async fn invoke_with_args_forwards_arguments() {
    let mut test = smoke_test();
    test.do_run(&smprj()).unwrap();

    let exit = test
        .invoke_with_args("build", ["app1", "app3"], async |session: &mut Session| {
            session.expect("Building app1").await?;
            session.expect("Building app3").await?;
            session.expect("build complete").await?;
            session.expect_eof().await
        })
        .await
        .unwrap();

    assert_eq!(exit, ExitState::Exited(0));
}

#[tokio::test]
async fn failed_invocation_marks_stage() {
    let mut test = smoke_test();
    test.do_run(&smprj()).unwrap();

    let err = test
        .invoke("crash", async |session: &mut Session| {
            session.expect("Looking for Calls").await
        })
        .await
        .unwrap_err();

    assert!(matches!(err, HarnessError::PatternNotFound { .. }));
    assert_eq!(test.stage(), &Stage::Failed);
}

#[test]
#[serial]
fn enter_build_dir_brackets_cwd() {
    let before = std::env::current_dir().unwrap();
    let mut test = smoke_test();
    let build_dir = test.do_run(&smprj()).unwrap().build_dir().canonicalize().unwrap();

    {
        let _guard = test.enter_build_dir().unwrap();
        assert_eq!(std::env::current_dir().unwrap(), build_dir);
    }

    assert_eq!(std::env::current_dir().unwrap(), before);
}
