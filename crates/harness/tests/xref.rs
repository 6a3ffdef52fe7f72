// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke test: scaffold a three-app project and cross-reference it.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::time::Duration;

use smoke_harness::{
    ExitState, HarnessConfig, HarnessError, ProjectDescriptor, Session, SmokeTest, Stage, Tool,
};

fn sinan() -> Tool {
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
    SmokeTest::new(sinan())
        .unwrap()
        .with_config(HarnessConfig::default().with_timeout(Some(Duration::from_secs(10))))
}

#[tokio::test]
async fn xref_reports_deprecated_calls() {
    let mut test = smoke_test();
    let layout = test.do_run(&smprj()).unwrap();

    assert!(layout.build_dir().ends_with("smprj/_build/development"));
    assert!(layout.build_dir().is_dir());
    for app in ["app1", "app2", "app3"] {
        assert!(layout.app_dir(app).join("src").join(format!("{app}_app.erl")).is_file());
    }

    let exit = test
        .invoke("xref", async |child: &mut Session| {
            child
                .expect("Looking for Calls to Deprecated Functions")
                .await?;
            child.expect_eof().await
        })
        .await
        .unwrap();

    assert_eq!(exit, ExitState::Exited(0));
    assert_eq!(test.stage(), &Stage::Scaffolded);
}

#[tokio::test]
async fn crashing_subcommand_fails_without_hanging() {
    let mut test = SmokeTest::new(sinan())
        .unwrap()
        .with_config(HarnessConfig::default().with_timeout(None));
    test.do_run(&smprj()).unwrap();

    let err = test
        .invoke("crash", async |child: &mut Session| {
            child
                .expect("Looking for Calls to Deprecated Functions")
                .await?;
            child.expect_eof().await
        })
        .await
        .unwrap_err();

    match err {
        HarnessError::PatternNotFound { command, pattern, .. } => {
            assert_eq!(command, "sinan crash");
            assert!(pattern.contains("Looking for Calls to Deprecated Functions"));
        }
        other => panic!("expected PatternNotFound, got {other:?}"),
    }
    assert_eq!(test.stage(), &Stage::Failed);
}

#[tokio::test]
async fn invocations_share_one_scaffold() {
    let mut test = smoke_test();
    test.do_run(&smprj()).unwrap();

    for subcommand in ["xref", "xref"] {
        test.invoke(subcommand, async |child: &mut Session| {
            child.expect("starting: xref").await?;
            child.expect_eof().await
        })
        .await
        .unwrap();
    }
}
