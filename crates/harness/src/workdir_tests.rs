// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use super::*;
use serial_test::serial;
use tempfile::TempDir;

#[test]
#[serial]
fn restores_previous_directory() {
    let before = std::env::current_dir().unwrap();
    let dir = TempDir::new().unwrap();
    let target = dir.path().canonicalize().unwrap();

    {
        let guard = WorkdirGuard::enter(&target).unwrap();
        assert_eq!(std::env::current_dir().unwrap(), target);
        assert_eq!(guard.previous(), before);
    }

    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial]
fn restores_after_panic() {
    let before = std::env::current_dir().unwrap();
    let dir = TempDir::new().unwrap();
    let target = dir.path().to_path_buf();

    let result = std::panic::catch_unwind(move || {
        let _guard = WorkdirGuard::enter(&target).unwrap();
        panic!("assertion inside the bracketed section");
    });

    assert!(result.is_err());
    assert_eq!(std::env::current_dir().unwrap(), before);
}

#[test]
#[serial]
fn missing_directory_leaves_cwd_alone() {
    let before = std::env::current_dir().unwrap();
    let dir = TempDir::new().unwrap();

    let err = WorkdirGuard::enter(&dir.path().join("missing")).unwrap_err();

    assert!(matches!(err, HarnessError::Filesystem { .. }));
    assert_eq!(std::env::current_dir().unwrap(), before);
}
