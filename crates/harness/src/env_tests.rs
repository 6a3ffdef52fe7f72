// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;

#[test]
#[serial]
fn tool_returns_none_when_unset() {
    std::env::remove_var(SMOKE_TOOL);
    assert_eq!(tool(), None);
}

#[test]
#[serial]
fn tool_returns_path_when_set() {
    std::env::set_var(SMOKE_TOOL, "/opt/sinan/bin/sinan");
    let result = tool();
    std::env::remove_var(SMOKE_TOOL);
    assert_eq!(result, Some(PathBuf::from("/opt/sinan/bin/sinan")));
}

#[test]
#[serial]
fn blank_values_count_as_unset() {
    std::env::set_var(SMOKE_RECORD_DIR, "  ");
    let result = record_dir();
    std::env::remove_var(SMOKE_RECORD_DIR);
    assert_eq!(result, None);
}

#[test]
#[serial]
fn timeout_parses_milliseconds() {
    std::env::set_var(SMOKE_TIMEOUT_MS, "1500");
    let result = timeout_ms();
    std::env::remove_var(SMOKE_TIMEOUT_MS);
    assert_eq!(result, Some(1500));
}

#[test]
#[serial]
fn timeout_ignores_garbage() {
    std::env::set_var(SMOKE_TIMEOUT_MS, "soon");
    let result = timeout_ms();
    std::env::remove_var(SMOKE_TIMEOUT_MS);
    assert_eq!(result, None);
}

#[test]
#[serial]
fn keep_scaffold_accepts_truthy_values() {
    for value in ["1", "true", "YES"] {
        std::env::set_var(SMOKE_KEEP_SCAFFOLD, value);
        assert!(keep_scaffold(), "{value} should be truthy");
    }
    std::env::set_var(SMOKE_KEEP_SCAFFOLD, "0");
    assert!(!keep_scaffold());
    std::env::remove_var(SMOKE_KEEP_SCAFFOLD);
    assert!(!keep_scaffold());
}
