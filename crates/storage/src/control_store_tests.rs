// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use coder_core::ControlAction;
use tempfile::tempdir;

#[test]
fn consume_returns_none_when_absent() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    assert_eq!(consume(&paths, RunId::new()).unwrap(), None);
}

#[test]
fn consume_unlinks_file_after_reading() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    let run_id = RunId::new();
    write(&paths, &ControlSignal::new(ControlAction::Pause, run_id, 0)).unwrap();
    let signal = consume(&paths, run_id).unwrap();
    assert_eq!(signal.unwrap().action, ControlAction::Pause);
    assert!(!paths.control_signal().exists());
}

#[test]
fn consume_ignores_signal_for_a_different_run() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    let run_id = RunId::new();
    write(&paths, &ControlSignal::new(ControlAction::Cancel, run_id, 0)).unwrap();
    assert_eq!(consume(&paths, RunId::new()).unwrap(), None);
    // still unlinked even though it didn't apply
    assert!(!paths.control_signal().exists());
}

#[test]
fn consume_treats_malformed_file_as_absent_and_removes_it() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    std::fs::create_dir_all(paths.coder_dir()).unwrap();
    std::fs::write(paths.control_signal(), b"not json").unwrap();
    assert_eq!(consume(&paths, RunId::new()).unwrap(), None);
    assert!(!paths.control_signal().exists());
}
