// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use coder_core::LifecycleState;
use tempfile::tempdir;

#[test]
fn save_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    let snap = LifecycleSnapshot::new(RunId::new(), "develop", 0);
    save(&paths, &snap, None).unwrap();
    assert_eq!(load(&paths).unwrap(), Some(snap));
}

#[test]
fn guard_mismatch_is_refused() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    let snap = LifecycleSnapshot::new(RunId::new(), "develop", 0);
    save(&paths, &snap, None).unwrap();

    let other = LifecycleSnapshot::new(RunId::new(), "develop", 1);
    let err = save(&paths, &other, Some(other.run_id)).unwrap_err();
    assert!(matches!(err, StorageError::GuardMismatch { .. }));
}

#[test]
fn mirror_replay_returns_transitions_for_run_in_order() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    let run_id = RunId::new();
    let mut snap = LifecycleSnapshot::new(run_id, "develop", 0);
    save(&paths, &snap, None).unwrap();
    snap.transition(LifecycleState::Running, 1).unwrap();
    save(&paths, &snap, Some(run_id)).unwrap();
    snap.transition(LifecycleState::Completed, 2).unwrap();
    save(&paths, &snap, Some(run_id)).unwrap();

    let replayed = replay_mirror(&paths, run_id).unwrap();
    assert_eq!(replayed.len(), 3);
    assert_eq!(replayed[0].value, LifecycleState::Idle);
    assert_eq!(replayed[2].value, LifecycleState::Completed);
}

#[test]
fn mirror_replay_filters_out_other_runs() {
    let dir = tempdir().unwrap();
    let paths = WorkspacePaths::new(dir.path());
    let run_a = RunId::new();
    let run_b = RunId::new();
    save(&paths, &LifecycleSnapshot::new(run_a, "develop", 0), None).unwrap();
    save(&paths, &LifecycleSnapshot::new(run_b, "develop", 0), None).unwrap();
    assert_eq!(replay_mirror(&paths, run_a).unwrap().len(), 1);
}
