//! `coder signal`: writes `.coder/control.json` for a running loop to
//! pick up (spec §4.G control signals).

use crate::prelude::*;

#[test]
fn cancel_writes_control_signal() {
    let ws = Workspace::empty();

    ws.coder().args(&["signal", "cancel"]).passes();

    let raw = ws.read(".coder/control.json").expect("control.json should exist");
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["action"], "cancel");
}

#[test]
fn pause_then_resume_overwrites_the_prior_signal() {
    let ws = Workspace::empty();

    ws.coder().args(&["signal", "pause"]).passes();
    let raw = ws.read(".coder/control.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["action"], "pause");

    ws.coder().args(&["signal", "resume"]).passes();
    let raw = ws.read(".coder/control.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["action"], "resume");
}

#[test]
fn run_id_flag_is_recorded_on_the_signal() {
    let ws = Workspace::empty();

    ws.coder().args(&["signal", "cancel", "--run-id", "run-abc123"]).passes();

    let raw = ws.read(".coder/control.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["run_id"], "run-abc123");
}

#[test]
fn omitted_run_id_is_a_wildcard_signal() {
    let ws = Workspace::empty();

    ws.coder().args(&["signal", "pause"]).passes();

    let raw = ws.read(".coder/control.json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value["run_id"].is_null());
}
