// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `coder signal {cancel,pause,resume}`: writes `control.json` for a
//! running loop's control bridge to pick up (spec §4.G / §9).

use anyhow::{Context, Result};
use coder_core::{Clock, ControlAction, ControlSignal, RunId, SystemClock};
use coder_storage::WorkspacePaths;

use crate::cli::{SignalAction, SignalArgs};

pub fn handle(args: SignalArgs) -> Result<()> {
    let workspace = WorkspacePaths::new(args.workspace.workspace);
    let action = match args.action {
        SignalAction::Cancel => ControlAction::Cancel,
        SignalAction::Pause => ControlAction::Pause,
        SignalAction::Resume => ControlAction::Resume,
    };
    let ts = SystemClock.epoch_ms();
    let signal = match args.run_id {
        Some(id) => ControlSignal::new(action, RunId::from_string(id), ts),
        // No run id given: a wildcard signal, applied to whichever run
        // is active when the bridge next consumes it.
        None => ControlSignal { action, run_id: None, ts },
    };

    coder_storage::control_store::write(&workspace, &signal)
        .context("writing control.json")?;
    println!("wrote {action} signal");
    Ok(())
}
