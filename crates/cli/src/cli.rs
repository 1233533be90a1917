// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line surface (spec §1 explicitly scopes this out of the core
//! as "thin registration"): a handful of subcommands that construct a
//! [`coder_engine::machine::MachineContext`] and hand it to the engine.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coder", version = env!("CARGO_PKG_VERSION"), about = "Agent workflow orchestrator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the develop loop over one workspace's issue queue.
    Develop(DevelopArgs),
    /// Write a cancel/pause/resume signal for a running loop to consume.
    Signal(SignalArgs),
    /// Print the current loop state for a workspace.
    Status(WorkspaceArgs),
}

#[derive(Args)]
pub struct WorkspaceArgs {
    /// Workspace root; its state lives under `<workspace>/.coder/`.
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,
}

#[derive(Args)]
pub struct DevelopArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    /// Path to the workspace's TOML configuration file.
    #[arg(long, default_value = "coder.toml")]
    pub config: PathBuf,

    /// Free-text goal passed through to the issue_list machine.
    #[arg(long)]
    pub goal: Option<String>,

    /// Cap the number of issues discovered this run.
    #[arg(long)]
    pub max_issues: Option<u32>,

    /// Restrict discovery to a single project/repo.
    #[arg(long)]
    pub project_filter: Option<String>,

    /// Directory of local issue manifests, for the local tracker backend.
    #[arg(long)]
    pub local_issues_dir: Option<String>,

    /// Process exactly these issue ids, bypassing normal discovery
    /// filters. May be passed more than once.
    #[arg(long = "force")]
    pub forced_ids: Vec<String>,

    /// Branch new issue branches are based on when an issue has no
    /// completed dependency to inherit a branch from.
    #[arg(long, default_value = "main")]
    pub default_branch: String,

    /// Also remove untracked files when resetting a workspace between
    /// issues, rather than only checking out the default branch.
    #[arg(long)]
    pub destructive_reset: bool,
}

#[derive(Args)]
pub struct SignalArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[command(subcommand)]
    pub action: SignalAction,

    /// Only apply to this run id; omitted means "whichever run is active".
    #[arg(long)]
    pub run_id: Option<String>,
}

#[derive(Subcommand)]
pub enum SignalAction {
    Cancel,
    Pause,
    Resume,
}
