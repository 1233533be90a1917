// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! coder - agent workflow orchestrator CLI

mod cli;
mod commands;
mod config_file;
mod control_bridge;
mod exit_error;
mod factory;

use clap::Parser;

use cli::{Cli, Command};
use exit_error::{ExitError, EXIT_FAILURE};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.code
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32, ExitError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Develop(args) => commands::develop::handle(args).await,
        Command::Signal(args) => {
            commands::signal::handle(args).map(|()| 0).map_err(|e| ExitError::new(EXIT_FAILURE, e.to_string()))
        }
        Command::Status(args) => {
            commands::status::handle(args).map(|()| 0).map_err(|e| ExitError::new(EXIT_FAILURE, e.to_string()))
        }
    }
}
