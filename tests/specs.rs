//! Behavioral specifications for the coder CLI.
//!
//! These tests are black-box: they invoke the CLI binary and verify
//! stdout, stderr, exit codes, and the `.coder/` files it leaves behind.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// cli/
#[path = "specs/cli/help.rs"]
mod cli_help;
#[path = "specs/cli/signal.rs"]
mod cli_signal;
#[path = "specs/cli/status.rs"]
mod cli_status;
#[path = "specs/cli/develop_config.rs"]
mod cli_develop_config;
