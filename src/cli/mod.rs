//! CLI module for promotectl
//!
//! Provides the command-line interface:
//! - promote: run the full promotion pipeline from environment config
//! - create-build: start a self-contained build for a model version
//! - mark-external: flag a build as externally scanned
//! - save-scan-results: attach external scan results to a build
//! - build: create a build, optionally mark it external, wait for it
//! - wait-build: poll a build until it reaches a terminal status

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
