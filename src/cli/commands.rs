//! CLI command implementations
//!
//! Each command loads its configuration from the environment, builds the
//! client(s), runs the operation, and prints a short human-readable result
//! to stdout. Structured progress goes through the logger; errors bubble to
//! main as CliError.

use std::fs;
use std::time::Duration;

use crate::builds::{
    attach_scan_result, create_build, mark_external, wait_for_build, PollPolicy, SafetyStatus,
    ScanResult,
};
use crate::config::{HelperConfig, PromotionConfig};
use crate::promotion::promote;
use crate::registry::RegistryClient;

use super::args::{Cli, Command};
use super::errors::CliResult;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command. This is the
/// only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Promote => cmd_promote(),
        Command::CreateBuild { model_version_id } => cmd_create_build(model_version_id),
        Command::MarkExternal { build_id } => cmd_mark_external(build_id),
        Command::SaveScanResults {
            build_id,
            url,
            safety_status,
            results_file,
        } => cmd_save_scan_results(build_id, url, safety_status, results_file),
        Command::Build {
            model_version_id,
            external,
            interval_secs,
            timeout_secs,
        } => cmd_build(model_version_id, external, policy(interval_secs, timeout_secs)),
        Command::WaitBuild {
            build_id,
            interval_secs,
            timeout_secs,
        } => cmd_wait_build(build_id, policy(interval_secs, timeout_secs)),
    }
}

fn policy(interval_secs: u64, timeout_secs: u64) -> PollPolicy {
    PollPolicy {
        interval: Duration::from_secs(interval_secs),
        timeout: Duration::from_secs(timeout_secs),
    }
}

fn helper_client() -> CliResult<RegistryClient> {
    let config = HelperConfig::from_env()?;
    Ok(RegistryClient::new(config.env.auth())?)
}

fn cmd_promote() -> CliResult<()> {
    let config = PromotionConfig::from_env()?;
    let build = promote(&config)?;
    println!("Promoted build {} created.", build.id);
    Ok(())
}

fn cmd_create_build(model_version_id: u64) -> CliResult<()> {
    let client = helper_client()?;
    let build_id = create_build(&client, model_version_id)?;
    println!("Started self contained build {}", build_id);
    Ok(())
}

fn cmd_mark_external(build_id: u64) -> CliResult<()> {
    let client = helper_client()?;
    mark_external(&client, build_id)?;
    println!("Marked build {} as externally scanned", build_id);
    Ok(())
}

fn cmd_save_scan_results(
    build_id: u64,
    url: Option<String>,
    safety_status: Option<String>,
    results_file: Option<std::path::PathBuf>,
) -> CliResult<()> {
    // Validate everything before touching the network.
    let result = match results_file {
        Some(path) => ScanResult::Text(fs::read_to_string(&path)?.trim().to_string()),
        None => {
            // clap guarantees both positionals are present in this branch
            let url = url.unwrap_or_default();
            let status: SafetyStatus = safety_status.unwrap_or_default().parse()?;
            ScanResult::External { url, status }
        }
    };

    let client = helper_client()?;
    attach_scan_result(&client, build_id, &result)?;
    println!("Saved scan results for build {}", build_id);
    Ok(())
}

fn cmd_build(model_version_id: u64, external: bool, policy: PollPolicy) -> CliResult<()> {
    let client = helper_client()?;

    let build_id = create_build(&client, model_version_id)?;
    println!("Started self contained build {}", build_id);

    if external {
        mark_external(&client, build_id)?;
    }

    let build = wait_for_build(&client, build_id, policy)?;
    println!("build complete; image location:");
    println!("{}", build.location);
    Ok(())
}

fn cmd_wait_build(build_id: u64, policy: PollPolicy) -> CliResult<()> {
    let client = helper_client()?;
    let build = wait_for_build(&client, build_id, policy)?;
    println!("build {} finished at {}", build.id, build.location);
    Ok(())
}
