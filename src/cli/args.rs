//! CLI argument definitions using clap
//!
//! Commands:
//! - promotectl promote
//! - promotectl create-build <model_version_id>
//! - promotectl mark-external <build_id>
//! - promotectl save-scan-results <build_id> <url> <safety_status>
//! - promotectl save-scan-results <build_id> --results-file <path>
//! - promotectl build <model_version_id> [--external]
//! - promotectl wait-build <build_id>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// promotectl - strict, deterministic build promotion for ML model registries
#[derive(Parser, Debug)]
#[command(name = "promotectl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Promote the latest self-contained build of a model version between
    /// instances, configured entirely via VERTA_SOURCE_* / VERTA_DEST_*
    /// environment variables
    Promote,

    /// Start a self-contained build of a model version
    CreateBuild {
        /// Model version id to build
        model_version_id: u64,
    },

    /// Mark a build as externally scanned
    MarkExternal {
        /// Build id to mark
        build_id: u64,
    },

    /// Attach external scan results to a build
    SaveScanResults {
        /// Build with which to associate the results
        build_id: u64,

        /// URL of the external scan report
        #[arg(required_unless_present = "results_file")]
        url: Option<String>,

        /// Scan verdict: exactly "safe" or "unsafe"
        #[arg(required_unless_present = "results_file")]
        safety_status: Option<String>,

        /// Send this file's contents as free-text results instead
        #[arg(long, conflicts_with_all = ["url", "safety_status"])]
        results_file: Option<PathBuf>,
    },

    /// Create a self-contained build, wait for it, and print the image
    /// location
    Build {
        /// Model version id to build
        model_version_id: u64,

        /// Mark the build for external scanning
        #[arg(long)]
        external: bool,

        /// Seconds between status polls
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 1800)]
        timeout_secs: u64,
    },

    /// Poll a build until it finishes or errors
    WaitBuild {
        /// Build id to wait on
        build_id: u64,

        /// Seconds between status polls
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,

        /// Give up after this many seconds
        #[arg(long, default_value_t = 1800)]
        timeout_secs: u64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
