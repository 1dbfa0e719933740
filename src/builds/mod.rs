//! Build and scan helper operations
//!
//! Standalone operations invoked around the promotion pipeline:
//! - create a self-contained build for a model version
//! - mark a build as externally scanned
//! - attach external scan results (free text, or url + verdict)
//! - wait for a build to reach a terminal status

mod errors;
mod helpers;
mod poll;
mod scan;

pub use errors::{BuildError, BuildResult};
pub use helpers::{create_build, get_build, mark_external};
pub use poll::{wait_for_build, PollPolicy};
pub use scan::{attach_scan_result, SafetyStatus, ScanResult};
