//! External scan results
//!
//! A scan result is either free text or a structured verdict: the report
//! URL plus a safety status that must be exactly "safe" or "unsafe"
//! (case-sensitive). Validation happens before any network call.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};

use crate::observability::Logger;
use crate::registry::RegistryClient;

use super::errors::{BuildError, BuildResult};

/// Verdict of an external scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafetyStatus {
    Safe,
    Unsafe,
}

impl SafetyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SafetyStatus::Safe => "safe",
            SafetyStatus::Unsafe => "unsafe",
        }
    }
}

impl fmt::Display for SafetyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SafetyStatus {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "safe" => Ok(SafetyStatus::Safe),
            "unsafe" => Ok(SafetyStatus::Unsafe),
            other => Err(BuildError::InvalidSafetyStatus(other.to_string())),
        }
    }
}

/// Results of an external scan, attached to a build post-hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanResult {
    /// Raw report text
    Text(String),
    /// Report URL plus verdict
    External { url: String, status: SafetyStatus },
}

impl ScanResult {
    fn payload(&self) -> Value {
        let results = match self {
            ScanResult::Text(text) => Value::String(text.clone()),
            ScanResult::External { url, status } => json!({
                "url": url,
                "safety_status": status.as_str()
            }),
        };
        json!({
            "scan_status": "scanned",
            "scan_external_results": results
        })
    }
}

/// PUT a scan result to the build's scan sub-resource.
pub fn attach_scan_result(
    client: &RegistryClient,
    build_id: u64,
    result: &ScanResult,
) -> BuildResult<()> {
    let id = build_id.to_string();
    Logger::info("SCAN_RESULTS_SAVE", &[("build_id", &id)]);

    let path = format!("/api/v1/deployment/builds/{}/scan", build_id);
    client.put(&path, result.payload())?;
    Ok(())
}
