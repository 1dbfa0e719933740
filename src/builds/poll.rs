//! Build status polling
//!
//! Repeatedly GETs a build at a fixed interval until it reaches a terminal
//! status. The loop is bounded by an explicit deadline; an operator who
//! wants the old wait-forever behavior can pass a very large timeout, but
//! never gets one implicitly.

use std::thread;
use std::time::{Duration, Instant};

use crate::observability::Logger;
use crate::registry::{Build, BuildStatus, RegistryClient};

use super::errors::{BuildError, BuildResult};
use super::helpers::get_build;

/// How often to poll and how long to keep trying.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Wait until the build reaches `finished`, or fail on `error` status or
/// deadline expiry.
pub fn wait_for_build(
    client: &RegistryClient,
    build_id: u64,
    policy: PollPolicy,
) -> BuildResult<Build> {
    let id = build_id.to_string();
    let start = Instant::now();

    let mut build = get_build(client, build_id)?;
    loop {
        match build.status {
            BuildStatus::Finished => {
                Logger::info("BUILD_FINISHED", &[("build_id", &id)]);
                return Ok(build);
            }
            BuildStatus::Error => {
                return Err(BuildError::BuildFailed {
                    build_id,
                    message: build.message,
                });
            }
            _ => {
                let waited = start.elapsed();
                if waited >= policy.timeout {
                    return Err(BuildError::PollDeadlineExceeded { build_id, waited });
                }
                Logger::info("BUILD_WAITING", &[("build_id", &id)]);
                thread::sleep(policy.interval);
                build = get_build(client, build_id)?;
            }
        }
    }
}
