//! Build helper error types

use std::time::Duration;

use thiserror::Error;

use crate::registry::RegistryError;

/// Result type for build helper operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Build helper errors
#[derive(Debug, Error)]
pub enum BuildError {
    /// The build reached `error` status; carries the server-supplied message
    #[error("build {build_id} failed with message: {message}")]
    BuildFailed { build_id: u64, message: String },

    /// The build did not reach a terminal status within the poll deadline
    #[error("build {build_id} not finished after {waited:?}, giving up")]
    PollDeadlineExceeded { build_id: u64, waited: Duration },

    /// A scan verdict other than exactly "safe" or "unsafe"
    #[error("invalid safety status '{0}': must be exactly \"safe\" or \"unsafe\"")]
    InvalidSafetyStatus(String),

    /// Transport or decode failure from the deployment API
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
