//! Registry transport error types
//!
//! A non-2xx response is surfaced on first occurrence with its status code
//! and body text; there is no retry layer.

use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry transport errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The server answered with a non-2xx status
    #[error("registry returned {status} for {url}: {body}")]
    Transport {
        status: u16,
        url: String,
        body: String,
    },

    /// The request never produced a response (DNS, connect, timeout)
    #[error("request to registry failed: {0}")]
    Connection(#[from] reqwest::Error),

    /// A 2xx response body could not be decoded as the expected JSON shape
    #[error("failed to decode registry response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Local file I/O during artifact transfer
    #[error("artifact I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// HTTP status of a transport error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RegistryError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
