//! CLI-specific error types
//!
//! Every failure surfaces to the invoking process or CI job as a nonzero
//! exit; nothing is swallowed silently.

use std::fmt;

use crate::builds::BuildError;
use crate::config::ConfigError;
use crate::promotion::PromotionError;
use crate::registry::RegistryError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Malformed or missing command arguments
    Usage,
    /// Environment configuration error
    ConfigError,
    /// HTTP transport failure
    TransportError,
    /// Promotion pipeline failure
    PromotionError,
    /// Build helper failure
    BuildError,
    /// Local file I/O failure
    IoError,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usage => "PCTL_USAGE_ERROR",
            Self::ConfigError => "PCTL_CONFIG_ERROR",
            Self::TransportError => "PCTL_TRANSPORT_ERROR",
            Self::PromotionError => "PCTL_PROMOTION_ERROR",
            Self::BuildError => "PCTL_BUILD_ERROR",
            Self::IoError => "PCTL_IO_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Usage, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e.to_string())
    }
}

impl From<RegistryError> for CliError {
    fn from(e: RegistryError) -> Self {
        Self::new(CliErrorCode::TransportError, e.to_string())
    }
}

impl From<PromotionError> for CliError {
    fn from(e: PromotionError) -> Self {
        Self::new(CliErrorCode::PromotionError, e.to_string())
    }
}

impl From<BuildError> for CliError {
    fn from(e: BuildError) -> Self {
        match e {
            BuildError::InvalidSafetyStatus(_) => Self::new(CliErrorCode::Usage, e.to_string()),
            other => Self::new(CliErrorCode::BuildError, other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(CliErrorCode::IoError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
