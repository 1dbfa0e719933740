//! Configuration for promotectl
//!
//! All configuration comes from environment variables, parsed once at
//! process start into explicit structs that are passed by reference into
//! each component. Nothing here is global; tests supply fixture lookups
//! instead of mutating the process environment.
//!
//! Promotion (mandatory unless noted):
//! - VERTA_SOURCE_MODEL_VERSION_ID
//! - VERTA_SOURCE_HOST / VERTA_SOURCE_EMAIL / VERTA_SOURCE_DEV_KEY
//! - VERTA_SOURCE_WORKSPACE (falls back to VERTA_SOURCE_WORKSPACE_0)
//! - VERTA_DEST_HOST / VERTA_DEST_EMAIL / VERTA_DEST_DEV_KEY
//! - VERTA_DEST_WORKSPACE
//! - VERTA_DEST_REGISTERED_MODEL_ID (optional; reuse instead of create)
//! - VERTA_SOURCE_PATH_PREFIX / VERTA_DEST_PATH_PREFIX (optional pair;
//!   rewrites artifact storage paths across environments)
//!
//! Helper commands (create-build, scan, wait):
//! - VERTA_HOST / VERTA_EMAIL / VERTA_DEV_KEY / VERTA_WORKSPACE

use thiserror::Error;

use crate::promotion::PathRewrite;
use crate::registry::AuthContext;

/// Configuration errors
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A mandatory environment variable is absent or empty
    #[error("missing environment variable {0}")]
    MissingVar(String),

    /// An environment variable is present but malformed
    #[error("invalid value for {name}: {reason}")]
    InvalidVar { name: String, reason: String },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// One registry/deployment instance and the caller's identity on it.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub host: String,
    pub email: String,
    pub dev_key: String,
    pub workspace: String,
}

impl EnvironmentConfig {
    /// Build the reusable auth context for this instance.
    pub fn auth(&self) -> AuthContext {
        AuthContext::new(&self.host, &self.email, &self.dev_key, &self.workspace)
    }
}

/// Full configuration for one promotion run.
#[derive(Debug, Clone)]
pub struct PromotionConfig {
    pub source: EnvironmentConfig,
    pub source_model_version_id: u64,
    pub dest: EnvironmentConfig,
    /// When present, the destination registered model is reused verbatim
    /// instead of being created.
    pub dest_registered_model_id: Option<u64>,
    /// When present, artifact base paths are rewritten source->dest before
    /// upload.
    pub path_rewrite: Option<PathRewrite>,
}

impl PromotionConfig {
    /// Load promotion configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Load promotion configuration through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let source_workspace = lookup("VERTA_SOURCE_WORKSPACE")
            .or_else(|| lookup("VERTA_SOURCE_WORKSPACE_0"))
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::MissingVar("VERTA_SOURCE_WORKSPACE".to_string()))?;

        let source = EnvironmentConfig {
            host: required(&lookup, "VERTA_SOURCE_HOST")?,
            email: required(&lookup, "VERTA_SOURCE_EMAIL")?,
            dev_key: required(&lookup, "VERTA_SOURCE_DEV_KEY")?,
            workspace: source_workspace,
        };
        let dest = EnvironmentConfig {
            host: required(&lookup, "VERTA_DEST_HOST")?,
            email: required(&lookup, "VERTA_DEST_EMAIL")?,
            dev_key: required(&lookup, "VERTA_DEST_DEV_KEY")?,
            workspace: required(&lookup, "VERTA_DEST_WORKSPACE")?,
        };

        let source_model_version_id =
            parse_id(&required(&lookup, "VERTA_SOURCE_MODEL_VERSION_ID")?, "VERTA_SOURCE_MODEL_VERSION_ID")?;

        let dest_registered_model_id = match lookup("VERTA_DEST_REGISTERED_MODEL_ID") {
            Some(v) if !v.is_empty() => Some(parse_id(&v, "VERTA_DEST_REGISTERED_MODEL_ID")?),
            _ => None,
        };

        // The rewrite only applies when both prefixes are configured; a lone
        // prefix is a configuration mistake.
        let source_prefix = lookup("VERTA_SOURCE_PATH_PREFIX").filter(|v| !v.is_empty());
        let dest_prefix = lookup("VERTA_DEST_PATH_PREFIX").filter(|v| !v.is_empty());
        let path_rewrite = match (source_prefix, dest_prefix) {
            (Some(from), Some(to)) => Some(PathRewrite::new(from, to)),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::InvalidVar {
                    name: "VERTA_DEST_PATH_PREFIX".to_string(),
                    reason: "required when VERTA_SOURCE_PATH_PREFIX is set".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigError::InvalidVar {
                    name: "VERTA_SOURCE_PATH_PREFIX".to_string(),
                    reason: "required when VERTA_DEST_PATH_PREFIX is set".to_string(),
                })
            }
        };

        Ok(Self {
            source,
            source_model_version_id,
            dest,
            dest_registered_model_id,
            path_rewrite,
        })
    }
}

/// Configuration for the standalone build/scan helper commands, which talk
/// to a single instance.
#[derive(Debug, Clone)]
pub struct HelperConfig {
    pub env: EnvironmentConfig,
}

impl HelperConfig {
    /// Load helper configuration from the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Load helper configuration through an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            env: EnvironmentConfig {
                host: required(&lookup, "VERTA_HOST")?,
                email: required(&lookup, "VERTA_EMAIL")?,
                dev_key: required(&lookup, "VERTA_DEV_KEY")?,
                workspace: required(&lookup, "VERTA_WORKSPACE")?,
            },
        })
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn required<F>(lookup: &F, name: &str) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(name.to_string()))
}

fn parse_id(value: &str, name: &str) -> ConfigResult<u64> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
        name: name.to_string(),
        reason: format!("'{}' is not an integer id", value),
    })
}
