//! Promotion error types
//!
//! Domain failures are explicit; transport failures propagate from the
//! registry layer unchanged. If promotion cannot proceed safely it fails
//! before the destination is touched.

use thiserror::Error;

use crate::registry::RegistryError;

/// Result type for promotion operations
pub type PromotionResult<T> = Result<T, PromotionError>;

/// Promotion pipeline errors
#[derive(Debug, Error)]
pub enum PromotionError {
    /// No self-contained build exists for the model version
    #[error("no self contained builds found for model version id {model_version_id}, promotion stopped")]
    NoSelfContainedBuild { model_version_id: u64 },

    /// A build carried a creation timestamp this tool cannot parse
    #[error("build {build_id} has unparseable date_created '{value}'")]
    BadTimestamp { build_id: u64, value: String },

    /// The artifact bytes could not be stored on the destination
    #[error("failed to put artifact '{key}' at {url}: {source}")]
    ArtifactUploadFailed {
        key: String,
        url: String,
        #[source]
        source: RegistryError,
    },

    /// The post-upload verification GET did not succeed
    #[error("failed to verify artifact '{key}' upload at URL {url}")]
    ArtifactVerifyFailed { key: String, url: String },

    /// The created model version exposes neither a 'model' nor a
    /// 'model.pkl' artifact path to patch
    #[error("no uploaded path found for the model artifact (expected key 'model' or 'model.pkl')")]
    MissingModelArtifactPath,

    /// The local staging directory could not be resolved
    #[error("cannot resolve artifact staging directory: {reason}")]
    Staging { reason: String },

    /// Transport or decode failure from either registry instance
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
