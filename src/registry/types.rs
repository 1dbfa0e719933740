//! Typed records for the registry and deployment wire formats
//!
//! Entities deserialized from the registry keep their wire field names.
//! Creation payloads are separate `New*` records with explicit field lists,
//! so what gets copied between instances is visible in the type rather than
//! buried in a "copy these keys if present" helper.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named binary blob attached to a model version.
///
/// `path` is a storage-layer location, `key` is the logical name within the
/// model version. Downloaded files are named by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_extension: Option<String>,
}

/// Logical container for model versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredModel {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_permission: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_visibility: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One immutable snapshot of a model under a registered model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersion {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub registered_model_id: u64,
    pub version: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Value>,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    /// The serialized-model artifact entry, distinct from `artifacts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Terminal and non-terminal build states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Pending,
    Finished,
    Error,
    /// Any status this tool does not recognize; treated as still running.
    #[serde(other)]
    Other,
}

impl Default for BuildStatus {
    fn default() -> Self {
        BuildStatus::Pending
    }
}

impl BuildStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Finished | BuildStatus::Error)
    }
}

/// The request that created a build, echoed back by the deployment API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatorRequest {
    #[serde(default)]
    pub self_contained: bool,
    #[serde(default)]
    pub requires_root: bool,
    #[serde(default)]
    pub scan_external: bool,
    #[serde(default)]
    pub uses_flask: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_location: Option<String>,
}

/// A deployable, containerized packaging of one model version.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Build {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub model_version_id: u64,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub status: BuildStatus,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub creator_request: CreatorRequest,
}

// =============================================================================
// Creation payloads
// =============================================================================

/// Payload for creating a registered model on the destination.
#[derive(Debug, Clone, Serialize)]
pub struct NewRegisteredModel {
    pub name: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_permission: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub artifacts: Vec<Artifact>,
}

impl NewRegisteredModel {
    /// Copy the creatable fields of a source model, embedding the artifact
    /// metadata fetched alongside it.
    pub fn from_source(source: &RegisteredModel, artifacts: Vec<Artifact>) -> Self {
        Self {
            name: source.name.clone(),
            labels: source.labels.clone(),
            custom_permission: source.custom_permission.clone(),
            resource_visibility: source.resource_visibility.clone(),
            readme_text: source.readme_text.clone(),
            description: source.description.clone(),
            artifacts,
        }
    }
}

/// Payload for creating a model version on the destination.
///
/// Artifact metadata (not bytes) is embedded here; the bytes follow through
/// signed-URL uploads after the version exists.
#[derive(Debug, Clone, Serialize)]
pub struct NewModelVersion {
    pub version: String,
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<Value>,
    pub artifacts: Vec<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readme_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewModelVersion {
    pub fn from_source(source: &ModelVersion) -> Self {
        Self {
            version: source.version.clone(),
            labels: source.labels.clone(),
            attributes: source.attributes.clone(),
            environment: source.environment.clone(),
            artifacts: source.artifacts.clone(),
            model: source.model.clone(),
            readme_text: source.readme_text.clone(),
            description: source.description.clone(),
        }
    }
}

/// Payload for creating a build on the destination.
#[derive(Debug, Clone, Serialize)]
pub struct NewBuild {
    pub model_version_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_location: Option<String>,
    pub requires_root: bool,
    pub scan_external: bool,
    pub self_contained: bool,
    pub uses_flask: bool,
}

impl NewBuild {
    /// Copy the creator-request flags of a source build for a new model
    /// version, pointing at the source build's image location.
    pub fn from_source(source: &Build, model_version_id: u64, external_location: String) -> Self {
        let cr = &source.creator_request;
        Self {
            model_version_id,
            external_location: Some(external_location),
            requires_root: cr.requires_root,
            scan_external: cr.scan_external,
            self_contained: cr.self_contained,
            uses_flask: cr.uses_flask,
        }
    }
}

// =============================================================================
// Response envelopes and signed-URL exchange
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ModelVersionResponse {
    pub model_version: ModelVersion,
}

#[derive(Debug, Deserialize)]
pub struct RegisteredModelResponse {
    pub registered_model: RegisteredModel,
}

#[derive(Debug, Deserialize)]
pub struct BuildListResponse {
    #[serde(default)]
    pub builds: Vec<Build>,
}

/// Request for a time-limited, pre-authorized URL to one artifact's bytes.
#[derive(Debug, Clone, Serialize)]
pub struct SignedUrlRequest {
    pub method: String,
    pub model_version_id: u64,
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
}

impl SignedUrlRequest {
    pub fn get(model_version_id: u64, artifact: &Artifact) -> Self {
        Self {
            method: "GET".to_string(),
            model_version_id,
            key: artifact.key.clone(),
            artifact_type: artifact.artifact_type.clone(),
        }
    }

    pub fn put(model_version_id: u64, artifact: &Artifact) -> Self {
        Self {
            method: "PUT".to_string(),
            model_version_id,
            key: artifact.key.clone(),
            artifact_type: artifact.artifact_type.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignedUrlResponse {
    pub url: String,
}
