//! Promotion writer
//!
//! Recreates the fetched entities on the destination instance, in order:
//! registered model (unless one was supplied), model version (metadata
//! before bytes), artifact bytes, the model-artifact path patch, and
//! finally the build plus its message.
//!
//! Any step failing raises immediately. No rollback is attempted: a
//! half-created model version on the destination is an accepted, manually
//! cleaned up failure mode, since this tool never deletes anything.

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::json;

use crate::observability::Logger;
use crate::registry::{
    decode, Build, ModelVersion, ModelVersionResponse, NewBuild, NewModelVersion,
    NewRegisteredModel, RegisteredModel, RegisteredModelResponse, RegistryClient,
};

use super::errors::{PromotionError, PromotionResult};
use super::fetcher::{get_registered_model, PromotionData};
use super::paths::PathRewrite;
use super::transfer::upload_artifacts;

/// Destination-side knobs for one promotion.
#[derive(Debug, Clone, Default)]
pub struct DestinationOptions {
    /// Reuse this registered model instead of creating one.
    pub registered_model_id: Option<u64>,
    /// Rewrite artifact base paths across storage environments.
    pub path_rewrite: Option<PathRewrite>,
}

/// Write the fetched promotion data to the destination and return the
/// created build.
pub fn write(
    client: &RegistryClient,
    options: &DestinationOptions,
    data: PromotionData,
    staging: &Path,
) -> PromotionResult<Build> {
    Logger::info("PROMOTION_WRITE_STARTED", &[("workspace", client.workspace())]);

    // The build image itself stays where it is; the destination build
    // points at the source location. Re-hosting the image only matters
    // when the two environments use different image stores.
    let build_location = data.build.location.clone();

    let model = match options.registered_model_id {
        Some(id) => {
            let model = get_registered_model(client, id)?;
            Logger::info("REGISTERED_MODEL_REUSED", &[("name", &model.name)]);
            model
        }
        None => create_model(client, &data.model, &data)?,
    };

    let model_version = create_model_version(client, &data.model_version, &model)?;

    // Upload the downloaded artifacts plus the serialized model the created
    // version points at.
    let mut to_upload = data.artifacts.clone();
    if let Some(model_artifact) = &model_version.model {
        to_upload.push(model_artifact.clone());
    }
    let uploaded = upload_artifacts(
        client,
        model_version.id,
        &mut to_upload,
        options.path_rewrite.as_ref(),
        staging,
    )?;

    patch_model_artifact(client, &model, &model_version, &uploaded)?;

    let build = create_build(client, &data.build, model_version.id, build_location)?;
    update_build_message(client, &data.build, &build)?;

    Ok(build)
}

fn create_model(
    client: &RegistryClient,
    source: &RegisteredModel,
    data: &PromotionData,
) -> PromotionResult<RegisteredModel> {
    Logger::info("REGISTERED_MODEL_CREATE", &[("name", &source.name)]);
    let path = format!(
        "/api/v1/registry/workspaces/{}/registered_models",
        client.workspace()
    );
    let payload = NewRegisteredModel::from_source(source, data.artifacts.clone());
    let body = serde_json::to_value(&payload).expect("registered model payload serializes");
    let value = client.post(&path, body)?;
    let envelope: RegisteredModelResponse = decode(&path, value)?;
    Ok(envelope.registered_model)
}

fn create_model_version(
    client: &RegistryClient,
    source: &ModelVersion,
    model: &RegisteredModel,
) -> PromotionResult<ModelVersion> {
    Logger::info("MODEL_VERSION_CREATE", &[("version", &source.version)]);
    let path = format!(
        "/api/v1/registry/registered_models/{}/model_versions",
        model.id
    );
    let payload = NewModelVersion::from_source(source);
    let body = serde_json::to_value(&payload).expect("model version payload serializes");
    let value = client.post(&path, body)?;
    let envelope: ModelVersionResponse = decode(&path, value)?;
    Ok(envelope.model_version)
}

/// Point the created version's model artifact at its uploaded path.
///
/// Standard model versions expose the serialized model under the key
/// `model`; versions converted from experiment runs expose `model.pkl`.
/// Whichever key was uploaded is the one to patch in.
fn patch_model_artifact(
    client: &RegistryClient,
    model: &RegisteredModel,
    model_version: &ModelVersion,
    uploaded: &BTreeMap<String, String>,
) -> PromotionResult<()> {
    let uploaded_path = uploaded_model_path(uploaded).ok_or(PromotionError::MissingModelArtifactPath)?;

    let mut model_artifact = model_version
        .model
        .clone()
        .ok_or(PromotionError::MissingModelArtifactPath)?;
    model_artifact.path = uploaded_path.to_string();

    let mv_id = model_version.id.to_string();
    Logger::info("MODEL_ARTIFACT_PATCH", &[("model_version_id", &mv_id)]);
    let path = format!(
        "/api/v1/registry/registered_models/{}/model_versions/{}",
        model.id, model_version.id
    );
    let update = json!({ "model": model_artifact });
    client.patch(&path, update)?;
    Ok(())
}

pub(crate) fn uploaded_model_path(uploaded: &BTreeMap<String, String>) -> Option<&String> {
    uploaded.get("model").or_else(|| uploaded.get("model.pkl"))
}

fn create_build(
    client: &RegistryClient,
    source: &Build,
    model_version_id: u64,
    external_location: String,
) -> PromotionResult<Build> {
    let mv_id = model_version_id.to_string();
    Logger::info("BUILD_CREATE", &[("model_version_id", &mv_id)]);
    let path = format!("/api/v1/deployment/workspace/{}/builds", client.workspace());
    let payload = NewBuild::from_source(source, model_version_id, external_location);
    let body = serde_json::to_value(&payload).expect("build payload serializes");
    let value = client.post(&path, body)?;
    decode(&path, value).map_err(PromotionError::from)
}

fn update_build_message(
    client: &RegistryClient,
    source: &Build,
    dest: &Build,
) -> PromotionResult<()> {
    let size = source.message.len().to_string();
    Logger::info("BUILD_MESSAGE_SET", &[("bytes", &size)]);
    let path = format!("/api/v1/deployment/builds/{}/message", dest.id);
    client.put(&path, json!(source.message))?;
    Ok(())
}
