//! Promotion fetcher
//!
//! Reads everything a promotion needs from the source instance before the
//! destination is touched. If no self-contained build exists the whole
//! promotion terminates here, which is safe: nothing has been written yet.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::observability::Logger;
use crate::registry::{
    decode, Artifact, Build, BuildListResponse, ModelVersion, ModelVersionResponse,
    RegisteredModel, RegisteredModelResponse, RegistryClient,
};

use super::errors::{PromotionError, PromotionResult};
use super::transfer::download_artifact;

const DATE_CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Everything fetched from the source that the writer needs.
#[derive(Debug)]
pub struct PromotionData {
    pub build: Build,
    pub model_version: ModelVersion,
    pub model: RegisteredModel,
    /// Metadata of the downloaded artifacts (bytes are on local disk,
    /// named by key).
    pub artifacts: Vec<Artifact>,
}

/// Fetch the model version, its registered model, its latest self-contained
/// build, and all artifact bytes (staged under `staging`).
pub fn fetch(
    client: &RegistryClient,
    model_version_id: u64,
    staging: &Path,
) -> PromotionResult<PromotionData> {
    let mv_id = model_version_id.to_string();
    Logger::info("FETCH_STARTED", &[("model_version_id", &mv_id)]);

    let model_version = get_model_version(client, model_version_id)?;

    let builds = list_builds(client, model_version_id)?;
    let build = latest_self_contained(&builds)?
        .ok_or(PromotionError::NoSelfContainedBuild { model_version_id })?
        .clone();
    let build_id = build.id.to_string();
    Logger::info(
        "BUILD_SELECTED",
        &[
            ("build_id", &build_id),
            ("date_created", &build.date_created),
            ("model_version_id", &mv_id),
        ],
    );

    let model = get_registered_model(client, model_version.registered_model_id)?;

    let artifacts = download_artifacts(client, &model_version, staging)?;

    Ok(PromotionData {
        build,
        model_version,
        model,
        artifacts,
    })
}

/// Select the self-contained build with the greatest `date_created`.
///
/// Non-self-contained builds never win, even when newer. Comparison is
/// strict, so the first build seen wins a timestamp tie; the scan order is
/// whatever the server returned.
pub fn latest_self_contained(builds: &[Build]) -> PromotionResult<Option<&Build>> {
    let mut selected: Option<(&Build, NaiveDateTime)> = None;
    for build in builds {
        if !build.creator_request.self_contained {
            continue;
        }
        let created = NaiveDateTime::parse_from_str(&build.date_created, DATE_CREATED_FORMAT)
            .map_err(|_| PromotionError::BadTimestamp {
                build_id: build.id,
                value: build.date_created.clone(),
            })?;
        match selected {
            Some((_, latest)) if created > latest => selected = Some((build, created)),
            None => selected = Some((build, created)),
            _ => {}
        }
    }
    Ok(selected.map(|(build, _)| build))
}

pub(crate) fn get_model_version(
    client: &RegistryClient,
    id: u64,
) -> PromotionResult<ModelVersion> {
    let path = format!("/api/v1/registry/model_versions/{}", id);
    let value = client.get(&path)?;
    let envelope: ModelVersionResponse = decode(&path, value)?;
    Ok(envelope.model_version)
}

pub(crate) fn get_registered_model(
    client: &RegistryClient,
    id: u64,
) -> PromotionResult<RegisteredModel> {
    let path = format!("/api/v1/registry/registered_models/{}", id);
    let value = client.get(&path)?;
    let envelope: RegisteredModelResponse = decode(&path, value)?;
    Ok(envelope.registered_model)
}

fn list_builds(client: &RegistryClient, model_version_id: u64) -> PromotionResult<Vec<Build>> {
    let path = format!(
        "/api/v1/deployment/builds/?workspaceName={}&model_version_id={}",
        client.workspace(),
        model_version_id
    );
    let value = client.get(&path)?;
    let envelope: BuildListResponse = decode(&path, value)?;
    Ok(envelope.builds)
}

/// Download every artifact plus the model's own artifact entry.
fn download_artifacts(
    client: &RegistryClient,
    model_version: &ModelVersion,
    staging: &Path,
) -> PromotionResult<Vec<Artifact>> {
    let count = model_version.artifacts.len().to_string();
    Logger::info("ARTIFACT_DOWNLOADS_STARTED", &[("count", &count)]);

    let mut downloaded = Vec::with_capacity(model_version.artifacts.len());
    for artifact in &model_version.artifacts {
        download_artifact(client, model_version.id, artifact, staging)?;
        downloaded.push(artifact.clone());
    }

    // The serialized model is an artifact in its own right, just not listed
    // under `artifacts`.
    if let Some(model_artifact) = &model_version.model {
        download_artifact(client, model_version.id, model_artifact, staging)?;
    }

    Ok(downloaded)
}
