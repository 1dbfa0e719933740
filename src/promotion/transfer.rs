//! Artifact transfer through signed URLs
//!
//! Downloads resolve a signed GET URL and stream bytes to a file named by
//! the artifact's key. Uploads resolve a signed PUT URL, stream the local
//! file in one request, verify with a follow-up signed GET, and commit an
//! ETag-bearing part record with a fixed part number of 1 (single-part
//! transfer; large artifacts are a known scaling limit).
//!
//! Transfers are strictly sequential, one artifact at a time, so failure
//! attribution is always per artifact key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::observability::Logger;
use crate::registry::{decode, Artifact, RegistryClient, SignedUrlRequest, SignedUrlResponse};

use super::errors::{PromotionError, PromotionResult};
use super::paths::{base_artifact_path, PathRewrite};

/// Resolve the signed URL for one artifact.
fn signed_artifact_url(
    client: &RegistryClient,
    model_version_id: u64,
    request: &SignedUrlRequest,
) -> PromotionResult<String> {
    let path = format!(
        "/api/v1/registry/model_versions/{}/getUrlForArtifact",
        model_version_id
    );
    let body = serde_json::to_value(request).expect("signed url request serializes");
    let value = client.post(&path, body)?;
    let envelope: SignedUrlResponse = decode(&path, value)?;
    Ok(envelope.url)
}

/// Download one artifact's bytes into `staging`, named by key.
pub fn download_artifact(
    client: &RegistryClient,
    model_version_id: u64,
    artifact: &Artifact,
    staging: &Path,
) -> PromotionResult<PathBuf> {
    let request = SignedUrlRequest::get(model_version_id, artifact);
    let url = signed_artifact_url(client, model_version_id, &request)?;

    let dest = staging.join(&artifact.key);
    client.download_to(&url, &dest)?;
    Logger::info("ARTIFACT_DOWNLOADED", &[("key", &artifact.key)]);
    Ok(dest)
}

/// Upload one artifact's bytes from `staging` and commit the part record.
///
/// Returns the signed PUT URL, which the writer records as the uploaded
/// path of the artifact.
pub fn upload_artifact(
    client: &RegistryClient,
    model_version_id: u64,
    artifact: &Artifact,
    staging: &Path,
) -> PromotionResult<String> {
    let key = &artifact.key;

    let put_url = signed_artifact_url(
        client,
        model_version_id,
        &SignedUrlRequest::put(model_version_id, artifact),
    )?;

    let local = staging.join(key);
    let etag = client
        .upload_file(&put_url, &local)
        .map_err(|source| PromotionError::ArtifactUploadFailed {
            key: key.clone(),
            url: put_url.clone(),
            source,
        })?;
    Logger::info("ARTIFACT_UPLOADED", &[("key", key)]);

    // The upload only counts once the object is readable back.
    let check_url = signed_artifact_url(
        client,
        model_version_id,
        &SignedUrlRequest::get(model_version_id, artifact),
    )?;
    client
        .probe(&check_url)
        .map_err(|_| PromotionError::ArtifactVerifyFailed {
            key: key.clone(),
            url: check_url.clone(),
        })?;

    commit_artifact_part(client, model_version_id, key, &etag)?;
    Logger::info("ARTIFACT_COMMITTED", &[("etag", &etag), ("key", key)]);

    Ok(put_url)
}

/// Upload a set of artifacts sequentially, rewriting their shared base path
/// first when a cross-environment rewrite is configured.
///
/// Returns the uploaded path (signed PUT URL) per artifact key.
pub fn upload_artifacts(
    client: &RegistryClient,
    model_version_id: u64,
    artifacts: &mut [Artifact],
    rewrite: Option<&PathRewrite>,
    staging: &Path,
) -> PromotionResult<BTreeMap<String, String>> {
    let count = artifacts.len().to_string();
    Logger::info("ARTIFACT_UPLOADS_STARTED", &[("count", &count)]);

    if let Some(base) = base_artifact_path(artifacts) {
        let base = match rewrite {
            Some(rewrite) => rewrite.apply(&base),
            None => base,
        };
        for artifact in artifacts.iter_mut() {
            artifact.path = base.clone();
        }
    }

    let mut uploaded = BTreeMap::new();
    for artifact in artifacts.iter() {
        let put_url = upload_artifact(client, model_version_id, artifact, staging)?;
        uploaded.insert(artifact.key.clone(), put_url);
    }
    Ok(uploaded)
}

fn commit_artifact_part(
    client: &RegistryClient,
    model_version_id: u64,
    key: &str,
    etag: &str,
) -> PromotionResult<()> {
    let path = format!(
        "/api/v1/registry/model_versions/{}/commitArtifactPart",
        model_version_id
    );
    let commit = json!({
        "artifact_part": {
            "etag": etag,
            "part_number": 1
        },
        "key": key,
        "model_version_id": model_version_id
    });
    client.post(&path, commit)?;
    Ok(())
}
