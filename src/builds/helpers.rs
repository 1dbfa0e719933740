//! Create and inspect builds

use serde_json::json;

use crate::observability::Logger;
use crate::registry::{decode, Build, RegistryClient};

use super::errors::BuildResult;

/// POST a self-contained build request for a model version; returns the
/// new build's id.
pub fn create_build(client: &RegistryClient, model_version_id: u64) -> BuildResult<u64> {
    let mv_id = model_version_id.to_string();
    Logger::info("BUILD_CREATE", &[("model_version_id", &mv_id)]);

    let path = format!("/api/v1/deployment/workspace/{}/builds", client.workspace());
    let body = json!({
        "model_version_id": model_version_id,
        "self_contained": true
    });
    let value = client.post(&path, body)?;
    let build: Build = decode(&path, value)?;
    Ok(build.id)
}

/// GET one build.
pub fn get_build(client: &RegistryClient, build_id: u64) -> BuildResult<Build> {
    let path = format!("/api/v1/deployment/builds/{}", build_id);
    let value = client.get(&path)?;
    Ok(decode(&path, value)?)
}

/// Mark a build as externally scanned.
pub fn mark_external(client: &RegistryClient, build_id: u64) -> BuildResult<()> {
    let id = build_id.to_string();
    Logger::info("BUILD_MARK_EXTERNAL", &[("build_id", &id)]);

    let path = format!("/api/v1/deployment/builds/{}/scan", build_id);
    client.put(&path, json!({ "scan_external": true }))?;
    Ok(())
}
