//! End-to-end promotion against two in-process mock registries
//!
//! One mock plays the source instance, another the destination. The tests
//! drive the real blocking client through the full pipeline and assert on
//! the recorded requests and stored state of each side.

mod common;

use common::MockRegistry;
use serde_json::json;
use tempfile::TempDir;

use promotectl::config::{EnvironmentConfig, PromotionConfig};
use promotectl::promotion::{promote_in, PromotionError};

fn env_for(mock: &MockRegistry, workspace: &str) -> EnvironmentConfig {
    EnvironmentConfig {
        host: mock.host(),
        email: "ops@example.com".to_string(),
        dev_key: "test-key".to_string(),
        workspace: workspace.to_string(),
    }
}

fn config_for(source: &MockRegistry, dest: &MockRegistry) -> PromotionConfig {
    PromotionConfig {
        source: env_for(source, "staging"),
        source_model_version_id: 123,
        dest: env_for(dest, "production"),
        dest_registered_model_id: None,
        path_rewrite: None,
    }
}

/// Seed the source with model version 123, its registered model, a
/// self-contained build, and artifact bytes.
fn seed_source(source: &MockRegistry) {
    source.add_registered_model(
        9,
        json!({
            "id": 9,
            "name": "churn-model",
            "labels": ["prod-candidate"],
            "readme_text": "predicts churn"
        }),
    );
    source.add_model_version(
        123,
        json!({
            "id": 123,
            "registered_model_id": 9,
            "version": "v4",
            "labels": ["vision"],
            "environment": {"python": {"version": "3.10"}},
            "artifacts": [
                {"key": "weights", "path": "bucket/team/models/123/weights"}
            ],
            "model": {"key": "model", "path": "bucket/team/models/123/model"}
        }),
    );
    source.add_build(json!({
        "id": 1,
        "model_version_id": 123,
        "location": "ecr/images/churn:1",
        "status": "finished",
        "message": "built ok",
        "date_created": "2023-01-01T08:30:00.000Z",
        "creator_request": {
            "self_contained": true,
            "requires_root": false,
            "scan_external": false,
            "uses_flask": true
        }
    }));
    source.add_blob("weights", b"weight-bytes-0123456789");
    source.add_blob("model", b"serialized-model-bytes");
}

#[test]
fn test_promote_recreates_entities_and_bytes_on_destination() {
    let source = MockRegistry::spawn();
    let dest = MockRegistry::spawn();
    seed_source(&source);
    // A newer build that is not self-contained must never win.
    source.add_build(json!({
        "id": 2,
        "model_version_id": 123,
        "location": "ecr/images/churn:2",
        "status": "finished",
        "date_created": "2023-02-01T08:30:00.000Z",
        "creator_request": {"self_contained": false}
    }));

    let staging = TempDir::new().unwrap();
    let config = config_for(&source, &dest);
    let build = promote_in(&config, staging.path()).unwrap();

    // The new build copies the source build's flags and points back at the
    // self-contained image, not the newer non-self-contained one.
    let requests = dest.requests();
    let build_create = requests
        .iter()
        .find(|r| r.method == "POST" && r.path.ends_with("/builds"))
        .expect("build created on destination");
    let body = build_create.body.as_ref().unwrap();
    assert_eq!(body["external_location"], "ecr/images/churn:1");
    assert_eq!(body["self_contained"], true);
    assert_eq!(body["uses_flask"], true);
    assert_eq!(body["requires_root"], false);

    // The registered model is recreated in the destination workspace, with
    // the workspace name injected into the creation body.
    let model_create = requests
        .iter()
        .find(|r| r.path == "/api/v1/registry/workspaces/production/registered_models")
        .expect("registered model created on destination");
    let body = model_create.body.as_ref().unwrap();
    assert_eq!(body["name"], "churn-model");
    assert_eq!(body["workspaceName"], "production");

    // Artifact bytes round-trip exactly.
    assert_eq!(
        dest.blob("weights").as_deref(),
        Some(b"weight-bytes-0123456789".as_slice())
    );
    assert_eq!(
        dest.blob("model").as_deref(),
        Some(b"serialized-model-bytes".as_slice())
    );

    // The build message is replayed verbatim.
    let message = requests
        .iter()
        .find(|r| r.path == format!("/api/v1/deployment/builds/{}/message", build.id))
        .expect("build message set");
    assert_eq!(message.body, Some(json!("built ok")));
}

#[test]
fn test_promote_patches_model_artifact_with_uploaded_path() {
    let source = MockRegistry::spawn();
    let dest = MockRegistry::spawn();
    seed_source(&source);

    let staging = TempDir::new().unwrap();
    promote_in(&config_for(&source, &dest), staging.path()).unwrap();

    let patch = dest
        .requests()
        .into_iter()
        .find(|r| r.method == "PATCH")
        .expect("model artifact patched");
    let body = patch.body.unwrap();
    assert_eq!(body["model"]["key"], "model");
    // The patched path is the uploaded destination location, not the
    // source storage path.
    let path = body["model"]["path"].as_str().unwrap();
    assert!(path.ends_with("/blob/model"), "unexpected path {}", path);
}

#[test]
fn test_promote_commits_each_artifact_with_part_number_one() {
    let source = MockRegistry::spawn();
    let dest = MockRegistry::spawn();
    seed_source(&source);

    let staging = TempDir::new().unwrap();
    promote_in(&config_for(&source, &dest), staging.path()).unwrap();

    let commits: Vec<_> = dest
        .requests()
        .into_iter()
        .filter(|r| r.path.ends_with("/commitArtifactPart"))
        .collect();
    assert_eq!(commits.len(), 2);
    for commit in commits {
        let body = commit.body.unwrap();
        assert_eq!(body["artifact_part"]["part_number"], 1);
        assert!(body["artifact_part"]["etag"].as_str().unwrap().contains("etag-"));
    }
}

#[test]
fn test_promote_reuses_supplied_registered_model() {
    let source = MockRegistry::spawn();
    let dest = MockRegistry::spawn();
    seed_source(&source);
    dest.add_registered_model(
        55,
        json!({"id": 55, "name": "churn-model-prod", "labels": []}),
    );

    let staging = TempDir::new().unwrap();
    let mut config = config_for(&source, &dest);
    config.dest_registered_model_id = Some(55);
    promote_in(&config, staging.path()).unwrap();

    let requests = dest.requests();
    assert!(
        !requests
            .iter()
            .any(|r| r.method == "POST" && r.path.contains("/workspaces/")),
        "no registered model may be created when one is supplied"
    );
    assert!(requests
        .iter()
        .any(|r| r.path == "/api/v1/registry/registered_models/55/model_versions"));
}

#[test]
fn test_promote_without_self_contained_build_touches_nothing() {
    let source = MockRegistry::spawn();
    let dest = MockRegistry::spawn();
    seed_source(&source);
    // Replace the build list with only non-self-contained builds.
    {
        let mut state = source.state.lock().unwrap();
        state.build_list.clear();
        state.builds.clear();
    }
    source.add_build(json!({
        "id": 3,
        "model_version_id": 123,
        "location": "ecr/images/churn:3",
        "status": "finished",
        "date_created": "2023-03-01T00:00:00.000Z",
        "creator_request": {"self_contained": false}
    }));

    let staging = TempDir::new().unwrap();
    let err = promote_in(&config_for(&source, &dest), staging.path()).unwrap_err();

    assert!(matches!(
        err,
        PromotionError::NoSelfContainedBuild { model_version_id: 123 }
    ));
    assert_eq!(
        err.to_string(),
        "no self contained builds found for model version id 123, promotion stopped"
    );
    assert_eq!(dest.mutation_count(), 0);
    assert!(
        dest.requests().is_empty(),
        "destination must not be touched when promotion aborts"
    );
}
