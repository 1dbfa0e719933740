//! Build promotion pipeline
//!
//! Copies a model version and its latest self-contained build from a source
//! registry instance to a destination instance:
//!
//! 1. Fetcher — read the model version, its registered model, and its
//!    builds; select the latest self-contained build; download all
//!    artifact bytes locally.
//! 2. Writer — recreate the registered model (unless one was supplied),
//!    the model version, and the build on the destination, driving the
//!    artifact transfer in between.
//!
//! The pipeline never deletes data on either side and attempts no rollback:
//! a failure mid-write leaves partial destination state for an operator to
//! inspect. Everything is sequential; failure attribution is per artifact.

mod errors;
mod fetcher;
mod paths;
mod transfer;
mod writer;

pub use errors::{PromotionError, PromotionResult};
pub use fetcher::{fetch, latest_self_contained, PromotionData};
pub use paths::{base_artifact_path, PathRewrite};
pub use transfer::{download_artifact, upload_artifact, upload_artifacts};
pub use writer::{write, DestinationOptions};

use std::path::Path;

use uuid::Uuid;

use crate::config::PromotionConfig;
use crate::observability::Logger;
use crate::registry::{Build, RegistryClient};

/// Run the full promotion pipeline described by `config`, staging artifact
/// bytes in the current working directory.
pub fn promote(config: &PromotionConfig) -> PromotionResult<Build> {
    let staging = std::env::current_dir().map_err(|e| PromotionError::Staging {
        reason: e.to_string(),
    })?;
    promote_in(config, &staging)
}

/// Run the full promotion pipeline, staging artifact bytes in `staging`.
pub fn promote_in(config: &PromotionConfig, staging: &Path) -> PromotionResult<Build> {
    // One correlation id per run, carried through the structured log stream
    // so interleaved CI runs stay attributable.
    let run_id = Uuid::new_v4().to_string();
    let mv_id = config.source_model_version_id.to_string();
    Logger::info(
        "PROMOTION_STARTED",
        &[("model_version_id", &mv_id), ("run_id", &run_id)],
    );

    let source = RegistryClient::new(config.source.auth())?;
    let dest = RegistryClient::new(config.dest.auth())?;

    let data = fetch(&source, config.source_model_version_id, staging)?;

    let options = DestinationOptions {
        registered_model_id: config.dest_registered_model_id,
        path_rewrite: config.path_rewrite.clone(),
    };
    let build = write(&dest, &options, data, staging)?;

    let build_id = build.id.to_string();
    Logger::info(
        "PROMOTION_COMPLETE",
        &[("build_id", &build_id), ("run_id", &run_id)],
    );
    Ok(build)
}
