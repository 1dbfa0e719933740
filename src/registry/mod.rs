//! Registry access layer
//!
//! - Auth contexts are immutable per-instance credential bundles; a source
//!   and a destination context always coexist and are never conflated.
//! - The client is a thin set of HTTP verb wrappers: JSON in, JSON out,
//!   transport error carrying status code and body text on any non-2xx.
//! - Entities are explicit typed records rather than ad hoc JSON maps.

mod auth;
mod client;
mod errors;
mod types;

pub use auth::AuthContext;
pub use client::{decode, RegistryClient};
pub use errors::{RegistryError, RegistryResult};
pub use types::{
    Artifact, Build, BuildListResponse, BuildStatus, CreatorRequest, ModelVersion,
    ModelVersionResponse, NewBuild, NewModelVersion, NewRegisteredModel, RegisteredModel,
    RegisteredModelResponse, SignedUrlRequest, SignedUrlResponse,
};
