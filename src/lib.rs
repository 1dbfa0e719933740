//! promotectl - strict, deterministic build promotion tooling for ML model
//! registries
//!
//! Copies a registered model version and its latest self-contained build
//! from one registry instance to another, and provides standalone helpers
//! to create, scan, and wait on builds.

pub mod builds;
pub mod cli;
pub mod config;
pub mod observability;
pub mod promotion;
pub mod registry;
