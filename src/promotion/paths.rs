//! Artifact storage path handling
//!
//! Artifacts of one model version share a common storage prefix. When a
//! version crosses storage environments the environment-specific segment of
//! that prefix is rewritten with a pure string substitution before upload.

use crate::registry::Artifact;

/// A source->destination prefix substitution applied to artifact base paths.
///
/// The substitution replaces the first occurrence of `from`. Once the
/// target prefix is in place the source prefix no longer occurs, so
/// applying the rewrite again is a no-op.
#[derive(Debug, Clone)]
pub struct PathRewrite {
    from: String,
    to: String,
}

impl PathRewrite {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn apply(&self, path: &str) -> String {
        path.replacen(&self.from, &self.to, 1)
    }
}

/// The storage base path shared by a version's artifacts: the first
/// artifact's path with its leading segment (bucket) and trailing segment
/// (file name) stripped.
///
/// Returns `None` for an empty artifact set; there is no path to derive.
pub fn base_artifact_path(artifacts: &[Artifact]) -> Option<String> {
    let first = artifacts.first()?;
    let segments: Vec<&str> = first.path.split('/').collect();
    if segments.len() <= 2 {
        return Some(String::new());
    }
    Some(segments[1..segments.len() - 1].join("/"))
}
