//! Per-environment auth context
//!
//! One context per registry instance: base URL plus the gRPC-metadata auth
//! headers every call carries. Immutable after construction so a source and
//! a destination context can never bleed headers into each other.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

/// Identifies one registry/deployment instance and the caller on it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    host: String,
    email: String,
    dev_key: String,
    workspace: String,
}

impl AuthContext {
    pub fn new(host: &str, email: &str, dev_key: &str, workspace: &str) -> Self {
        Self {
            host: host.to_string(),
            email: email.to_string(),
            dev_key: dev_key.to_string(),
            workspace: workspace.to_string(),
        }
    }

    /// The workspace this context operates in.
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Absolute URL for an API path on this instance.
    ///
    /// Hosts are normally bare hostnames and get an https scheme; a host
    /// given with an explicit scheme is used verbatim so local instances
    /// can be addressed over plain http.
    pub fn url(&self, path: &str) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            format!("{}{}", self.host, path)
        } else {
            format!("https://{}{}", self.host, path)
        }
    }

    /// The auth headers carried by every registry call.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("grpc-metadata-scheme"),
            HeaderValue::from_static("https"),
        );
        headers.insert(
            HeaderName::from_static("grpc-metadata-source"),
            HeaderValue::from_static("promotectl"),
        );
        headers.insert(
            HeaderName::from_static("grpc-metadata-email"),
            HeaderValue::from_str(&self.email).unwrap_or(HeaderValue::from_static("")),
        );
        headers.insert(
            HeaderName::from_static("grpc-metadata-developer_key"),
            HeaderValue::from_str(&self.dev_key).unwrap_or(HeaderValue::from_static("")),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}
