//! Thin HTTP verb wrappers over one registry instance
//!
//! Each verb serializes a JSON body, parses the response JSON on 2xx, and
//! raises a transport error carrying the status code and response body text
//! on any other status. PUT tolerates an empty body (some sub-resources
//! answer 200 with no content). There is no retry: the first non-2xx is
//! surfaced to the caller.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderValue, CONTENT_TYPE, ETAG};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::auth::AuthContext;
use super::errors::{RegistryError, RegistryResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one registry instance.
pub struct RegistryClient {
    http: Client,
    auth: AuthContext,
}

impl RegistryClient {
    pub fn new(auth: AuthContext) -> RegistryResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, auth })
    }

    pub fn workspace(&self) -> &str {
        self.auth.workspace()
    }

    pub fn url(&self, path: &str) -> String {
        self.auth.url(path)
    }

    /// GET a path, expecting JSON back.
    pub fn get(&self, path: &str) -> RegistryResult<Value> {
        let url = self.auth.url(path);
        let res = self
            .http
            .get(&url)
            .headers(self.auth.headers())
            .send()?;
        let res = ensure_success(res, &url)?;
        decode_json(res, &url)
    }

    /// POST a JSON body. The workspace name is injected into object bodies,
    /// matching the registry's creation endpoints.
    pub fn post(&self, path: &str, mut body: Value) -> RegistryResult<Value> {
        if let Some(object) = body.as_object_mut() {
            object.insert(
                "workspaceName".to_string(),
                Value::String(self.auth.workspace().to_string()),
            );
        }
        let url = self.auth.url(path);
        let res = self
            .http
            .post(&url)
            .headers(self.auth.headers())
            .json(&body)
            .send()?;
        let res = ensure_success(res, &url)?;
        decode_json(res, &url)
    }

    /// PUT a JSON body. An empty response body is treated as an empty
    /// mapping rather than a decode failure.
    pub fn put(&self, path: &str, body: Value) -> RegistryResult<Value> {
        let url = self.auth.url(path);
        let res = self
            .http
            .put(&url)
            .headers(self.auth.headers())
            .json(&body)
            .send()?;
        let res = ensure_success(res, &url)?;
        let text = res.text()?;
        if text.is_empty() {
            return Ok(json!({}));
        }
        serde_json::from_str(&text).map_err(|e| RegistryError::Decode {
            url,
            reason: e.to_string(),
        })
    }

    /// PATCH a JSON body.
    pub fn patch(&self, path: &str, body: Value) -> RegistryResult<Value> {
        let url = self.auth.url(path);
        let res = self
            .http
            .patch(&url)
            .headers(self.auth.headers())
            .json(&body)
            .send()?;
        let res = ensure_success(res, &url)?;
        decode_json(res, &url)
    }

    // =========================================================================
    // Signed-URL byte transfer (no auth headers; the URL itself authorizes)
    // =========================================================================

    /// Stream the bytes behind a signed GET URL to a local file.
    pub fn download_to(&self, url: &str, dest: &Path) -> RegistryResult<()> {
        let res = self.http.get(url).send()?;
        let mut res = ensure_success(res, url)?;
        let mut file = File::create(dest).map_err(|e| RegistryError::Io {
            path: dest.display().to_string(),
            source: e,
        })?;
        io::copy(&mut res, &mut file).map_err(|e| RegistryError::Io {
            path: dest.display().to_string(),
            source: e,
        })?;
        Ok(())
    }

    /// Stream a local file's bytes to a signed PUT URL in one request and
    /// return the ETag the storage layer assigned.
    pub fn upload_file(&self, url: &str, src: &Path) -> RegistryResult<String> {
        let file = File::open(src).map_err(|e| RegistryError::Io {
            path: src.display().to_string(),
            source: e,
        })?;
        let res = self
            .http
            .put(url)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )
            .body(file)
            .send()?;
        let res = ensure_success(res, url)?;
        let etag = res
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .ok_or_else(|| RegistryError::Decode {
                url: url.to_string(),
                reason: "upload response carried no ETag header".to_string(),
            })?;
        Ok(etag)
    }

    /// Issue a GET against a signed URL purely to confirm the object is
    /// readable. The body is discarded.
    pub fn probe(&self, url: &str) -> RegistryResult<()> {
        let res = self.http.get(url).send()?;
        ensure_success(res, url)?;
        Ok(())
    }
}

/// Deserialize a JSON value into a typed record, naming the URL on failure.
pub fn decode<T: DeserializeOwned>(url: &str, value: Value) -> RegistryResult<T> {
    serde_json::from_value(value).map_err(|e| RegistryError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

fn ensure_success(res: Response, url: &str) -> RegistryResult<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    Err(RegistryError::Transport {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}

fn decode_json(res: Response, url: &str) -> RegistryResult<Value> {
    let text = res.text()?;
    serde_json::from_str(&text).map_err(|e| RegistryError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
