//! Request/response transport.
//!
//! The plugin builds an [`UploadRequest`] and hands it to a [`Transport`].
//! Sends are blocking; the plugin runs them on `spawn_blocking`.

mod easy;
mod error;
mod response;

pub use easy::CurlTransport;
pub use error::TransportError;
pub use response::{HttpResponse, UploadResponse};

use crate::payload::UploadBody;
use crate::progress::UploadProgress;
use std::collections::BTreeMap;
use url::Url;

/// Everything the transport needs to perform one upload request.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Upper-case HTTP verb.
    pub method: String,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: UploadBody,
}

/// Sends one request and returns the raw response.
///
/// The request is taken by value so the body bytes can move into the
/// transfer instead of being copied. `on_progress` is called with upload (request body) progress whenever the
/// transport has new numbers. Non-2xx responses are returned as `Ok`; the
/// caller decides what counts as success.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: UploadRequest,
        on_progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<HttpResponse, TransportError>;
}

impl UploadRequest {
    /// True when the caller set `name` in `headers`, compared case-insensitively.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.trim().eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_header_ignores_case() {
        let mut headers = BTreeMap::new();
        headers.insert("content-TYPE".to_string(), "image/png".to_string());
        let request = UploadRequest {
            method: "PUT".to_string(),
            url: Url::parse("https://up.example.com/a").unwrap(),
            headers,
            body: UploadBody::Json(serde_json::Value::Null),
        };
        assert!(request.has_header("Content-Type"));
        assert!(!request.has_header("Accept"));
    }
}
