//! Response types and body interpretation.

use super::TransportError;
use serde::Serialize;
use serde_json::Value;

/// Status and body as received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Checks the status and interprets the body. `url_field` names the JSON
    /// field that carries the uploaded file's URL.
    pub fn into_upload_response(self, url_field: &str) -> Result<UploadResponse, TransportError> {
        let body = self.body_text();
        if !self.is_success() {
            return Err(TransportError::Http {
                status: self.status,
                body,
            });
        }
        let data = parse_json(&body);
        let url = data
            .as_ref()
            .and_then(|d| d.get(url_field))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(UploadResponse {
            status: self.status,
            body,
            data,
            url,
        })
    }
}

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadResponse {
    pub status: u32,
    /// Raw response body.
    pub body: String,
    /// Body parsed as JSON, when it is JSON.
    pub data: Option<Value>,
    /// Uploaded file's URL, from `data[response_url_field]`.
    pub url: Option<String>,
}

impl UploadResponse {
    /// String field `key` of the JSON body.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.data.as_ref()?.get(key)?.as_str()
    }
}

fn parse_json(body: &str) -> Option<Value> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}
