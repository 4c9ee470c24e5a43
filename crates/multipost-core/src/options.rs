//! Layered upload options.
//!
//! Three layers are merged once per upload: built-in defaults, the plugin's
//! instance options, then the file's own options. A field set in a later layer
//! wins; `headers` merge key by key.

use crate::error::UploadError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

pub const DEFAULT_METHOD: &str = "POST";
pub const DEFAULT_FIELD_NAME: &str = "file";
pub const DEFAULT_RESPONSE_URL_FIELD: &str = "url";

/// One layer of options. Every field is optional; unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadOptions {
    /// Destination URL.
    pub endpoint: Option<String>,
    /// HTTP verb (e.g. "POST", "PUT").
    pub method: Option<String>,
    /// Form field the file bytes are attached under.
    pub field_name: Option<String>,
    /// When set, only these meta keys are sent as form fields.
    pub meta_fields: Option<Vec<String>>,
    /// Multipart body (true) or raw file bytes (false).
    pub form_data: Option<bool>,
    /// JSON field of the response body that holds the uploaded file's URL.
    pub response_url_field: Option<String>,
    /// Extra request headers.
    pub headers: BTreeMap<String, String>,
}

impl UploadOptions {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

/// Fully merged options for one upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub endpoint: String,
    pub method: String,
    pub field_name: String,
    pub meta_fields: Option<Vec<String>>,
    pub form_data: bool,
    pub headers: BTreeMap<String, String>,
    pub response_url_field: String,
}

impl Default for ResolvedOptions {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            method: DEFAULT_METHOD.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            meta_fields: None,
            form_data: true,
            headers: BTreeMap::new(),
            response_url_field: DEFAULT_RESPONSE_URL_FIELD.to_string(),
        }
    }
}

impl ResolvedOptions {
    /// Merge `layers` (lowest precedence first) on top of `self`.
    pub fn layered<'a, I>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = &'a UploadOptions>,
    {
        for layer in layers {
            self.apply(layer);
        }
        self
    }

    fn apply(&mut self, layer: &UploadOptions) {
        if let Some(endpoint) = &layer.endpoint {
            self.endpoint = endpoint.clone();
        }
        if let Some(method) = &layer.method {
            self.method = method.trim().to_ascii_uppercase();
        }
        if let Some(field_name) = &layer.field_name {
            self.field_name = field_name.clone();
        }
        if let Some(meta_fields) = &layer.meta_fields {
            self.meta_fields = Some(meta_fields.clone());
        }
        if let Some(form_data) = layer.form_data {
            self.form_data = form_data;
        }
        for (k, v) in &layer.headers {
            self.headers.insert(k.clone(), v.clone());
        }
        if let Some(field) = &layer.response_url_field {
            self.response_url_field = field.clone();
        }
    }

    /// True if meta key `key` should be sent with the upload.
    pub fn allows_meta(&self, key: &str) -> bool {
        match &self.meta_fields {
            Some(fields) => fields.iter().any(|f| f == key),
            None => true,
        }
    }

    /// Parse and check the endpoint. Called before any request is built.
    pub fn endpoint_url(&self) -> Result<Url, UploadError> {
        let raw = self.endpoint.trim();
        if raw.is_empty() {
            return Err(UploadError::Config("endpoint is empty".to_string()));
        }
        let url = Url::parse(raw)
            .map_err(|e| UploadError::Config(format!("endpoint {:?}: {}", raw, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(UploadError::Config(format!(
                "endpoint {:?}: unsupported scheme {}",
                raw,
                url.scheme()
            )));
        }
        if self.method.is_empty() {
            return Err(UploadError::Config("method is empty".to_string()));
        }
        Ok(url)
    }
}

/// Resolve the options for one file: defaults < instance < per-file.
pub fn resolve(instance: &UploadOptions, file: Option<&UploadOptions>) -> ResolvedOptions {
    ResolvedOptions::default().layered(std::iter::once(instance).chain(file))
}
