//! File records handed to the plugin by the host.

use crate::options::UploadOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form attributes the host attaches to a file (`name`, `size`, `type`, ...).
pub type Meta = BTreeMap<String, Value>;

/// Locates a file whose bytes are held by a remote intermediary rather than locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSource {
    /// URL the upload request is sent to; the intermediary performs the actual upload.
    pub url: String,
    /// Extra JSON fields the intermediary needs to find the file (provider id, path, ...).
    #[serde(default)]
    pub body: Map<String, Value>,
}

/// A file selected in the host and queued for upload.
#[derive(Debug, Clone, Default)]
pub struct UploadFile {
    pub id: String,
    /// Raw file content. Empty for remote files.
    pub data: Vec<u8>,
    pub meta: Meta,
    /// Set when the bytes live on a remote intermediary.
    pub remote: Option<RemoteSource>,
    /// Per-file options; override the plugin's instance options.
    pub options: Option<UploadOptions>,
}

impl UploadFile {
    /// Local file with `name` and `size` meta filled in from the arguments.
    pub fn local(id: impl Into<String>, name: impl Into<String>, data: Vec<u8>) -> Self {
        let mut meta = Meta::new();
        meta.insert("name".to_string(), Value::String(name.into()));
        meta.insert("size".to_string(), Value::from(data.len() as u64));
        Self {
            id: id.into(),
            data,
            meta,
            remote: None,
            options: None,
        }
    }

    /// File held by a remote intermediary. `size` is the size the host was told about.
    pub fn remote(
        id: impl Into<String>,
        name: impl Into<String>,
        size: u64,
        source: RemoteSource,
    ) -> Self {
        let mut meta = Meta::new();
        meta.insert("name".to_string(), Value::String(name.into()));
        meta.insert("size".to_string(), Value::from(size));
        Self {
            id: id.into(),
            data: Vec::new(),
            meta,
            remote: Some(source),
            options: None,
        }
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn with_options(mut self, options: UploadOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// `meta.name` when it is a string.
    pub fn name(&self) -> Option<&str> {
        self.meta.get("name").and_then(Value::as_str)
    }

    /// `meta.size` if present, else the local data length.
    pub fn size(&self) -> u64 {
        self.meta
            .get("size")
            .and_then(Value::as_u64)
            .unwrap_or(self.data.len() as u64)
    }
}
