//! Request body construction.
//!
//! A file is sent either as a `multipart/form-data` body (metadata fields plus
//! the file part) or bare, with the file bytes as the whole body.

mod form;

pub use form::{FieldValue, FormData};

use crate::file::UploadFile;
use crate::options::ResolvedOptions;
use serde_json::Value;

/// Request body handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadBody {
    Form(FormData),
    Bare {
        data: Vec<u8>,
        content_type: Option<String>,
    },
    Json(Value),
}

impl UploadBody {
    /// Bytes of content in the body. Multipart framing is not counted.
    pub fn payload_len(&self) -> u64 {
        match self {
            UploadBody::Form(form) => form.payload_len(),
            UploadBody::Bare { data, .. } => data.len() as u64,
            UploadBody::Json(v) => v.to_string().len() as u64,
        }
    }
}

/// Builds the multipart form for `file`.
///
/// Every meta key is appended unless `options.meta_fields` is set, in which
/// case only the listed keys that exist in `file.meta` are. The file bytes go
/// last, under `options.field_name`.
pub fn create_form_data_upload(file: &UploadFile, options: &ResolvedOptions) -> FormData {
    let mut form = FormData::new();
    for (key, value) in &file.meta {
        if options.allows_meta(key) {
            form.append(key.clone(), FieldValue::Text(value.clone()));
        }
    }
    form.append(
        options.field_name.clone(),
        FieldValue::File {
            data: file.data.clone(),
            filename: file.name().map(str::to_string),
            content_type: content_type(file),
        },
    );
    form
}

/// The file bytes, unchanged.
pub fn create_bare_upload(file: &UploadFile, _options: &ResolvedOptions) -> Vec<u8> {
    file.data.clone()
}

/// Picks the builder selected by `options.form_data`.
pub fn build_body(file: &UploadFile, options: &ResolvedOptions) -> UploadBody {
    if options.form_data {
        UploadBody::Form(create_form_data_upload(file, options))
    } else {
        UploadBody::Bare {
            data: create_bare_upload(file, options),
            content_type: content_type(file),
        }
    }
}

/// Meta fields the options allow, as a JSON object (used for remote uploads).
pub fn filtered_meta(file: &UploadFile, options: &ResolvedOptions) -> serde_json::Map<String, Value> {
    file.meta
        .iter()
        .filter(|(k, _)| options.allows_meta(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

fn content_type(file: &UploadFile) -> Option<String> {
    file.meta
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
