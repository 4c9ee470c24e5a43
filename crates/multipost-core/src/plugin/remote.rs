//! Request body for uploads performed by a remote intermediary.
//!
//! The intermediary already holds the file; we tell it where to send it and
//! how. It replies with a `token` identifying the upload on its side.

use crate::file::{RemoteSource, UploadFile};
use crate::options::ResolvedOptions;
use crate::payload::filtered_meta;
use serde_json::{Map, Value};
use url::Url;

pub(crate) const TOKEN_FIELD: &str = "token";

/// `source.body` with the upload instructions merged over it.
pub(crate) fn request_body(
    file: &UploadFile,
    source: &RemoteSource,
    options: &ResolvedOptions,
    endpoint: &Url,
) -> Value {
    let mut body: Map<String, Value> = source.body.clone();
    body.insert("endpoint".to_string(), Value::from(endpoint.as_str()));
    body.insert("method".to_string(), Value::from(options.method.as_str()));
    body.insert("fieldname".to_string(), Value::from(options.field_name.as_str()));
    body.insert(
        "protocol".to_string(),
        Value::from(if options.form_data { "multipart" } else { "raw" }),
    );
    body.insert("size".to_string(), Value::from(file.size()));
    body.insert(
        "metadata".to_string(),
        Value::Object(filtered_meta(file, options)),
    );
    if !options.headers.is_empty() {
        let headers: Map<String, Value> = options
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        body.insert("headers".to_string(), Value::Object(headers));
    }
    Value::Object(body)
}
