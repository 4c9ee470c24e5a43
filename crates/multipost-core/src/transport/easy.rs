//! libcurl transport (curl crate, easy interface).
//!
//! Multipart bodies go through `curl::easy::Form`; bare and JSON bodies are
//! streamed through the read callback. Any method other than POST is set with CUSTOMREQUEST
//! so PUT/PATCH still carry the body.

use super::{HttpResponse, Transport, TransportError, UploadRequest};
use crate::config::TransportConfig;
use crate::payload::{FieldValue, FormData, UploadBody};
use crate::progress::UploadProgress;
use curl::easy::{Easy, Form, List, PostRedirections, SeekResult};
use std::cell::RefCell;
use std::io::{Cursor, Read, SeekFrom};
use std::time::Duration;

const DEFAULT_FILENAME: &str = "blob";
const OCTET_STREAM: &str = "application/octet-stream";

/// Transport backed by one curl Easy handle per request.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    config: TransportConfig,
}

impl CurlTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

impl Transport for CurlTransport {
    fn send(
        &self,
        request: UploadRequest,
        on_progress: &mut dyn FnMut(UploadProgress),
    ) -> Result<HttpResponse, TransportError> {
        let mut easy = Easy::new();
        easy.url(request.url.as_str())?;
        easy.follow_location(self.config.follow_redirects)?;
        easy.max_redirections(10)?;
        // Keep the method and body across 301/302/303 instead of falling back to GET.
        easy.post_redirections(PostRedirections::new().redirect_all(true))?;
        easy.connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))?;
        easy.timeout(Duration::from_secs(self.config.timeout_secs))?;

        let mut list = List::new();
        // Without this libcurl stalls on a 100-continue for larger bodies.
        list.append("Expect:")?;
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        let has_content_type = request.has_header("content-type");

        let UploadRequest {
            method, url, body, ..
        } = request;
        let raw_body = match body {
            UploadBody::Form(form) => {
                easy.httppost(build_form(form)?)?;
                None
            }
            UploadBody::Bare { data, content_type } => {
                if !has_content_type {
                    list.append(&format!(
                        "Content-Type: {}",
                        content_type.as_deref().unwrap_or(OCTET_STREAM)
                    ))?;
                }
                Some(data)
            }
            UploadBody::Json(value) => {
                if !has_content_type {
                    list.append("Content-Type: application/json")?;
                }
                list.append("Accept: application/json")?;
                Some(value.to_string().into_bytes())
            }
        };
        let streamed = raw_body.is_some();
        if let Some(data) = &raw_body {
            easy.post(true)?;
            easy.post_field_size(data.len() as u64)?;
        }
        easy.http_headers(list)?;
        if method != "POST" {
            easy.custom_request(&method)?;
        }
        easy.progress(true)?;

        // Raw bodies are streamed from the buffer; curl seeks back to the
        // start when a redirect makes it send the body again.
        let source = RefCell::new(Cursor::new(raw_body.unwrap_or_default()));
        let mut body = Vec::new();
        {
            let mut transfer = easy.transfer();
            if streamed {
                transfer.read_function(|into| Ok(source.borrow_mut().read(into).unwrap_or(0)))?;
                transfer.seek_function(|whence| match whence {
                    SeekFrom::Start(pos) => {
                        source.borrow_mut().set_position(pos);
                        SeekResult::Ok
                    }
                    _ => SeekResult::CantSeek,
                })?;
            }
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.progress_function(|_dltotal, _dlnow, ultotal, ulnow| {
                on_progress(UploadProgress::new(ulnow as u64, ultotal as u64));
                true
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(%method, %url, status, "upload request finished");
        Ok(HttpResponse { status, body })
    }
}

/// Moves a `FormData` into a curl multipart form, preserving field order.
fn build_form(form: FormData) -> Result<Form, TransportError> {
    let mut curl_form = Form::new();
    for (name, value) in form {
        match value {
            FieldValue::File {
                data,
                filename,
                content_type,
            } => {
                let filename = filename.as_deref().unwrap_or(DEFAULT_FILENAME);
                let mut part = curl_form.part(&name);
                part.buffer(filename, data);
                part.content_type(content_type.as_deref().unwrap_or(OCTET_STREAM));
                part.add()?;
            }
            text => {
                let rendered = text.as_text().unwrap_or_default();
                curl_form.part(&name).contents(rendered.as_bytes()).add()?;
            }
        }
    }
    Ok(curl_form)
}
