//! Sending files: option resolution, body selection, transfer and events.

use super::remote;
use crate::error::UploadError;
use crate::file::UploadFile;
use crate::host::{Host, UploadEvent, UploadOutcome};
use crate::options::{self, ResolvedOptions, UploadOptions};
use crate::payload::{build_body, UploadBody};
use crate::progress::UploadProgress;
use crate::transport::{HttpResponse, Transport, UploadRequest, UploadResponse};
use std::sync::Arc;
use url::Url;

/// Instance options plus the transport. Cheap to clone; one clone per in-flight file.
#[derive(Clone)]
pub(crate) struct Dispatcher {
    pub(crate) options: UploadOptions,
    pub(crate) transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub(crate) fn resolve(&self, file: &UploadFile) -> ResolvedOptions {
        options::resolve(&self.options, file.options.as_ref())
    }

    pub(crate) async fn upload(
        &self,
        host: &Arc<dyn Host>,
        file: &UploadFile,
        current: usize,
        total: usize,
    ) -> Result<UploadResponse, UploadError> {
        let result = self.upload_local(host, file, current, total).await;
        report(host.as_ref(), &file.id, &result);
        result
    }

    pub(crate) async fn upload_remote(
        &self,
        host: &Arc<dyn Host>,
        file: &UploadFile,
        current: usize,
        total: usize,
    ) -> Result<UploadResponse, UploadError> {
        let result = self.upload_via_remote(host, file, current, total).await;
        report(host.as_ref(), &file.id, &result);
        result
    }

    /// Dispatches every file at once and waits for all of them to settle.
    /// Outcomes come back in input order.
    pub(crate) async fn select_for_upload(
        &self,
        host: &Arc<dyn Host>,
        files: Vec<UploadFile>,
    ) -> Vec<UploadOutcome> {
        let total = files.len();
        let remote_count = files.iter().filter(|f| f.is_remote()).count();
        tracing::debug!(
            local = total - remote_count,
            remote = remote_count,
            "dispatching uploads"
        );

        let mut handles = Vec::with_capacity(total);
        for (index, file) in files.into_iter().enumerate() {
            let dispatcher = self.clone();
            let host = Arc::clone(host);
            let file_id = file.id.clone();
            let handle = tokio::spawn(async move {
                if file.is_remote() {
                    dispatcher.upload_remote(&host, &file, index + 1, total).await
                } else {
                    dispatcher.upload(&host, &file, index + 1, total).await
                }
            });
            handles.push((file_id, handle));
        }

        let mut outcomes = Vec::with_capacity(total);
        for (file_id, handle) in handles {
            let result = handle.await.unwrap_or_else(|e| {
                let result = Err(UploadError::Task(e.to_string()));
                report(host.as_ref(), &file_id, &result);
                result
            });
            outcomes.push(UploadOutcome { file_id, result });
        }
        outcomes
    }

    async fn upload_local(
        &self,
        host: &Arc<dyn Host>,
        file: &UploadFile,
        current: usize,
        total: usize,
    ) -> Result<UploadResponse, UploadError> {
        let options = self.resolve(file);
        let url = options.endpoint_url()?;
        host.log(&format!("uploading {} of {}", current, total));

        let request = UploadRequest {
            method: options.method.clone(),
            url,
            headers: options.headers.clone(),
            body: build_body(file, &options),
        };
        let response = self.send(host, &file.id, request).await?;
        Ok(response.into_upload_response(&options.response_url_field)?)
    }

    async fn upload_via_remote(
        &self,
        host: &Arc<dyn Host>,
        file: &UploadFile,
        current: usize,
        total: usize,
    ) -> Result<UploadResponse, UploadError> {
        let options = self.resolve(file);
        let endpoint = options.endpoint_url()?;
        let source = file.remote.as_ref().ok_or_else(|| {
            UploadError::Config(format!("file {} has no remote source", file.id))
        })?;
        let remote_url = Url::parse(&source.url).map_err(|e| {
            UploadError::Config(format!("remote url {:?}: {}", source.url, e))
        })?;
        host.log(&format!("uploading {} of {} (remote)", current, total));

        let request = UploadRequest {
            method: options::DEFAULT_METHOD.to_string(),
            url: remote_url,
            headers: Default::default(),
            body: UploadBody::Json(remote::request_body(file, source, &options, &endpoint)),
        };
        let response = self
            .send(host, &file.id, request)
            .await?
            .into_upload_response(&options.response_url_field)?;
        if response.field(remote::TOKEN_FIELD).is_none() {
            return Err(UploadError::Remote(format!(
                "no {} in intermediary response",
                remote::TOKEN_FIELD
            )));
        }
        Ok(response)
    }

    /// Runs the blocking transfer off the async threads, forwarding progress to the host.
    async fn send(
        &self,
        host: &Arc<dyn Host>,
        file_id: &str,
        request: UploadRequest,
    ) -> Result<HttpResponse, UploadError> {
        host.emit(UploadEvent::Started {
            file_id: file_id.to_string(),
        });
        let transport = Arc::clone(&self.transport);
        let host = Arc::clone(host);
        let file_id = file_id.to_string();
        let response = tokio::task::spawn_blocking(move || {
            let mut last: Option<UploadProgress> = None;
            let mut on_progress = |progress: UploadProgress| {
                // curl reports all-zero numbers until the body starts moving.
                if progress.bytes_total == 0 || last == Some(progress) {
                    return;
                }
                last = Some(progress);
                host.emit(UploadEvent::Progress {
                    file_id: file_id.clone(),
                    progress,
                });
            };
            transport.send(request, &mut on_progress)
        })
        .await
        .map_err(|e| UploadError::Task(e.to_string()))??;
        Ok(response)
    }
}

fn report(host: &dyn Host, file_id: &str, result: &Result<UploadResponse, UploadError>) {
    match result {
        Ok(response) => {
            tracing::debug!(file_id, status = response.status, "upload succeeded");
            host.emit(UploadEvent::Success {
                file_id: file_id.to_string(),
                response: response.clone(),
            });
        }
        Err(e) => {
            tracing::warn!(file_id, "upload failed: {}", e);
            host.emit(UploadEvent::Error {
                file_id: file_id.to_string(),
                error: e.to_string(),
            });
        }
    }
}
