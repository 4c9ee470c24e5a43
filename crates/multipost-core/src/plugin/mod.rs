//! The HTTP upload plugin.
//!
//! `HttpUpload` registers with a [`Host`] as its uploader. When the host runs
//! it, the plugin reads the pending files, sends each one (multipart or bare,
//! local or through a remote intermediary) and reports one outcome per file.

mod dispatch;
mod remote;

use crate::config::TransportConfig;
use crate::error::UploadError;
use crate::file::UploadFile;
use crate::host::{Host, UploadOutcome, Uploader, UploaderId};
use crate::options::UploadOptions;
use crate::transport::{CurlTransport, Transport, UploadResponse};
use async_trait::async_trait;
use dispatch::Dispatcher;
use std::sync::{Arc, Mutex};

pub struct HttpUpload {
    dispatcher: Dispatcher,
    registration: Mutex<Option<UploaderId>>,
}

impl HttpUpload {
    /// `options` is the instance layer: it overrides the built-in defaults
    /// and is overridden by each file's own options.
    pub fn new(options: UploadOptions, transport: Arc<dyn Transport>) -> Self {
        Self {
            dispatcher: Dispatcher { options, transport },
            registration: Mutex::new(None),
        }
    }

    /// Plugin backed by the libcurl transport.
    pub fn with_curl(options: UploadOptions, transport: TransportConfig) -> Self {
        Self::new(options, Arc::new(CurlTransport::new(transport)))
    }

    pub fn options(&self) -> &UploadOptions {
        &self.dispatcher.options
    }

    /// Current registration token, if installed.
    pub fn registration(&self) -> Option<UploaderId> {
        *self.registration.lock().unwrap()
    }

    /// Register with `host` as an uploader. Installing again returns the existing token.
    pub fn install(self: &Arc<Self>, host: &dyn Host) -> UploaderId {
        let mut registration = self.registration.lock().unwrap();
        if let Some(id) = *registration {
            return id;
        }
        let id = host.add_uploader(Arc::clone(self) as Arc<dyn Uploader>);
        *registration = Some(id);
        id
    }

    /// Deregister from `host` with the token `install` received. No-op if not installed.
    pub fn uninstall(&self, host: &dyn Host) -> bool {
        match self.registration.lock().unwrap().take() {
            Some(id) => host.remove_uploader(id),
            None => false,
        }
    }

    /// Send one local file. `current`/`total` only label the log line.
    pub async fn upload(
        &self,
        host: &Arc<dyn Host>,
        file: &UploadFile,
        current: usize,
        total: usize,
    ) -> Result<UploadResponse, UploadError> {
        self.dispatcher.upload(host, file, current, total).await
    }

    /// Ask the file's remote intermediary to perform the upload.
    pub async fn upload_remote(
        &self,
        host: &Arc<dyn Host>,
        file: &UploadFile,
        current: usize,
        total: usize,
    ) -> Result<UploadResponse, UploadError> {
        self.dispatcher.upload_remote(host, file, current, total).await
    }

    /// Upload all `files` concurrently (remote ones through their intermediary)
    /// and return once every upload has settled.
    pub async fn select_for_upload(
        &self,
        host: &Arc<dyn Host>,
        files: Vec<UploadFile>,
    ) -> Vec<UploadOutcome> {
        self.dispatcher.select_for_upload(host, files).await
    }

    /// Upload whatever the host has pending.
    pub async fn handle_upload(&self, host: Arc<dyn Host>) -> Vec<UploadOutcome> {
        let files = host.pending_files();
        if files.is_empty() {
            host.log("no files to upload");
            return Vec::new();
        }
        host.log(&format!("uploading {} file(s)", files.len()));
        self.select_for_upload(&host, files).await
    }
}

#[async_trait]
impl Uploader for HttpUpload {
    async fn handle_upload(&self, host: Arc<dyn Host>) -> Vec<UploadOutcome> {
        HttpUpload::handle_upload(self, host).await
    }
}
