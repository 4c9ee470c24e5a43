//! Host registry interface.
//!
//! The host owns the pending files and decides when to upload; uploaders
//! register with it and get an [`UploaderId`] back, which they present again to
//! deregister.

mod registry;

pub use registry::UploadCore;

use crate::error::UploadError;
use crate::file::UploadFile;
use crate::progress::UploadProgress;
use crate::transport::UploadResponse;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Token returned by [`Host::add_uploader`]; identifies the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UploaderId(pub(crate) u64);

impl fmt::Display for UploaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "uploader#{}", self.0)
    }
}

/// Result of one file's upload.
#[derive(Debug)]
pub struct UploadOutcome {
    pub file_id: String,
    pub result: Result<UploadResponse, UploadError>,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Lifecycle notifications emitted while uploading.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEvent {
    Started {
        file_id: String,
    },
    Progress {
        file_id: String,
        progress: UploadProgress,
    },
    Success {
        file_id: String,
        response: UploadResponse,
    },
    Error {
        file_id: String,
        error: String,
    },
}

impl UploadEvent {
    pub fn file_id(&self) -> &str {
        match self {
            UploadEvent::Started { file_id }
            | UploadEvent::Progress { file_id, .. }
            | UploadEvent::Success { file_id, .. }
            | UploadEvent::Error { file_id, .. } => file_id,
        }
    }
}

/// Handler the host invokes when its pending files are ready to upload.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn handle_upload(&self, host: Arc<dyn Host>) -> Vec<UploadOutcome>;
}

/// What an uploader needs from the surrounding framework.
pub trait Host: Send + Sync {
    fn add_uploader(&self, uploader: Arc<dyn Uploader>) -> UploaderId;
    /// Returns false if `id` was not registered.
    fn remove_uploader(&self, id: UploaderId) -> bool;
    /// Files currently waiting for upload, in the order they were added.
    fn pending_files(&self) -> Vec<UploadFile>;
    fn log(&self, message: &str);
    fn emit(&self, event: UploadEvent);
}
