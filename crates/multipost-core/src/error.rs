//! Errors surfaced by a single file upload.

use crate::transport::TransportError;

/// Why one file's upload was rejected.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// Options are unusable (empty or malformed endpoint, missing remote source).
    /// Raised before any request is attempted.
    #[error("invalid upload configuration: {0}")]
    Config(String),
    /// The request failed at the transport level or returned a non-2xx status.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The remote intermediary accepted the request but its reply was unusable.
    #[error("remote upload rejected: {0}")]
    Remote(String),
    /// The blocking transfer task panicked or was cancelled.
    #[error("upload task failed: {0}")]
    Task(String),
}

impl UploadError {
    /// True for errors raised before anything was sent.
    pub fn is_config(&self) -> bool {
        matches!(self, UploadError::Config(_))
    }

    /// HTTP status of the failed response, if the server answered at all.
    pub fn http_status(&self) -> Option<u32> {
        match self {
            UploadError::Transport(TransportError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }
}
