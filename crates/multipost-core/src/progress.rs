//! Upload progress snapshots (bytes sent, total, fraction).
//!
//! Emitted by the plugin from the transport's progress callback; consumers can
//! compute rate from successive snapshots.

use serde::Serialize;

/// Snapshot of upload progress for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    /// Request body bytes sent so far.
    pub bytes_uploaded: u64,
    /// Total request body bytes (0 if the transport doesn't know yet).
    pub bytes_total: u64,
}

impl UploadProgress {
    pub fn new(bytes_uploaded: u64, bytes_total: u64) -> Self {
        Self {
            bytes_uploaded,
            bytes_total,
        }
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.bytes_total == 0 {
            return 0.0;
        }
        (self.bytes_uploaded as f64 / self.bytes_total as f64).min(1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.bytes_total > 0 && self.bytes_uploaded >= self.bytes_total
    }
}
