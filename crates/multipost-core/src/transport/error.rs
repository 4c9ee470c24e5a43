//! Transport error type.

/// Error returned by a transport send (curl failure, form build failure, or HTTP error).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// A multipart part could not be added to the curl form.
    #[error("multipart form: {0}")]
    Form(#[from] curl::FormError),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u32, body: String },
}

