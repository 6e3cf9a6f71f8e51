//! Error types for rp-http

use thiserror::Error;

/// Errors from a single fetch attempt
#[derive(Error, Debug)]
pub enum HttpError {
    /// Connection, DNS, TLS or timeout failure (H001)
    #[error("[H001] Request failed: {0}")]
    Transport(String),

    /// Server answered with a non-2xx status (H002)
    #[error("[H002] HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// 2xx body is not a list of records (H003)
    #[error("[H003] Unexpected response body: {0}")]
    Decode(String),

    /// Reading the response body failed (H004)
    #[error("[H004] Failed to read response body: {0}")]
    Body(#[from] std::io::Error),
}

/// Result type alias for HttpError
pub type HttpResult<T> = Result<T, HttpError>;
