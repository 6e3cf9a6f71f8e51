//! Error types for rp-store

use thiserror::Error;

/// Output errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing to write (S001)
    #[error("[S001] No records to write")]
    EmptyRecordSet,

    /// Output file name would escape the output directory (S002)
    #[error("[S002] Invalid output file name '{name}'")]
    InvalidFileName { name: String },

    /// File system error with path context (S003)
    #[error("[S003] Failed to write '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Error writing encoded bytes (S004)
    #[error("[S004] Write error: {0}")]
    Write(#[from] std::io::Error),

    /// JSON encoding error (S005)
    #[error("[S005] JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow schema inference or decoding error (S006)
    #[error("[S006] Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet encoding error (S007)
    #[error("[S007] Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

/// Result type alias for StoreError
pub type StoreResult<T> = Result<T, StoreError>;
