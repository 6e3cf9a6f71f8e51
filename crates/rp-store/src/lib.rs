//! rp-store - Output layer for Reportpull
//!
//! This crate provides the [`RecordWriter`] trait with JSON, NDJSON and
//! Parquet implementations, and the [`Persister`] that writes one record
//! set per file with atomic replace semantics.

pub mod error;
pub mod json;
pub mod parquet;
pub mod persister;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use persister::{writer_for, PersistReport, Persister};
pub use traits::RecordWriter;
