//! rp-http - HTTP layer for Reportpull
//!
//! This crate provides the [`Transport`] abstraction over blocking HTTP
//! GETs, its `ureq` implementation, and the [`Fetcher`] that wraps a
//! transport with a fixed retry policy and decodes response bodies into
//! record sets.

pub mod error;
pub mod fetcher;
pub mod traits;
pub mod ureq;

pub use error::{HttpError, HttpResult};
pub use fetcher::{decode_body, FetchResult, Fetcher, NoDataReason};
pub use traits::{HttpResponse, Transport};
pub use ureq::UreqTransport;
