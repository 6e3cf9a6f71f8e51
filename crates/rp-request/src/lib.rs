//! rp-request - Request building for Reportpull
//!
//! Renders query filter templates (configured vars plus the warehouse
//! code) and assembles fully percent-encoded request URLs. Nothing in this
//! crate touches the network.

pub mod error;
pub mod filter;
pub mod url;

pub use error::{RequestError, RequestResult};
pub use filter::FilterRenderer;
pub use url::UrlBuilder;
