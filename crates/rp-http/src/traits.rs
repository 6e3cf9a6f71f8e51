//! Transport trait definition

use crate::error::HttpResult;

/// Raw HTTP response: status code and body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// Build a response from a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP GET abstraction for Reportpull
///
/// Implementations return `Ok` for any response the server produced,
/// including 4xx/5xx, and `Err` only when no response was received.
pub trait Transport {
    /// Issue one GET request with the given headers
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> HttpResult<HttpResponse>;

    /// Transport identifier for logging
    fn transport_type(&self) -> &'static str;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> HttpResult<HttpResponse> {
        (**self).get(url, headers)
    }

    fn transport_type(&self) -> &'static str {
        (**self).transport_type()
    }
}
