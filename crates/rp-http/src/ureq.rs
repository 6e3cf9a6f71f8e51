//! Transport implementation over a blocking `ureq` agent

use crate::error::{HttpError, HttpResult};
use crate::traits::{HttpResponse, Transport};
use std::io::Read;
use std::time::Duration;

/// Keep error bodies short in log lines
const MAX_ERROR_BODY: usize = 512;

/// `ureq` backed transport with a per-request timeout
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Create a transport whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> HttpResult<HttpResponse> {
        let mut request = self.agent.get(url);
        for (name, value) in headers {
            request = request.set(name, value);
        }

        match request.call() {
            Ok(response) => {
                let status = response.status();
                // into_string() caps bodies at 10MB; report pulls can exceed that
                let mut body = String::new();
                response.into_reader().read_to_string(&mut body)?;
                Ok(HttpResponse::new(status, body))
            }
            Err(ureq::Error::Status(status, response)) => {
                let mut body = response.into_string().unwrap_or_default();
                truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
                Ok(HttpResponse::new(status, body))
            }
            Err(ureq::Error::Transport(err)) => Err(HttpError::Transport(err.to_string())),
        }
    }

    fn transport_type(&self) -> &'static str {
        "ureq"
    }
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_bodies() {
        let mut s = "short".to_string();
        truncate_at_char_boundary(&mut s, 10);
        assert_eq!(s, "short");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let mut s = "ééé".to_string();
        truncate_at_char_boundary(&mut s, 3);
        assert_eq!(s, "é");
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let transport = UreqTransport::new(Duration::from_secs(1));
        let err = transport
            .get("http://127.0.0.1:9/unreachable", &[])
            .unwrap_err();
        assert!(matches!(err, HttpError::Transport(_)));
        assert_eq!(transport.transport_type(), "ureq");
    }
}
