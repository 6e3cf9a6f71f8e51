//! Fixed-count, fixed-delay retrying fetcher.

use crate::error::{HttpError, HttpResult};
use crate::traits::Transport;
use rp_core::{FetchConfig, Record, RecordSet};
use std::fmt;
use std::time::Duration;

/// Header carrying the API token
pub const TOKEN_HEADER: &str = "token";

/// Keys under which an object-wrapped response may carry its rows
const WRAPPER_KEYS: &[&str] = &["data", "items", "value"];

/// Why a fetch produced no records
#[derive(Debug)]
pub enum NoDataReason {
    /// The API answered successfully with no rows
    Empty,
    /// Every attempt failed
    Failed { attempts: u32, last_error: HttpError },
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataReason::Empty => write!(f, "empty result"),
            NoDataReason::Failed {
                attempts,
                last_error,
            } => write!(f, "failed after {} attempt(s): {}", attempts, last_error),
        }
    }
}

/// Outcome of [`Fetcher::fetch`]
#[derive(Debug)]
pub enum FetchResult {
    Data(RecordSet),
    NoData(NoDataReason),
}

impl FetchResult {
    /// The records, if any were returned.
    pub fn into_records(self) -> Option<RecordSet> {
        match self {
            FetchResult::Data(records) => Some(records),
            FetchResult::NoData(_) => None,
        }
    }
}

/// Issues authenticated GETs and retries failures a fixed number of times
pub struct Fetcher<T: Transport> {
    transport: T,
    token: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl<T: Transport> Fetcher<T> {
    /// Create a fetcher with the retry policy from `fetch`
    pub fn new(transport: T, token: impl Into<String>, fetch: &FetchConfig) -> Self {
        Self {
            transport,
            token: token.into(),
            max_retries: fetch.max_retries,
            retry_delay: fetch.retry_delay(),
        }
    }

    /// Borrow the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch `url`, retrying transport errors, non-2xx statuses and
    /// undecodable bodies up to `max_retries` times.
    ///
    /// Empty results are not retried. Failures never propagate as errors;
    /// they come back as [`FetchResult::NoData`].
    pub fn fetch(&self, url: &str, query_name: &str) -> FetchResult {
        let total = self.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            log::info!(
                "Fetching {} (attempt {}/{}) via {}",
                query_name,
                attempt,
                total,
                self.transport.transport_type()
            );

            match self.attempt(url) {
                Ok(Some(records)) => {
                    log::info!("{}: received {} records", query_name, records.len());
                    return FetchResult::Data(records);
                }
                Ok(None) => {
                    log::warn!("{}: empty result", query_name);
                    return FetchResult::NoData(NoDataReason::Empty);
                }
                Err(err) if attempt < total => {
                    log::warn!(
                        "{}: attempt {}/{} failed: {}. Retrying in {}s",
                        query_name,
                        attempt,
                        total,
                        err,
                        self.retry_delay.as_secs()
                    );
                    if !self.retry_delay.is_zero() {
                        std::thread::sleep(self.retry_delay);
                    }
                }
                Err(err) => {
                    log::error!(
                        "{}: giving up after {} attempt(s): {}",
                        query_name,
                        attempt,
                        err
                    );
                    return FetchResult::NoData(NoDataReason::Failed {
                        attempts: attempt,
                        last_error: err,
                    });
                }
            }
        }
    }

    fn attempt(&self, url: &str) -> HttpResult<Option<RecordSet>> {
        let headers = [(TOKEN_HEADER, self.token.as_str())];
        let response = self.transport.get(url, &headers)?;
        if !response.is_success() {
            return Err(HttpError::Status {
                status: response.status,
                body: response.body,
            });
        }
        decode_body(&response.body)
    }
}

/// Decode a 2xx body into records.
///
/// `Ok(None)` for an empty body, `null` or `[]`. A JSON array of objects
/// is the normal shape; an object wrapping the array under `data`, `items`
/// or `value` is unwrapped. Anything else is a decode error.
pub fn decode_body(body: &str) -> HttpResult<Option<RecordSet>> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(|e| HttpError::Decode(e.to_string()))?;
    decode_value(value)
}

fn decode_value(value: serde_json::Value) -> HttpResult<Option<RecordSet>> {
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Array(items) if items.is_empty() => Ok(None),
        serde_json::Value::Array(items) => {
            let records = items
                .into_iter()
                .enumerate()
                .map(|(i, item)| match item {
                    serde_json::Value::Object(map) => Ok(map),
                    other => Err(HttpError::Decode(format!(
                        "element {} is {}, expected an object",
                        i,
                        json_kind(&other)
                    ))),
                })
                .collect::<HttpResult<Vec<Record>>>()?;
            Ok(Some(RecordSet::new(records)))
        }
        serde_json::Value::Object(mut map) => {
            for key in WRAPPER_KEYS {
                if let Some(inner @ (serde_json::Value::Array(_) | serde_json::Value::Null)) =
                    map.remove(*key)
                {
                    return decode_value(inner);
                }
            }
            Err(HttpError::Decode(format!(
                "object without a record list (expected one of: {})",
                WRAPPER_KEYS.join(", ")
            )))
        }
        other => Err(HttpError::Decode(format!(
            "{} where a list of records was expected",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

#[cfg(test)]
#[path = "fetcher_test.rs"]
mod tests;
