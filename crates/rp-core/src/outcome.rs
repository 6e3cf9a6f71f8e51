//! Per-run bookkeeping: what happened to every query/warehouse pairing.
//!
//! A [`RunOutcome`] lives only for the duration of one process; nothing is
//! persisted between runs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Result status of a single pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PairingStatus {
    /// Records fetched and written
    Success,
    /// Fetch or persist failed
    Error,
    /// API answered with no rows
    Empty,
    /// Not attempted (warehouse query with no warehouse codes)
    Skipped,
}

impl PairingStatus {
    /// Whether this status sets the run-level error flag.
    pub fn is_failure(self) -> bool {
        matches!(self, PairingStatus::Error | PairingStatus::Empty)
    }
}

impl fmt::Display for PairingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PairingStatus::Success => write!(f, "success"),
            PairingStatus::Error => write!(f, "error"),
            PairingStatus::Empty => write!(f, "empty"),
            PairingStatus::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of one (query, optional warehouse) pairing
#[derive(Debug, Clone, Serialize)]
pub struct PairingOutcome {
    pub query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse: Option<String>,
    pub status: PairingStatus,
    pub rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub duration_secs: f64,
}

impl PairingOutcome {
    fn base(query_id: &str, warehouse: Option<&str>, status: PairingStatus) -> Self {
        Self {
            query_id: query_id.to_string(),
            warehouse: warehouse.map(str::to_string),
            status,
            rows: 0,
            output: None,
            bytes: None,
            error: None,
            duration_secs: 0.0,
        }
    }

    /// Records were written to `output`.
    pub fn success(
        query_id: &str,
        warehouse: Option<&str>,
        rows: usize,
        output: PathBuf,
        bytes: u64,
    ) -> Self {
        Self {
            rows,
            output: Some(output),
            bytes: Some(bytes),
            ..Self::base(query_id, warehouse, PairingStatus::Success)
        }
    }

    /// The pairing failed; `error` is shown to the user.
    pub fn error(query_id: &str, warehouse: Option<&str>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::base(query_id, warehouse, PairingStatus::Error)
        }
    }

    /// The API returned no rows.
    pub fn empty(query_id: &str, warehouse: Option<&str>) -> Self {
        Self::base(query_id, warehouse, PairingStatus::Empty)
    }

    /// The pairing was never attempted.
    pub fn skipped(query_id: &str, reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::base(query_id, None, PairingStatus::Skipped)
        }
    }

    /// Attach the wall-clock duration of the pairing.
    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    /// `query` or `query@warehouse`, for log and summary lines.
    pub fn label(&self) -> String {
        match &self.warehouse {
            Some(code) => format!("{}@{}", self.query_id, code),
            None => self.query_id.clone(),
        }
    }
}

/// Everything that happened during one run
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Short unique identifier for this run
    pub run_id: String,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// Total wall-clock time, set by [`RunOutcome::finish`]
    pub elapsed_secs: f64,

    /// Pairings in execution order
    pub pairings: Vec<PairingOutcome>,
}

impl Default for RunOutcome {
    fn default() -> Self {
        Self::new()
    }
}

impl RunOutcome {
    /// Start a new, empty outcome.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string()[..8].to_string(),
            started_at: Utc::now(),
            elapsed_secs: 0.0,
            pairings: Vec::new(),
        }
    }

    /// Append a pairing outcome.
    pub fn record(&mut self, pairing: PairingOutcome) {
        self.pairings.push(pairing);
    }

    /// Stamp the total elapsed time.
    pub fn finish(&mut self, elapsed_secs: f64) {
        self.elapsed_secs = elapsed_secs;
    }

    /// Number of pairings with the given status.
    pub fn count(&self, status: PairingStatus) -> usize {
        self.pairings.iter().filter(|p| p.status == status).count()
    }

    /// Pairings that wrote a file.
    pub fn success_count(&self) -> usize {
        self.count(PairingStatus::Success)
    }

    /// Pairings that set the error flag.
    pub fn failure_count(&self) -> usize {
        self.pairings.iter().filter(|p| p.status.is_failure()).count()
    }

    /// Total rows written across all pairings.
    pub fn total_rows(&self) -> usize {
        self.pairings.iter().map(|p| p.rows).sum()
    }

    /// Run-level error flag. Skipped pairings do not count.
    pub fn has_errors(&self) -> bool {
        self.pairings.iter().any(|p| p.status.is_failure())
    }

    /// Process exit status for a finished run.
    pub fn exit_code(&self) -> i32 {
        if self.has_errors() {
            1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_outcome_is_clean() {
        let outcome = RunOutcome::new();
        assert_eq!(outcome.run_id.len(), 8);
        assert!(outcome.pairings.is_empty());
        assert!(!outcome.has_errors());
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_skipped_does_not_set_error_flag() {
        let mut outcome = RunOutcome::new();
        outcome.record(PairingOutcome::success(
            "a",
            None,
            10,
            PathBuf::from("data/a.json"),
            512,
        ));
        outcome.record(PairingOutcome::skipped("stock", "no warehouse codes configured"));

        assert!(!outcome.has_errors());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.count(PairingStatus::Skipped), 1);
    }

    #[test]
    fn test_empty_and_error_set_error_flag() {
        let mut empty = RunOutcome::new();
        empty.record(PairingOutcome::empty("a", Some("1145")));
        assert!(empty.has_errors());

        let mut failed = RunOutcome::new();
        failed.record(PairingOutcome::error("a", None, "HTTP 500"));
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn test_counts_and_rows() {
        let mut outcome = RunOutcome::new();
        outcome.record(PairingOutcome::success("a", Some("1"), 3, PathBuf::from("a_1.json"), 1));
        outcome.record(PairingOutcome::success("a", Some("2"), 4, PathBuf::from("a_2.json"), 1));
        outcome.record(PairingOutcome::error("b", Some("1"), "timeout"));

        assert_eq!(outcome.success_count(), 2);
        assert_eq!(outcome.failure_count(), 1);
        assert_eq!(outcome.total_rows(), 7);
    }

    #[test]
    fn test_label() {
        assert_eq!(PairingOutcome::empty("a", Some("1145")).label(), "a@1145");
        assert_eq!(PairingOutcome::empty("a", None).label(), "a");
    }

    #[test]
    fn test_serializes_status_lowercase() {
        let pairing = PairingOutcome::error("a", None, "boom").with_duration(1.5);
        let json = serde_json::to_value(&pairing).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["duration_secs"], 1.5);
        assert!(json.get("warehouse").is_none());
        assert!(json.get("output").is_none());
    }
}
