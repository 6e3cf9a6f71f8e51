//! Record sets returned by the reporting API and their load annotations.

use crate::query_id::QueryId;
use crate::warehouse::WarehouseCode;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single API row: field name to JSON value.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Reserved field: when the record was loaded (RFC 3339, UTC).
pub const LOAD_TIMESTAMP_FIELD: &str = "_load_timestamp";

/// Reserved field: id of the query that produced the record.
pub const QUERY_ID_FIELD: &str = "_query_id";

/// Reserved field: warehouse code the query was filtered by, if any.
pub const WAREHOUSE_FIELD: &str = "_warehouse";

/// Ordered rows returned by one fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Wrap decoded rows.
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether there are no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate rows in API order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Borrow the rows as a slice.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the set and return the rows.
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Format a load timestamp the way it is stamped onto records.
pub fn format_load_timestamp(loaded_at: DateTime<Utc>) -> String {
    loaded_at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Stamp every record with the load timestamp, query id and warehouse.
///
/// Reserved fields already present in a record are overwritten. The
/// warehouse field is only written when a warehouse applies.
pub fn annotate(
    set: RecordSet,
    query_id: &QueryId,
    warehouse: Option<&WarehouseCode>,
    loaded_at: DateTime<Utc>,
) -> RecordSet {
    let timestamp = serde_json::Value::String(format_load_timestamp(loaded_at));
    let query_id = serde_json::Value::String(query_id.to_string());
    let warehouse = warehouse.map(|w| serde_json::Value::String(w.to_string()));

    let records = set
        .into_records()
        .into_iter()
        .map(|mut record| {
            record.insert(LOAD_TIMESTAMP_FIELD.to_string(), timestamp.clone());
            record.insert(QUERY_ID_FIELD.to_string(), query_id.clone());
            if let Some(code) = &warehouse {
                record.insert(WAREHOUSE_FIELD.to_string(), code.clone());
            }
            record
        })
        .collect();

    RecordSet::new(records)
}

#[cfg(test)]
#[path = "record_test.rs"]
mod tests;
