//! Record writer trait definition

use crate::error::StoreResult;
use rp_core::{OutputFormat, RecordSet};
use std::io::Write;

/// Serializes a whole record set to a byte sink
pub trait RecordWriter {
    /// Write every record in `records` to `out`
    fn write(&self, records: &RecordSet, out: &mut (dyn Write + Send)) -> StoreResult<()>;

    /// Format produced by this writer
    fn format(&self) -> OutputFormat;
}
