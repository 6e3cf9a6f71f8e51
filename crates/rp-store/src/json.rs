//! JSON array and newline-delimited JSON writers

use crate::error::StoreResult;
use crate::traits::RecordWriter;
use rp_core::{OutputFormat, RecordSet};
use std::io::Write;

/// Pretty-printed JSON array, the shape the BI import expects
pub struct JsonWriter;

impl RecordWriter for JsonWriter {
    fn write(&self, records: &RecordSet, out: &mut (dyn Write + Send)) -> StoreResult<()> {
        serde_json::to_writer_pretty(&mut *out, records.records())?;
        out.write_all(b"\n")?;
        Ok(())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

/// One compact JSON object per line
pub struct NdjsonWriter;

impl RecordWriter for NdjsonWriter {
    fn write(&self, records: &RecordSet, out: &mut (dyn Write + Send)) -> StoreResult<()> {
        for record in records {
            serde_json::to_writer(&mut *out, record)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Ndjson
    }
}
