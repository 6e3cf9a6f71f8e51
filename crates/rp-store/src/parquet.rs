//! Parquet writer with a schema inferred from the records

use crate::error::StoreResult;
use crate::traits::RecordWriter;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::json::reader::infer_json_schema_from_iterator;
use arrow::json::ReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use rp_core::{OutputFormat, RecordSet};
use std::io::Write;
use std::sync::Arc;

/// Rows decoded into each Arrow batch
const BATCH_SIZE: usize = 8192;

/// Columnar output, Snappy compressed
pub struct ParquetWriter {
    batch_size: usize,
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self {
            batch_size: BATCH_SIZE,
        }
    }
}

impl ParquetWriter {
    /// Writer with a custom batch size
    pub fn with_batch_size(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }
}

impl RecordWriter for ParquetWriter {
    fn write(&self, records: &RecordSet, out: &mut (dyn Write + Send)) -> StoreResult<()> {
        let schema = infer_schema(records)?;
        log::debug!(
            "Inferred parquet schema with {} columns",
            schema.fields().len()
        );

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();
        let mut writer = ArrowWriter::try_new(&mut *out, schema.clone(), Some(props))?;
        let mut decoder = ReaderBuilder::new(schema)
            .with_batch_size(self.batch_size)
            .with_coerce_primitive(true)
            .build_decoder()?;

        for chunk in records.records().chunks(self.batch_size) {
            decoder.serialize(chunk)?;
            if let Some(batch) = decoder.flush()? {
                writer.write(&batch)?;
            }
        }

        writer.close()?;
        Ok(())
    }

    fn format(&self) -> OutputFormat {
        OutputFormat::Parquet
    }
}

/// Infer an Arrow schema covering every record.
///
/// Columns that are null in every record have no usable type; they are
/// written as nullable strings.
fn infer_schema(records: &RecordSet) -> StoreResult<SchemaRef> {
    let inferred = infer_json_schema_from_iterator(
        records
            .iter()
            .map(|record| Ok(serde_json::Value::Object(record.clone()))),
    )?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| match field.data_type() {
            DataType::Null => Field::new(field.name(), DataType::Utf8, true),
            _ => field.as_ref().clone().with_nullable(true),
        })
        .collect();

    Ok(Arc::new(Schema::new(fields)))
}
