//! Writes record sets to the output directory, one file per pairing.

use crate::error::{StoreError, StoreResult};
use crate::json::{JsonWriter, NdjsonWriter};
use crate::parquet::ParquetWriter;
use crate::traits::RecordWriter;
use rp_core::{OutputFormat, RecordSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// What a successful persist wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistReport {
    pub path: PathBuf,
    pub bytes: u64,
    pub rows: usize,
}

/// Serializes record sets into `output_dir` with overwrite semantics
pub struct Persister {
    output_dir: PathBuf,
    writer: Box<dyn RecordWriter>,
}

impl Persister {
    /// Persister for the given directory and format
    pub fn new(output_dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self::with_writer(output_dir, writer_for(format))
    }

    /// Persister using a custom writer
    pub fn with_writer(output_dir: impl Into<PathBuf>, writer: Box<dyn RecordWriter>) -> Self {
        Self {
            output_dir: output_dir.into(),
            writer,
        }
    }

    /// Directory receiving output files
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Format written by this persister
    pub fn format(&self) -> OutputFormat {
        self.writer.format()
    }

    /// Write `records` to `output_dir/file_name`.
    ///
    /// Absent or empty record sets are rejected without touching the file
    /// system. The file is written to a temporary sibling and renamed over
    /// the target, so readers never see a half-written file.
    pub fn persist(
        &self,
        records: Option<&RecordSet>,
        file_name: &str,
    ) -> StoreResult<PersistReport> {
        let records = match records {
            Some(records) if !records.is_empty() => records,
            _ => return Err(StoreError::EmptyRecordSet),
        };
        check_file_name(file_name)?;

        fs::create_dir_all(&self.output_dir).map_err(|e| io_error(&self.output_dir, e))?;

        let path = self.output_dir.join(file_name);
        let temp_path = self.output_dir.join(format!(".{}.tmp", file_name));

        if let Err(err) = self.write_file(records, &temp_path) {
            // Best-effort cleanup
            let _ = fs::remove_file(&temp_path);
            return Err(err);
        }

        fs::rename(&temp_path, &path).map_err(|e| io_error(&path, e))?;
        let bytes = fs::metadata(&path).map_err(|e| io_error(&path, e))?.len();

        log::info!(
            "Wrote {} records ({} bytes) to {}",
            records.len(),
            bytes,
            path.display()
        );

        Ok(PersistReport {
            path,
            bytes,
            rows: records.len(),
        })
    }

    fn write_file(&self, records: &RecordSet, temp_path: &Path) -> StoreResult<()> {
        let file = fs::File::create(temp_path).map_err(|e| io_error(temp_path, e))?;
        let mut out = BufWriter::new(file);
        self.writer.write(records, &mut out)?;
        out.flush().map_err(|e| io_error(temp_path, e))?;
        out.get_ref()
            .sync_all()
            .map_err(|e| io_error(temp_path, e))?;
        Ok(())
    }
}

/// Writer for an output format
pub fn writer_for(format: OutputFormat) -> Box<dyn RecordWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter),
        OutputFormat::Ndjson => Box::new(NdjsonWriter),
        OutputFormat::Parquet => Box::new(ParquetWriter::default()),
    }
}

fn check_file_name(name: &str) -> StoreResult<()> {
    let plain = Path::new(name)
        .file_name()
        .map(|f| f == std::ffi::OsStr::new(name))
        .unwrap_or(false);
    if name.is_empty() || !plain {
        return Err(StoreError::InvalidFileName {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "persister_test.rs"]
mod tests;
