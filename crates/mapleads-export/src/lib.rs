//! Appending CSV persistence for extracted leads.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use mapleads_core::{BusinessRecord, RecordSink, RECORD_HEADERS};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> ExportError + '_ {
    move |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Appends records to a CSV file, writing the header row only when the
/// file is new or empty.
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSink for CsvSink {
    type Error = ExportError;

    fn write_all(&mut self, records: &[BusinessRecord]) -> Result<usize, ExportError> {
        append_records(&self.path, records)
    }
}

/// Appends `records` to the CSV file at `path`.
///
/// The rows are encoded in memory first and written with a single append,
/// so an encoding failure leaves the file untouched. An empty `records`
/// slice writes nothing, not even a header.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the directory or file cannot be created
/// or written, and [`ExportError::Csv`] if a record fails to encode.
pub fn append_records(path: &Path, records: &[BusinessRecord]) -> Result<usize, ExportError> {
    if records.is_empty() {
        tracing::info!(path = %path.display(), "no records to write");
        return Ok(0);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let needs_header = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => return Err(io_error(path)(e)),
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    if needs_header {
        writer.write_record(RECORD_HEADERS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    let encoded = writer
        .into_inner()
        .map_err(|e| io_error(path)(e.into_error()))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error(path))?;
    file.write_all(&encoded).map_err(io_error(path))?;
    file.flush().map_err(io_error(path))?;

    tracing::info!(
        path = %path.display(),
        rows = records.len(),
        header = needs_header,
        "records appended"
    );
    Ok(records.len())
}
