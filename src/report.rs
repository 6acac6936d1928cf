//! Schema report writer
//!
//! Serializes scan rows to CSV with the header
//! `GDB,Ruta,Capa,Num_Objetos,Campo,Tipo`.

use crate::error::ReportResult;
use crate::scanner::SchemaRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What happened to the report file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// File written with this many data rows
    Written { path: PathBuf, rows: usize },

    /// No rows; no file was created
    Empty,
}

/// Write `records` as CSV to `writer`, returning the number of data rows
pub fn write_schema_csv<W: Write>(writer: W, records: &[SchemaRecord]) -> ReportResult<usize> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(records.len())
}

/// Write the schema report to `path`
///
/// An empty record set leaves the file system untouched.
pub fn write_schema_report(path: &Path, records: &[SchemaRecord]) -> ReportResult<ReportOutcome> {
    if records.is_empty() {
        warn!(path = %path.display(), "No schema rows, report not written");
        return Ok(ReportOutcome::Empty);
    }

    let file = File::create(path)?;
    let rows = write_schema_csv(BufWriter::new(file), records)?;
    info!(path = %path.display(), rows, "Schema report written");

    Ok(ReportOutcome::Written {
        path: path.to_path_buf(),
        rows,
    })
}
