//! Content exporter
//!
//! Writes the layers of one geodatabase into a single XLSX workbook, one
//! sheet per layer, skipping topology/validation layers.
//!
//! ```text
//! list_layers ──► ExclusionFilter ──► for each kept layer (in order):
//!                                       read_layer ──► Sheet (+ geometry_wkt)
//!                                          │ fail
//!                                          ▼
//!                                       read_attributes ──► Sheet
//!                                          │ fail
//!                                          ▼
//!                                       skip, log both errors
//!                                                │
//!                                                ▼
//!                                         XlsxWorkbook::save
//! ```
//!
//! Failures before the workbook exists (missing path, no layers, all
//! layers excluded) abort the export. Failures of single layers never do.

pub mod filter;
pub mod layer;
pub mod sheet;
pub mod workbook;

pub use filter::{select_layers, ExclusionFilter, LayerSelection, DEFAULT_EXCLUDE_PATTERNS};
pub use layer::{export_layer, ExportMode, LayerOutcome};
pub use sheet::{sanitize_sheet_name, SheetNamer, MAX_SHEET_NAME_LEN};
pub use workbook::{Sheet, SheetSink, XlsxWorkbook, GEOMETRY_WKT_COLUMN};

use crate::config::{ensure_gdb_exists, ExportConfig};
use crate::error::{ExportError, Result};
use crate::gdb::GeodatabaseReader;
use crate::progress::ProgressReporter;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Suffix identifying a geodatabase container
const GDB_SUFFIX: &str = ".gdb";

/// Result of a completed export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Workbook that was written
    pub output_path: PathBuf,

    /// Per-layer outcomes, in listing order
    pub outcomes: Vec<LayerOutcome>,

    /// Layers dropped by exclusion patterns
    pub excluded: Vec<String>,

    /// Time taken
    pub duration: Duration,
}

impl ExportReport {
    pub fn exported(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_exported()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.exported()
    }

    /// Total rows written across all sheets
    pub fn total_rows(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o {
                LayerOutcome::Exported { rows, .. } => *rows,
                LayerOutcome::Skipped { .. } => 0,
            })
            .sum()
    }
}

/// Default workbook path: `<dir>/<name>_export_<YYYYMMDD_HHMMSS>.xlsx`
/// next to the container
pub fn default_output_path(gdb: &Path, now: DateTime<Local>) -> PathBuf {
    let file_name = gdb
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "geodatabase".to_string());
    let stem = strip_gdb_suffix(&file_name);

    let name = format!("{}_export_{}.xlsx", stem, now.format("%Y%m%d_%H%M%S"));
    match gdb.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn strip_gdb_suffix(name: &str) -> &str {
    let split = name.len().saturating_sub(GDB_SUFFIX.len());
    match name.get(split..) {
        Some(suffix) if suffix.eq_ignore_ascii_case(GDB_SUFFIX) => &name[..split],
        _ => name,
    }
}

/// Exports one geodatabase to a workbook
pub struct GdbExporter<'r, R: ?Sized> {
    reader: &'r R,
    config: ExportConfig,
    output_path: PathBuf,
}

impl<'r, R: GeodatabaseReader + ?Sized> GdbExporter<'r, R> {
    /// Resolves the default workbook path once, at construction
    pub fn new(reader: &'r R, config: ExportConfig) -> Self {
        let output_path = config
            .output_path
            .clone()
            .unwrap_or_else(|| default_output_path(&config.gdb_path, Local::now()));
        Self {
            reader,
            config,
            output_path,
        }
    }

    /// Path the workbook will be written to
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Run the export and return the report
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<ExportReport> {
        let start = Instant::now();
        let gdb = self.config.gdb_path.as_path();
        ensure_gdb_exists(gdb)?;

        let output_path = self.output_path.clone();
        info!(gdb = %gdb.display(), output = %output_path.display(), "Exporting geodatabase");

        if let Some(p) = progress {
            p.set_status("Listing layers...");
        }
        let selection = select_layers(self.reader, gdb, &self.config.filter)?;

        let mut workbook = XlsxWorkbook::new();
        let mut namer = SheetNamer::new();
        let total = selection.kept.len();
        let mut outcomes = Vec::with_capacity(total);

        for (idx, layer) in selection.kept.iter().enumerate() {
            if let Some(p) = progress {
                p.set_status(&format!("Layer {}/{}: {}", idx + 1, total, layer));
            }

            let sheet_name = namer.assign(layer);
            outcomes.push(export_layer(self.reader, gdb, layer, &sheet_name, &mut workbook));
        }

        if workbook.sheet_count() == 0 {
            warn!(gdb = %gdb.display(), "No layer could be exported");
            return Err(ExportError::NothingExported {
                path: gdb.to_path_buf(),
            }
            .into());
        }

        if let Some(p) = progress {
            p.set_status("Saving workbook...");
        }
        workbook.save(&output_path)?;

        let report = ExportReport {
            output_path,
            outcomes,
            excluded: selection.excluded,
            duration: start.elapsed(),
        };
        info!(
            exported = report.exported(),
            skipped = report.skipped(),
            rows = report.total_rows(),
            "Export complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_output_path() {
        let now = Local.with_ymd_and_hms(2024, 1, 5, 9, 3, 7).unwrap();
        let path = default_output_path(Path::new("/data/gis/City.gdb"), now);
        assert_eq!(
            path,
            PathBuf::from("/data/gis/City_export_20240105_090307.xlsx")
        );
    }

    #[test]
    fn test_default_output_path_relative() {
        let now = Local.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).unwrap();
        let path = default_output_path(Path::new("roads.GDB"), now);
        assert_eq!(path, PathBuf::from("roads_export_20231231_235959.xlsx"));
    }

    #[test]
    fn test_strip_suffix() {
        assert_eq!(strip_gdb_suffix("a.gdb"), "a");
        assert_eq!(strip_gdb_suffix("a.Gdb"), "a");
        assert_eq!(strip_gdb_suffix("gdb"), "gdb");
        assert_eq!(strip_gdb_suffix("ñandú.gdb"), "ñandú");
    }
}
