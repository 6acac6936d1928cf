//! Export of a single layer with attribute-table fallback

use super::workbook::{Sheet, SheetSink};
use crate::gdb::GeodatabaseReader;
use std::path::Path;
use tracing::{info, warn};

/// How a layer ended up in the workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportMode {
    /// Read with geometry (converted to WKT when present)
    Geometry,
    /// Primary read failed; attributes only
    AttributesOnly,
}

/// Outcome of exporting one layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    /// A sheet was written
    Exported {
        layer: String,
        sheet: String,
        rows: usize,
        mode: ExportMode,
    },

    /// Both read attempts failed; no sheet was written
    Skipped {
        layer: String,
        primary: String,
        fallback: String,
    },
}

impl LayerOutcome {
    pub fn is_exported(&self) -> bool {
        matches!(self, LayerOutcome::Exported { .. })
    }

    pub fn layer(&self) -> &str {
        match self {
            LayerOutcome::Exported { layer, .. } => layer,
            LayerOutcome::Skipped { layer, .. } => layer,
        }
    }
}

/// Export `layer` of `gdb` into `sink` as sheet `sheet_name`
///
/// The layer is first read with geometry. Any failure there (read or
/// sheet write) falls back to an attribute-only read. If that fails too
/// the layer is skipped; the error never propagates.
pub fn export_layer<R, S>(
    reader: &R,
    gdb: &Path,
    layer: &str,
    sheet_name: &str,
    sink: &mut S,
) -> LayerOutcome
where
    R: GeodatabaseReader + ?Sized,
    S: SheetSink + ?Sized,
{
    let primary = reader
        .read_layer(gdb, layer)
        .map_err(|e| e.to_string())
        .and_then(|table| write(&mut *sink, Sheet::from_table(sheet_name, table)));

    let primary_err = match primary {
        Ok(rows) => {
            info!(layer, sheet = sheet_name, rows, "Exported layer");
            return LayerOutcome::Exported {
                layer: layer.to_string(),
                sheet: sheet_name.to_string(),
                rows,
                mode: ExportMode::Geometry,
            };
        }
        Err(e) => e,
    };

    warn!(layer, error = %primary_err, "Layer read failed, retrying as attribute table");

    let fallback = reader
        .read_attributes(gdb, layer)
        .map_err(|e| e.to_string())
        .and_then(|mut table| {
            table.geometry = None;
            write(&mut *sink, Sheet::from_table(sheet_name, table))
        });

    match fallback {
        Ok(rows) => {
            info!(layer, sheet = sheet_name, rows, "Exported layer as attribute table");
            LayerOutcome::Exported {
                layer: layer.to_string(),
                sheet: sheet_name.to_string(),
                rows,
                mode: ExportMode::AttributesOnly,
            }
        }
        Err(fallback_err) => {
            warn!(
                layer,
                primary = %primary_err,
                fallback = %fallback_err,
                "Skipping layer, both read attempts failed"
            );
            LayerOutcome::Skipped {
                layer: layer.to_string(),
                primary: primary_err,
                fallback: fallback_err,
            }
        }
    }
}

fn write<S: SheetSink + ?Sized>(sink: &mut S, sheet: Sheet) -> Result<usize, String> {
    sink.write_sheet(&sheet).map_err(|e| e.to_string())?;
    Ok(sheet.rows.len())
}
