//! Workbook output
//!
//! A [`Sheet`] is the fully built content of one worksheet. Sheets are
//! assembled in memory before anything touches the workbook, so a failed
//! attempt never leaves a half-written worksheet behind and the layer can
//! be retried under the same name.

use crate::error::{ExportError, ExportResult};
use crate::gdb::{CellValue, LayerTable};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;
use tracing::warn;

/// Name of the synthetic geometry column
pub const GEOMETRY_WKT_COLUMN: &str = "geometry_wkt";

/// Longest string Excel stores in a single cell
const MAX_CELL_CHARS: usize = 32_767;

/// Largest magnitude an `f64` holds without rounding an integer
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Content of one worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Build a sheet from a layer table
    ///
    /// The raw geometry column is replaced by a `geometry_wkt` text column
    /// when present.
    pub fn from_table(name: impl Into<String>, table: LayerTable) -> Self {
        let LayerTable {
            mut columns,
            mut rows,
            geometry,
        } = table;

        if let Some(geometry) = geometry {
            columns.push(GEOMETRY_WKT_COLUMN.to_string());
            let mut wkt = geometry.wkt.into_iter();
            for row in rows.iter_mut() {
                row.push(wkt.next().flatten().into());
            }
        }

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// Destination for finished sheets
pub trait SheetSink {
    fn write_sheet(&mut self, sheet: &Sheet) -> ExportResult<()>;
}

impl SheetSink for Vec<Sheet> {
    fn write_sheet(&mut self, sheet: &Sheet) -> ExportResult<()> {
        self.push(sheet.clone());
        Ok(())
    }
}

/// XLSX workbook kept open for a whole export run
pub struct XlsxWorkbook {
    workbook: Workbook,
    header: Format,
    sheets: usize,
}

impl XlsxWorkbook {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            header: Format::new().set_bold(),
            sheets: 0,
        }
    }

    /// Number of sheets added so far
    pub fn sheet_count(&self) -> usize {
        self.sheets
    }

    /// Write the workbook to `path`, replacing any existing file
    pub fn save(&mut self, path: &Path) -> ExportResult<()> {
        self.workbook.save(path)?;
        Ok(())
    }

    fn build_worksheet(&self, sheet: &Sheet) -> ExportResult<Worksheet> {
        let sheet_err = |reason: String| ExportError::Sheet {
            sheet: sheet.name.clone(),
            reason,
        };

        let mut worksheet = Worksheet::new();
        worksheet.set_name(&sheet.name)?;

        for (col, name) in sheet.columns.iter().enumerate() {
            let col = u16::try_from(col).map_err(|_| sheet_err("too many columns".into()))?;
            worksheet.write_string_with_format(0, col, name, &self.header)?;
        }
        worksheet.set_freeze_panes(1, 0)?;

        for (idx, row) in sheet.rows.iter().enumerate() {
            let row_num = u32::try_from(idx + 1).map_err(|_| sheet_err("too many rows".into()))?;
            for (col, cell) in row.iter().enumerate() {
                let col = u16::try_from(col).map_err(|_| sheet_err("too many columns".into()))?;
                write_cell(&mut worksheet, row_num, col, cell, &sheet.name)?;
            }
        }

        Ok(worksheet)
    }
}

impl Default for XlsxWorkbook {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetSink for XlsxWorkbook {
    fn write_sheet(&mut self, sheet: &Sheet) -> ExportResult<()> {
        let worksheet = self.build_worksheet(sheet)?;
        self.workbook.push_worksheet(worksheet);
        self.sheets += 1;
        Ok(())
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    sheet: &str,
) -> ExportResult<()> {
    match cell {
        CellValue::Null => {}
        CellValue::Integer(v) => match exact_f64(*v) {
            Some(number) => {
                worksheet.write_number(row, col, number)?;
            }
            None => {
                worksheet.write_string(row, col, v.to_string())?;
            }
        },
        CellValue::Real(v) if v.is_finite() => {
            worksheet.write_number(row, col, *v)?;
        }
        CellValue::Text(v) => {
            worksheet.write_string(row, col, clip(v, sheet, row))?;
        }
        other => {
            let text = other.to_string();
            worksheet.write_string(row, col, clip(&text, sheet, row))?;
        }
    }
    Ok(())
}

/// Excel stores numbers as doubles; larger integers are kept as text
fn exact_f64(value: i64) -> Option<f64> {
    (value.unsigned_abs() <= MAX_EXACT_INTEGER).then_some(value as f64)
}

fn clip<'a>(value: &'a str, sheet: &str, row: u32) -> &'a str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((end, _)) => {
            warn!(sheet, row, "Cell text exceeds Excel limit, truncating");
            &value[..end]
        }
        None => value,
    }
}
