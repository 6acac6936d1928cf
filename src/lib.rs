//! gdb-extract - Schema and content extractor for Esri File Geodatabases
//!
//! Finds `.gdb` containers on disk and flattens what is inside them into
//! plain tabular files GIS analysts can open anywhere.
//!
//! # Features
//!
//! - **Schema scan**: walks a directory tree, reads the field definitions
//!   of every layer of every container on a fixed pool of worker threads,
//!   and writes one CSV row per field.
//!
//! - **Workbook export**: writes every layer of one container to an XLSX
//!   workbook, one sheet per layer, with geometry serialized as WKT.
//!
//! - **Best effort**: an unreadable container, layer or geometry is logged
//!   and skipped; the rest of the run carries on.
//!
//! # Architecture
//!
//! ```text
//!        scan                                   export
//!  ┌──────────────┐                      ┌──────────────────┐
//!  │  root dir    │                      │  one .gdb        │
//!  └──────┬───────┘                      └────────┬─────────┘
//!         │ walkdir                               │ list_layers
//!         ▼                                       ▼
//!  ┌──────────────┐                      ┌──────────────────┐
//!  │  ScanPool    │  GeodatabaseReader   │ ExclusionFilter  │
//!  │  N threads   │◄──── (gdal) ────────►│ read_layer /     │
//!  │  read_schema │                      │ read_attributes  │
//!  └──────┬───────┘                      └────────┬─────────┘
//!         │                                       │
//!         ▼                                       ▼
//!  ┌──────────────┐                      ┌──────────────────┐
//!  │ atributos_   │                      │ <name>_export_   │
//!  │ gdbs.csv     │                      │ <ts>.xlsx        │
//!  └──────────────┘                      └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Schema of every geodatabase under /data/gis
//! gdb-extract scan /data/gis -w 8
//!
//! # One geodatabase to Excel, skipping temporary layers too
//! gdb-extract export /data/gis/City.gdb --exclude 'tmp_*'
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod gdb;
pub mod progress;
pub mod prompt;
pub mod report;
pub mod scanner;

pub use config::{CliArgs, ExportConfig, ScanConfig};
pub use error::{ExtractError, Result};
pub use export::{ExportReport, GdbExporter};
pub use gdb::{open_backend, GeodatabaseReader};
pub use report::{write_schema_report, ReportOutcome};
pub use scanner::{ScanReport, SchemaRecord, SchemaScanner};
