//! Geodatabase access module
//!
//! Everything the scanner and exporter know about a File Geodatabase goes
//! through the [`GeodatabaseReader`] trait. Parsing is delegated to a
//! backend:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 GeodatabaseReader                    │
//! │  - read_schema      (scanner, per container)        │
//! │  - list_layers      (exporter)                      │
//! │  - read_layer       (exporter, geometry-aware)      │
//! │  - read_attributes  (exporter, fallback)            │
//! └──────────────┬──────────────────────┬───────────────┘
//!                │                      │
//!                ▼                      ▼
//! ┌──────────────────────────┐ ┌────────────────────────┐
//! │  GdalReader (feature)    │ │  MemoryReader          │
//! │  - OGR OpenFileGDB       │ │  - fixtures / tests    │
//! │  - dataset per call      │ │                        │
//! └──────────────────────────┘ └────────────────────────┘
//! ```
//!
//! Every call opens its own data source, so a reader can be shared by
//! reference across scan workers without any locking.

#[cfg(feature = "gdal")]
mod gdal_reader;
pub mod memory;
pub mod types;

#[cfg(feature = "gdal")]
pub use gdal_reader::GdalReader;
pub use memory::{MemoryGdb, MemoryLayer, MemoryReader};
pub use types::{geometry_to_wkt, CellValue, FieldDef, GeometryColumn, LayerSchema, LayerTable};

use crate::error::GdbResult;
use std::path::Path;

/// Read access to File Geodatabase containers
pub trait GeodatabaseReader: Send + Sync {
    /// Read the schema of every layer in index order.
    ///
    /// The outer error means the container could not be opened at all.
    /// Inner errors are per layer and do not affect sibling layers.
    fn read_schema(&self, gdb: &Path) -> GdbResult<Vec<GdbResult<LayerSchema>>>;

    /// List layer names in the order the backend reports them
    fn list_layers(&self, gdb: &Path) -> GdbResult<Vec<String>>;

    /// Read a layer with attributes and geometry
    fn read_layer(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable>;

    /// Read a layer as a plain attribute table, ignoring geometry
    fn read_attributes(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable>;
}

impl<R: GeodatabaseReader + ?Sized> GeodatabaseReader for Box<R> {
    fn read_schema(&self, gdb: &Path) -> GdbResult<Vec<GdbResult<LayerSchema>>> {
        (**self).read_schema(gdb)
    }

    fn list_layers(&self, gdb: &Path) -> GdbResult<Vec<String>> {
        (**self).list_layers(gdb)
    }

    fn read_layer(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable> {
        (**self).read_layer(gdb, layer)
    }

    fn read_attributes(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable> {
        (**self).read_attributes(gdb, layer)
    }
}

/// Create the native reader this binary was built with
pub fn open_backend() -> GdbResult<Box<dyn GeodatabaseReader>> {
    #[cfg(feature = "gdal")]
    {
        Ok(Box::new(GdalReader::new()))
    }

    #[cfg(not(feature = "gdal"))]
    {
        Err(crate::error::GdbError::BackendUnavailable)
    }
}
