//! In-memory geodatabase backend
//!
//! Holds containers as plain Rust values keyed by path. Used for fixtures
//! and tests; layers can be flagged to fail at a given stage so the
//! scanner's and exporter's failure handling can be exercised without a
//! native library.

use super::types::{
    geometry_to_wkt, CellValue, FieldDef, GeometryColumn, LayerSchema, LayerTable,
};
use super::GeodatabaseReader;
use crate::error::{GdbError, GdbResult};
use geo_types::Geometry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Which stage of reading a layer should fail
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FailurePlan {
    schema: bool,
    read: bool,
    attributes: bool,
}

/// A layer held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryLayer {
    name: String,
    fields: Vec<FieldDef>,
    rows: Vec<Vec<CellValue>>,
    geometry: Option<Vec<Option<String>>>,
    failures: FailurePlan,
}

impl MemoryLayer {
    /// Create an empty attribute-only layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            rows: Vec::new(),
            geometry: None,
            failures: FailurePlan::default(),
        }
    }

    /// Add a field definition
    pub fn field(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.fields.push(FieldDef::new(name, type_name));
        self
    }

    /// Add an attribute row
    pub fn row(mut self, cells: Vec<CellValue>) -> Self {
        if let Some(column) = self.geometry.as_mut() {
            column.push(None);
        }
        self.rows.push(cells);
        self
    }

    /// Add a row together with its geometry, turning this into a geometry layer
    pub fn feature(self, cells: Vec<CellValue>, geometry: Option<Geometry<f64>>) -> Self {
        let wkt = geometry_to_wkt(geometry.as_ref());
        self.push_feature(cells, wkt)
    }

    /// Add a row with geometry given as WKT, as a native backend reports it
    pub fn feature_wkt(self, cells: Vec<CellValue>, wkt: Option<&str>) -> Self {
        self.push_feature(cells, wkt.map(str::to_string))
    }

    fn push_feature(mut self, cells: Vec<CellValue>, wkt: Option<String>) -> Self {
        let column = self
            .geometry
            .get_or_insert_with(|| vec![None; self.rows.len()]);
        column.push(wkt);
        self.rows.push(cells);
        self
    }

    /// Make the schema read of this layer fail
    pub fn fail_schema(mut self) -> Self {
        self.failures.schema = true;
        self
    }

    /// Make the geometry-aware read of this layer fail
    pub fn fail_read(mut self) -> Self {
        self.failures.read = true;
        self
    }

    /// Make the attribute-only read of this layer fail
    pub fn fail_attributes(mut self) -> Self {
        self.failures.attributes = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> GdbResult<LayerSchema> {
        if self.failures.schema {
            return Err(GdbError::LayerSchema {
                layer: self.name.clone(),
                reason: "malformed layer definition".into(),
            });
        }

        Ok(LayerSchema {
            name: self.name.clone(),
            feature_count: self.rows.len() as u64,
            fields: self.fields.clone(),
        })
    }

    fn columns(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }
}

/// A geodatabase container held in memory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryGdb {
    layers: Vec<MemoryLayer>,
    unreadable: bool,
}

impl MemoryGdb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer; listing order is insertion order
    pub fn layer(mut self, layer: MemoryLayer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Make every open of this container fail
    pub fn unreadable(mut self) -> Self {
        self.unreadable = true;
        self
    }

    fn find(&self, layer: &str) -> GdbResult<&MemoryLayer> {
        self.layers
            .iter()
            .find(|l| l.name == layer)
            .ok_or_else(|| GdbError::LayerNotFound {
                layer: layer.to_string(),
            })
    }
}

/// Reader over a set of in-memory containers
#[derive(Debug, Clone, Default)]
pub struct MemoryReader {
    containers: HashMap<PathBuf, MemoryGdb>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a container under `path`
    pub fn with_gdb(mut self, path: impl Into<PathBuf>, gdb: MemoryGdb) -> Self {
        self.containers.insert(path.into(), gdb);
        self
    }

    fn open(&self, path: &Path) -> GdbResult<&MemoryGdb> {
        match self.containers.get(path) {
            Some(gdb) if !gdb.unreadable => Ok(gdb),
            Some(_) => Err(GdbError::OpenFailed {
                path: path.to_path_buf(),
                reason: "container is corrupt".into(),
            }),
            None => Err(GdbError::OpenFailed {
                path: path.to_path_buf(),
                reason: "no such container".into(),
            }),
        }
    }
}

impl GeodatabaseReader for MemoryReader {
    fn read_schema(&self, gdb: &Path) -> GdbResult<Vec<GdbResult<LayerSchema>>> {
        let container = self.open(gdb)?;
        Ok(container.layers.iter().map(MemoryLayer::schema).collect())
    }

    fn list_layers(&self, gdb: &Path) -> GdbResult<Vec<String>> {
        let container = self.open(gdb)?;
        Ok(container.layers.iter().map(|l| l.name.clone()).collect())
    }

    fn read_layer(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable> {
        let layer = self.open(gdb)?.find(layer)?;
        if layer.failures.read {
            return Err(GdbError::LayerRead {
                layer: layer.name.clone(),
                reason: "unsupported geometry type".into(),
            });
        }

        Ok(LayerTable {
            columns: layer.columns(),
            rows: layer.rows.clone(),
            geometry: layer
                .geometry
                .as_ref()
                .map(|wkt| GeometryColumn { wkt: wkt.clone() }),
        })
    }

    fn read_attributes(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable> {
        let layer = self.open(gdb)?.find(layer)?;
        if layer.failures.attributes {
            return Err(GdbError::LayerRead {
                layer: layer.name.clone(),
                reason: "attribute table unreadable".into(),
            });
        }

        Ok(LayerTable::attributes(layer.columns(), layer.rows.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;

    #[test]
    fn test_feature_backfills_geometry_column() {
        let layer = MemoryLayer::new("wells")
            .field("id", "Integer")
            .row(vec![CellValue::Integer(1)])
            .feature(vec![CellValue::Integer(2)], Some(Point::new(1.0, 2.0).into()));

        let geometry = layer.geometry.as_ref().unwrap();
        assert_eq!(geometry.len(), 2);
        assert!(geometry[0].is_none());
        assert!(geometry[1].as_deref().unwrap().starts_with("POINT"));
    }

    #[test]
    fn test_wkt_feature_is_passed_through() {
        let reader = MemoryReader::new().with_gdb(
            "/data/a.gdb",
            MemoryGdb::new().layer(
                MemoryLayer::new("poles")
                    .field("id", "Integer")
                    .feature_wkt(vec![CellValue::Integer(1)], Some("POINT Z (1 2 3)"))
                    .row(vec![CellValue::Integer(2)]),
            ),
        );

        let table = reader.read_layer(Path::new("/data/a.gdb"), "poles").unwrap();
        let geometry = table.geometry.unwrap();
        assert_eq!(
            geometry.wkt,
            vec![Some("POINT Z (1 2 3)".to_string()), None]
        );
    }

    #[test]
    fn test_unknown_container_fails_to_open() {
        let reader = MemoryReader::new();
        let err = reader.list_layers(Path::new("/nowhere.gdb")).unwrap_err();
        assert!(matches!(err, GdbError::OpenFailed { .. }));
    }

    #[test]
    fn test_schema_failure_is_per_layer() {
        let reader = MemoryReader::new().with_gdb(
            "/data/a.gdb",
            MemoryGdb::new()
                .layer(MemoryLayer::new("bad").fail_schema())
                .layer(MemoryLayer::new("good").field("name", "String")),
        );

        let layers = reader.read_schema(Path::new("/data/a.gdb")).unwrap();
        assert_eq!(layers.len(), 2);
        assert!(layers[0].is_err());
        assert_eq!(layers[1].as_ref().unwrap().fields.len(), 1);
    }
}
