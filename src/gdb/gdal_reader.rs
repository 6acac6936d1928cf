//! GDAL/OGR backed geodatabase reader
//!
//! Opens containers read-only through the OpenFileGDB driver (or the
//! proprietary FileGDB driver when GDAL was built with it). A fresh
//! `Dataset` is opened for every call; datasets are never shared between
//! threads.

use super::types::{CellValue, FieldDef, GeometryColumn, LayerSchema, LayerTable};
use super::GeodatabaseReader;
use crate::error::{GdbError, GdbResult};
use gdal::vector::{field_type_to_name, Feature, FieldValue, Layer, LayerAccess, OGRFieldType};
use gdal::{Dataset, DatasetOptions, GdalOpenFlags};
use std::path::Path;
use tracing::debug;

/// Drivers able to read File Geodatabases, in order of preference
const GDB_DRIVERS: &[&str] = &["OpenFileGDB", "FileGDB"];

/// Reader backed by the GDAL vector API
#[derive(Debug, Clone, Copy, Default)]
pub struct GdalReader;

impl GdalReader {
    pub fn new() -> Self {
        Self
    }

    fn open(&self, path: &Path) -> GdbResult<Dataset> {
        let options = DatasetOptions {
            open_flags: GdalOpenFlags::GDAL_OF_VECTOR | GdalOpenFlags::GDAL_OF_READONLY,
            allowed_drivers: Some(GDB_DRIVERS),
            ..Default::default()
        };

        Dataset::open_ex(path, options).map_err(|e| GdbError::OpenFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl GeodatabaseReader for GdalReader {
    fn read_schema(&self, gdb: &Path) -> GdbResult<Vec<GdbResult<LayerSchema>>> {
        let dataset = self.open(gdb)?;
        let count = dataset.layer_count();
        debug!(gdb = %gdb.display(), layers = count, "Opened geodatabase");

        let layers = (0..count)
            .map(|idx| {
                let layer = dataset.layer(idx).map_err(|e| GdbError::LayerSchema {
                    layer: format!("#{}", idx),
                    reason: e.to_string(),
                })?;
                Ok(layer_schema(&layer))
            })
            .collect();

        Ok(layers)
    }

    fn list_layers(&self, gdb: &Path) -> GdbResult<Vec<String>> {
        let dataset = self.open(gdb)?;
        Ok(dataset.layers().map(|layer| layer.name()).collect())
    }

    fn read_layer(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable> {
        let dataset = self.open(gdb)?;
        let mut ogr_layer = open_layer(&dataset, layer)?;
        layer_table(&mut ogr_layer, true)
    }

    fn read_attributes(&self, gdb: &Path, layer: &str) -> GdbResult<LayerTable> {
        let dataset = self.open(gdb)?;
        let mut ogr_layer = open_layer(&dataset, layer)?;
        layer_table(&mut ogr_layer, false)
    }
}

fn open_layer<'a>(dataset: &'a Dataset, name: &str) -> GdbResult<Layer<'a>> {
    dataset
        .layer_by_name(name)
        .map_err(|_| GdbError::LayerNotFound {
            layer: name.to_string(),
        })
}

fn layer_schema(layer: &Layer<'_>) -> LayerSchema {
    let fields = layer
        .defn()
        .fields()
        .map(|field| FieldDef::new(field.name(), field_type_to_name(field.field_type())))
        .collect();

    LayerSchema {
        name: layer.name(),
        feature_count: layer.feature_count(),
        fields,
    }
}

/// Materialize every feature of `layer`
///
/// Geometry is serialized by OGR itself, so Z/M ordinates and curve types
/// come through as written in the container.
fn layer_table(layer: &mut Layer<'_>, with_geometry: bool) -> GdbResult<LayerTable> {
    let name = layer.name();
    let (columns, types): (Vec<String>, Vec<OGRFieldType::Type>) = layer
        .defn()
        .fields()
        .map(|field| (field.name(), field.field_type()))
        .unzip();
    let geometry = with_geometry && layer.defn().geom_fields().next().is_some();

    let mut rows = Vec::new();
    let mut wkt = Vec::new();
    for (idx, feature) in layer.features().enumerate() {
        rows.push(feature_cells(&feature, &types));
        if geometry {
            let text = match feature.geometry() {
                Some(geom) => Some(geom.wkt().map_err(|e| GdbError::Geometry {
                    layer: name.clone(),
                    feature: idx as u64,
                    reason: e.to_string(),
                })?),
                None => None,
            };
            wkt.push(text);
        }
    }

    Ok(LayerTable {
        columns,
        rows,
        geometry: geometry.then_some(GeometryColumn { wkt }),
    })
}

/// One cell per field definition, in definition order
fn feature_cells(feature: &Feature<'_>, types: &[OGRFieldType::Type]) -> Vec<CellValue> {
    types
        .iter()
        .enumerate()
        .map(|(idx, field_type)| field_cell(feature, idx, *field_type))
        .collect()
}

fn field_cell(feature: &Feature<'_>, idx: usize, field_type: OGRFieldType::Type) -> CellValue {
    match feature.field(idx) {
        Ok(Some(value)) => to_cell(value),
        Ok(None) => CellValue::Null,
        // No typed accessor (binary, time); OGR still renders these as text
        Err(_) => match feature.field_as_string(idx) {
            Ok(Some(text)) if field_type == OGRFieldType::OFTBinary => {
                CellValue::from_hex(&text).unwrap_or(CellValue::Text(text))
            }
            Ok(text) => text.into(),
            Err(e) => {
                debug!(field = idx, error = %e, "Unreadable field value");
                CellValue::Null
            }
        },
    }
}

#[allow(unreachable_patterns)]
fn to_cell(value: FieldValue) -> CellValue {
    match value {
        FieldValue::IntegerValue(v) => CellValue::Integer(v as i64),
        FieldValue::Integer64Value(v) => CellValue::Integer(v),
        FieldValue::RealValue(v) => CellValue::Real(v),
        FieldValue::StringValue(v) => CellValue::Text(v),
        FieldValue::DateValue(v) => CellValue::Date(v),
        FieldValue::DateTimeValue(v) => CellValue::DateTime(v.naive_local()),
        FieldValue::IntegerListValue(v) => CellValue::Text(join(&v)),
        FieldValue::Integer64ListValue(v) => CellValue::Text(join(&v)),
        FieldValue::RealListValue(v) => CellValue::Text(join(&v)),
        FieldValue::StringListValue(v) => CellValue::Text(v.join(",")),
        other => CellValue::Text(format!("{:?}", other)),
    }
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdal::vector::{Defn, Geometry, LayerOptions, OGRwkbGeometryType};
    use gdal::DriverManager;

    /// In-memory OGR dataset with a 3D point layer whose middle fields
    /// have no typed accessor
    fn poles() -> Dataset {
        let driver = DriverManager::get_driver_by_name("Memory").unwrap();
        let mut dataset = driver.create_vector_only("").unwrap();
        let mut layer = dataset
            .create_layer(LayerOptions {
                name: "poles",
                ty: OGRwkbGeometryType::wkbPoint25D,
                ..Default::default()
            })
            .unwrap();
        layer
            .create_defn_fields(&[
                ("id", OGRFieldType::OFTInteger),
                ("photo", OGRFieldType::OFTBinary),
                ("installed", OGRFieldType::OFTTime),
                ("name", OGRFieldType::OFTString),
            ])
            .unwrap();

        let defn = Defn::from_layer(&layer);
        for (id, wkt) in [(1, Some("POINT Z (1 2 3)")), (2, None)] {
            let mut feature = Feature::new(&defn).unwrap();
            feature.set_field_integer(0, id).unwrap();
            // OGR parses hex for binary fields and text for time fields
            feature.set_field_string(1, "CAFE").unwrap();
            feature.set_field_string(2, "12:30:00").unwrap();
            feature.set_field_string(3, &format!("pole-{}", id)).unwrap();
            if let Some(wkt) = wkt {
                feature.set_geometry(Geometry::from_wkt(wkt).unwrap()).unwrap();
            }
            feature.create(&mut layer).unwrap();
        }
        drop(layer);
        dataset
    }

    #[test]
    fn test_cells_stay_aligned_with_columns() {
        let dataset = poles();
        let mut layer = open_layer(&dataset, "poles").unwrap();
        let table = layer_table(&mut layer, false).unwrap();

        assert_eq!(table.columns, vec!["id", "photo", "installed", "name"]);
        assert!(table.geometry.is_none());
        assert_eq!(
            table.rows[0],
            vec![
                CellValue::Integer(1),
                CellValue::Binary(vec![0xCA, 0xFE]),
                CellValue::Text("12:30:00".into()),
                CellValue::Text("pole-1".into()),
            ]
        );
        assert_eq!(table.rows[1].len(), 4);
        assert_eq!(table.rows[1][3], CellValue::Text("pole-2".into()));
    }

    #[test]
    fn test_geometry_keeps_z_ordinates() {
        let dataset = poles();
        let mut layer = open_layer(&dataset, "poles").unwrap();
        let table = layer_table(&mut layer, true).unwrap();

        assert_eq!(table.rows[0][3], CellValue::Text("pole-1".into()));
        let wkt = table.geometry.unwrap().wkt;
        assert_eq!(wkt.len(), 2);
        let first = wkt[0].as_deref().unwrap();
        assert!(first.starts_with("POINT"), "{}", first);
        assert!(first.contains("1 2 3"), "{}", first);
        assert_eq!(wkt[1], None);
    }

    #[test]
    fn test_layer_schema_names_field_types() {
        let dataset = poles();
        let layer = open_layer(&dataset, "poles").unwrap();
        let schema = layer_schema(&layer);

        assert_eq!(schema.name, "poles");
        assert_eq!(schema.feature_count, 2);
        assert_eq!(
            schema.fields,
            vec![
                FieldDef::new("id", "Integer"),
                FieldDef::new("photo", "Binary"),
                FieldDef::new("installed", "Time"),
                FieldDef::new("name", "String"),
            ]
        );
    }

    #[test]
    fn test_unknown_layer_is_not_found() {
        let dataset = poles();
        let err = open_layer(&dataset, "missing").unwrap_err();
        assert!(matches!(err, GdbError::LayerNotFound { .. }));
    }
}
