//! Geodatabase data types
//!
//! These are the backend-neutral views a reader hands back: layer schemas
//! for the scanner and fully materialized layer tables for the exporter.

use chrono::{NaiveDate, NaiveDateTime};
use geo_types::Geometry;
use std::fmt;
use wkt::ToWkt;

/// A field of a layer definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Declared type name (OGR naming: Integer, Real, String, ...)
    pub type_name: String,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Schema of a single layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSchema {
    /// Layer name
    pub name: String,

    /// Number of features reported by the backend
    pub feature_count: u64,

    /// Fields in definition order
    pub fields: Vec<FieldDef>,
}

/// A single attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Missing / unset value
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Raw bytes of a binary field, shown as uppercase hex
    Binary(Vec<u8>),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Decode a hex dump into a binary cell; `None` if it is not valid hex
    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() % 2 != 0 {
            return None;
        }
        (0..hex.len())
            .step_by(2)
            .map(|i| hex.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
            .collect::<Option<Vec<u8>>>()
            .map(CellValue::Binary)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Null, CellValue::Text)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{}", v),
            CellValue::Text(v) => f.write_str(v),
            CellValue::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            CellValue::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Binary(bytes) => bytes.iter().try_for_each(|b| write!(f, "{:02X}", b)),
        }
    }
}

/// Serialize a geometry to Well-Known Text; `None` stays `None`
pub fn geometry_to_wkt(geometry: Option<&Geometry<f64>>) -> Option<String> {
    geometry.map(|g| g.wkt_string())
}

/// Geometry column of a layer table as WKT, one slot per row
///
/// Backends serialize geometry themselves so Z/M ordinates and curve
/// types survive unchanged.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeometryColumn {
    /// Per-row WKT; `None` for features without geometry
    pub wkt: Vec<Option<String>>,
}

/// Fully materialized content of one layer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayerTable {
    /// Attribute column names in definition order
    pub columns: Vec<String>,

    /// Attribute rows; each row has `columns.len()` cells
    pub rows: Vec<Vec<CellValue>>,

    /// Geometry column, if the layer carries geometry
    pub geometry: Option<GeometryColumn>,
}

impl LayerTable {
    /// Create an attribute-only table
    pub fn attributes(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            columns,
            rows,
            geometry: None,
        }
    }

    /// Number of feature rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{line_string, Point};

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Integer(42).to_string(), "42");
        assert_eq!(CellValue::Text("abc".into()).to_string(), "abc");
        assert_eq!(CellValue::Binary(vec![0x00, 0xAB, 0x7f]).to_string(), "00AB7F");

        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(CellValue::Date(date).to_string(), "2024-03-09");
        let dt = date.and_hms_opt(8, 5, 0).unwrap();
        assert_eq!(CellValue::DateTime(dt).to_string(), "2024-03-09 08:05:00");
    }

    #[test]
    fn test_cell_from_optional_text() {
        assert!(CellValue::from(None).is_null());
        assert_eq!(
            CellValue::from(Some("x".to_string())),
            CellValue::Text("x".into())
        );
    }

    #[test]
    fn test_binary_from_hex() {
        assert_eq!(
            CellValue::from_hex("00ab7F"),
            Some(CellValue::Binary(vec![0x00, 0xAB, 0x7F]))
        );
        assert_eq!(CellValue::from_hex(""), Some(CellValue::Binary(vec![])));
        assert_eq!(CellValue::from_hex("abc"), None);
        assert_eq!(CellValue::from_hex("zz"), None);
        assert_eq!(CellValue::from_hex("é1"), None);
    }

    #[test]
    fn test_wkt_null_is_none() {
        assert_eq!(geometry_to_wkt(None), None);
    }

    #[test]
    fn test_wkt_point_and_line() {
        let point: Geometry<f64> = Point::new(1.5, 2.0).into();
        let wkt = geometry_to_wkt(Some(&point)).unwrap();
        assert!(wkt.starts_with("POINT"), "{}", wkt);
        assert!(wkt.contains("1.5 2"), "{}", wkt);

        let line: Geometry<f64> = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)].into();
        assert!(geometry_to_wkt(Some(&line)).unwrap().starts_with("LINESTRING"));
    }
}
