//! Per-container schema extraction

use crate::gdb::GeodatabaseReader;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// One row of the schema report: a field of a layer of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaRecord {
    /// Container directory name
    #[serde(rename = "GDB")]
    pub gdb: String,

    /// Full container path
    #[serde(rename = "Ruta")]
    pub path: String,

    #[serde(rename = "Capa")]
    pub layer: String,

    #[serde(rename = "Num_Objetos")]
    pub feature_count: u64,

    #[serde(rename = "Campo")]
    pub field: String,

    #[serde(rename = "Tipo")]
    pub field_type: String,
}

/// A layer whose schema could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFailure {
    /// Layer index within the container
    pub index: usize,
    pub reason: String,
}

/// Outcome of scanning one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerOutcome {
    /// Container opened; some layers may still have failed
    Scanned {
        path: PathBuf,
        layers: usize,
        records: Vec<SchemaRecord>,
        failed_layers: Vec<LayerFailure>,
    },

    /// Container could not be opened; contributes no rows
    Failed { path: PathBuf, reason: String },
}

impl ContainerOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ContainerOutcome::Scanned { path, .. } => path,
            ContainerOutcome::Failed { path, .. } => path,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ContainerOutcome::Failed { .. })
    }

    /// Rows contributed by this container
    pub fn records(&self) -> &[SchemaRecord] {
        match self {
            ContainerOutcome::Scanned { records, .. } => records,
            ContainerOutcome::Failed { .. } => &[],
        }
    }

    pub fn failed_layer_count(&self) -> usize {
        match self {
            ContainerOutcome::Scanned { failed_layers, .. } => failed_layers.len(),
            ContainerOutcome::Failed { .. } => 0,
        }
    }

    pub fn into_records(self) -> Vec<SchemaRecord> {
        match self {
            ContainerOutcome::Scanned { records, .. } => records,
            ContainerOutcome::Failed { .. } => Vec::new(),
        }
    }
}

/// Container base name as shown in the report
pub fn container_name(gdb: &Path) -> String {
    gdb.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| gdb.display().to_string())
}

/// Read the schema of every layer of `gdb` into report rows
///
/// Never fails: an unopenable container yields [`ContainerOutcome::Failed`]
/// and a bad layer is recorded without affecting the others.
pub fn extract_container<R: GeodatabaseReader + ?Sized>(
    reader: &R,
    gdb: &Path,
) -> ContainerOutcome {
    let layers = match reader.read_schema(gdb) {
        Ok(layers) => layers,
        Err(e) => {
            warn!(container = %gdb.display(), error = %e, "Could not open geodatabase");
            return ContainerOutcome::Failed {
                path: gdb.to_path_buf(),
                reason: e.to_string(),
            };
        }
    };

    let name = container_name(gdb);
    let display_path = gdb.display().to_string();
    let total = layers.len();
    let mut records = Vec::new();
    let mut failed_layers = Vec::new();

    for (index, layer) in layers.into_iter().enumerate() {
        match layer {
            Ok(schema) => {
                records.extend(schema.fields.iter().map(|field| SchemaRecord {
                    gdb: name.clone(),
                    path: display_path.clone(),
                    layer: schema.name.clone(),
                    feature_count: schema.feature_count,
                    field: field.name.clone(),
                    field_type: field.type_name.clone(),
                }));
                debug!(
                    container = %name,
                    layer = %schema.name,
                    "Processed layer {}/{}",
                    index + 1,
                    total
                );
            }
            Err(e) => {
                warn!(container = %name, index, error = %e, "Error processing layer");
                failed_layers.push(LayerFailure {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    info!(
        container = %name,
        layers = total,
        rows = records.len(),
        failed = failed_layers.len(),
        "Processed geodatabase"
    );

    ContainerOutcome::Scanned {
        path: gdb.to_path_buf(),
        layers: total,
        records,
        failed_layers,
    }
}
