//! Schema scanner
//!
//! Finds every `.gdb` container below a root directory and records the
//! field schema of each of its layers.
//!
//! ```text
//!  root ──► discover_containers ──► [g0, g1, ... gN]
//!                                        │
//!                                        ▼
//!                        ┌─────── task channel ───────┐
//!                        ▼              ▼             ▼
//!                   scanner-0      scanner-1  ... scanner-k
//!                   extract_container (catch_unwind per container)
//!                        │              │             │
//!                        └──── join, merge by index ──┘
//!                                        │
//!                                        ▼
//!                                   ScanReport ──► CSV
//! ```

pub mod discovery;
pub mod extract;
pub mod pool;

pub use discovery::{discover_containers, is_gdb_name, GDB_EXTENSION};
pub use extract::{container_name, extract_container, ContainerOutcome, LayerFailure, SchemaRecord};
pub use pool::ScanPool;

use crate::config::ScanConfig;
use crate::gdb::GeodatabaseReader;
use crate::progress::ProgressReporter;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Result of a completed scan
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// One outcome per discovered container, in discovery order
    pub outcomes: Vec<ContainerOutcome>,

    /// Time taken
    pub duration: Duration,
}

impl ScanReport {
    pub fn containers(&self) -> usize {
        self.outcomes.len()
    }

    pub fn failed_containers(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failed()).count()
    }

    pub fn failed_layers(&self) -> usize {
        self.outcomes.iter().map(|o| o.failed_layer_count()).sum()
    }

    /// Number of report rows
    pub fn row_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.records().len()).sum()
    }

    /// All rows, grouped by container in discovery order
    pub fn records(&self) -> impl Iterator<Item = &SchemaRecord> {
        self.outcomes.iter().flat_map(|o| o.records())
    }

    pub fn into_records(self) -> Vec<SchemaRecord> {
        self.outcomes
            .into_iter()
            .flat_map(ContainerOutcome::into_records)
            .collect()
    }
}

/// Scans a directory tree for geodatabase schemas
pub struct SchemaScanner<'r, R: ?Sized> {
    reader: &'r R,
    config: ScanConfig,
}

impl<'r, R: GeodatabaseReader + ?Sized> SchemaScanner<'r, R> {
    pub fn new(reader: &'r R, config: ScanConfig) -> Self {
        Self { reader, config }
    }

    /// Find containers under the configured root
    pub fn discover(&self) -> Vec<PathBuf> {
        let found = discover_containers(&self.config.root_path);
        info!(
            root = %self.config.root_path.display(),
            count = found.len(),
            "Discovery complete"
        );
        found
    }

    /// Extract the schema of each container
    pub fn scan(&self, containers: &[PathBuf], progress: Option<&ProgressReporter>) -> ScanReport {
        let start = Instant::now();
        let pool = ScanPool::new(self.config.worker_count);

        let outcomes = pool.run(self.reader, containers, |outcome| {
            if let Some(p) = progress {
                p.inc(1);
                p.set_status(&container_name(outcome.path()));
            }
        });

        let report = ScanReport {
            outcomes,
            duration: start.elapsed(),
        };
        info!(
            containers = report.containers(),
            failed = report.failed_containers(),
            rows = report.row_count(),
            "Scan complete"
        );
        report
    }

    /// Discover and scan in one step
    pub fn run(&self, progress: Option<&ProgressReporter>) -> ScanReport {
        let containers = self.discover();
        self.scan(&containers, progress)
    }
}
