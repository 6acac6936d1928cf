//! Configuration types for gdb-extract
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration for the scan and export commands, with validation

use crate::error::ConfigError;
use crate::export::ExclusionFilter;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Maximum reasonable worker count
pub const MAX_WORKERS: usize = 64;

/// Default size of the scan worker pool
pub const DEFAULT_WORKERS: usize = 4;

/// Default schema report file, written to the current directory
pub const SCHEMA_CSV_NAME: &str = "atributos_gdbs.csv";

/// Schema and content extractor for Esri File Geodatabases
#[derive(Parser, Debug, Clone)]
#[command(
    name = "gdb-extract",
    version,
    about = "Schema and content extractor for Esri File Geodatabases",
    long_about = "Finds File Geodatabases (.gdb) on disk and extracts their contents.\n\n\
                  scan:   walks a directory tree and writes the field schema of every layer\n        \
                  of every geodatabase found to one CSV file.\n\
                  export: writes every layer of one geodatabase to an Excel workbook, one\n        \
                  sheet per layer, skipping topology/validation layers.",
    after_help = "EXAMPLES:\n    \
        gdb-extract scan /data/gis\n    \
        gdb-extract scan /data/gis -w 8 -o schema.csv\n    \
        gdb-extract export /data/gis/City.gdb\n    \
        gdb-extract export /data/gis/City.gdb -o city.xlsx --exclude 'tmp_*'\n    \
        gdb-extract export                       # interactive"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Verbose output (show per-layer details)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the field schema of every geodatabase under a directory to CSV
    Scan(ScanArgs),

    /// Export the layers of one geodatabase to an Excel workbook
    Export(ExportArgs),
}

/// Arguments of the `scan` command
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory to search for .gdb containers
    #[arg(value_name = "ROOT")]
    pub root: PathBuf,

    /// Number of worker threads reading containers
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Output CSV file
    #[arg(short, long, default_value = SCHEMA_CSV_NAME, value_name = "FILE")]
    pub output: PathBuf,
}

/// Arguments of the `export` command
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Geodatabase to export (prompted for when omitted)
    #[arg(value_name = "GDB")]
    pub gdb: Option<PathBuf>,

    /// Output workbook (default: <name>_export_<timestamp>.xlsx next to the geodatabase)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Additional layer exclusion pattern (can be repeated)
    #[arg(long = "exclude", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude_patterns: Vec<String>,
}

/// Validated configuration of a schema scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Directory searched for containers
    pub root_path: PathBuf,

    /// Size of the worker pool
    pub worker_count: usize,

    /// CSV report path
    pub output_path: PathBuf,

    /// Show progress indicator
    pub show_progress: bool,
}

impl ScanConfig {
    /// Configuration with default pool size and report path
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
            worker_count: DEFAULT_WORKERS,
            output_path: PathBuf::from(SCHEMA_CSV_NAME),
            show_progress: false,
        }
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: ScanArgs, quiet: bool) -> Result<Self, ConfigError> {
        let config = Self {
            root_path: args.root,
            worker_count: args.workers,
            output_path: args.output,
            show_progress: !quiet,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root_path.exists() {
            return Err(ConfigError::RootNotFound {
                path: self.root_path.clone(),
            });
        }
        if !self.root_path.is_dir() {
            return Err(ConfigError::RootNotDirectory {
                path: self.root_path.clone(),
            });
        }

        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }

        validate_output_parent(&self.output_path)
    }
}

/// Validated configuration of a workbook export
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Geodatabase to export
    pub gdb_path: PathBuf,

    /// Workbook path; derived from the container name when unset
    pub output_path: Option<PathBuf>,

    /// Default patterns plus user patterns
    pub filter: ExclusionFilter,

    /// Show progress indicator
    pub show_progress: bool,
}

impl ExportConfig {
    /// Configuration with default exclusion patterns and output path
    pub fn new(gdb_path: impl Into<PathBuf>) -> Self {
        Self {
            gdb_path: gdb_path.into(),
            output_path: None,
            filter: ExclusionFilter::with_defaults(),
            show_progress: false,
        }
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: ExportArgs, quiet: bool) -> Result<Self, ConfigError> {
        let gdb_path = args.gdb.ok_or(ConfigError::MissingGdbPath)?;
        ensure_gdb_exists(&gdb_path)?;

        let filter = ExclusionFilter::with_extra(&args.exclude_patterns)?;

        if let Some(ref output) = args.output {
            validate_output_parent(output)?;
        }

        Ok(Self {
            gdb_path,
            output_path: args.output,
            filter,
            show_progress: !quiet,
        })
    }
}

/// Fail unless the geodatabase path exists
pub fn ensure_gdb_exists(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        Ok(())
    } else {
        Err(ConfigError::GdbNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn validate_output_parent(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(ConfigError::InvalidOutputPath {
                path: path.to_path_buf(),
                reason: format!("Parent directory '{}' does not exist", parent.display()),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_scan_args() {
        let args = CliArgs::try_parse_from(["gdb-extract", "scan", "/data", "-w", "8"]).unwrap();
        match args.command {
            Command::Scan(scan) => {
                assert_eq!(scan.root, PathBuf::from("/data"));
                assert_eq!(scan.workers, 8);
                assert_eq!(scan.output, PathBuf::from(SCHEMA_CSV_NAME));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_export_args() {
        let args = CliArgs::try_parse_from([
            "gdb-extract",
            "-q",
            "export",
            "city.gdb",
            "--exclude",
            "tmp_*",
            "--exclude",
            "old_*",
        ])
        .unwrap();
        assert!(args.quiet);
        match args.command {
            Command::Export(export) => {
                assert_eq!(export.gdb, Some(PathBuf::from("city.gdb")));
                assert_eq!(export.exclude_patterns, vec!["tmp_*", "old_*"]);
                assert!(export.output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_scan_config_validation() {
        let dir = tempdir().unwrap();

        let mut config = ScanConfig::new(dir.path());
        assert!(config.validate().is_ok());

        config.worker_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorkerCount { count: 0, .. })
        ));

        config.worker_count = MAX_WORKERS + 1;
        assert!(config.validate().is_err());

        let missing = ScanConfig::new(dir.path().join("missing"));
        assert!(matches!(
            missing.validate(),
            Err(ConfigError::RootNotFound { .. })
        ));
    }

    #[test]
    fn test_scan_root_must_be_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(matches!(
            ScanConfig::new(&file).validate(),
            Err(ConfigError::RootNotDirectory { .. })
        ));
    }

    #[test]
    fn test_export_config_requires_existing_gdb() {
        let dir = tempdir().unwrap();
        let args = ExportArgs {
            gdb: Some(dir.path().join("missing.gdb")),
            ..Default::default()
        };
        assert!(matches!(
            ExportConfig::from_args(args, true),
            Err(ConfigError::GdbNotFound { .. })
        ));
    }

    #[test]
    fn test_export_config_compiles_patterns() {
        let dir = tempdir().unwrap();
        let gdb = dir.path().join("city.gdb");
        std::fs::create_dir(&gdb).unwrap();

        let args = ExportArgs {
            gdb: Some(gdb.clone()),
            output: None,
            exclude_patterns: vec!["tmp_*".into()],
        };
        let config = ExportConfig::from_args(args, true).unwrap();
        assert_eq!(config.gdb_path, gdb);
        assert!(config.filter.is_excluded("TMP_x"));
        assert!(config.filter.is_excluded("net_topology"));

        let bad = ExportArgs {
            gdb: Some(gdb),
            output: None,
            exclude_patterns: vec!["[".into()],
        };
        assert!(matches!(
            ExportConfig::from_args(bad, true),
            Err(ConfigError::InvalidExcludePattern { .. })
        ));
    }

    #[test]
    fn test_output_parent_must_exist() {
        let dir = tempdir().unwrap();
        let mut config = ScanConfig::new(dir.path());
        config.output_path = dir.path().join("nope").join("out.csv");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidOutputPath { .. })
        ));
    }
}
