//! gdb-extract - Schema and content extractor for Esri File Geodatabases
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use gdb_extract::config::{CliArgs, Command, ExportArgs, ExportConfig, ScanArgs, ScanConfig};
use gdb_extract::export::GdbExporter;
use gdb_extract::gdb::open_backend;
use gdb_extract::progress::{
    print_export_summary, print_header, print_scan_summary, ProgressReporter,
};
use gdb_extract::prompt::Prompter;
use gdb_extract::report::{write_schema_report, ReportOutcome};
use gdb_extract::scanner::{SchemaRecord, SchemaScanner};
use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.verbose)?;

    match args.command {
        Command::Scan(scan) => run_scan(scan, args.quiet),
        Command::Export(export) => run_export(export, args.quiet),
    }
}

/// Discover containers, extract their schemas, write the CSV report
fn run_scan(args: ScanArgs, quiet: bool) -> Result<()> {
    let config = ScanConfig::from_args(args, quiet).context("Invalid configuration")?;
    let reader = open_backend().context("Cannot read geodatabases")?;

    let output = config.output_path.display().to_string();
    if config.show_progress {
        print_header(
            "scan",
            &config.root_path.display().to_string(),
            Some(config.worker_count),
            &output,
        );
    }

    let scanner = SchemaScanner::new(reader.as_ref(), config.clone());
    let containers = scanner.discover();
    if containers.is_empty() {
        println!(
            "No geodatabases (.gdb) found under {}",
            config.root_path.display()
        );
        return Ok(());
    }
    info!(count = containers.len(), "Found geodatabases");

    let progress = config
        .show_progress
        .then(|| ProgressReporter::with_total(containers.len() as u64));

    let report = scanner.scan(&containers, progress.as_ref());

    if let Some(ref p) = progress {
        p.finish("Scan completed");
    }

    let records: Vec<SchemaRecord> = report.records().cloned().collect();
    let written = write_schema_report(&config.output_path, &records)
        .with_context(|| format!("Failed to write report to {}", output))?;

    match written {
        ReportOutcome::Written { path, .. } => {
            print_scan_summary(&report, &output, file_size(&path));
        }
        ReportOutcome::Empty => {
            println!("No schema data extracted; {} was not written", output);
        }
    }

    if report.failed_containers() > 0 {
        info!(
            failed = report.failed_containers(),
            "Scan completed with unreadable geodatabases"
        );
    }

    Ok(())
}

/// Export one container to a workbook, prompting for missing input
fn run_export(args: ExportArgs, quiet: bool) -> Result<()> {
    let args = if args.gdb.is_some() {
        args
    } else {
        let stdin = io::stdin();
        let prompted = Prompter::new(stdin.lock(), io::stdout())
            .ask_export_args()
            .context("Interactive input failed")?;
        merge_prompted(args, prompted)
    };

    let config = ExportConfig::from_args(args, quiet).context("Invalid configuration")?;
    let reader = open_backend().context("Cannot read geodatabases")?;
    let show_progress = config.show_progress;
    let gdb = config.gdb_path.display().to_string();

    let exporter = GdbExporter::new(reader.as_ref(), config);
    if show_progress {
        print_header(
            "export",
            &gdb,
            None,
            &exporter.output_path().display().to_string(),
        );
    }

    let progress = show_progress.then(ProgressReporter::new);
    let result = exporter.run(progress.as_ref());

    if let Some(ref p) = progress {
        match &result {
            Ok(_) => p.finish("Export completed"),
            Err(_) => p.finish_and_clear(),
        }
    }

    let report = result.with_context(|| format!("Export of {} failed", gdb))?;
    print_export_summary(&report, file_size(&report.output_path));

    if report.skipped() > 0 {
        info!(skipped = report.skipped(), "Export completed with skipped layers");
    }

    Ok(())
}

/// Command line flags given alongside the interactive flow still apply
fn merge_prompted(cli: ExportArgs, prompted: ExportArgs) -> ExportArgs {
    let mut exclude_patterns = cli.exclude_patterns;
    exclude_patterns.extend(prompted.exclude_patterns);

    ExportArgs {
        gdb: prompted.gdb,
        output: cli.output.or(prompted.output),
        exclude_patterns,
    }
}

fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().map(|m| m.len())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("gdb_extract=debug,warn")
    } else {
        EnvFilter::new("gdb_extract=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
