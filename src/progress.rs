//! Progress reporting and terminal summaries
//!
//! Provides progress display using indicatif and the colored header and
//! summary blocks printed around each command.

use crate::export::{ExportReport, LayerOutcome};
use crate::scanner::ScanReport;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Progress reporter for scans (counted bar) and exports (spinner)
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Spinner with elapsed time and a status message
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars(TICK_CHARS),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Bar counting up to `total` units
    pub fn with_total(total: u64) -> Self {
        let bar = ProgressBar::new(total);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars(TICK_CHARS)
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Hidden reporter, for quiet mode
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of a command
pub fn print_header(command: &str, source: &str, workers: Option<usize>, output: &str) {
    println!();
    println!(
        "{} {} {}",
        style("gdb-extract").cyan().bold(),
        env!("CARGO_PKG_VERSION"),
        style(command).dim()
    );
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Source:").bold(), source);
    if let Some(workers) = workers {
        println!("  {} {}", style("Workers:").bold(), workers);
    }
    println!("  {} {}", style("Output:").bold(), output);
    println!();
}

/// Print a summary of a schema scan
pub fn print_scan_summary(report: &ScanReport, output: &str, output_size: Option<u64>) {
    let secs = report.duration.as_secs_f64();

    println!();
    println!("{}", style("Scan Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Geodatabases:").bold(),
        format_number(report.containers() as u64)
    );
    println!(
        "  {} {}",
        style("Fields:").bold(),
        format_number(report.row_count() as u64)
    );
    println!("  {} {:.1}s", style("Duration:").bold(), secs);
    if report.failed_containers() > 0 {
        println!(
            "  {} {}",
            style("Unreadable:").yellow().bold(),
            format_number(report.failed_containers() as u64)
        );
    }
    if report.failed_layers() > 0 {
        println!(
            "  {} {}",
            style("Layer errors:").yellow().bold(),
            format_number(report.failed_layers() as u64)
        );
    }
    print_output_line("Report:", output, output_size);
    println!();
}

/// Print a summary of a workbook export
pub fn print_export_summary(report: &ExportReport, output_size: Option<u64>) {
    println!();
    println!("{}", style("Export Complete").green().bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Sheets:").bold(), report.exported());
    println!(
        "  {} {}",
        style("Rows:").bold(),
        format_number(report.total_rows() as u64)
    );
    println!(
        "  {} {:.1}s",
        style("Duration:").bold(),
        report.duration.as_secs_f64()
    );
    if !report.excluded.is_empty() {
        println!(
            "  {} {}",
            style("Excluded:").bold(),
            report.excluded.join(", ")
        );
    }
    for outcome in &report.outcomes {
        if let LayerOutcome::Skipped { layer, .. } = outcome {
            println!("  {} {}", style("Skipped:").yellow().bold(), layer);
        }
    }
    print_output_line(
        "Workbook:",
        &report.output_path.display().to_string(),
        output_size,
    );
    println!();
}

fn print_output_line(label: &str, path: &str, size: Option<u64>) {
    match size {
        Some(size) => println!(
            "  {} {} ({})",
            style(label).bold(),
            path,
            format_size(size, BINARY)
        ),
        None => println!("  {} {}", style(label).bold(), path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }

    #[test]
    fn test_hidden_reporter_counts() {
        let progress = ProgressReporter::hidden();
        progress.inc(2);
        progress.inc(1);
        assert_eq!(progress.position(), 3);
        progress.finish_and_clear();
    }
}
