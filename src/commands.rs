//! CLI commands for docxref: check, anchors, info.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error;
use crate::extract;
use crate::report;
use crate::scanner;
use crate::validator::{self, ValidationResult};

/// Options for `docxref check`, already resolved from CLI flags.
pub struct CheckOptions {
    /// Explicit config file; `None` means `<root>/.docxref.toml` if present.
    pub config: Option<PathBuf>,
    /// Print the result as JSON instead of the human summary.
    pub json: bool,
    /// Skip writing the report file.
    pub no_report: bool,
    /// Report destination overriding the configured one.
    pub report: Option<PathBuf>,
    /// Directory to scan.
    pub root: PathBuf,
}

/// List every heading anchor of one markdown file, marking duplicates.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the file cannot be read.
pub fn anchors(file: &Path) -> Result<(), error::Error> {
    let content = std::fs::read_to_string(file)
        .map_err(|_err| return error::Error::FileNotFound { path: file.to_path_buf() })?;
    let headings = extract::headings(&content);

    let mut seen: HashSet<&str> = HashSet::new();
    for heading in &headings {
        let marker = if seen.insert(heading.anchor.as_str()) { "" } else { "  (duplicate)" };
        let indent = "  ".repeat(usize::from(heading.level.saturating_sub(1)));
        println!("{indent}{}#{}{marker}", file.display(), heading.anchor);
    }
    if headings.is_empty() {
        eprintln!("No headings in {}.", file.display());
    }
    return Ok(());
}

/// Scan, validate, write the report, and print a summary.
/// Findings never fail the command; only setup and report I/O errors do.
///
/// # Errors
///
/// Returns `Error::RootNotFound` if the root is not a directory, config
/// errors, `Error::ReportWrite` if the report cannot be written, or
/// `Error::Json` if JSON output fails.
pub fn check(options: &CheckOptions) -> Result<(), error::Error> {
    let root = &options.root;
    if !root.is_dir() {
        return Err(error::Error::RootNotFound { path: root.clone() });
    }

    let config = match &options.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(root)?,
    };
    let report_path = options.report.clone().unwrap_or_else(|| return config.report_path(root));

    log::info!("scanning {}", root.display());
    let index = scanner::scan(root, &config, &report_path);
    if index.is_empty() {
        log::warn!("no markdown files found under {}", root.display());
    }
    let result = validator::validate(&index, &config);

    if !options.no_report {
        report::write(&report_path, &result)?;
        log::info!("report written to {}", report_path.display());
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let written = (!options.no_report).then_some(report_path.as_path());
        print_summary(&result, written);
    }
    return Ok(());
}

/// Output the reference document for docxref.
///
/// # Errors
///
/// Returns `Error::Json` if JSON output fails.
pub fn info(json: bool) -> Result<(), error::Error> {
    return crate::info::run(json);
}

/// Human summary on stdout: totals, per-kind counts, report location.
fn print_summary(result: &ValidationResult, report_path: Option<&Path>) {
    println!("Validated {} files, found {} issues", result.total_files, result.total_issues);
    if !result.issue_types.is_empty() {
        println!();
        for (kind, count) in &result.issue_types {
            println!("  {:<22} {count}", kind.as_str());
        }
    }
    if !result.unreadable_files.is_empty() {
        println!();
        println!("{} files could not be read:", result.unreadable_files.len());
        for failure in &result.unreadable_files {
            println!("  {}: {}", failure.path.display(), failure.reason);
        }
    }
    if let Some(path) = report_path {
        println!();
        println!("Report written to {}", path.display());
    }
    return;
}
