use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{self, Config};
use crate::error::Error;
use crate::types::IssueKind;

/// Output the docxref reference document for the current directory.
///
/// # Errors
///
/// Returns `Error::Json` if JSON output fails.
pub fn run(json: bool) -> Result<(), Error> {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state)?;
    } else {
        print_markdown(&state);
    }
    return Ok(());
}

// ── State gathering ───────────────────────────────────────────────────

/// What docxref finds in the current directory.
struct CurrentState {
    /// Whether `.docxref.toml` exists.
    config_found: bool,
    /// Whether the config parsed; `false` when present but malformed.
    config_valid: bool,
    /// Effective configuration (defaults when missing or malformed).
    effective: Config,
    /// Whether a report from an earlier run exists.
    report_found: bool,
}

/// Inspect config and report presence under `root`.
fn gather_state(root: &Path) -> CurrentState {
    let config_found = root.join(config::CONFIG_FILE).exists();
    let loaded = Config::load(root);
    let config_valid = loaded.is_ok();
    let effective = loaded.unwrap_or_default();
    let report_found = effective.report_path(root).exists();

    return CurrentState { config_found, config_valid, effective, report_found };
}

// ── Markdown output ───────────────────────────────────────────────────

/// Print the human-readable reference document.
fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_issue_kinds();
    print_markdown_state(state);
    return;
}

/// Static part: syntax, workflow, configuration.
fn print_markdown_header(version: &str) {
    print!(
        "\
# docxref {version}

Cross-reference validator for markdown books: checks that fragment links
name real headings, relative links name real documents, images exist, and
every document is reachable from somewhere.

## Recognized Syntax

    # Heading                      anchor: lowercase, punctuation removed, spaces -> '-'
    [text](#anchor)                same-file anchor
    [text](../dir/file.md#anchor)  cross-file link, resolved against the linking file
    [text](https://host/path)      external link, syntax-checked only
    <a href=\"file.md\">text</a>      raw HTML link
    ![alt](img/pic.png)            local image, must exist on disk
    <img src=\"img/pic.png\">        raw HTML image

## Workflow

    docxref check                     Validate ./ and write cross-reference-report.md
    docxref check --path docs         Validate another root
    docxref check --json --no-report  Machine-readable result, no report file
    docxref anchors <file.md>         List valid anchors in one file
    docxref info                      This document

## Configuration (.docxref.toml)

    exclude = [\".git\", \"node_modules\", \"temp\"]        # path substrings to skip
    entry_points = [\"readme\", \"index\", \"toc\", \"目录\"]  # never reported as orphaned
    report = \"cross-reference-report.md\"              # relative to the root
    extensions = [\"md\"]

"
    );
    return;
}

/// Table of issue kinds.
fn print_markdown_issue_kinds() {
    println!("## Issue Kinds\n");
    println!("| Kind | Meaning |");
    println!("|------|---------|");
    for kind in IssueKind::ALL {
        println!("| {} | {} |", kind.as_str(), kind.label());
    }
    println!();
    return;
}

/// Dynamic part: what exists in the current directory.
fn print_markdown_state(state: &CurrentState) {
    println!("## Current State\n");
    let config_status = match (state.config_found, state.config_valid) {
        (false, _) => "not found, using defaults",
        (true, true) => "found",
        (true, false) => "found, but invalid",
    };
    println!("Config:  {} ({config_status})", config::CONFIG_FILE);
    let report_status = if state.report_found { "found" } else { "not found" };
    println!("Report:  {} ({report_status})", state.effective.report.display());
    println!("Exclude: {}", state.effective.exclude.join(", "));
    return;
}

// ── JSON output ───────────────────────────────────────────────────────

/// Top-level JSON document.
#[derive(Serialize)]
struct InfoJson {
    /// Current configuration and report state.
    current_state: StateJson,
    /// Exit code table.
    exit_codes: Vec<ExitCodeInfo>,
    /// Every issue kind with its label.
    issue_kinds: Vec<IssueKindInfo>,
    /// Crate version.
    version: String,
}

/// One exit code row.
#[derive(Serialize)]
struct ExitCodeInfo {
    /// Process exit code.
    code: u8,
    /// What it means.
    meaning: String,
}

/// One issue kind row.
#[derive(Serialize)]
struct IssueKindInfo {
    /// Human label.
    label: &'static str,
    /// Machine name.
    name: &'static str,
}

/// JSON view of `CurrentState`.
#[derive(Serialize)]
struct StateJson {
    /// Whether `.docxref.toml` exists.
    config_found: bool,
    /// Whether it parsed.
    config_valid: bool,
    /// Effective entry-point patterns.
    entry_points: Vec<String>,
    /// Effective exclusion substrings.
    exclude: Vec<String>,
    /// Effective report path.
    report: PathBuf,
    /// Whether the report exists.
    report_found: bool,
}

/// Print the reference document as JSON.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
fn print_json(state: &CurrentState) -> Result<(), Error> {
    let info = InfoJson {
        current_state: StateJson {
            config_found: state.config_found,
            config_valid: state.config_valid,
            entry_points: state.effective.entry_points.clone(),
            exclude: state.effective.exclude.clone(),
            report: state.effective.report.clone(),
            report_found: state.report_found,
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Run completed, with or without findings".to_string() },
            ExitCodeInfo { code: 1, meaning: "Setup error: missing root, bad config, unwritable report".to_string() },
        ],
        issue_kinds: IssueKind::ALL
            .iter()
            .map(|k| return IssueKindInfo { label: k.label(), name: k.as_str() })
            .collect(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    println!("{}", serde_json::to_string_pretty(&info)?);
    return Ok(());
}
