mod commands;
mod config;
mod diagnostics;
mod error;
mod extract;
mod info;
mod report;
mod resolver;
mod scanner;
mod types;
mod validator;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Top-level command line.
#[derive(Parser)]
#[command(name = "docxref", version, about = "Cross-reference validator for markdown books")]
struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
    /// Log debug detail to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List the heading anchors of one markdown file
    Anchors {
        /// Markdown file to inspect
        file: PathBuf,
    },
    /// Validate anchors, links, images, and orphans, then write a report
    Check {
        /// Config file to use instead of `<path>/.docxref.toml`
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,
        /// Do not write the report file
        #[arg(long)]
        no_report: bool,
        /// Directory holding the markdown sources
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
        /// Report destination (default: `<path>/cross-reference-report.md`)
        #[arg(short, long)]
        report: Option<PathBuf>,
    },
    /// Print a reference document: syntax, issue kinds, config, current state
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Anchors { file } => commands::anchors(&file),
        Commands::Check { config, json, no_report, path, report } => {
            commands::check(&commands::CheckOptions { config, json, no_report, report, root: path })
        },
        Commands::Info { json } => commands::info(json),
    };

    return match result {
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
        Ok(()) => ExitCode::SUCCESS,
    };
}

/// Route `log` output to stderr. `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_module("docxref", level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
    return;
}
