use crate::error::Error;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::ConfigNotFound { path } => format!("\
# Error: Config Not Found

`{}` does not exist.

## Fix

Pass an existing file to `--config`, or drop the flag to use
`.docxref.toml` from the scan root.
", path.display()),

        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist or is not readable.
", path.display()),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::Json(e) => format!("\
# Error: JSON Serialization

{e}
"),

        Error::ReportWrite { path, source } => format!("\
# Error: Report Not Written

Could not write `{}`: {source}

## Fix

Check that the directory exists and is writable, or choose another
destination:

    docxref check --report <FILE>
", path.display()),

        Error::RootNotFound { path } => format!("\
# Error: Root Not Found

`{}` is not a directory.

## Fix

Point `--path` at the directory holding the markdown sources:

    docxref check --path docs
", path.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Correct `.docxref.toml`. Recognized keys: `exclude`, `entry_points`,
`report`, `extensions`.
"),
    }
}
