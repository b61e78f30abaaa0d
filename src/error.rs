/// Crate-level error types for docxref diagnostics.
use std::path::PathBuf;

/// Fatal errors that stop a run. Every variant names the path or reason for
/// failure. Per-file read problems during a scan are not errors at this level;
/// they are recorded as `ReadFailure` entries in the document index.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A config file passed explicitly does not exist on disk.
    #[error("config not found: {}", path.display())]
    ConfigNotFound {
        /// Path to the missing config file.
        path: PathBuf,
    },

    /// A file passed on the command line does not exist or is unreadable.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The report destination could not be written.
    #[error("cannot write report {}: {source}", path.display())]
    ReportWrite {
        /// Report destination.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The scan root is missing or not a directory.
    #[error("root not found: {}", path.display())]
    RootNotFound {
        /// Path given as the scan root.
        path: PathBuf,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
