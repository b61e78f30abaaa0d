use std::path::{Path, PathBuf};

use crate::error::Error;

/// Name of the optional config file looked up in the scan root.
pub const CONFIG_FILE: &str = ".docxref.toml";

/// Default report file name, relative to the scan root.
pub const DEFAULT_REPORT: &str = "cross-reference-report.md";

/// Project configuration loaded from `.docxref.toml`.
/// Exclusions and entry points are plain substring matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Lowercase filename substrings that mark a file as an entry point.
    pub entry_points: Vec<String>,
    /// Path substrings that remove a file from the scan entirely.
    pub exclude: Vec<String>,
    /// File extensions treated as markdown, without the dot.
    pub extensions: Vec<String>,
    /// Report destination, relative to the scan root unless absolute.
    pub report: PathBuf,
}

/// Raw TOML structure for `.docxref.toml`. Absent keys keep their defaults.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DocxrefTomlConfig {
    /// Overrides `Config::entry_points`.
    entry_points: Option<Vec<String>>,
    /// Overrides `Config::exclude`.
    exclude: Option<Vec<String>>,
    /// Overrides `Config::extensions`.
    extensions: Option<Vec<String>>,
    /// Overrides `Config::report`.
    report: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            entry_points: ["readme", "index", "toc", "目录"].map(String::from).to_vec(),
            exclude: [".git", "node_modules", "temp"].map(String::from).to_vec(),
            extensions: vec!["md".to_string()],
            report: PathBuf::from(DEFAULT_REPORT),
        };
    }
}

impl Config {
    /// Load config from `.docxref.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the user
    /// wrote is never silently replaced by defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        log::debug!("loaded config from {}", path.display());
        return Self::parse(&content);
    }

    /// Load config from an explicit path. Unlike `load`, a missing file is an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigNotFound` if the file doesn't exist,
    /// `Error::Io` for other read failures, or `Error::TomlDe` if malformed.
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = match std::fs::read_to_string(path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound { path: path.to_path_buf() });
            },
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };
        return Self::parse(&content);
    }

    /// Parse TOML content, filling absent keys from the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed or has unknown keys.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: DocxrefTomlConfig = toml::from_str(content)?;
        let defaults = Self::default();
        return Ok(Self {
            entry_points: raw
                .entry_points
                .map(|names| return names.iter().map(|n| return n.to_lowercase()).collect())
                .unwrap_or(defaults.entry_points),
            exclude: raw.exclude.unwrap_or(defaults.exclude),
            extensions: raw.extensions.unwrap_or(defaults.extensions),
            report: raw.report.unwrap_or(defaults.report),
        });
    }

    /// Whether a file name marks a conventional entry point, which is never
    /// reported as orphaned.
    pub fn is_entry_point(&self, relative_path: &Path) -> bool {
        let Some(name) = relative_path.file_name() else {
            return false;
        };
        let name = name.to_string_lossy().to_lowercase();
        return self.entry_points.iter().any(|p| return name.contains(p.as_str()));
    }

    /// Whether a path has one of the configured markdown extensions.
    pub fn is_markdown(&self, path: &Path) -> bool {
        return path
            .extension()
            .is_some_and(|ext| return self.extensions.iter().any(|e| return ext == e.as_str()));
    }

    /// Resolve the report destination against the scan root.
    pub fn report_path(&self, root: &Path) -> PathBuf {
        return root.join(&self.report);
    }

    /// Check whether a file should be scanned.
    /// A path is skipped if its full text contains any exclude substring.
    pub fn should_scan(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        return !self.exclude.iter().any(|p| return text.contains(p.as_str()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.report, PathBuf::from("cross-reference-report.md"));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse("exclude = [\"drafts\"]\n").unwrap();
        assert_eq!(config.exclude, vec!["drafts".to_string()]);
        assert_eq!(config.entry_points, Config::default().entry_points);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "exclude = [").unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }

    #[test]
    fn unknown_key_is_an_error() {
        assert!(Config::parse("exclud = []").is_err());
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(Config::load_from(&path), Err(Error::ConfigNotFound { .. })));
    }

    #[test]
    fn exclusion_is_substring_on_full_path() {
        let config = Config::default();
        assert!(!config.should_scan(Path::new("book/node_modules/pkg/README.md")));
        assert!(!config.should_scan(Path::new(".git/info.md")));
        assert!(!config.should_scan(Path::new("notes/temp/draft.md")));
        assert!(config.should_scan(Path::new("book/ch01/intro.md")));
    }

    #[test]
    fn entry_points_match_file_name_case_insensitively() {
        let config = Config::default();
        assert!(config.is_entry_point(Path::new("docs/README.md")));
        assert!(config.is_entry_point(Path::new("index.md")));
        assert!(config.is_entry_point(Path::new("part1/TOC.md")));
        assert!(config.is_entry_point(Path::new("目录.md")));
        assert!(!config.is_entry_point(Path::new("readme-notes/c.md")));
        assert!(!config.is_entry_point(Path::new("c.md")));
    }

    #[test]
    fn markdown_extension_filter() {
        let config = Config::default();
        assert!(config.is_markdown(Path::new("a/b.md")));
        assert!(!config.is_markdown(Path::new("a/b.png")));
        assert!(!config.is_markdown(Path::new("Makefile")));
    }
}
