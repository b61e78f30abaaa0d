use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;
use crate::extract;
use crate::types::{Document, ReadFailure};

/// Every readable markdown document under a root, keyed by root-relative
/// path. Built once per run and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    /// Parsed documents, ordered by path.
    pub documents: BTreeMap<PathBuf, Document>,
    /// Files that matched the scan but could not be read.
    pub failures: Vec<ReadFailure>,
    /// Directory the scan started from. Image paths resolve against it.
    pub root: PathBuf,
}

impl DocumentIndex {
    /// Look up a document by root-relative path.
    pub fn get(&self, path: &Path) -> Option<&Document> {
        return self.documents.get(path);
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        return self.documents.len();
    }

    /// Whether no documents were indexed.
    pub fn is_empty(&self) -> bool {
        return self.documents.is_empty();
    }
}

/// Scan all markdown files under `root` and build the document index.
/// Applies the config's exclusion substrings to root-relative paths and never
/// indexes `report`, the destination this run writes to. Symlinks are
/// followed. A file or directory that cannot be read is recorded in
/// `failures` and the scan continues.
pub fn scan(root: &Path, config: &Config, report: &Path) -> DocumentIndex {
    let report = ReportPath::new(report);
    let mut documents = BTreeMap::new();
    let mut failures = Vec::new();

    for walked in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match walked {
            Err(e) => {
                let path = e.path().unwrap_or(root);
                let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
                log::warn!("cannot walk {}: {e}", relative.display());
                failures.push(ReadFailure { path: relative, reason: e.to_string() });
                continue;
            },
            Ok(entry) => entry,
        };
        let md_path = entry.path();
        if !entry.file_type().is_file() || !config.is_markdown(md_path) || report.matches(md_path) {
            continue;
        }
        let relative = md_path.strip_prefix(root).unwrap_or(md_path).to_path_buf();
        if !config.should_scan(&relative) {
            log::debug!("excluded {}", relative.display());
            continue;
        }

        match std::fs::read_to_string(md_path) {
            Err(e) => {
                log::warn!("cannot read {}: {e}", relative.display());
                failures.push(ReadFailure { path: relative, reason: e.to_string() });
            },
            Ok(content) => {
                let document = extract::document(&content);
                log::debug!(
                    "indexed {} ({} headings, {} links, {} images)",
                    relative.display(),
                    document.headings.len(),
                    document.links.len(),
                    document.images.len(),
                );
                documents.insert(relative, document);
            },
        }
    }

    log::info!("indexed {} markdown files under {}", documents.len(), root.display());
    return DocumentIndex { documents, failures, root: root.to_path_buf() };
}

/// The report destination, matched against walked paths either literally or,
/// when it already exists, by canonical path.
struct ReportPath<'a> {
    /// Canonical form, if the report exists on disk.
    canonical: Option<PathBuf>,
    /// Path as given.
    path: &'a Path,
}

impl<'a> ReportPath<'a> {
    /// Resolve the canonical form once up front.
    fn new(path: &'a Path) -> Self {
        return Self { canonical: std::fs::canonicalize(path).ok(), path };
    }

    /// Whether `candidate` is the report file.
    fn matches(&self, candidate: &Path) -> bool {
        if candidate == self.path {
            return true;
        }
        let Some(canonical) = &self.canonical else {
            return false;
        };
        if candidate.file_name() != canonical.file_name() {
            return false;
        }
        return std::fs::canonicalize(candidate).is_ok_and(|c| return c == *canonical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_REPORT;

    #[test]
    fn indexes_nested_markdown_with_relative_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("ch1")).unwrap();
        std::fs::write(dir.path().join("README.md"), "# Book\n").unwrap();
        std::fs::write(dir.path().join("ch1/intro.md"), "# Intro\n[home](../README.md)\n").unwrap();
        std::fs::write(dir.path().join("ch1/pic.png"), "png").unwrap();

        let index = scan(dir.path(), &Config::default(), &dir.path().join(DEFAULT_REPORT));
        let keys: Vec<&PathBuf> = index.documents.keys().collect();
        assert_eq!(keys, vec![&PathBuf::from("README.md"), &PathBuf::from("ch1/intro.md")]);
        let intro = index.get(Path::new("ch1/intro.md")).unwrap();
        assert_eq!(intro.headings.len(), 1);
        assert_eq!(intro.links.len(), 1);
        assert!(index.failures.is_empty());
    }

    #[test]
    fn skips_excluded_segments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        std::fs::create_dir_all(dir.path().join("temp")).unwrap();
        std::fs::write(dir.path().join("node_modules/pkg/README.md"), "# Pkg\n").unwrap();
        std::fs::write(dir.path().join("temp/draft.md"), "# Draft\n").unwrap();
        std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();

        let index = scan(dir.path(), &Config::default(), &dir.path().join(DEFAULT_REPORT));
        assert_eq!(index.len(), 1);
        assert!(index.get(Path::new("a.md")).is_some());
    }

    #[test]
    fn previous_report_is_not_indexed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();
        std::fs::write(dir.path().join("cross-reference-report.md"), "# Report\n").unwrap();

        let index = scan(dir.path(), &Config::default(), &dir.path().join(DEFAULT_REPORT));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn custom_report_destination_is_not_indexed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();
        std::fs::write(dir.path().join("out.md"), "# Report\n[x](missing.md)\n").unwrap();

        let index = scan(dir.path(), &Config::default(), &dir.path().join("out.md"));
        assert_eq!(index.len(), 1);
        assert!(index.get(Path::new("out.md")).is_none());
    }

    #[test]
    fn report_given_through_another_spelling_is_not_indexed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();
        std::fs::write(dir.path().join("out.md"), "# Report\n").unwrap();

        let report = dir.path().join("sub/../out.md");
        let index = scan(dir.path(), &Config::default(), &report);
        assert_eq!(index.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_markdown_is_indexed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("shared")).unwrap();
        std::fs::write(dir.path().join("shared/notes.txt"), "# Notes\n").unwrap();
        std::os::unix::fs::symlink(dir.path().join("shared/notes.txt"), dir.path().join("notes.md")).unwrap();

        let index = scan(dir.path(), &Config::default(), &dir.path().join(DEFAULT_REPORT));
        assert!(index.get(Path::new("notes.md")).is_some());
    }

    #[cfg(unix)]
    #[test]
    fn broken_symlink_is_recorded_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone.md"), dir.path().join("dangling.md")).unwrap();

        let index = scan(dir.path(), &Config::default(), &dir.path().join(DEFAULT_REPORT));
        assert_eq!(index.len(), 1);
        assert_eq!(index.failures.len(), 1);
        assert_eq!(index.failures[0].path, PathBuf::from("dangling.md"));
    }

    #[test]
    fn unreadable_file_is_recorded_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.md"), "# A\n").unwrap();
        std::fs::write(dir.path().join("bad.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let index = scan(dir.path(), &Config::default(), &dir.path().join(DEFAULT_REPORT));
        assert_eq!(index.len(), 1);
        assert_eq!(index.failures.len(), 1);
        assert_eq!(index.failures[0].path, PathBuf::from("bad.md"));
    }
}
