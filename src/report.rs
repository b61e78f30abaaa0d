//! Markdown rendering of a validation result.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::types::{Evidence, Issue, IssueKind};
use crate::validator::ValidationResult;

/// Render the full report. Output depends only on `result`, so reruns over
/// an unchanged tree produce identical bytes.
pub fn render(result: &ValidationResult) -> String {
    let mut out = String::from("# Cross-Reference Validation Report\n\n");
    render_summary(&mut out, result);
    render_breakdown(&mut out, result);
    render_details(&mut out, &result.issues);
    render_unreadable(&mut out, result);
    render_fix_suggestions(&mut out, result);
    return out;
}

/// Write the rendered report to `path`, replacing any previous report.
///
/// # Errors
///
/// Returns `Error::ReportWrite` if the file cannot be written.
pub fn write(path: &Path, result: &ValidationResult) -> Result<(), Error> {
    let content = render(result);
    return std::fs::write(path, content).map_err(|source| {
        return Error::ReportWrite { path: path.to_path_buf(), source };
    });
}

/// Totals block.
fn render_summary(out: &mut String, result: &ValidationResult) {
    out.push_str("## Summary\n\n");
    let _ = writeln!(out, "- total files: {}", result.total_files);
    let _ = writeln!(out, "- total issues: {}", result.total_issues);
    if !result.unreadable_files.is_empty() {
        let _ = writeln!(out, "- unreadable files: {}", result.unreadable_files.len());
    }
    out.push('\n');
    return;
}

/// One line per kind that occurred, in kind-name order.
fn render_breakdown(out: &mut String, result: &ValidationResult) {
    out.push_str("## Issue Types\n\n");
    if result.issue_types.is_empty() {
        out.push_str("No issues found.\n\n");
        return;
    }
    for (kind, count) in &result.issue_types {
        let _ = writeln!(out, "- {}: {count}", kind.as_str());
    }
    out.push('\n');
    return;
}

/// Per-file sections sorted by path, each grouped by kind.
fn render_details(out: &mut String, issues: &[Issue]) {
    if issues.is_empty() {
        return;
    }
    out.push_str("## Details\n\n");

    let mut by_file: BTreeMap<&PathBuf, BTreeMap<IssueKind, Vec<&Issue>>> = BTreeMap::new();
    for issue in issues {
        by_file
            .entry(&issue.file)
            .or_default()
            .entry(issue.kind)
            .or_default()
            .push(issue);
    }

    for (file, kinds) in &by_file {
        let count: usize = kinds.values().map(Vec::len).sum();
        let _ = writeln!(out, "### {}\n", file.display());
        let _ = writeln!(out, "Issues: {count}\n");
        for (kind, group) in kinds {
            let _ = writeln!(out, "#### {} ({})\n", kind.as_str(), kind.label());
            for issue in group {
                render_issue(out, issue);
            }
            out.push('\n');
        }
    }
    return;
}

/// A single issue line plus its evidence.
fn render_issue(out: &mut String, issue: &Issue) {
    if issue.line > 0 {
        let _ = writeln!(out, "- line {}: {}", issue.line, issue.message);
    } else {
        let _ = writeln!(out, "- {}", issue.message);
    }
    match &issue.evidence {
        Some(Evidence::Heading(title)) => {
            let _ = writeln!(out, "  heading: {title}");
        },
        Some(Evidence::Markup(raw)) => {
            let _ = writeln!(out, "  ```\n  {raw}\n  ```");
        },
        None => {},
    }
    if issue.kind == IssueKind::OrphanedFile {
        out.push_str("  suggestion: add it to a table of contents or link it from a related document\n");
    }
    return;
}

/// Files that were found but could not be read.
fn render_unreadable(out: &mut String, result: &ValidationResult) {
    if result.unreadable_files.is_empty() {
        return;
    }
    out.push_str("## Unreadable Files\n\n");
    for failure in &result.unreadable_files {
        let _ = writeln!(out, "- {}: {}", failure.path.display(), failure.reason);
    }
    out.push('\n');
    return;
}

/// Advice for each kind that actually occurred.
fn render_fix_suggestions(out: &mut String, result: &ValidationResult) {
    if result.issue_types.is_empty() {
        return;
    }
    out.push_str("## Fix Suggestions\n");
    for kind in result.issue_types.keys() {
        let _ = write!(out, "\n### {}\n\n", kind.label());
        for tip in fix_tips(*kind) {
            let _ = writeln!(out, "- {tip}");
        }
    }
    return;
}

/// Generic remediation steps per kind.
const fn fix_tips(kind: IssueKind) -> &'static [&'static str] {
    return match kind {
        IssueKind::DuplicateHeading => &[
            "Give repeated headings a distinguishing word",
            "Restructure the document so each section title is unique",
        ],
        IssueKind::MalformedUrl => &["Include the scheme and host, e.g. `https://example.com/page`"],
        IssueKind::MissingAnchor | IssueKind::MissingTargetAnchor => &[
            "Check the heading for spelling changes",
            "Anchors are the lowercased heading text with punctuation removed and spaces as hyphens",
            "Run `docxref anchors <file>` to list valid anchors",
        ],
        IssueKind::MissingFile => &[
            "Check the relative path from the linking document",
            "Create the missing document or point the link at the right one",
        ],
        IssueKind::MissingImage => &[
            "Check that the image file exists",
            "Image paths resolve relative to the document that embeds them",
        ],
        IssueKind::OrphanedFile => &[
            "Add the file to a table of contents",
            "Link to it from a related document, or delete it if unused",
        ],
        IssueKind::UrlWithSpaces => &["Percent-encode spaces as `%20`"],
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::DocumentIndex;
    use crate::types::ReadFailure;

    fn issue(file: &str, kind: IssueKind, line: u32, evidence: Option<Evidence>) -> Issue {
        Issue {
            evidence,
            file: PathBuf::from(file),
            kind,
            line,
            message: format!("{} at {line}", kind.as_str()),
        }
    }

    fn result_of(issues: Vec<Issue>) -> ValidationResult {
        let mut index = DocumentIndex::default();
        index.documents.insert(PathBuf::from("a.md"), crate::types::Document::default());
        index.documents.insert(PathBuf::from("b.md"), crate::types::Document::default());
        ValidationResult::new(&index, issues)
    }

    #[test]
    fn clean_report() {
        let out = render(&result_of(vec![]));
        assert_eq!(
            out,
            "# Cross-Reference Validation Report\n\n## Summary\n\n- total files: 2\n- total issues: 0\n\n## Issue Types\n\nNo issues found.\n\n"
        );
    }

    #[test]
    fn files_sorted_and_grouped_by_kind() {
        let out = render(&result_of(vec![
            issue("b.md", IssueKind::MissingFile, 4, Some(Evidence::Markup("[x](y.md)".to_string()))),
            issue("a.md", IssueKind::OrphanedFile, 0, None),
            issue("b.md", IssueKind::DuplicateHeading, 2, Some(Evidence::Heading("Overview".to_string()))),
        ]));

        let a = out.find("### a.md").unwrap();
        let b = out.find("### b.md").unwrap();
        assert!(a < b);

        let dup = out.find("#### duplicate_heading").unwrap();
        let missing = out.find("#### missing_file").unwrap();
        assert!(b < dup && dup < missing);

        assert!(out.contains("- duplicate_heading: 1\n- missing_file: 1\n- orphaned_file: 1\n"));
        assert!(out.contains("- line 4: missing_file at 4\n  ```\n  [x](y.md)\n  ```\n"));
        assert!(out.contains("- line 2: duplicate_heading at 2\n  heading: Overview\n"));
        assert!(out.contains("- orphaned_file at 0\n  suggestion:"));
        assert!(out.contains("## Fix Suggestions"));
        assert!(!out.contains("### URL with spaces"));
    }

    #[test]
    fn unreadable_files_listed() {
        let mut result = result_of(vec![]);
        result.unreadable_files.push(ReadFailure {
            path: PathBuf::from("bad.md"),
            reason: "stream did not contain valid UTF-8".to_string(),
        });
        let out = render(&result);
        assert!(out.contains("- unreadable files: 1\n"));
        assert!(out.contains("## Unreadable Files\n\n- bad.md: stream did not contain valid UTF-8\n"));
    }

    #[test]
    fn write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");
        std::fs::write(&path, "stale content that is much longer than anything else\n".repeat(50)).unwrap();
        let result = result_of(vec![]);
        write(&path, &result).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), render(&result));
    }
}
