//! Cross-document checks over a finished document index.
//!
//! Each check is an independent pure pass; `validate` concatenates them.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::Config;
use crate::resolver;
use crate::scanner::DocumentIndex;
use crate::types::{Document, Evidence, Issue, IssueKind, Link, LinkKind, ReadFailure};

/// Outcome of one validation run, shaped for both the report and `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// Issue count per kind, ordered by kind name. Kinds with no issues are absent.
    pub issue_types: BTreeMap<IssueKind, usize>,
    /// Every finding, grouped by check and then by file order.
    pub issues: Vec<Issue>,
    /// Number of documents that were indexed.
    pub total_files: usize,
    /// Length of `issues`.
    pub total_issues: usize,
    /// Files that matched the scan but could not be read.
    pub unreadable_files: Vec<ReadFailure>,
}

impl ValidationResult {
    /// Tally issues and package them with the index summary.
    pub fn new(index: &DocumentIndex, issues: Vec<Issue>) -> Self {
        let mut issue_types: BTreeMap<IssueKind, usize> = BTreeMap::new();
        for issue in &issues {
            let count = issue_types.entry(issue.kind).or_default();
            *count = count.saturating_add(1);
        }
        return Self {
            issue_types,
            total_files: index.len(),
            total_issues: issues.len(),
            issues,
            unreadable_files: index.failures.clone(),
        };
    }
}

/// Run every check against the index.
pub fn validate(index: &DocumentIndex, config: &Config) -> ValidationResult {
    let mut issues = Vec::new();

    log::info!("validating internal links");
    issues.extend(check_internal_links(index));
    log::info!("validating images");
    issues.extend(check_images(index));
    log::info!("validating external links");
    issues.extend(check_external_links(index));
    log::info!("checking duplicate headings");
    issues.extend(check_duplicate_headings(index));
    log::info!("checking orphaned files");
    issues.extend(check_orphaned_files(index, config));

    return ValidationResult::new(index, issues);
}

/// Fragment links must name a heading in the same file, and relative links
/// must name an indexed file (and a heading in it when a fragment is given).
pub fn check_internal_links(index: &DocumentIndex) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (path, document) in &index.documents {
        for link in &document.links {
            match link.kind {
                LinkKind::PureAnchor => check_pure_anchor(path, document, link, &mut issues),
                LinkKind::RelativePath => check_relative_link(index, path, link, &mut issues),
                LinkKind::External | LinkKind::Opaque => {},
            }
        }
    }
    return issues;
}

/// A `#fragment` link must match a heading anchor in its own document. A bare
/// `#` never does.
fn check_pure_anchor(path: &Path, document: &Document, link: &Link, issues: &mut Vec<Issue>) {
    let anchor = link.target.strip_prefix('#').unwrap_or(&link.target);
    if !anchor.is_empty() && document.has_anchor(anchor) {
        return;
    }
    issues.push(link_issue(
        IssueKind::MissingAnchor,
        path,
        link,
        format!("anchor not found: #{anchor}"),
    ));
    return;
}

/// A relative link must resolve into the index; its fragment, if any, must
/// match a heading in the target.
fn check_relative_link(index: &DocumentIndex, path: &Path, link: &Link, issues: &mut Vec<Issue>) {
    let Some(target) = resolver::resolve_link(path, &link.target) else {
        return;
    };
    let Some(document) = target.resolved.as_deref().and_then(|p| return index.get(p)) else {
        log::debug!("{}:{}: link \"{}\" does not resolve", path.display(), link.line, link.text);
        issues.push(link_issue(
            IssueKind::MissingFile,
            path,
            link,
            format!("linked file not found: {}", target.path_part),
        ));
        return;
    };
    let Some(fragment) = target.fragment else {
        return;
    };
    if !document.has_anchor(fragment) {
        issues.push(link_issue(
            IssueKind::MissingTargetAnchor,
            path,
            link,
            format!("anchor not found in target: {}#{fragment}", target.path_part),
        ));
    }
    return;
}

/// Local images must exist on disk beside the referencing document.
pub fn check_images(index: &DocumentIndex) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (path, document) in &index.documents {
        for image in document.images.iter().filter(|i| return i.is_local()) {
            let on_disk = resolver::image_path(&index.root, path, &image.source);
            if on_disk.exists() {
                continue;
            }
            log::debug!("{}:{}: image \"{}\" not at {}", path.display(), image.line, image.alt, on_disk.display());
            issues.push(Issue {
                evidence: Some(Evidence::Markup(image.raw.clone())),
                file: path.clone(),
                kind: IssueKind::MissingImage,
                line: image.line,
                message: format!("image file not found: {}", image.source),
            });
        }
    }
    return issues;
}

/// External links need a host and must not contain spaces. No network access.
pub fn check_external_links(index: &DocumentIndex) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (path, document) in &index.documents {
        for link in document.links.iter().filter(|l| return l.kind == LinkKind::External) {
            if !has_host(&link.target) {
                issues.push(link_issue(
                    IssueKind::MalformedUrl,
                    path,
                    link,
                    format!("malformed URL: {}", link.target),
                ));
            }
            if link.target.contains(' ') {
                issues.push(link_issue(
                    IssueKind::UrlWithSpaces,
                    path,
                    link,
                    format!("URL contains spaces: {}", link.target),
                ));
            }
        }
    }
    return issues;
}

/// Whether an external URL names a host. `mailto:` and `tel:` only need a
/// non-empty body.
fn has_host(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once(':') else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
        return !rest.trim().is_empty();
    }
    let Some(after_slashes) = rest.strip_prefix("//") else {
        return false;
    };
    let authority = after_slashes
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| return h);
    let host = if host_port.starts_with('[') {
        host_port.split_once(']').map_or("", |(h, _)| return h.trim_start_matches('['))
    } else {
        host_port.split(':').next().unwrap_or_default()
    };
    return !host.is_empty();
}

/// Within one file, every heading whose anchor was already produced by an
/// earlier heading is a duplicate.
pub fn check_duplicate_headings(index: &DocumentIndex) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (path, document) in &index.documents {
        let mut seen: HashSet<&str> = HashSet::new();
        for heading in &document.headings {
            if seen.insert(heading.anchor.as_str()) {
                continue;
            }
            issues.push(Issue {
                evidence: Some(Evidence::Heading(heading.title.clone())),
                file: path.clone(),
                kind: IssueKind::DuplicateHeading,
                line: heading.line,
                message: format!("duplicate heading anchor: {}", heading.anchor),
            });
        }
    }
    return issues;
}

/// Files that no other document links to, minus configured entry points.
pub fn check_orphaned_files(index: &DocumentIndex, config: &Config) -> Vec<Issue> {
    let referenced = referenced_files(index);
    return index
        .documents
        .keys()
        .filter(|path| return !config.is_entry_point(path) && !referenced.contains(path.as_path()))
        .map(|path| {
            return Issue {
                evidence: None,
                file: path.clone(),
                kind: IssueKind::OrphanedFile,
                line: 0,
                message: "not referenced by any other document".to_string(),
            };
        })
        .collect();
}

/// Every root-relative path targeted by a relative link from another file,
/// whether or not the target is indexed.
fn referenced_files(index: &DocumentIndex) -> HashSet<PathBuf> {
    let mut referenced = HashSet::new();
    for (path, document) in &index.documents {
        for link in document.links.iter().filter(|l| return l.kind == LinkKind::RelativePath) {
            let Some(resolved) = resolver::resolve_link(path, &link.target).and_then(|t| return t.resolved) else {
                continue;
            };
            if resolved != *path {
                referenced.insert(resolved);
            }
        }
    }
    return referenced;
}

/// Build an issue for a link, using its markup as evidence.
fn link_issue(kind: IssueKind, path: &Path, link: &Link, message: String) -> Issue {
    return Issue {
        evidence: Some(Evidence::Markup(link.raw.clone())),
        file: path.to_path_buf(),
        kind,
        line: link.line,
        message,
    };
}
