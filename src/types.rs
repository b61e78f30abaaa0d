/// Core domain types for docxref documents, links, images, and issues.
use std::path::PathBuf;

use serde::Serialize;

/// Parsed from an ATX heading line by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Slug derived from the title, used as a fragment target.
    pub anchor: String,
    /// Number of leading `#` markers, 1 through 6.
    pub level: u8,
    /// One-based line number of the heading.
    pub line: u32,
    /// Raw heading text, trimmed.
    pub title: String,
}

/// An image reference, either `![alt](src)` or `<img src=...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Alt text, empty when absent.
    pub alt: String,
    /// One-based line number of the image markup.
    pub line: u32,
    /// The full matched markup, kept as issue evidence.
    pub raw: String,
    /// Image source exactly as written.
    pub source: String,
}

impl Image {
    /// Whether the source names a file next to the document rather than a URL
    /// or an inline data URI. Root-absolute sources are not local either.
    pub fn is_local(&self) -> bool {
        let src = self.source.as_str();
        return !(src.starts_with("http://")
            || src.starts_with("https://")
            || src.starts_with("data:")
            || src.starts_with('/'));
    }
}

/// A link found in a document, either `[text](target)` or `<a href=...>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Classification by prefix inspection of `target`.
    pub kind: LinkKind,
    /// One-based line number of the link markup.
    pub line: u32,
    /// The full matched markup, kept as issue evidence.
    pub raw: String,
    /// Target exactly as written.
    pub target: String,
    /// Display text.
    pub text: String,
}

/// How a link target is interpreted. Exactly one applies to each link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// `http`, `https`, `mailto`, or `tel` URL. Checked syntactically only.
    External,
    /// Root-absolute path or unrecognized URL scheme. Never resolved.
    Opaque,
    /// `#fragment` pointing into the same document.
    PureAnchor,
    /// Path relative to the linking document, optionally with `#fragment`.
    RelativePath,
}

impl LinkKind {
    /// Classify a raw link target by its prefix.
    pub fn classify(target: &str) -> Self {
        const EXTERNAL_PREFIXES: [&str; 4] = ["http://", "https://", "mailto:", "tel:"];
        if EXTERNAL_PREFIXES.iter().any(|p| return target.starts_with(p)) {
            return Self::External;
        }
        if target.starts_with('#') {
            return Self::PureAnchor;
        }
        if target.starts_with('/') || target.contains("://") {
            return Self::Opaque;
        }
        return Self::RelativePath;
    }
}

/// One scanned markdown file. Built once per run and never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Headings in file order.
    pub headings: Vec<Heading>,
    /// Images in match order.
    pub images: Vec<Image>,
    /// Links in match order.
    pub links: Vec<Link>,
}

impl Document {
    /// Whether any heading in this document produces `anchor`.
    pub fn has_anchor(&self, anchor: &str) -> bool {
        return self.headings.iter().any(|h| return h.anchor == anchor);
    }
}

/// Extra context attached to an issue for the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum Evidence {
    /// Title of the heading that collided with an earlier one.
    Heading(String),
    /// The offending link or image markup.
    Markup(String),
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Optional snippet or heading title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,
    /// Document path relative to the scan root.
    pub file: PathBuf,
    /// Finding category.
    pub kind: IssueKind,
    /// One-based line, or 0 when the finding concerns the whole file.
    pub line: u32,
    /// Human-readable description.
    pub message: String,
}

/// Closed taxonomy of findings. Ordered by kind name so sorted output
/// matches the alphabetical order of the serialized names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Two headings in one file collapse to the same anchor.
    DuplicateHeading,
    /// External link with no host.
    MalformedUrl,
    /// Pure-anchor link with no matching heading in the same file.
    MissingAnchor,
    /// Relative link resolving outside the indexed file set.
    MissingFile,
    /// Local image with nothing on disk at the resolved path.
    MissingImage,
    /// Relative link to a known file whose fragment matches no heading.
    MissingTargetAnchor,
    /// Indexed file that nothing links to and that is not an entry point.
    OrphanedFile,
    /// External link containing a literal space.
    UrlWithSpaces,
}

impl IssueKind {
    /// Every kind, in name order.
    pub const ALL: [Self; 8] = [
        Self::DuplicateHeading,
        Self::MalformedUrl,
        Self::MissingAnchor,
        Self::MissingFile,
        Self::MissingImage,
        Self::MissingTargetAnchor,
        Self::OrphanedFile,
        Self::UrlWithSpaces,
    ];

    /// Machine name as written in reports and JSON.
    pub const fn as_str(self) -> &'static str {
        return match self {
            Self::DuplicateHeading => "duplicate_heading",
            Self::MalformedUrl => "malformed_url",
            Self::MissingAnchor => "missing_anchor",
            Self::MissingFile => "missing_file",
            Self::MissingImage => "missing_image",
            Self::MissingTargetAnchor => "missing_target_anchor",
            Self::OrphanedFile => "orphaned_file",
            Self::UrlWithSpaces => "url_with_spaces",
        };
    }

    /// Short human label for report headings.
    pub const fn label(self) -> &'static str {
        return match self {
            Self::DuplicateHeading => "Duplicate heading",
            Self::MalformedUrl => "Malformed URL",
            Self::MissingAnchor => "Missing anchor",
            Self::MissingFile => "Missing file",
            Self::MissingImage => "Missing image",
            Self::MissingTargetAnchor => "Missing target anchor",
            Self::OrphanedFile => "Orphaned file",
            Self::UrlWithSpaces => "URL with spaces",
        };
    }
}

/// A markdown file that was found by the walk but could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadFailure {
    /// Path relative to the scan root.
    pub path: PathBuf,
    /// The underlying I/O or decoding error, as text.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_prefix() {
        assert_eq!(LinkKind::classify("https://example.com"), LinkKind::External);
        assert_eq!(LinkKind::classify("mailto:a@b.c"), LinkKind::External);
        assert_eq!(LinkKind::classify("tel:+100"), LinkKind::External);
        assert_eq!(LinkKind::classify("#intro"), LinkKind::PureAnchor);
        assert_eq!(LinkKind::classify("../b/c.md#sec"), LinkKind::RelativePath);
        assert_eq!(LinkKind::classify("c.md"), LinkKind::RelativePath);
        assert_eq!(LinkKind::classify("/abs/path.md"), LinkKind::Opaque);
        assert_eq!(LinkKind::classify("ftp://host/file"), LinkKind::Opaque);
    }

    #[test]
    fn kind_order_matches_name_order() {
        let names: Vec<&str> = IssueKind::ALL.iter().map(|k| k.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }

    #[test]
    fn image_locality() {
        let image = |source: &str| Image {
            alt: String::new(),
            line: 1,
            raw: String::new(),
            source: source.to_string(),
        };
        assert!(image("./pic.png").is_local());
        assert!(image("assets/pic.png").is_local());
        assert!(!image("https://cdn.example.com/pic.png").is_local());
        assert!(!image("data:image/png;base64,AAAA").is_local());
        assert!(!image("/static/pic.png").is_local());
    }
}
