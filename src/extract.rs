//! Pure extraction of headings, links, and images from markdown text.
//!
//! Extraction is regex-driven and line-oriented where possible. It is not a
//! markdown parser: code blocks are not skipped and reference-style links are
//! not recognized.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Document, Heading, Image, Link, LinkKind};

/// Compile a hardcoded pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid (compile-time invariant).
#[allow(clippy::expect_used, reason = "patterns are string literals covered by tests")]
fn compile(pattern: &str) -> Regex {
    return Regex::new(pattern).expect("valid regex");
}

/// `# Title` through `###### Title`; whitespace after the markers is required.
static HEADING: LazyLock<Regex> = LazyLock::new(|| return compile(r"^(#{1,6})\s+(.+)"));

/// `<a href="target">text</a>`.
static HTML_LINK: LazyLock<Regex> = LazyLock::new(|| {
    return compile(r#"(?i)<a[^>]+href=["']([^"']+)["'][^>]*>([^<]*)</a>"#);
});

/// `<img src="...">`.
static HTML_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| return compile(r#"(?i)<img[^>]+src=["']([^"']+)["'][^>]*>"#));

/// `alt="..."` inside an `<img>` tag.
static HTML_ALT: LazyLock<Regex> = LazyLock::new(|| return compile(r#"(?i)alt=["']([^"']*)["']"#));

/// `![alt](src)`.
static MD_IMAGE: LazyLock<Regex> = LazyLock::new(|| return compile(r"!\[([^\]]*)\]\(([^)]+)\)"));

/// `[text](target)`, where the text may itself hold an inline image, as in
/// `[![badge](b.png)](https://ci)`. A bare image still matches from its `[`;
/// callers skip matches preceded by `!`.
static MD_LINK: LazyLock<Regex> = LazyLock::new(|| {
    return compile(r"\[((?:!\[[^\]]*\]\([^)]*\)|[^\]])*)\]\(([^)]+)\)");
});

/// Characters dropped from anchors: anything but word chars, CJK ideographs,
/// whitespace, and hyphens.
static SLUG_STRIP: LazyLock<Regex> =
    LazyLock::new(|| return compile(r"[^\w\x{4e00}-\x{9fff}\s-]"));

/// Whitespace runs, replaced by a single hyphen.
static SLUG_SPACES: LazyLock<Regex> = LazyLock::new(|| return compile(r"\s+"));

/// Hyphen runs, collapsed to one.
static SLUG_HYPHENS: LazyLock<Regex> = LazyLock::new(|| return compile(r"-+"));

/// Derive the anchor slug for a heading title.
///
/// Lowercase, strip punctuation, whitespace runs to one hyphen, collapse
/// hyphens, trim hyphens at both ends. Identical titles always give identical
/// anchors.
pub fn anchor_for(title: &str) -> String {
    let lowered = title.to_lowercase();
    let stripped = SLUG_STRIP.replace_all(&lowered, "");
    let hyphenated = SLUG_SPACES.replace_all(&stripped, "-");
    let collapsed = SLUG_HYPHENS.replace_all(&hyphenated, "-");
    return collapsed.trim_matches('-').to_string();
}

/// Build a document model from markdown content.
pub fn document(content: &str) -> Document {
    return Document {
        headings: headings(content),
        images: images(content),
        links: links(content),
    };
}

/// Extract every ATX heading in file order.
pub fn headings(content: &str) -> Vec<Heading> {
    let mut found = Vec::new();
    for (idx, line) in content.split('\n').enumerate() {
        let Some(cap) = HEADING.captures(line) else {
            continue;
        };
        let (Some(markers), Some(text)) = (cap.get(1), cap.get(2)) else {
            continue;
        };
        let title = text.as_str().trim().to_string();
        found.push(Heading {
            anchor: anchor_for(&title),
            level: u8::try_from(markers.as_str().len()).unwrap_or(6),
            line: u32::try_from(idx).unwrap_or(u32::MAX).saturating_add(1),
            title,
        });
    }
    return found;
}

/// Extract inline images and `<img>` tags. Inline images come first, then
/// tags, each group in match order.
pub fn images(content: &str) -> Vec<Image> {
    let mut found = Vec::new();

    for cap in MD_IMAGE.captures_iter(content) {
        let (Some(whole), Some(alt), Some(src)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        found.push(Image {
            alt: alt.as_str().to_string(),
            line: line_at(content, whole.start()),
            raw: whole.as_str().to_string(),
            source: src.as_str().to_string(),
        });
    }

    for cap in HTML_IMAGE.captures_iter(content) {
        let (Some(whole), Some(src)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let alt = HTML_ALT
            .captures(whole.as_str())
            .and_then(|a| return a.get(1))
            .map(|a| return a.as_str().to_string())
            .unwrap_or_default();
        found.push(Image {
            alt,
            line: line_at(content, whole.start()),
            raw: whole.as_str().to_string(),
            source: src.as_str().to_string(),
        });
    }

    return found;
}

/// Extract inline links and `<a href>` tags. Inline links come first, then
/// tags, each group in match order. Image markup is not a link.
pub fn links(content: &str) -> Vec<Link> {
    let mut found = Vec::new();

    for cap in MD_LINK.captures_iter(content) {
        let (Some(whole), Some(text), Some(target)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        if is_image_bang(content, whole.start()) {
            continue;
        }
        found.push(new_link(content, whole, text.as_str(), target.as_str()));
    }

    for cap in HTML_LINK.captures_iter(content) {
        let (Some(whole), Some(target), Some(text)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            continue;
        };
        found.push(new_link(content, whole, text.as_str(), target.as_str()));
    }

    return found;
}

/// Whether the byte just before `start` is the `!` of image syntax.
fn is_image_bang(content: &str, start: usize) -> bool {
    return start
        .checked_sub(1)
        .and_then(|prev| return content.as_bytes().get(prev))
        .is_some_and(|b| return *b == b'!');
}

/// One-based line number of a byte offset: newlines before it, plus one.
pub fn line_at(content: &str, offset: usize) -> u32 {
    let before = content.get(..offset).unwrap_or(content);
    let newlines = before.bytes().filter(|b| return *b == b'\n').count();
    return u32::try_from(newlines).unwrap_or(u32::MAX).saturating_add(1);
}

/// Assemble a link record from a match.
fn new_link(content: &str, whole: regex::Match<'_>, text: &str, target: &str) -> Link {
    return Link {
        kind: LinkKind::classify(target),
        line: line_at(content, whole.start()),
        raw: whole.as_str().to_string(),
        target: target.to_string(),
        text: text.to_string(),
    };
}
