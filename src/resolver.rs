//! Lexical resolution of relative link and image targets.
//!
//! Link targets resolve against the document index only; nothing here asks
//! the filesystem whether a markdown file exists.

use std::path::{Component, Path, PathBuf};

/// A relative link target split into its resolved path and fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget<'a> {
    /// Fragment after `#`, if any. Empty fragments are treated as absent.
    pub fragment: Option<&'a str>,
    /// Path component exactly as written, without the fragment.
    pub path_part: &'a str,
    /// Normalized path relative to the scan root, or `None` when the path
    /// climbs above the root.
    pub resolved: Option<PathBuf>,
}

/// Resolve a relative link target written in `source` (a root-relative
/// document path). Returns `None` when the target has no path component,
/// such as `#frag` or `?query#frag` with an empty path.
pub fn resolve_link<'a>(source: &Path, target: &'a str) -> Option<ResolvedTarget<'a>> {
    let (path_part, fragment) = split_fragment(target);
    if path_part.is_empty() {
        return None;
    }
    return Some(ResolvedTarget {
        fragment,
        path_part,
        resolved: resolve_against(source, path_part),
    });
}

/// Resolve `relative` against the directory containing `source`, staying
/// inside the scan root.
pub fn resolve_against(source: &Path, relative: &str) -> Option<PathBuf> {
    let source_dir = source.parent().unwrap_or_else(|| return Path::new(""));
    let normalized = normalize_path(&source_dir.join(relative));
    let escapes = normalized
        .components()
        .next()
        .is_some_and(|c| return matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes || normalized.as_os_str().is_empty() {
        return None;
    }
    return Some(normalized);
}

/// Filesystem location of a local image referenced from `source`.
pub fn image_path(root: &Path, source: &Path, image_source: &str) -> PathBuf {
    let source_dir = source.parent().unwrap_or_else(|| return Path::new(""));
    return root.join(source_dir).join(image_source);
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
/// Pops the last component for `..` when possible, preserves it otherwise.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => {
            let can_pop = matches!(
                components.last(),
                Some(c) if matches!(c, Component::Normal(_))
            );
            if can_pop {
                components.pop();
            } else {
                components.push(component);
            }
        },
        other => components.push(other),
    }
    return;
}

/// Split `path#fragment` at the first `#`.
pub fn split_fragment(target: &str) -> (&str, Option<&str>) {
    return match target.split_once('#') {
        None => (target, None),
        Some((path, "")) => (path, None),
        Some((path, fragment)) => (path, Some(fragment)),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_relative_link() {
        let resolved = resolve_link(Path::new("a/x.md"), "../b/c.md").unwrap();
        assert_eq!(resolved.resolved, Some(PathBuf::from("b/c.md")));
        assert_eq!(resolved.fragment, None);
    }

    #[test]
    fn current_dir_link_with_fragment() {
        let resolved = resolve_link(Path::new("a/x.md"), "./c.md#sec").unwrap();
        assert_eq!(resolved.resolved, Some(PathBuf::from("a/c.md")));
        assert_eq!(resolved.fragment, Some("sec"));
        assert_eq!(resolved.path_part, "./c.md");
    }

    #[test]
    fn top_level_source() {
        let resolved = resolve_link(Path::new("a.md"), "b.md#intro").unwrap();
        assert_eq!(resolved.resolved, Some(PathBuf::from("b.md")));
        assert_eq!(resolved.fragment, Some("intro"));
    }

    #[test]
    fn escaping_the_root_does_not_resolve() {
        let resolved = resolve_link(Path::new("a.md"), "../outside.md").unwrap();
        assert_eq!(resolved.resolved, None);
    }

    #[test]
    fn fragment_only_has_no_path() {
        assert!(resolve_link(Path::new("a.md"), "#sec").is_none());
    }

    #[test]
    fn empty_fragment_is_absent() {
        assert_eq!(split_fragment("c.md#"), ("c.md", None));
        assert_eq!(split_fragment("c.md#a#b"), ("c.md", Some("a#b")));
    }

    #[test]
    fn normalize_keeps_leading_parent() {
        assert_eq!(normalize_path(Path::new("../../a/./b/../c")), PathBuf::from("../../a/c"));
    }

    #[test]
    fn image_path_is_beside_document() {
        let root = Path::new("/book");
        assert_eq!(image_path(root, Path::new("ch1/a.md"), "./pic.png"), PathBuf::from("/book/ch1/./pic.png"));
    }
}
