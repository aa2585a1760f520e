//! Canonical path mapping
//!
//! Registry and source archives root the package tree under different
//! directory names (`mypkg-1.2.3/mypkg/` in a tag export, `mypkg/` in a
//! wheel). Both sides are mapped to the path relative to the package
//! directory so that they line up.

use provaudit_types::PathMatch;

/// Map an archive entry path to its canonical path
///
/// Returns `None` for entries outside the package tree and for the package
/// directory itself.
///
/// With [`PathMatch::Segment`] the anchor is the first path segment exactly
/// equal to `package`. With [`PathMatch::Substring`] it is the first
/// occurrence of the text `"{package}/"` anywhere in the path, so a segment
/// merely ending in the package name (`notmypkg/`) also anchors. That looser
/// form is kept for parity with existing audit reports.
#[must_use]
pub fn normalize(path: &str, package: &str, mode: PathMatch) -> Option<String> {
    if package.is_empty() {
        return None;
    }

    let rest = match mode {
        PathMatch::Segment => after_segment(path, package)?,
        PathMatch::Substring => after_substring(path, package)?,
    };

    if rest.is_empty() || rest.ends_with('/') {
        return None;
    }
    Some(rest.to_string())
}

fn after_segment<'a>(path: &'a str, package: &str) -> Option<&'a str> {
    let mut offset = 0;
    for segment in path.split('/') {
        let end = offset + segment.len();
        if segment == package && end < path.len() {
            return Some(&path[end + 1..]);
        }
        offset = end + 1;
    }
    None
}

fn after_substring<'a>(path: &'a str, package: &str) -> Option<&'a str> {
    let needle = format!("{package}/");
    path.find(&needle).map(|idx| &path[idx + needle.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_different_roots_align() {
        for mode in [PathMatch::Segment, PathMatch::Substring] {
            assert_eq!(
                normalize("mypkg-1.2.3/mypkg/util.py", "mypkg", mode).as_deref(),
                Some("util.py")
            );
            assert_eq!(
                normalize("mypkg/util.py", "mypkg", mode).as_deref(),
                Some("util.py")
            );
            assert_eq!(
                normalize("mypkg/sub/mod.py", "mypkg", mode).as_deref(),
                Some("sub/mod.py")
            );
        }
    }

    #[test]
    fn test_outside_package_is_excluded() {
        for mode in [PathMatch::Segment, PathMatch::Substring] {
            assert_eq!(normalize("mypkg-1.2.3/README.md", "mypkg", mode), None);
            assert_eq!(normalize("mypkg-1.2.3/setup.py", "mypkg", mode), None);
        }
    }

    #[test]
    fn test_first_occurrence_wins() {
        for mode in [PathMatch::Segment, PathMatch::Substring] {
            assert_eq!(
                normalize("root/mypkg/mypkg/x.py", "mypkg", mode).as_deref(),
                Some("mypkg/x.py")
            );
        }
    }

    #[test]
    fn test_substring_matches_inside_segment() {
        assert_eq!(
            normalize("src/notmypkg/x.py", "mypkg", PathMatch::Substring).as_deref(),
            Some("x.py")
        );
        assert_eq!(normalize("src/notmypkg/x.py", "mypkg", PathMatch::Segment), None);
    }

    #[test]
    fn test_package_directory_itself_is_dropped() {
        assert_eq!(normalize("mypkg-1.0/mypkg/", "mypkg", PathMatch::Segment), None);
        assert_eq!(normalize("mypkg-1.0/mypkg", "mypkg", PathMatch::Segment), None);
        assert_eq!(normalize("mypkg/", "mypkg", PathMatch::Substring), None);
        assert_eq!(normalize("mypkg/sub/", "mypkg", PathMatch::Segment), None);
    }

    #[test]
    fn test_file_named_like_package() {
        // a file called `mypkg` never has a trailing slash, so it cannot anchor
        assert_eq!(normalize("docs/mypkg", "mypkg", PathMatch::Segment), None);
        assert_eq!(normalize("docs/mypkg", "mypkg", PathMatch::Substring), None);
    }

    #[test]
    fn test_empty_package_name() {
        assert_eq!(normalize("a/b.py", "", PathMatch::Substring), None);
    }
}
