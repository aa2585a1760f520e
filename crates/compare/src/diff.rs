//! Index-aligned line diff
//!
//! Lines are paired by position, not by longest common subsequence, so an
//! inserted line reports every following line as changed. Reports produced
//! by earlier audits have the same granularity.

use crate::fileset::{CanonicalFileSet, FileContent};
use provaudit_types::{ComparisonResult, FileDifference, LineDifference};
use std::collections::BTreeSet;

/// Compare two canonical file sets
///
/// The result is empty exactly when every canonical path present on either
/// side has identical lines on both sides. Files are reported in sorted path
/// order and files without differences are omitted.
#[must_use]
pub fn diff(left: &CanonicalFileSet, right: &CanonicalFileSet) -> ComparisonResult {
    let all_paths: BTreeSet<&str> = left.paths().chain(right.paths()).collect();

    let files = all_paths
        .into_iter()
        .filter_map(|path| {
            let differences = diff_content(left.get(path), right.get(path));
            (!differences.is_empty()).then(|| FileDifference {
                path: path.to_string(),
                differences,
            })
        })
        .collect();

    ComparisonResult::new(files)
}

fn diff_content(left: Option<&FileContent>, right: Option<&FileContent>) -> Vec<LineDifference> {
    match (left, right) {
        (Some(FileContent::Binary(a)), Some(FileContent::Binary(b))) if a == b => Vec::new(),
        (Some(FileContent::Binary(_)), _) | (_, Some(FileContent::Binary(_))) => {
            vec![LineDifference::new(
                1,
                left.map(placeholder),
                right.map(placeholder),
            )]
        }
        _ => diff_lines(
            left.and_then(FileContent::as_text).unwrap_or_default(),
            right.and_then(FileContent::as_text).unwrap_or_default(),
        ),
    }
}

fn placeholder(content: &FileContent) -> String {
    match content {
        FileContent::Binary(bytes) => format!("<binary {} bytes>", bytes.len()),
        FileContent::Text(text) => format!("<text {} bytes>", text.len()),
    }
}

/// Pair lines by index; the tail of the longer side is reported against an
/// absent counterpart
#[must_use]
pub fn diff_lines(left: &str, right: &str) -> Vec<LineDifference> {
    let left_lines: Vec<&str> = left.lines().collect();
    let right_lines: Vec<&str> = right.lines().collect();
    let max_len = left_lines.len().max(right_lines.len());

    (0..max_len)
        .filter_map(|i| {
            let l = left_lines.get(i).copied();
            let r = right_lines.get(i).copied();
            (l != r).then(|| {
                LineDifference::new(i + 1, l.map(str::to_string), r.map(str::to_string))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    fn set(files: &[(&str, &str)]) -> CanonicalFileSet {
        files.iter().copied().collect()
    }

    fn swap(differences: &[LineDifference]) -> Vec<LineDifference> {
        differences
            .iter()
            .map(|d| LineDifference::new(d.line_number, d.right.clone(), d.left.clone()))
            .collect()
    }

    fn lines() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-c ]{1,4}", 0..8)
    }

    fn file_sets() -> impl Strategy<Value = CanonicalFileSet> {
        prop::collection::btree_map("[a-d]\\.py", "[a-c\n]{0,12}", 0..4).prop_map(|files| {
            let mut set = CanonicalFileSet::new();
            for (path, text) in files {
                set.insert_text(&path, &text);
            }
            set
        })
    }

    proptest! {
        #[test]
        fn prop_identical_sets_have_no_differences(a in file_sets()) {
            prop_assert!(diff(&a, &a.clone()).is_identical());
        }

        #[test]
        fn prop_swapping_sides_swaps_differences(a in file_sets(), b in file_sets()) {
            let forward = diff(&a, &b);
            let backward = diff(&b, &a);

            prop_assert_eq!(forward.changed_paths(), backward.changed_paths());
            for (f, r) in forward.files.iter().zip(&backward.files) {
                prop_assert_eq!(&f.differences, &swap(&r.differences));
            }
        }

        #[test]
        fn prop_one_extra_trailing_line(base in lines(), extra in "[a-c]{1,4}") {
            let left = base.join("\n");
            let right = if base.is_empty() {
                extra.clone()
            } else {
                format!("{left}\n{extra}")
            };

            let diffs = diff_lines(&left, &right);
            prop_assert_eq!(
                diffs,
                vec![LineDifference::new(base.len() + 1, None, Some(extra))]
            );
        }
    }

    #[test]
    fn test_diff_lines_changed_and_tail() {
        let diffs = diff_lines("a\nb\nc", "a\nB\nc\nd");
        assert_eq!(
            diffs,
            vec![
                LineDifference::new(2, Some("b".into()), Some("B".into())),
                LineDifference::new(4, None, Some("d".into())),
            ]
        );
    }

    #[test]
    fn test_diff_lines_left_longer_keeps_tail() {
        let diffs = diff_lines("a\nb\nc", "a");
        assert_eq!(
            diffs,
            vec![
                LineDifference::new(2, Some("b".into()), None),
                LineDifference::new(3, Some("c".into()), None),
            ]
        );
    }

    #[test]
    fn test_trailing_newline_and_crlf() {
        assert!(diff_lines("a\nb\n", "a\nb").is_empty());
        assert!(diff_lines("a\r\nb\r\n", "a\nb\n").is_empty());
    }

    #[test]
    fn test_empty_line_is_not_absent() {
        let diffs = diff_lines("a\n\nc", "a\nc");
        assert_eq!(
            diffs,
            vec![
                LineDifference::new(2, Some(String::new()), Some("c".into())),
                LineDifference::new(3, Some("c".into()), None),
            ]
        );
    }

    #[test]
    fn test_identical_sets_are_empty() {
        let a = set(&[("x.py", "print(1)\n"), ("y.py", "")]);
        assert!(diff(&a, &a.clone()).is_identical());
    }

    #[test]
    fn test_missing_file_reports_every_line() {
        let left = set(&[("only_left.py", "one\ntwo\n")]);
        let right = CanonicalFileSet::new();

        let result = diff(&left, &right);
        let file = result.get("only_left.py").unwrap();
        assert_eq!(
            file.differences,
            vec![
                LineDifference::new(1, Some("one".into()), None),
                LineDifference::new(2, Some("two".into()), None),
            ]
        );
    }

    #[test]
    fn test_empty_file_missing_on_one_side_is_not_reported() {
        let left = set(&[("__init__.py", "")]);
        assert!(diff(&left, &CanonicalFileSet::new()).is_identical());
    }

    #[test]
    fn test_paths_sorted() {
        let left = set(&[("b.py", "1"), ("a.py", "1")]);
        let right = set(&[("b.py", "2"), ("a.py", "2")]);
        assert_eq!(diff(&left, &right).changed_paths(), ["a.py", "b.py"]);
    }

    #[test]
    fn test_swapping_sides_swaps_differences() {
        let left = set(&[("m.py", "a\nb\nc"), ("l.py", "x")]);
        let right = set(&[("m.py", "a\nB\nc\nd"), ("r.py", "y\n")]);

        let forward = diff(&left, &right);
        let backward = diff(&right, &left);

        assert_eq!(forward.changed_paths(), backward.changed_paths());
        for (f, b) in forward.files.iter().zip(&backward.files) {
            assert_eq!(f.differences, swap(&b.differences));
        }
    }

    #[test]
    fn test_binary_contents() {
        let mut left = CanonicalFileSet::new();
        let mut right = CanonicalFileSet::new();
        left.insert("same.bin", FileContent::Binary(vec![0xff, 0x00]));
        right.insert("same.bin", FileContent::Binary(vec![0xff, 0x00]));
        left.insert("other.bin", FileContent::Binary(vec![0xff]));
        right.insert("other.bin", FileContent::Binary(vec![0xfe, 0xfe]));
        left.insert("gone.bin", FileContent::Binary(vec![0xff; 3]));
        right.insert_text("mixed.py", "pass\n");
        left.insert("mixed.py", FileContent::Binary(vec![0x80]));

        let result = diff(&left, &right);
        assert_eq!(result.changed_paths(), ["gone.bin", "mixed.py", "other.bin"]);
        assert_eq!(
            result.get("other.bin").unwrap().differences,
            vec![LineDifference::new(
                1,
                Some("<binary 1 bytes>".into()),
                Some("<binary 2 bytes>".into())
            )]
        );
        assert_eq!(
            result.get("gone.bin").unwrap().differences,
            vec![LineDifference::new(1, Some("<binary 3 bytes>".into()), None)]
        );
        assert_eq!(
            result.get("mixed.py").unwrap().differences,
            vec![LineDifference::new(
                1,
                Some("<binary 1 bytes>".into()),
                Some("<text 5 bytes>".into())
            )]
        );
    }
}
