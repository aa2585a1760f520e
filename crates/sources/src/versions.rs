//! Version list parsing and ordering

use pep440_rs::Version;
use std::cmp::Reverse;
use std::str::FromStr;

const AVAILABLE_VERSIONS: &str = "Available versions:";

/// Extract the version tokens from `pip index versions` output
///
/// pip prints a header line (`pkg (1.2.0)`), the comma-separated list after
/// `Available versions:` and, depending on the environment, `INSTALLED:` /
/// `LATEST:` lines and deprecation warnings. Only the list is kept.
///
/// Returns `None` when the output carries no version list at all.
#[must_use]
pub fn parse_pip_versions(output: &str) -> Option<Vec<String>> {
    let line = output
        .lines()
        .find_map(|line| line.split_once(AVAILABLE_VERSIONS).map(|(_, rest)| rest))?;

    Some(
        line.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Sort version strings newest first by PEP 440 precedence
///
/// Strings that are not valid PEP 440 versions go last, in their original
/// order.
pub fn sort_versions_desc(versions: &mut [String]) {
    versions.sort_by_cached_key(|raw| match Version::from_str(raw) {
        Ok(version) => (false, Some(Reverse(version))),
        Err(_) => (true, None),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pip_output() {
        let output = "requests (2.32.3)\nAvailable versions: 2.32.3, 2.32.2, 2.31.0\n  INSTALLED: 2.31.0\n  LATEST:    2.32.3\n";
        assert_eq!(
            parse_pip_versions(output).unwrap(),
            ["2.32.3", "2.32.2", "2.31.0"]
        );
    }

    #[test]
    fn test_parse_pip_output_with_warnings() {
        let output = "WARNING: pip index is currently an experimental command.\nmypkg (1.1.0)\nAvailable versions: 1.1.0,1.0.0 ,\n";
        assert_eq!(parse_pip_versions(output).unwrap(), ["1.1.0", "1.0.0"]);
    }

    #[test]
    fn test_parse_pip_output_without_list() {
        assert_eq!(parse_pip_versions("ERROR: No matching distribution found"), None);
    }

    fn sorted(input: &[&str]) -> Vec<String> {
        let mut versions: Vec<String> = input.iter().map(ToString::to_string).collect();
        sort_versions_desc(&mut versions);
        versions
    }

    #[test]
    fn test_sort_versions_desc() {
        assert_eq!(
            sorted(&["1.0.0", "1.10.0", "1.2.0", "1.2.0rc1", "1.2.0.post1", "0.9"]),
            ["1.10.0", "1.2.0.post1", "1.2.0", "1.2.0rc1", "1.0.0", "0.9"]
        );
    }

    #[test]
    fn test_dev_releases_sort_below_pre_releases() {
        assert_eq!(
            sorted(&["1.0a1", "1.0.dev0", "1.0", "1.0rc1"]),
            ["1.0", "1.0rc1", "1.0a1", "1.0.dev0"]
        );
    }

    #[test]
    fn test_post_and_pre_release_ordering() {
        assert_eq!(
            sorted(&["1.0b2", "1.0.post2", "1.0a1", "1.0.post1", "1.0b1.post1"]),
            ["1.0.post2", "1.0.post1", "1.0b2", "1.0b1.post1", "1.0a1"]
        );
    }

    #[test]
    fn test_epoch_outranks_release() {
        assert_eq!(sorted(&["2.0", "1!0.5", "10.0"]), ["1!0.5", "10.0", "2.0"]);
    }

    #[test]
    fn test_unparseable_versions_go_last_in_order() {
        assert_eq!(
            sorted(&["not-a-version", "1.0", "zzz", "2.0"]),
            ["2.0", "1.0", "not-a-version", "zzz"]
        );
    }
}
