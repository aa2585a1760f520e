//! Integration tests for archive comparison

#[cfg(test)]
mod tests {
    use provaudit_compare::*;
    use provaudit_errors::{AuditError, Error};
    use provaudit_types::{DecodePolicy, LineDifference, PathMatch};
    use std::io::{Cursor, Write};

    fn wheel(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn sdist(files: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_wheel_matches_tag_export() {
        let registry = wheel(&[
            ("mypkg/__init__.py", b"VERSION = '1.0.0'\n"),
            ("mypkg/core.py", b"def run():\n    return 1\n"),
            ("mypkg-1.0.0.dist-info/METADATA", b"Name: mypkg\n"),
        ]);
        let source = wheel(&[
            ("mypkg-1.0.0/README.md", b"# mypkg\n"),
            ("mypkg-1.0.0/mypkg/__init__.py", b"VERSION = '1.0.0'\n"),
            ("mypkg-1.0.0/mypkg/core.py", b"def run():\n    return 1\n"),
            ("mypkg-1.0.0/tests/test_core.py", b"assert True\n"),
        ]);

        let result =
            compare_archives("mypkg", "1.0.0", &registry, &source, CompareOptions::default())
                .unwrap();
        assert!(result.is_identical());
    }

    #[test]
    fn test_injected_line_is_reported() {
        let registry = wheel(&[("mypkg/core.py", b"a\nB\nc\nd\n")]);
        let source = wheel(&[("mypkg-2.0/mypkg/core.py", b"a\nb\nc\n")]);

        let result =
            compare_archives("mypkg", "2.0", &registry, &source, CompareOptions::default())
                .unwrap();

        assert_eq!(result.changed_paths(), ["core.py"]);
        assert_eq!(
            result.get("core.py").unwrap().differences,
            vec![
                LineDifference::new(2, Some("B".into()), Some("b".into())),
                LineDifference::new(4, Some("d".into()), None),
            ]
        );
    }

    #[test]
    fn test_sdist_against_zip() {
        let registry = sdist(&[
            ("mypkg-1.0/PKG-INFO", b"Metadata-Version: 2.1\n"),
            ("mypkg-1.0/mypkg/__init__.py", b""),
            ("mypkg-1.0/mypkg/extra.py", b"import os\n"),
        ]);
        let source = wheel(&[("repo-1.0/mypkg/__init__.py", b"")]);

        let result =
            compare_archives("mypkg", "1.0", &registry, &source, CompareOptions::default())
                .unwrap();
        assert_eq!(result.changed_paths(), ["extra.py"]);
        assert_eq!(result.line_count(), 1);
    }

    #[test]
    fn test_comparison_is_deterministic() {
        let registry = wheel(&[("mypkg/z.py", b"1\n"), ("mypkg/a.py", b"1\n")]);
        let source = wheel(&[("x/mypkg/a.py", b"2\n"), ("x/mypkg/z.py", b"2\n")]);
        let comparator = Comparator::new("mypkg", CompareOptions::default());

        let first = comparator.compare("1", &registry, &source).unwrap();
        let second = comparator.compare("1", &registry, &source).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.changed_paths(), ["a.py", "z.py"]);
    }

    #[test]
    fn test_corrupt_source_archive() {
        let registry = wheel(&[("mypkg/a.py", b"x\n")]);
        let err = compare_archives(
            "mypkg",
            "1.0",
            &registry,
            b"<html>Not Found</html>",
            CompareOptions::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Audit(AuditError::ArchiveCorrupt { ref channel, .. }) if channel == "source"
        ));
    }

    #[test]
    fn test_decode_policies() {
        let registry = wheel(&[("mypkg/_speedups.so", &[0x7f, 0x45, 0xff, 0x00])]);
        let source = wheel(&[("mypkg-1.0/mypkg/_speedups.c", b"int x;\n")]);

        let strict = compare_archives(
            "mypkg",
            "1.0",
            &registry,
            &source,
            CompareOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(
            strict,
            Error::Audit(AuditError::DecodeFailed { ref path, .. }) if path == "_speedups.so"
        ));

        let lenient = compare_archives(
            "mypkg",
            "1.0",
            &registry,
            &source,
            CompareOptions {
                decode_policy: DecodePolicy::MarkDifferent,
                path_match: PathMatch::Segment,
            },
        )
        .unwrap();
        assert_eq!(lenient.changed_paths(), ["_speedups.c", "_speedups.so"]);
        assert_eq!(
            lenient.get("_speedups.so").unwrap().differences,
            vec![LineDifference::new(
                1,
                Some("<binary 4 bytes>".into()),
                None
            )]
        );
    }

    #[test]
    fn test_path_match_modes() {
        let registry = wheel(&[("mypkg/a.py", b"x\n")]);
        let source = wheel(&[("src/notmypkg/a.py", b"x\n")]);

        let segment =
            compare_archives("mypkg", "1.0", &registry, &source, CompareOptions::default())
                .unwrap();
        assert_eq!(segment.changed_paths(), ["a.py"]);

        let substring = compare_archives(
            "mypkg",
            "1.0",
            &registry,
            &source,
            CompareOptions {
                decode_policy: DecodePolicy::Strict,
                path_match: PathMatch::Substring,
            },
        )
        .unwrap();
        assert!(substring.is_identical());
    }
}
