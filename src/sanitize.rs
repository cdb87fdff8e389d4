//! Entry-path sanitization
//!
//! Callers name the entry they want with an arbitrary, untrusted string.
//! Before that string is handed to the extraction tool or joined against a
//! workspace directory it is normalized here so it can never escape the
//! directory it is resolved under.

/// Normalize an untrusted entry path into a safe relative path.
///
/// Applies, in order: every backslash becomes a forward slash, leading
/// slashes are stripped, and any `..` segment (along with empty segments
/// left by doubled slashes) is dropped before the segments are rejoined
/// with `/`.
///
/// The result never contains a parent-directory traversal and is safe to
/// join against a trusted base directory. An empty result is valid and
/// means the archive root. The function is pure and idempotent.
///
/// # Examples
///
/// ```
/// use unzipper::sanitize::sanitize_entry_path;
///
/// assert_eq!(sanitize_entry_path("../../etc/passwd"), "etc/passwd");
/// assert_eq!(sanitize_entry_path("docs\\readme.html"), "docs/readme.html");
/// assert_eq!(sanitize_entry_path("/x/y"), "x/y");
/// ```
#[must_use]
pub fn sanitize_entry_path(raw: &str) -> String {
    raw.replace('\\', "/")
        .trim_start_matches('/')
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "..")
        .collect::<Vec<_>>()
        .join("/")
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_all_parent_traversal_segments() {
        assert_eq!(sanitize_entry_path("../../etc/passwd"), "etc/passwd");
        assert_eq!(sanitize_entry_path("a/../b"), "a/b");
        assert_eq!(sanitize_entry_path("a/../../../b/c"), "a/b/c");
        assert!(!sanitize_entry_path("..\\..\\windows\\system32").contains(".."));
    }

    #[test]
    fn converts_every_backslash() {
        assert_eq!(sanitize_entry_path("a\\b"), "a/b");
        assert_eq!(sanitize_entry_path("a\\b\\c\\d"), "a/b/c/d");
    }

    #[test]
    fn strips_all_leading_slashes() {
        assert_eq!(sanitize_entry_path("/x/y"), "x/y");
        assert_eq!(sanitize_entry_path("///x/y"), "x/y");
        assert_eq!(sanitize_entry_path("\\x\\y"), "x/y");
    }

    #[test]
    fn collapses_empty_segments() {
        assert_eq!(sanitize_entry_path("a//b"), "a/b");
        assert_eq!(sanitize_entry_path("a/b/"), "a/b");
    }

    #[test]
    fn keeps_ordinary_paths_unchanged() {
        assert_eq!(sanitize_entry_path("index.html"), "index.html");
        assert_eq!(sanitize_entry_path("docs/guide/ch1.md"), "docs/guide/ch1.md");
        assert_eq!(sanitize_entry_path("with space/file.txt"), "with space/file.txt");
    }

    #[test]
    fn empty_result_means_archive_root() {
        assert_eq!(sanitize_entry_path(""), "");
        assert_eq!(sanitize_entry_path("/"), "");
        assert_eq!(sanitize_entry_path("../.."), "");
    }

    #[test]
    fn idempotent_on_every_input_shape() {
        for raw in [
            "../../etc/passwd",
            "a\\b",
            "/x/y",
            "a//b/",
            "",
            "plain.txt",
            "..\\../mixed/..\\deep",
        ] {
            let once = sanitize_entry_path(raw);
            assert_eq!(sanitize_entry_path(&once), once, "input: {raw:?}");
        }
    }
}
