//! Filename-extension helpers operating on URL strings
//!
//! All comparisons here are case-insensitive and ignore the query string
//! and fragment, so `photo.JPG?size=large` matches the `.jpg` extension.

/// Returns the path portion of a URL string, without query or fragment
fn path_part(value: &str) -> &str {
    let end = value
        .find(|c| c == '?' || c == '#')
        .unwrap_or(value.len());
    &value[..end]
}

/// Returns the last path segment of a URL string, if there is one
///
/// The query string and fragment are ignored. Returns `None` when the
/// path ends in a slash or the URL has no path at all.
pub fn file_name_of(value: &str) -> Option<&str> {
    let path = path_part(value);
    // Skip the scheme separator so "https://host" does not yield "host"
    let after_scheme = match path.find("://") {
        Some(idx) => {
            let rest = &path[idx + 3..];
            match rest.find('/') {
                Some(slash) => &rest[slash + 1..],
                None => return None,
            }
        }
        None => path,
    };

    let segment = after_scheme.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Checks whether the URL path ends with any of the given extensions
///
/// Extensions are expected to include the leading dot (e.g. `.jpg`).
/// The comparison is case-insensitive.
pub fn ends_with_any(value: &str, extensions: &[String]) -> bool {
    let path = path_part(value).to_ascii_lowercase();
    extensions
        .iter()
        .any(|ext| path.ends_with(&ext.to_ascii_lowercase()))
}

/// Returns the extension of the last path segment, without the dot
///
/// `https://example.com/archive/data.tar.gz` yields `gz`.
pub fn extension_of(value: &str) -> Option<&str> {
    let segment = file_name_of(value)?;
    let dot = segment.rfind('.')?;
    let ext = &segment[dot + 1..];
    if ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// Checks whether the URL path has no filename extension at all
///
/// Extension-less URLs are follow-candidates for recursion: directory
/// listings, index pages, and routes like `/docs/getting-started`.
pub fn has_no_extension(value: &str) -> bool {
    match file_name_of(value) {
        Some(segment) => !segment.contains('.'),
        // Trailing slash or bare host: no extension
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_ends_with_any_match() {
        assert!(ends_with_any(
            "https://example.com/a.jpg",
            &exts(&[".jpg", ".png"])
        ));
    }

    #[test]
    fn test_ends_with_any_case_insensitive() {
        assert!(ends_with_any("https://example.com/A.JPG", &exts(&[".jpg"])));
        assert!(ends_with_any("https://example.com/a.jpg", &exts(&[".JPG"])));
    }

    #[test]
    fn test_ends_with_any_ignores_query() {
        assert!(ends_with_any(
            "https://example.com/a.jpg?size=large",
            &exts(&[".jpg"])
        ));
        assert!(ends_with_any(
            "https://example.com/a.jpg#top",
            &exts(&[".jpg"])
        ));
    }

    #[test]
    fn test_ends_with_any_no_match() {
        assert!(!ends_with_any(
            "https://example.com/a.jpeg",
            &exts(&[".jpg"])
        ));
        assert!(!ends_with_any("https://example.com/page", &exts(&[".jpg"])));
    }

    #[test]
    fn test_file_name_of() {
        assert_eq!(
            file_name_of("https://example.com/dir/file.zip"),
            Some("file.zip")
        );
        assert_eq!(
            file_name_of("https://example.com/dir/file.zip?v=2"),
            Some("file.zip")
        );
    }

    #[test]
    fn test_file_name_of_trailing_slash() {
        assert_eq!(file_name_of("https://example.com/dir/"), None);
        assert_eq!(file_name_of("https://example.com"), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("https://example.com/a.jpg"), Some("jpg"));
        assert_eq!(
            extension_of("https://example.com/data.tar.gz"),
            Some("gz")
        );
        assert_eq!(extension_of("https://example.com/page"), None);
        assert_eq!(extension_of("https://example.com/dir/"), None);
    }

    #[test]
    fn test_has_no_extension() {
        assert!(has_no_extension("https://example.com/docs"));
        assert!(has_no_extension("https://example.com/docs/"));
        assert!(has_no_extension("https://example.com"));
        assert!(!has_no_extension("https://example.com/a.jpg"));
        assert!(!has_no_extension("https://example.com/page.html"));
    }

    #[test]
    fn test_dot_in_directory_not_in_file() {
        // Only the last segment decides
        assert!(has_no_extension("https://example.com/v1.2/docs"));
        assert_eq!(extension_of("https://example.com/v1.2/docs"), None);
    }
}
