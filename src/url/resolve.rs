//! Relative-to-absolute URL resolution

use url::Url;

/// Resolves a link value to an absolute URL against the page it came from
///
/// Returns `None` if the link should be excluded:
/// - empty values and fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:`, `data:` schemes
/// - values that fail to resolve
/// - non-HTTP(S) URLs after resolution
pub fn to_absolute(value: &str, base: &Url) -> Option<String> {
    let value = value.trim();

    if value.is_empty() || value.starts_with('#') {
        return None;
    }

    if value.starts_with("javascript:")
        || value.starts_with("mailto:")
        || value.starts_with("tel:")
        || value.starts_with("data:")
    {
        return None;
    }

    match base.join(value) {
        Ok(absolute) => {
            if absolute.scheme() == "http" || absolute.scheme() == "https" {
                Some(absolute.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
