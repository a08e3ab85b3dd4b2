//! HTML parser for extracting candidate links
//!
//! This module turns raw page text into a sequence of link records. Each
//! record carries the raw attribute value plus an optional human-readable
//! label (anchor text, image alt text) that the downloader may use for
//! naming files.

use scraper::{Html, Selector};

/// One candidate link extracted from a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    /// The raw href/src value, possibly relative
    pub value: String,

    /// Human-readable label, if the markup provides a non-empty one
    pub label: Option<String>,
}

/// Extracts all candidate links from HTML content
///
/// Sources, in document order per selector:
/// - `<a href="...">` with the anchor text as label
/// - `<img src="...">` with the alt attribute as label
///
/// Values are returned as written in the markup; resolution against the
/// page URL happens in the controller.
pub fn extract_links(html: &str) -> Vec<LinkRecord> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(anchor_selector) = Selector::parse("a[href]") {
        for element in document.select(&anchor_selector) {
            if let Some(href) = element.value().attr("href") {
                let text = element.text().collect::<String>();
                links.push(LinkRecord {
                    value: href.to_string(),
                    label: non_empty(text.trim()),
                });
            }
        }
    }

    if let Ok(img_selector) = Selector::parse("img[src]") {
        for element in document.select(&img_selector) {
            if let Some(src) = element.value().attr("src") {
                let alt = element.value().attr("alt").unwrap_or("");
                links.push(LinkRecord {
                    value: src.to_string(),
                    label: non_empty(alt.trim()),
                });
            }
        }
    }

    links
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_anchor_with_label() {
        let html = r#"<html><body><a href="/files/a.zip">Archive</a></body></html>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].value, "/files/a.zip");
        assert_eq!(links[0].label.as_deref(), Some("Archive"));
    }

    #[test]
    fn test_extract_anchor_without_label() {
        let html = r#"<html><body><a href="/files/a.zip"></a></body></html>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].label, None);
    }

    #[test]
    fn test_anchor_label_trimmed() {
        let html = r#"<html><body><a href="/x">  spaced out  </a></body></html>"#;
        let links = extract_links(html);
        assert_eq!(links[0].label.as_deref(), Some("spaced out"));
    }

    #[test]
    fn test_extract_img_with_alt() {
        let html = r#"<html><body><img src="/pics/cat.jpg" alt="A cat"></body></html>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].value, "/pics/cat.jpg");
        assert_eq!(links[0].label.as_deref(), Some("A cat"));
    }

    #[test]
    fn test_extract_img_without_alt() {
        let html = r#"<html><body><img src="/pics/cat.jpg"></body></html>"#;
        let links = extract_links(html);
        assert_eq!(links[0].label, None);
    }

    #[test]
    fn test_anchors_before_images() {
        let html = r#"<html><body>
            <img src="/b.png" alt="B">
            <a href="/a.zip">A</a>
        </body></html>"#;
        let links = extract_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].value, "/a.zip");
        assert_eq!(links[1].value, "/b.png");
    }

    #[test]
    fn test_no_links() {
        let html = r#"<html><body><p>Nothing here</p></body></html>"#;
        assert!(extract_links(html).is_empty());
    }

    #[test]
    fn test_nested_anchor_text() {
        let html = r#"<html><body><a href="/x"><span>inner</span> text</a></body></html>"#;
        let links = extract_links(html);
        assert_eq!(links[0].label.as_deref(), Some("inner text"));
    }
}
