//! Document loader: raw HTML string to a queryable tree.

use scraper::Html;
use tracing::{debug, instrument};

/// Parse `html` into a document tree.
///
/// Returns `None` for empty or whitespace-only input. The underlying
/// html5ever parser recovers from any malformed markup, so non-empty input
/// always yields a tree.
#[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
pub fn load_document(html: &str) -> Option<Html> {
    if html.trim().is_empty() {
        debug!("Empty document; nothing to extract");
        return None;
    }

    Some(Html::parse_document(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    #[test]
    fn test_empty_input_has_no_document() {
        assert!(load_document("").is_none());
        assert!(load_document("   \n\t ").is_none());
    }

    #[test]
    fn test_malformed_markup_is_recovered() {
        let document = load_document("<div><a href='/x-20250729094728.htm'>Tin <b>mới</a><p>unclosed").unwrap();
        let anchors = Selector::parse("a").unwrap();
        assert_eq!(document.select(&anchors).count(), 1);
    }

    #[test]
    fn test_plain_text_parses_to_empty_tree() {
        let document = load_document("not html at all").unwrap();
        let anchors = Selector::parse("a").unwrap();
        assert_eq!(document.select(&anchors).count(), 0);
    }
}
