//! Link canonicalization and first-seen deduplication.

use super::Rejection;
use crate::config::ConfigError;
use crate::models::CanonicalArticle;
use itertools::Itertools;
use url::{ParseError, Url};

/// Turns raw `href` values into absolute `http(s)` links.
#[derive(Debug, Clone)]
pub struct LinkNormalizer {
    base: Url,
}

impl LinkNormalizer {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: reason.to_string(),
        };
        let base = Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") || base.host_str().is_none() {
            return Err(invalid("expected an http(s) origin"));
        }
        Ok(Self { base })
    }

    /// Canonical form of `raw`.
    ///
    /// Links that already carry an `http(s)` scheme are kept byte-for-byte;
    /// root-relative links get the origin prepended verbatim and other
    /// relative forms are resolved against the base. Any other scheme
    /// (`javascript:`, `mailto:`) is rejected.
    pub fn canonicalize(&self, raw: &str) -> Result<String, Rejection> {
        let raw = raw.trim();
        if raw.starts_with('/') && !raw.starts_with("//") {
            return Ok(format!("{}{raw}", self.base.origin().ascii_serialization()));
        }
        match Url::parse(raw) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(raw.to_string()),
            Ok(_) => Err(Rejection::UnsupportedLink(raw.to_string())),
            Err(ParseError::RelativeUrlWithoutBase) => self
                .base
                .join(raw)
                .map(String::from)
                .map_err(|_| Rejection::UnsupportedLink(raw.to_string())),
            Err(_) => Err(Rejection::UnsupportedLink(raw.to_string())),
        }
    }
}

/// Keep the first article for every distinct link, in discovery order.
pub fn unique_links(articles: Vec<CanonicalArticle>) -> Vec<CanonicalArticle> {
    articles
        .into_iter()
        .unique_by(|article| article.link.clone())
        .collect()
}

/// Stable sort, newest first. Equal instants keep discovery order.
pub fn sort_newest_first(articles: &mut [CanonicalArticle]) {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, TimeZone};

    fn normalizer() -> LinkNormalizer {
        LinkNormalizer::new("https://dantri.com.vn").unwrap()
    }

    fn at(hour: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 7, 29, hour, 0, 0)
            .unwrap()
    }

    fn article(title: &str, link: &str, hour: u32) -> CanonicalArticle {
        CanonicalArticle {
            title: title.to_string(),
            link: link.to_string(),
            published_at: at(hour),
        }
    }

    #[test]
    fn test_relative_links_get_base_origin() {
        let n = normalizer();
        assert_eq!(
            n.canonicalize("/xa-hoi/bao-cao-20250729094728.htm").unwrap(),
            "https://dantri.com.vn/xa-hoi/bao-cao-20250729094728.htm"
        );
        assert_eq!(
            n.canonicalize("xa-hoi/a.htm").unwrap(),
            "https://dantri.com.vn/xa-hoi/a.htm"
        );
        assert_eq!(
            n.canonicalize("//tuoitre.vn/a.htm").unwrap(),
            "https://tuoitre.vn/a.htm"
        );
    }

    #[test]
    fn test_root_relative_link_is_not_percent_encoded() {
        let n = normalizer();
        assert_eq!(
            n.canonicalize("/bài-viết-20250729100000.htm").unwrap(),
            "https://dantri.com.vn/bài-viết-20250729100000.htm"
        );
        assert_eq!(
            n.canonicalize("/xa-hoi/../a.htm?x=1").unwrap(),
            "https://dantri.com.vn/xa-hoi/../a.htm?x=1"
        );
    }

    #[test]
    fn test_relative_and_absolute_forms_share_a_key() {
        let n = normalizer();
        let relative = n.canonicalize("/bài-viết-20250729100000.htm").unwrap();
        let absolute = n.canonicalize("https://dantri.com.vn/bài-viết-20250729100000.htm").unwrap();
        let unique = unique_links(vec![article("A", &relative, 10), article("B", &absolute, 10)]);
        assert_eq!(unique.len(), 1);
        assert_eq!(unique[0].title, "A");
    }

    #[test]
    fn test_absolute_links_kept_verbatim() {
        let n = normalizer();
        assert_eq!(
            n.canonicalize(" http://dantri.com.vn/a.htm?ref=home ").unwrap(),
            "http://dantri.com.vn/a.htm?ref=home"
        );
    }

    #[test]
    fn test_other_schemes_rejected() {
        let n = normalizer();
        assert!(matches!(n.canonicalize("javascript:void(0)"), Err(Rejection::UnsupportedLink(_))));
        assert!(matches!(n.canonicalize("mailto:toasoan@dantri.com.vn"), Err(Rejection::UnsupportedLink(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(LinkNormalizer::new("not a url").is_err());
        assert!(LinkNormalizer::new("ftp://dantri.com.vn").is_err());
    }

    #[test]
    fn test_first_seen_title_wins() {
        let unique = unique_links(vec![
            article("Đầu tiên", "https://dantri.com.vn/a.htm", 9),
            article("Khác", "https://dantri.com.vn/b.htm", 10),
            article("Lặp lại", "https://dantri.com.vn/a.htm", 10),
        ]);
        let titles: Vec<_> = unique.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Đầu tiên", "Khác"]);
    }

    #[test]
    fn test_query_variants_stay_distinct() {
        let unique = unique_links(vec![
            article("A", "https://dantri.com.vn/a.htm?x=1", 9),
            article("A", "https://dantri.com.vn/a.htm?x=2", 9),
        ]);
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn test_sort_newest_first_is_stable() {
        let mut articles = vec![
            article("old", "https://x.vn/1.htm", 8),
            article("tie-1", "https://x.vn/2.htm", 10),
            article("new", "https://x.vn/3.htm", 11),
            article("tie-2", "https://x.vn/4.htm", 10),
        ];
        sort_newest_first(&mut articles);
        let titles: Vec<_> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["new", "tie-1", "tie-2", "old"]);
    }
}
