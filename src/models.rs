//! Data models flowing through the extraction pipeline.
//!
//! - [`ArticleCandidate`]: a provisional article reference found by the locator
//! - [`TimestampSource`]: which signal the publish time will be recovered from
//! - [`DatedCandidate`]: a candidate whose publish time has been recovered
//! - [`ArticleRecord`]: the immutable output unit returned to callers
//!
//! Everything except [`ArticleRecord`] lives only for the duration of one
//! extraction call.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Where the publish timestamp of a candidate is going to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampSource {
    /// A machine-readable `datetime` attribute value (ISO-8601-like).
    Structured(String),
    /// A 14-digit `YYYYMMDDHHMMSS` run embedded in the link itself.
    UrlDigits,
    /// A custom attribute whose trailing segment starts with 14 digits.
    AttributeDigits(String),
}

impl TimestampSource {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            TimestampSource::Structured(_) => "structured",
            TimestampSource::UrlDigits => "url_digits",
            TimestampSource::AttributeDigits(_) => "attribute_digits",
        }
    }
}

/// A provisional article reference produced by the candidate locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleCandidate {
    /// The `href` exactly as found in the markup (trimmed).
    pub raw_link: String,
    /// Title attribute or visible anchor text.
    pub raw_title: String,
    pub timestamp_source: TimestampSource,
}

/// A candidate with its recovered publish instant, already in the publisher offset.
#[derive(Debug, Clone)]
pub struct DatedCandidate {
    pub candidate: ArticleCandidate,
    pub published_at: DateTime<FixedOffset>,
}

/// A candidate that survived the window filter and has a canonical link.
#[derive(Debug, Clone)]
pub struct CanonicalArticle {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<FixedOffset>,
}

/// One extracted article as returned to callers and serialized over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    /// Absolute `http`/`https` URL; the deduplication key.
    pub link: String,
    /// Publish time rendered with the publisher's display pattern.
    pub publish_time: String,
}
