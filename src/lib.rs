//! # vn_headlines
//!
//! Extracts recently published articles (title, canonical link, publish
//! time) from raw HTML snapshots of Vietnamese news portals and serves the
//! extraction over HTTP for automation pipelines such as n8n.
//!
//! ## Features
//!
//! - Per-publisher pipelines for Dân Trí and Tuổi Trẻ
//! - Several locator strategies per publisher to survive markup drift
//! - Publish-time recovery from `datetime` attributes, ad-hoc attributes or
//!   digits embedded in the link, normalized to UTC+7
//! - Trailing two-hour recency window and first-seen deduplication by link
//! - An axum HTTP API accepting JSON payloads or HTML file uploads
//!
//! ## Usage
//!
//! ```ignore
//! use vn_headlines::{extract, Publisher};
//!
//! let records = extract(Publisher::Dantri, &html);
//! for record in records {
//!     println!("{} {} {}", record.publish_time, record.title, record.link);
//! }
//! ```
//!
//! ## Architecture
//!
//! Each call runs a linear, synchronous pipeline:
//! 1. **Load**: parse the HTML leniently (empty input yields nothing)
//! 2. **Locate**: find article anchors with the first productive strategy
//! 3. **Recover**: read the publish time from the signal the locator captured
//! 4. **Filter**: keep candidates inside `[now - 2h, now]`
//! 5. **Dedup**: canonicalize links and keep the first occurrence
//! 6. **Assemble**: render publish times with the publisher's display pattern

pub mod api;
pub mod cli;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod scrapers;
pub mod utils;

pub use config::{AppConfig, ConfigError, DisplayFormat};
pub use models::ArticleRecord;
pub use pipeline::{Extraction, ExtractionReport, Extractor};
pub use scrapers::{Catalog, Publisher};

/// Extract the recent articles of `publisher` from `html` using the built-in profiles.
///
/// Never fails: malformed or empty input simply yields an empty list.
pub fn extract(publisher: Publisher, html: &str) -> Vec<ArticleRecord> {
    scrapers::builtin().get(publisher).extract(html)
}
