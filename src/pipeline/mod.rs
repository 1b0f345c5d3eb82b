//! The per-publisher extraction pipeline.
//!
//! Control flow is strictly linear:
//!
//! ```text
//! load_document → Locator → TimestampRecoverer → RecencyWindow
//!               → LinkNormalizer + unique_links → assemble
//! ```
//!
//! Every stage after the locator works on `Result<_, Rejection>` per
//! candidate, so one bad block never aborts the batch. Rejections are
//! tallied in an [`ExtractionReport`] and logged; they are never returned to
//! callers as errors.

pub mod assemble;
pub mod dedup;
pub mod loader;
pub mod locator;
pub mod timestamp;
pub mod window;

use crate::config::{ConfigError, DisplayFormat, MAX_WINDOW_MINUTES, PublisherConfig};
use crate::models::{ArticleCandidate, ArticleRecord, CanonicalArticle, DatedCandidate};
use crate::scrapers::Publisher;
use crate::utils::truncate_for_log;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use dedup::LinkNormalizer;
use locator::{LocateStrategy, Locator};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use timestamp::{TimestampError, TimestampRecoverer};
use tracing::{debug, info, instrument};
use window::RecencyWindow;

/// Why a single candidate was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("candidate `{link}` has no title")]
    MissingTitle { link: String },

    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    #[error("published at {published_at} which is outside the recency window")]
    OutOfWindow { published_at: DateTime<FixedOffset> },

    #[error("unsupported link `{0}`")]
    UnsupportedLink(String),
}

impl Rejection {
    /// Stable label used as the report key and log field.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MissingTitle { .. } => "missing_title",
            Rejection::Timestamp(TimestampError::InvalidCalendar(_)) => "invalid_timestamp",
            Rejection::Timestamp(_) => "no_timestamp",
            Rejection::OutOfWindow { .. } => "out_of_window",
            Rejection::UnsupportedLink(_) => "unsupported_link",
        }
    }
}

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionReport {
    /// Strategy that produced the candidates, if any did.
    pub strategy: Option<&'static str>,
    pub located: usize,
    pub rejected: BTreeMap<&'static str, usize>,
    pub duplicates: usize,
    pub kept: usize,
}

/// Records plus the report of how they were obtained.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<ArticleRecord>,
    pub report: ExtractionReport,
}

/// A compiled, read-only pipeline for one publisher.
#[derive(Debug)]
pub struct Extractor {
    publisher: Publisher,
    locator: Locator,
    recoverer: TimestampRecoverer,
    window: RecencyWindow,
    normalizer: LinkNormalizer,
    display_format: DisplayFormat,
    sort_newest_first: bool,
}

impl Extractor {
    /// Compile `config` into an extractor. Fails on invalid selectors, URLs or offsets.
    pub fn new(publisher: Publisher, config: &PublisherConfig) -> Result<Self, ConfigError> {
        let offset = FixedOffset::east_opt(config.utc_offset_hours.saturating_mul(3600))
            .ok_or(ConfigError::InvalidOffset(config.utc_offset_hours))?;
        let window = Some(config.window_minutes)
            .filter(|m| (1..=MAX_WINDOW_MINUTES).contains(m))
            .and_then(Duration::try_minutes)
            .ok_or(ConfigError::InvalidWindow(config.window_minutes))?;
        if config.strategies.is_empty() {
            return Err(ConfigError::NoStrategies(publisher));
        }

        let strategies = config
            .strategies
            .iter()
            .map(LocateStrategy::compile)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            publisher,
            locator: Locator::new(
                strategies,
                config.strategy_mode,
                &config.datetime_selector,
                config.stamp_attribute.clone(),
                &config.article_suffix,
            )?,
            recoverer: TimestampRecoverer::new(offset, &config.article_suffix)?,
            window: RecencyWindow::new(window),
            normalizer: LinkNormalizer::new(&config.base_url)?,
            display_format: config.display_format,
            sort_newest_first: config.sort_newest_first,
        })
    }

    pub fn publisher(&self) -> Publisher {
        self.publisher
    }

    pub fn offset(&self) -> FixedOffset {
        self.recoverer.offset()
    }

    pub fn window(&self) -> RecencyWindow {
        self.window
    }

    pub fn display_format(&self) -> DisplayFormat {
        self.display_format
    }

    pub fn sorts_newest_first(&self) -> bool {
        self.sort_newest_first
    }

    /// The current instant in the publisher offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset())
    }

    /// Extract records published within the window ending now.
    pub fn extract(&self, html: &str) -> Vec<ArticleRecord> {
        self.run(html, self.now()).records
    }

    /// Extract records published within the window ending at `now`.
    pub fn extract_at(&self, html: &str, now: DateTime<FixedOffset>) -> Vec<ArticleRecord> {
        self.run(html, now).records
    }

    /// Run the whole pipeline once. `now` is used for every candidate of this call.
    #[instrument(level = "debug", skip_all, fields(publisher = %self.publisher, bytes = html.len()))]
    pub fn run(&self, html: &str, now: DateTime<FixedOffset>) -> Extraction {
        let now = now.with_timezone(&self.offset());
        let Some(document) = loader::load_document(html) else {
            return Extraction::default();
        };

        let located = self.locator.locate(&document);
        let mut report = ExtractionReport {
            strategy: located.strategy,
            located: located.outcomes.len(),
            ..ExtractionReport::default()
        };

        let mut surviving = Vec::with_capacity(located.outcomes.len());
        for outcome in located.outcomes {
            let source = outcome.as_ref().map_or("none", |c| c.timestamp_source.kind());
            match outcome.and_then(|candidate| self.resolve(candidate, now)) {
                Ok(article) => surviving.push(article),
                Err(rejection) => {
                    debug!(
                        reason = rejection.reason(),
                        source,
                        detail = %truncate_for_log(&rejection.to_string(), 200),
                        "Candidate rejected"
                    );
                    *report.rejected.entry(rejection.reason()).or_default() += 1;
                }
            }
        }

        let before_dedup = surviving.len();
        let mut unique = dedup::unique_links(surviving);
        report.duplicates = before_dedup - unique.len();
        if self.sort_newest_first {
            dedup::sort_newest_first(&mut unique);
        }

        let records = assemble::assemble(unique, self.display_format);
        report.kept = records.len();

        info!(
            publisher = %self.publisher,
            strategy = report.strategy.unwrap_or("none"),
            located = report.located,
            rejected = report.rejected.values().sum::<usize>(),
            duplicates = report.duplicates,
            kept = report.kept,
            "Extraction finished"
        );
        Extraction { records, report }
    }

    /// Recover, window-check and canonicalize one candidate.
    fn resolve(&self, candidate: ArticleCandidate, now: DateTime<FixedOffset>) -> Result<CanonicalArticle, Rejection> {
        let published_at = self.recoverer.recover(&candidate)?;
        let dated = self.window.check(now, DatedCandidate { candidate, published_at })?;
        let link = self.normalizer.canonicalize(&dated.candidate.raw_link)?;
        Ok(CanonicalArticle {
            title: dated.candidate.raw_title,
            link,
            published_at: dated.published_at,
        })
    }
}
