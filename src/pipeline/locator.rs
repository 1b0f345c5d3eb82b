//! Candidate locator.
//!
//! Publisher markup drifts between revisions, so each publisher carries an
//! ordered list of [`LocateStrategy`] variants. In [`StrategyMode::FirstMatch`]
//! the first strategy that produces at least one accepted candidate wins; in
//! [`StrategyMode::Merge`] every strategy runs and deduplication downstream
//! collapses overlaps.

use super::Rejection;
use crate::config::{ConfigError, StrategyConfig, StrategyMode};
use crate::models::{ArticleCandidate, TimestampSource};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("static selector"));

/// Attribute read from the element matched by the datetime selector.
const DATETIME_ATTRIBUTE: &str = "datetime";

/// A compiled locating strategy.
#[derive(Debug)]
pub enum LocateStrategy {
    StructuralBlock { container: Selector, title: Selector },
    HeadingAnchor { headings: Selector },
    LinkClass { anchors: Selector },
    AllAnchors,
}

impl LocateStrategy {
    /// Compile a configured strategy into selectors.
    pub fn compile(config: &StrategyConfig) -> Result<Self, ConfigError> {
        Ok(match config {
            StrategyConfig::StructuralBlock { container, title } => LocateStrategy::StructuralBlock {
                container: parse_selector(container)?,
                title: parse_selector(title)?,
            },
            StrategyConfig::HeadingAnchor { levels, attribute } => {
                if let Some(bad) = levels.iter().find(|l| !is_heading(l)) {
                    return Err(ConfigError::InvalidHeadingLevel(bad.clone()));
                }
                if levels.is_empty() {
                    return Err(ConfigError::InvalidHeadingLevel(String::new()));
                }
                let list = levels
                    .iter()
                    .map(|level| format!("{}[{}]", level.to_ascii_lowercase(), attribute))
                    .collect::<Vec<_>>()
                    .join(", ");
                LocateStrategy::HeadingAnchor { headings: parse_selector(&list)? }
            }
            StrategyConfig::LinkClass { class } => LocateStrategy::LinkClass {
                anchors: parse_selector(&format!("a.{class}"))?,
            },
            StrategyConfig::AllAnchors => LocateStrategy::AllAnchors,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            LocateStrategy::StructuralBlock { .. } => "structural_block",
            LocateStrategy::HeadingAnchor { .. } => "heading_anchor",
            LocateStrategy::LinkClass { .. } => "link_class",
            LocateStrategy::AllAnchors => "all_anchors",
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

fn is_heading(level: &str) -> bool {
    matches!(level.to_ascii_lowercase().as_str(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Per-candidate outcomes of one locate pass.
#[derive(Debug, Default)]
pub struct Located {
    /// Name of the strategy that produced the candidates (`merge` when all ran).
    pub strategy: Option<&'static str>,
    pub outcomes: Vec<Result<ArticleCandidate, Rejection>>,
}

/// Finds article candidates for one publisher.
#[derive(Debug)]
pub struct Locator {
    strategies: Vec<LocateStrategy>,
    mode: StrategyMode,
    datetime: Selector,
    stamp_attribute: Option<String>,
    article_suffix: String,
}

impl Locator {
    pub fn new(
        strategies: Vec<LocateStrategy>,
        mode: StrategyMode,
        datetime_selector: &str,
        stamp_attribute: Option<String>,
        article_suffix: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            strategies,
            mode,
            datetime: parse_selector(datetime_selector)?,
            stamp_attribute,
            article_suffix: article_suffix.to_string(),
        })
    }

    /// Run the configured strategies against `document`.
    pub fn locate(&self, document: &Html) -> Located {
        match self.mode {
            StrategyMode::Merge => Located {
                strategy: Some("merge"),
                outcomes: self
                    .strategies
                    .iter()
                    .flat_map(|strategy| self.run_strategy(strategy, document))
                    .collect(),
            },
            StrategyMode::FirstMatch => {
                let mut rejected = Vec::new();
                for strategy in &self.strategies {
                    let outcomes = self.run_strategy(strategy, document);
                    if outcomes.iter().any(Result::is_ok) {
                        debug!(strategy = strategy.name(), found = outcomes.len(), "Locator strategy matched");
                        return Located {
                            strategy: Some(strategy.name()),
                            outcomes,
                        };
                    }
                    trace!(strategy = strategy.name(), "Locator strategy found nothing usable");
                    rejected.extend(outcomes);
                }
                Located {
                    strategy: None,
                    outcomes: rejected,
                }
            }
        }
    }

    fn run_strategy(&self, strategy: &LocateStrategy, document: &Html) -> Vec<Result<ArticleCandidate, Rejection>> {
        match strategy {
            LocateStrategy::StructuralBlock { container, title } => document
                .select(container)
                .filter_map(|block| {
                    let anchor = block.select(title).next().and_then(anchor_of);
                    self.candidate(block, anchor?)
                })
                .collect(),
            LocateStrategy::HeadingAnchor { headings } => document
                .select(headings)
                .filter_map(|heading| self.candidate(heading, heading.select(&ANCHOR).next()?))
                .collect(),
            LocateStrategy::LinkClass { anchors } => document
                .select(anchors)
                .filter_map(|anchor| self.candidate(anchor, anchor))
                .collect(),
            LocateStrategy::AllAnchors => document
                .select(&ANCHOR)
                .filter(|anchor| anchor.value().attr("href").is_some_and(|href| self.has_article_suffix(href)))
                .filter_map(|anchor| self.candidate(anchor, anchor))
                .collect(),
        }
    }

    /// Build a candidate from its scope element and anchor.
    ///
    /// `None` means the anchor has no usable `href` and is dropped silently.
    fn candidate(&self, scope: ElementRef<'_>, anchor: ElementRef<'_>) -> Option<Result<ArticleCandidate, Rejection>> {
        let href = anchor.value().attr("href").map(str::trim).filter(|h| !h.is_empty())?;

        let title = title_of(anchor);
        if title.is_empty() {
            return Some(Err(Rejection::MissingTitle { link: href.to_string() }));
        }

        Some(Ok(ArticleCandidate {
            raw_link: href.to_string(),
            raw_title: title,
            timestamp_source: self.timestamp_source(scope),
        }))
    }

    /// Choose the timestamp signal present on `scope`, most reliable first.
    fn timestamp_source(&self, scope: ElementRef<'_>) -> TimestampSource {
        let structured = scope
            .select(&self.datetime)
            .find_map(|el| el.value().attr(DATETIME_ATTRIBUTE))
            .or_else(|| scope.value().attr(DATETIME_ATTRIBUTE))
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(value) = structured {
            return TimestampSource::Structured(value.to_string());
        }

        let ad_hoc = self
            .stamp_attribute
            .as_deref()
            .and_then(|name| scope.value().attr(name))
            .map(str::trim)
            .filter(|v| !v.is_empty());
        match ad_hoc {
            Some(value) => TimestampSource::AttributeDigits(value.to_string()),
            None => TimestampSource::UrlDigits,
        }
    }

    /// Whether the path part of `href` ends with the article suffix.
    fn has_article_suffix(&self, href: &str) -> bool {
        let path = href.split(['?', '#']).next().unwrap_or(href).trim_end();
        path.ends_with(self.article_suffix.as_str())
    }
}

/// The element itself when it is an anchor with an `href`, else its first such descendant.
fn anchor_of(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    if element.value().name() == "a" && element.value().attr("href").is_some() {
        Some(element)
    } else {
        element.select(&ANCHOR).next()
    }
}

/// Prefer the `title` attribute, else the visible text with whitespace collapsed.
fn title_of(anchor: ElementRef<'_>) -> String {
    if let Some(title) = anchor.value().attr("title").map(str::trim).filter(|t| !t.is_empty()) {
        return title.to_string();
    }
    anchor
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
