//! Process-wide configuration for the publisher pipelines.
//!
//! Configuration is read once at startup and is read-only afterwards. Every
//! key is optional: anything missing from the YAML file falls back to the
//! built-in profile of the corresponding publisher (see
//! [`crate::scrapers::dantri`] and [`crate::scrapers::tuoitre`]).
//!
//! # Example
//!
//! ```yaml
//! max_html_bytes: 2097152
//! dantri:
//!   window_minutes: 90
//!   display_format: day_month_year
//! tuoitre:
//!   sort_newest_first: false
//!   strategies:
//!     - kind: link_class
//!       class: box-category-link-title
//!     - kind: all_anchors
//! ```

use crate::scrapers::Publisher;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument};

/// Default upper bound on accepted HTML input (5 MiB).
pub const DEFAULT_MAX_HTML_BYTES: usize = 5 * 1024 * 1024;

/// Longest accepted recency window (30 days).
pub const MAX_WINDOW_MINUTES: i64 = 30 * 24 * 60;

/// Errors raised while loading or compiling configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid CSS selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("invalid base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("UTC offset of {0} hours is out of range")]
    InvalidOffset(i32),

    #[error("recency window must be between 1 and {MAX_WINDOW_MINUTES} minutes, got {0}")]
    InvalidWindow(i64),

    #[error("`{0}` is not a heading element (expected h1..h6)")]
    InvalidHeadingLevel(String),

    #[error("publisher {0} has no locator strategies configured")]
    NoStrategies(Publisher),

    #[error("invalid article suffix pattern: {0}")]
    InvalidSuffix(#[from] regex::Error),
}

/// How publish times are rendered in [`crate::models::ArticleRecord::publish_time`].
///
/// Exactly one pattern is used per publisher; the patterns are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayFormat {
    /// `29/07/2025, 09:47:28`
    DayMonthYearComma,
    /// `09:47:28 29/07/2025`
    TimeDayMonthYear,
    /// `29/07/2025 09:47:28`
    DayMonthYear,
}

impl DisplayFormat {
    /// The `chrono` strftime pattern for this format.
    pub fn pattern(self) -> &'static str {
        match self {
            DisplayFormat::DayMonthYearComma => "%d/%m/%Y, %H:%M:%S",
            DisplayFormat::TimeDayMonthYear => "%H:%M:%S %d/%m/%Y",
            DisplayFormat::DayMonthYear => "%d/%m/%Y %H:%M:%S",
        }
    }
}

/// Whether locator strategies stop at the first productive one or are all merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    #[default]
    FirstMatch,
    Merge,
}

/// One way of finding article references in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    /// Container blocks (`container` selector), then the title element and its anchor.
    StructuralBlock { container: String, title: String },
    /// Headings of the given levels that carry `attribute`, then the anchor inside.
    HeadingAnchor { levels: Vec<String>, attribute: String },
    /// Anchors carrying `class` directly.
    LinkClass { class: String },
    /// Every anchor whose path ends with the article suffix.
    AllAnchors,
}

/// Settings for a single publisher pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// Origin prepended to relative links, e.g. `https://dantri.com.vn`.
    pub base_url: String,
    /// Fixed local offset assumed for naive timestamps.
    pub utc_offset_hours: i32,
    /// Length of the trailing recency window.
    pub window_minutes: i64,
    pub display_format: DisplayFormat,
    /// Sort by publish time, newest first, after deduplication.
    pub sort_newest_first: bool,
    pub strategy_mode: StrategyMode,
    /// File-extension-like suffix that terminates article links (`.htm`).
    pub article_suffix: String,
    /// Selector for a machine-readable datetime element inside a candidate.
    pub datetime_selector: String,
    /// Ad-hoc attribute carrying a digit timestamp on the candidate's scope element.
    pub stamp_attribute: Option<String>,
    pub strategies: Vec<StrategyConfig>,
}

/// Partial [`PublisherConfig`] as it appears in YAML.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PublisherOverrides {
    base_url: Option<String>,
    utc_offset_hours: Option<i32>,
    window_minutes: Option<i64>,
    display_format: Option<DisplayFormat>,
    sort_newest_first: Option<bool>,
    strategy_mode: Option<StrategyMode>,
    article_suffix: Option<String>,
    datetime_selector: Option<String>,
    stamp_attribute: Option<String>,
    strategies: Option<Vec<StrategyConfig>>,
}

impl PublisherOverrides {
    fn apply(self, mut base: PublisherConfig) -> PublisherConfig {
        if let Some(v) = self.base_url {
            base.base_url = v;
        }
        if let Some(v) = self.utc_offset_hours {
            base.utc_offset_hours = v;
        }
        if let Some(v) = self.window_minutes {
            base.window_minutes = v;
        }
        if let Some(v) = self.display_format {
            base.display_format = v;
        }
        if let Some(v) = self.sort_newest_first {
            base.sort_newest_first = v;
        }
        if let Some(v) = self.strategy_mode {
            base.strategy_mode = v;
        }
        if let Some(v) = self.article_suffix {
            base.article_suffix = v;
        }
        if let Some(v) = self.datetime_selector {
            base.datetime_selector = v;
        }
        // An empty string switches the ad-hoc attribute off.
        if let Some(v) = self.stamp_attribute {
            base.stamp_attribute = Some(v).filter(|s| !s.trim().is_empty());
        }
        if let Some(v) = self.strategies {
            base.strategies = v;
        }
        base
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    max_html_bytes: Option<usize>,
    dantri: Option<PublisherOverrides>,
    tuoitre: Option<PublisherOverrides>,
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppConfig {
    /// Inputs larger than this are rejected at the HTTP/CLI boundary.
    pub max_html_bytes: usize,
    pub dantri: PublisherConfig,
    pub tuoitre: PublisherConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_html_bytes: DEFAULT_MAX_HTML_BYTES,
            dantri: Publisher::Dantri.default_config(),
            tuoitre: Publisher::Tuoitre.default_config(),
        }
    }
}

impl AppConfig {
    /// Parse a YAML document, filling every missing key from the built-in defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        let defaults = Self::default();
        Ok(Self {
            max_html_bytes: raw.max_html_bytes.unwrap_or(defaults.max_html_bytes),
            dantri: raw.dantri.unwrap_or_default().apply(defaults.dantri),
            tuoitre: raw.tuoitre.unwrap_or_default().apply(defaults.tuoitre),
        })
    }

    /// The settings of one publisher.
    pub fn publisher(&self, publisher: Publisher) -> &PublisherConfig {
        match publisher {
            Publisher::Dantri => &self.dantri,
            Publisher::Tuoitre => &self.tuoitre,
        }
    }
}

/// Load configuration from `path`, or the built-in defaults when no path is given.
#[instrument(level = "info")]
pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        info!("No config file given; using built-in publisher profiles");
        return Ok(AppConfig::default());
    };

    let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    let config = AppConfig::from_yaml_str(&yaml)?;
    info!(path, max_html_bytes = config.max_html_bytes, "Loaded configuration");
    Ok(config)
}
