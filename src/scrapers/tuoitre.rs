//! Tuổi Trẻ (`tuoitre.vn`) profile.
//!
//! Article links carry the class `box-category-link-title` and end with a
//! 17-digit id whose first 14 digits are the local publish time:
//! `/tin-nong-20250729094728123.htm`. Results are sorted newest first and
//! render as `DD/MM/YYYY HH:MM:SS`.

use crate::config::{DisplayFormat, PublisherConfig, StrategyConfig, StrategyMode};

pub const BASE_URL: &str = "https://tuoitre.vn";

pub fn default_config() -> PublisherConfig {
    PublisherConfig {
        base_url: BASE_URL.to_string(),
        utc_offset_hours: 7,
        window_minutes: 120,
        display_format: DisplayFormat::DayMonthYear,
        sort_newest_first: true,
        strategy_mode: StrategyMode::FirstMatch,
        article_suffix: ".htm".to_string(),
        datetime_selector: "time[datetime]".to_string(),
        stamp_attribute: None,
        strategies: vec![
            StrategyConfig::LinkClass {
                class: "box-category-link-title".to_string(),
            },
            StrategyConfig::HeadingAnchor {
                levels: vec!["h3".to_string(), "h2".to_string()],
                attribute: "data-id".to_string(),
            },
            StrategyConfig::AllAnchors,
        ],
    }
}
