//! Dân Trí (`dantri.com.vn`) profile.
//!
//! Article cards are rendered as
//!
//! ```html
//! <article class="article-item" data-track-content="...-20250729094728.htm">
//!   <h3 class="article-title"><a href="/xa-hoi/bao-cao-20250729094728.htm">Báo cáo mới</a></h3>
//! </article>
//! ```
//!
//! The card's `data-track-content` attribute ends with the publish time; when
//! a revision drops it, the same 14 digits are recovered from the link.
//! Results keep page order and render as `DD/MM/YYYY, HH:MM:SS`.

use crate::config::{DisplayFormat, PublisherConfig, StrategyConfig, StrategyMode};

pub const BASE_URL: &str = "https://dantri.com.vn";

pub fn default_config() -> PublisherConfig {
    PublisherConfig {
        base_url: BASE_URL.to_string(),
        utc_offset_hours: 7,
        window_minutes: 120,
        display_format: DisplayFormat::DayMonthYearComma,
        sort_newest_first: false,
        strategy_mode: StrategyMode::FirstMatch,
        article_suffix: ".htm".to_string(),
        datetime_selector: "time[datetime]".to_string(),
        stamp_attribute: Some("data-track-content".to_string()),
        strategies: vec![
            StrategyConfig::StructuralBlock {
                container: "article.article-item".to_string(),
                title: "h3.article-title".to_string(),
            },
            StrategyConfig::HeadingAnchor {
                levels: vec!["h3".to_string(), "h2".to_string()],
                attribute: "data-content-name".to_string(),
            },
            StrategyConfig::AllAnchors,
        ],
    }
}
