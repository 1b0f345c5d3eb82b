//! Publisher profiles and the compiled extractor catalog.
//!
//! Each supported portal has a module exporting `default_config()`, the
//! built-in [`PublisherConfig`] describing how its markup is located, how its
//! timestamps are encoded, and how results are ordered and displayed.
//!
//! # Supported Sources
//!
//! | Source | Module | Primary strategy | Timestamp | Order | Display |
//! |--------|--------|------------------|-----------|-------|---------|
//! | Dân Trí | [`dantri`] | `article.article-item` blocks | `data-track-content` digits | discovery | `DD/MM/YYYY, HH:MM:SS` |
//! | Tuổi Trẻ | [`tuoitre`] | `a.box-category-link-title` | 17-digit link id | newest first | `DD/MM/YYYY HH:MM:SS` |
//!
//! Both profiles fall back to a heading-scoped strategy and finally to a
//! brute-force scan of every article-looking anchor.

pub mod dantri;
pub mod tuoitre;

use crate::config::{AppConfig, ConfigError, PublisherConfig};
use crate::pipeline::Extractor;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, instrument};

/// A supported news portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Publisher {
    Dantri,
    Tuoitre,
}

impl Publisher {
    pub const ALL: [Publisher; 2] = [Publisher::Dantri, Publisher::Tuoitre];

    /// Identifier used in routes, config keys and the CLI.
    pub fn slug(self) -> &'static str {
        match self {
            Publisher::Dantri => "dantri",
            Publisher::Tuoitre => "tuoitre",
        }
    }

    /// Human-readable name of the portal.
    pub fn display_name(self) -> &'static str {
        match self {
            Publisher::Dantri => "Dân Trí",
            Publisher::Tuoitre => "Tuổi Trẻ",
        }
    }

    pub fn default_config(self) -> PublisherConfig {
        match self {
            Publisher::Dantri => dantri::default_config(),
            Publisher::Tuoitre => tuoitre::default_config(),
        }
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Publisher {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Publisher::ALL
            .into_iter()
            .find(|p| p.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown publisher `{s}`"))
    }
}

/// One compiled [`Extractor`] per publisher, shared read-only.
#[derive(Debug, Clone)]
pub struct Catalog {
    dantri: Arc<Extractor>,
    tuoitre: Arc<Extractor>,
}

impl Catalog {
    /// Compile every publisher profile in `config`.
    #[instrument(level = "info", skip_all)]
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let catalog = Self {
            dantri: Arc::new(Extractor::new(Publisher::Dantri, &config.dantri)?),
            tuoitre: Arc::new(Extractor::new(Publisher::Tuoitre, &config.tuoitre)?),
        };
        for publisher in Publisher::ALL {
            let extractor = catalog.get(publisher);
            info!(
                %publisher,
                name = publisher.display_name(),
                display_format = ?extractor.display_format(),
                strategies = config.publisher(publisher).strategies.len(),
                window_minutes = extractor.window().length().num_minutes(),
                sort_newest_first = extractor.sorts_newest_first(),
                "Compiled publisher profile"
            );
        }
        Ok(catalog)
    }

    pub fn get(&self, publisher: Publisher) -> &Arc<Extractor> {
        match publisher {
            Publisher::Dantri => &self.dantri,
            Publisher::Tuoitre => &self.tuoitre,
        }
    }
}

static BUILTIN: Lazy<Catalog> =
    Lazy::new(|| Catalog::from_config(&AppConfig::default()).expect("built-in publisher profiles compile"));

/// The catalog compiled from the built-in profiles.
pub fn builtin() -> &'static Catalog {
    &BUILTIN
}
