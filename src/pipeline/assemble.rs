//! Result assembler: canonical articles to output records.

use crate::config::DisplayFormat;
use crate::models::{ArticleRecord, CanonicalArticle};

pub fn assemble(articles: Vec<CanonicalArticle>, format: DisplayFormat) -> Vec<ArticleRecord> {
    let pattern = format.pattern();
    articles
        .into_iter()
        .map(|article| ArticleRecord {
            publish_time: article.published_at.format(pattern).to_string(),
            title: article.title,
            link: article.link,
        })
        .collect()
}
