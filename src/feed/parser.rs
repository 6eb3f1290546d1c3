//! RSS feed parsing into [`Article`]s.
//!
//! The feed is a plain RSS 2.0 document. Its first `<item>` is a notice
//! from the provider rather than a story, so it is always skipped, and at
//! most [`MAX_ARTICLES`] stories are kept after it.
//!
//! A feed that does not parse is not an error here: it yields no articles,
//! which is what drives the pipeline to its fallback query.

use super::extract::DescriptionExtractor;
use crate::models::Article;
use crate::utils::truncate_for_log;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

/// Upper bound on articles taken from one feed.
pub const MAX_ARTICLES: usize = 5;

/// Separator between the aggregator's redirect URL and the story URL.
const REDIRECT_MARKER: &str = "&url=";

#[derive(Debug, Deserialize)]
struct RssDocument {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RawEntry>,
}

/// One `<item>` as it appears on the wire.
#[derive(Debug, Default, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
}

/// Parse the `<item>` list of an RSS document.
///
/// Returns an empty list when the document is not RSS.
pub fn parse_entries(raw: &str) -> Vec<RawEntry> {
    match quick_xml::de::from_str::<RssDocument>(raw) {
        Ok(doc) => doc.channel.items,
        Err(e) => {
            warn!(
                error = %e,
                body_preview = %truncate_for_log(raw, 200),
                "Feed did not parse as RSS; treating as empty"
            );
            Vec::new()
        }
    }
}

/// Story URL behind the aggregator redirect, or the link unchanged when it
/// carries no redirect.
pub fn strip_redirect(link: &str) -> &str {
    match link.split_once(REDIRECT_MARKER) {
        Some((_, target)) => target,
        None => link,
    }
}

/// Parse a feed into at most [`MAX_ARTICLES`] articles, skipping entry 0.
#[instrument(level = "debug", skip_all, fields(bytes = raw.len()))]
pub fn parse_articles_with(raw: &str, extractor: &dyn DescriptionExtractor) -> Vec<Article> {
    let entries = parse_entries(raw);
    if entries.len() < 2 {
        debug!(entries = entries.len(), "Feed has no stories");
        return Vec::new();
    }

    let count = MAX_ARTICLES.min(entries.len() - 1);
    let articles: Vec<Article> = entries[1..=count]
        .iter()
        .map(|entry| Article {
            title: entry.title.clone(),
            description: extractor.extract(&entry.description),
            link: strip_redirect(&entry.link).to_string(),
            image: String::new(),
        })
        .collect();

    debug!(
        entries = entries.len(),
        articles = articles.len(),
        "Parsed feed"
    );
    articles
}
