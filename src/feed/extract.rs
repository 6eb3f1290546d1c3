//! Plain-text extraction from the HTML embedded in feed descriptions.
//!
//! The feed's `<description>` holds an escaped HTML fragment rather than
//! text. How to get a snippet out of it depends entirely on the provider's
//! markup, so extraction sits behind [`DescriptionExtractor`] and the parser
//! never looks at the HTML itself.

use crate::config::ExtractorKind;
use crate::utils::normalize_whitespace;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

/// Turn a description's HTML into a plain-text snippet.
///
/// Implementations never fail: markup they do not recognise yields `""`.
pub trait DescriptionExtractor {
    fn extract(&self, html: &str) -> String;
}

/// Snippet path of the table-layout descriptions:
/// a `td.j` cell wrapping a `div.lh` whose fifth child is the snippet font.
static SNIPPET_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body > table > tbody > tr > td.j > font > div.lh > font:nth-child(5)")
        .unwrap()
});

/// Selects the snippet cell of the legacy table-layout description.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableCellExtractor;

impl DescriptionExtractor for TableCellExtractor {
    fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        match document.select(&SNIPPET_SELECTOR).next() {
            Some(element) => normalize_whitespace(&element.text().collect::<String>()),
            None => {
                debug!(bytes = html.len(), "Snippet cell not found in description");
                String::new()
            }
        }
    }
}

/// Uses every text node of the description, tags dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrippedTextExtractor;

impl DescriptionExtractor for StrippedTextExtractor {
    fn extract(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let text = fragment.root_element().text().collect::<Vec<_>>().join(" ");
        normalize_whitespace(&text)
    }
}

/// Build the extractor named in the configuration.
pub fn extractor_for(kind: ExtractorKind) -> Box<dyn DescriptionExtractor + Send + Sync> {
    match kind {
        ExtractorKind::TableCell => Box::new(TableCellExtractor),
        ExtractorKind::StrippedText => Box::new(StrippedTextExtractor),
    }
}
