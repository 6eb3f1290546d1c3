//! News feed retrieval and parsing.
//!
//! The feed side of a run happens in two phases:
//!
//! 1. **Fetching**: [`client::FeedSource::fetch_feed`] returns the raw RSS text
//!    for a search query
//! 2. **Parsing**: [`parser::parse_articles_with`] turns that text into at most
//!    five [`Article`](crate::models::Article)s
//!
//! # Submodules
//!
//! | Module | Role |
//! |--------|------|
//! | [`client`] | HTTP fetch via reqwest, typed [`FetchError`](crate::error::FetchError) |
//! | [`parser`] | RSS deserialization with quick-xml, entry selection, link cleanup |
//! | [`extract`] | Plain-text snippets from the HTML inside each description |

pub mod client;
pub mod extract;
pub mod parser;

pub use client::{FeedClient, FeedSource};
pub use extract::{DescriptionExtractor, extractor_for};
