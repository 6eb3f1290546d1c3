//! Address-to-headlines pipeline.
//!
//! A run walks a fixed sequence of stages:
//!
//! ```text
//! Idle -> ResolvingAddress -> FetchingPrimary -> ParsedPrimary -> Done
//!                                                      |
//!                                                      v (no articles)
//!                                  FetchingFallback -> ParsedFallback -> Done
//! ```
//!
//! The fallback query is fetched at most once per run. A failed fetch at
//! either stage ends the run with no articles; the failure is recorded in the
//! [`Outcome`] for the caller to report.

use crate::feed::{DescriptionExtractor, FeedSource, extract::TableCellExtractor, parser};
use crate::models::{AddressRecord, Article, LocalityResolution, Outcome, PipelineResult, SearchQuery};
use crate::resolver::{build_fallback_query, build_primary_query, resolve};
use tracing::{debug, info, instrument};

/// Stage of a single run, with the data each stage carries forward.
#[derive(Debug)]
enum Stage {
    Idle,
    ResolvingAddress,
    FetchingPrimary(SearchQuery),
    ParsedPrimary(Vec<Article>),
    FetchingFallback(SearchQuery),
    ParsedFallback(Vec<Article>),
    Done(Outcome, Vec<Article>),
}

impl Stage {
    fn name(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::ResolvingAddress => "resolving_address",
            Stage::FetchingPrimary(_) => "fetching_primary",
            Stage::ParsedPrimary(_) => "parsed_primary",
            Stage::FetchingFallback(_) => "fetching_fallback",
            Stage::ParsedFallback(_) => "parsed_fallback",
            Stage::Done(..) => "done",
        }
    }
}

/// Resolves an address, fetches and parses its feed, and falls back once.
pub struct Pipeline<S> {
    source: S,
    extractor: Box<dyn DescriptionExtractor + Send + Sync>,
}

impl<S: FeedSource> Pipeline<S> {
    /// Pipeline using the table-cell description extractor.
    pub fn new(source: S) -> Self {
        Self {
            source,
            extractor: Box::new(TableCellExtractor),
        }
    }

    /// Swap in another way of reading article descriptions.
    pub fn with_extractor(mut self, extractor: Box<dyn DescriptionExtractor + Send + Sync>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Fetch and parse one query.
    ///
    /// An empty query is not sent anywhere; it simply finds nothing.
    async fn fetch_articles(&self, query: &SearchQuery) -> Result<Vec<Article>, Outcome> {
        if query.is_empty() {
            debug!("Empty query; skipping fetch");
            return Ok(Vec::new());
        }
        match self.source.fetch_feed(query).await {
            Ok(raw) => Ok(parser::parse_articles_with(&raw, self.extractor.as_ref())),
            Err(e) => Err(Outcome::FetchFailed {
                query: query.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Run the pipeline for one address.
    ///
    /// Never fails: every problem ends in a result with no articles. The
    /// labels in the result are those of the original resolution.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self, address: &AddressRecord) -> PipelineResult {
        let mut resolution = LocalityResolution::default();
        let mut queries = Vec::with_capacity(2);
        let mut stage = Stage::Idle;

        let (outcome, articles) = loop {
            debug!(stage = stage.name(), "Pipeline stage");
            stage = match stage {
                Stage::Idle => Stage::ResolvingAddress,
                Stage::ResolvingAddress => {
                    if address.is_empty() {
                        info!("Address carries no locality data");
                    }
                    resolution = resolve(address);
                    Stage::FetchingPrimary(build_primary_query(&resolution))
                }
                Stage::FetchingPrimary(query) => {
                    queries.push(query.clone());
                    match self.fetch_articles(&query).await {
                        Ok(articles) => Stage::ParsedPrimary(articles),
                        Err(failed) => Stage::Done(failed, Vec::new()),
                    }
                }
                Stage::ParsedPrimary(articles) if articles.is_empty() => {
                    Stage::FetchingFallback(build_fallback_query(&resolution))
                }
                Stage::ParsedPrimary(articles) => Stage::Done(Outcome::Primary, articles),
                Stage::FetchingFallback(query) => {
                    queries.push(query.clone());
                    match self.fetch_articles(&query).await {
                        Ok(articles) => Stage::ParsedFallback(articles),
                        Err(failed) => Stage::Done(failed, Vec::new()),
                    }
                }
                Stage::ParsedFallback(articles) if articles.is_empty() => {
                    Stage::Done(Outcome::Empty, articles)
                }
                Stage::ParsedFallback(articles) => Stage::Done(Outcome::Fallback, articles),
                Stage::Done(outcome, articles) => break (outcome, articles),
            };
        };

        info!(
            articles = articles.len(),
            ?outcome,
            local = %resolution.local,
            regional = %resolution.regional,
            national = %resolution.national,
            "Pipeline finished"
        );

        let LocalityResolution {
            local,
            regional,
            national,
            ..
        } = resolution;
        PipelineResult {
            articles,
            local,
            regional,
            national,
            outcome,
            queries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::feed::parser::tests::sample_feed;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses and records every query it is asked for.
    #[derive(Default)]
    struct ScriptedFeed {
        responses: Mutex<VecDeque<Result<String, FetchError>>>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedFeed {
        fn new(responses: Vec<Result<String, FetchError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl FeedSource for &ScriptedFeed {
        async fn fetch_feed(&self, query: &SearchQuery) -> Result<String, FetchError> {
            self.seen.lock().unwrap().push(query.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn leeds() -> AddressRecord {
        AddressRecord {
            city: Some("Leeds".into()),
            county: Some("West Yorkshire".into()),
            country: Some("United Kingdom".into()),
            ..Default::default()
        }
    }

    fn unavailable(query: &str) -> FetchError {
        FetchError::Status {
            url: format!("https://news.example.com/news?q={query}&output=rss"),
            status: 503,
        }
    }

    #[tokio::test]
    async fn test_primary_hit_skips_fallback() {
        let feed = ScriptedFeed::new(vec![Ok(sample_feed(6))]);
        let result = Pipeline::new(&feed).run(&leeds()).await;

        assert_eq!(feed.seen(), ["leeds+west-yorkshire"]);
        assert_eq!(result.outcome, Outcome::Primary);
        assert_eq!(result.articles.len(), 5);
        assert_eq!(result.local, "Leeds");
        assert_eq!(result.regional, "West Yorkshire");
        assert_eq!(result.national, "United Kingdom");
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back_once() {
        let feed = ScriptedFeed::new(vec![Ok(sample_feed(0)), Ok(sample_feed(2))]);
        let result = Pipeline::new(&feed).run(&leeds()).await;

        assert_eq!(feed.seen(), ["leeds+west-yorkshire", "united-kingdom"]);
        assert_eq!(result.outcome, Outcome::Fallback);
        assert_eq!(result.articles.len(), 2);
        assert_eq!(result.local, "Leeds");
        assert_eq!(result.regional, "West Yorkshire");
        assert_eq!(result.national, "United Kingdom");
        let queries: Vec<_> = result.queries.iter().map(SearchQuery::as_str).collect();
        assert_eq!(queries, ["leeds+west-yorkshire", "united-kingdom"]);
    }

    #[tokio::test]
    async fn test_empty_fallback_is_terminal() {
        let feed = ScriptedFeed::new(vec![
            Ok("garbage".to_string()),
            Ok(sample_feed(0)),
            Ok(sample_feed(5)),
        ]);
        let result = Pipeline::new(&feed).run(&leeds()).await;

        assert_eq!(feed.seen().len(), 2);
        assert_eq!(result.outcome, Outcome::Empty);
        assert!(result.articles.is_empty());
        assert_eq!(result.local, "Leeds");
    }

    #[tokio::test]
    async fn test_primary_fetch_failure_ends_run() {
        let feed = ScriptedFeed::new(vec![Err(unavailable("leeds+west-yorkshire"))]);
        let result = Pipeline::new(&feed).run(&leeds()).await;

        assert_eq!(feed.seen(), ["leeds+west-yorkshire"]);
        assert!(result.articles.is_empty());
        assert!(matches!(
            result.outcome,
            Outcome::FetchFailed { ref query, .. } if query == "leeds+west-yorkshire"
        ));
        assert_eq!(result.national, "United Kingdom");
    }

    #[tokio::test]
    async fn test_fallback_fetch_failure_ends_run() {
        let feed = ScriptedFeed::new(vec![
            Ok(sample_feed(0)),
            Err(unavailable("united-kingdom")),
        ]);
        let result = Pipeline::new(&feed).run(&leeds()).await;

        assert_eq!(feed.seen().len(), 2);
        assert!(result.articles.is_empty());
        assert!(matches!(
            result.outcome,
            Outcome::FetchFailed { ref query, ref reason }
                if query == "united-kingdom" && reason.contains("503")
        ));
    }

    #[tokio::test]
    async fn test_country_only_address() {
        let feed = ScriptedFeed::new(vec![Ok(sample_feed(3))]);
        let address = AddressRecord {
            country: Some("PRC".into()),
            ..Default::default()
        };
        let result = Pipeline::new(&feed).run(&address).await;

        assert_eq!(feed.seen(), ["china"]);
        assert_eq!(result.national, "China");
        assert_eq!(result.local, "");
        assert_eq!(result.regional, "");
        assert_eq!(result.articles.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_address_sends_nothing() {
        let feed = ScriptedFeed::new(vec![]);
        let result = Pipeline::new(&feed).run(&AddressRecord::default()).await;

        assert!(feed.seen().is_empty());
        assert_eq!(result.outcome, Outcome::Empty);
        assert!(result.articles.is_empty());
        assert_eq!(result.queries.len(), 2);
        assert!(result.queries.iter().all(SearchQuery::is_empty));
    }

    #[tokio::test]
    async fn test_state_used_in_fallback() {
        let feed = ScriptedFeed::new(vec![Ok(sample_feed(0)), Ok(sample_feed(1))]);
        let address = AddressRecord {
            town: Some("Otley".into()),
            county: Some("West Yorkshire".into()),
            state: Some("England".into()),
            country: Some("United Kingdom".into()),
            ..Default::default()
        };
        let result = Pipeline::new(&feed).run(&address).await;

        assert_eq!(feed.seen(), ["otley+west-yorkshire", "england+united-kingdom"]);
        assert_eq!(result.regional, "West Yorkshire");
        assert_eq!(result.outcome, Outcome::Fallback);
    }

    #[tokio::test]
    async fn test_extractor_is_pluggable() {
        struct Upper;
        impl DescriptionExtractor for Upper {
            fn extract(&self, _html: &str) -> String {
                "STUB".to_string()
            }
        }
        let feed = ScriptedFeed::new(vec![Ok(sample_feed(2))]);
        let result = Pipeline::new(&feed)
            .with_extractor(Box::new(Upper))
            .run(&leeds())
            .await;
        assert!(result.articles.iter().all(|a| a.description == "STUB"));
    }
}
