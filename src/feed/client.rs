//! Feed retrieval over HTTP.
//!
//! [`FeedSource`] is the seam the pipeline depends on; [`FeedClient`] is the
//! reqwest implementation used at runtime. A request is sent exactly once:
//! deciding what to try next is the pipeline's job, at the query level.

use crate::config::AppConfig;
use crate::error::FetchError;
use crate::models::SearchQuery;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Something that can return the raw feed text for a query.
pub trait FeedSource {
    /// Fetch the feed body for `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] on transport failure or non-success status.
    async fn fetch_feed(&self, query: &SearchQuery) -> Result<String, FetchError>;
}

/// HTTP client for the feed endpoint, optionally routed through a relay.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    endpoint: String,
    relay: Option<String>,
}

impl FeedClient {
    /// Build a client from the feed settings of `config`.
    ///
    /// # Errors
    ///
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/rss+xml, application/xml;q=0.9, */*;q=0.8"),
        );
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.feed_endpoint.clone(),
            relay: config.relay_url.clone(),
        })
    }

    /// Full request URL for `query`: `[<relay>/]<endpoint>?q=<query>&output=rss`.
    ///
    /// The query is already URL-safe, so it is inserted as is; encoding it
    /// would turn the `+` separators into literal plus signs.
    pub fn feed_url(&self, query: &SearchQuery) -> Result<Url, FetchError> {
        let feed = format!("{}?q={}&output=rss", self.endpoint, query);
        let full = match &self.relay {
            Some(relay) => format!("{}/{}", relay.trim_end_matches('/'), feed),
            None => feed,
        };
        Url::parse(&full).map_err(|source| FetchError::InvalidUrl { url: full, source })
    }
}

impl FeedSource for FeedClient {
    #[instrument(level = "info", skip_all, fields(%query))]
    async fn fetch_feed(&self, query: &SearchQuery) -> Result<String, FetchError> {
        let url = self.feed_url(query)?;
        let t0 = Instant::now();
        debug!(%url, "Requesting feed");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Feed request rejected");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url.as_str(), e))?;
        info!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched feed"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::parser::tests::sample_feed;
    use std::time::Duration;
    use wiremock::matchers::{headers, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(endpoint: String) -> AppConfig {
        AppConfig {
            feed_endpoint: endpoint,
            request_timeout_secs: 2,
            ..AppConfig::default()
        }
    }

    fn query(s: &str) -> SearchQuery {
        SearchQuery::from_slugs(s.split('+'))
    }

    #[test]
    fn test_feed_url_direct() {
        let client = FeedClient::new(&config_for("https://news.example.com/news".into())).unwrap();
        let url = client.feed_url(&query("leeds+west-yorkshire")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://news.example.com/news?q=leeds+west-yorkshire&output=rss"
        );
    }

    #[test]
    fn test_feed_url_through_relay() {
        let mut config = config_for("https://news.example.com/news".into());
        config.relay_url = Some("https://relay.example.com/".into());
        let client = FeedClient::new(&config).unwrap();
        let url = client.feed_url(&query("china")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://relay.example.com/https://news.example.com/news?q=china&output=rss"
        );
    }

    #[test]
    fn test_feed_url_invalid_endpoint() {
        let client = FeedClient::new(&config_for("not a url".into())).unwrap();
        let err = client.feed_url(&query("leeds")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_feed_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("q", "leeds west-yorkshire"))
            .and(query_param("output", "rss"))
            .and(headers(
                "accept",
                vec!["application/rss+xml", "application/xml;q=0.9", "*/*;q=0.8"],
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(sample_feed(2)))
            .expect(1)
            .mount(&server)
            .await;

        let client = FeedClient::new(&config_for(format!("{}/news", server.uri()))).unwrap();
        let body = client.fetch_feed(&query("leeds+west-yorkshire")).await.unwrap();
        assert!(body.contains("Story 2"));
    }

    #[tokio::test]
    async fn test_fetch_feed_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = FeedClient::new(&config_for(format!("{}/news", server.uri()))).unwrap();
        let err = client.fetch_feed(&query("leeds")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_feed_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = FeedClient::new(&config_for(format!("{}/news", server.uri()))).unwrap();
        let err = client.fetch_feed(&query("leeds")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_fetch_feed_connection_refused() {
        let client = FeedClient::new(&config_for("http://127.0.0.1:1/news".into())).unwrap();
        let err = client.fetch_feed(&query("leeds")).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Transport { .. } | FetchError::Timeout { .. }
        ));
    }
}
