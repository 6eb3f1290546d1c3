//! Error types for the network and configuration layers.
//!
//! Parse and extraction failures have no variants here: a feed that cannot be
//! parsed is reported as "no articles" and a description that cannot be
//! extracted is reported as an empty string.

use thiserror::Error;

/// Failure to retrieve a feed for a [`SearchQuery`](crate::models::SearchQuery).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The feed URL could not be built from the configured endpoint.
    #[error("invalid feed url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The request did not complete within the configured timeout.
    #[error("request to {url} timed out")]
    Timeout { url: String },

    /// Connection, TLS or body-read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

/// Failure of the reverse-geocoding lookup.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("invalid geocoder url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("geocoder request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("geocoder returned status {0}")]
    Status(u16),
}

/// Failure to load the YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let e = FetchError::Status {
            url: "https://news.example.com/news?q=leeds".to_string(),
            status: 503,
        };
        assert_eq!(
            e.to_string(),
            "https://news.example.com/news?q=leeds returned status 503"
        );
    }

    #[test]
    fn test_invalid_url_keeps_source() {
        use std::error::Error as _;
        let source = url::Url::parse("not a url").unwrap_err();
        let e = FetchError::InvalidUrl {
            url: "not a url".to_string(),
            source,
        };
        assert!(e.source().is_some());
    }
}
