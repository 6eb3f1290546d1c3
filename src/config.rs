//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so an empty file (or no file at all) gives a
//! working setup against the public geocoder and feed endpoints.
//!
//! ```yaml
//! feed_endpoint: https://news.google.com/news
//! relay_url: https://cors-anywhere.herokuapp.com
//! geocoder_url: https://nominatim.openstreetmap.org
//! accept_language: en
//! request_timeout_secs: 10
//! description_extractor: table_cell
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, instrument};

/// Which [`DescriptionExtractor`](crate::feed::extract::DescriptionExtractor)
/// the parser uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    /// Snippet cell of the legacy table-layout description.
    #[default]
    TableCell,
    /// All text of the embedded HTML.
    StrippedText,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Feed search endpoint, queried with `?q=<query>&output=rss`.
    pub feed_endpoint: String,
    /// Optional relay that the feed URL is appended to (`<relay>/<feed url>`).
    pub relay_url: Option<String>,
    /// Base URL of the reverse geocoder (Nominatim-compatible).
    pub geocoder_url: String,
    /// Language requested for geocoder place names.
    pub accept_language: String,
    pub user_agent: String,
    /// Per-request timeout for every outbound call.
    pub request_timeout_secs: u64,
    pub description_extractor: ExtractorKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_endpoint: "https://news.google.com/news".to_string(),
            relay_url: None,
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            accept_language: "en".to_string(),
            user_agent: concat!("geo_headlines/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout_secs: 10,
            description_extractor: ExtractorKind::default(),
        }
    }
}

impl AppConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn from_yaml(text: &str, path: &str) -> Result<Self, ConfigError> {
        // serde_yaml reads an empty document as null rather than an empty map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

/// Load configuration from `path`, or the defaults when no path is given.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(AppConfig::default());
    };
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
    let config = AppConfig::from_yaml(&text, path)?;
    info!(path, "Loaded configuration");
    Ok(config)
}
