//! Data models shared by the resolver, the feed parser and the pipeline.
//!
//! - [`AddressRecord`]: locality fields returned by the reverse geocoder
//! - [`LocalityResolution`]: the place names picked from an address
//! - [`SearchQuery`]: URL-safe query string sent to the feed endpoint
//! - [`Article`]: one headline extracted from the feed
//! - [`PipelineResult`]: what a single run hands to the output sinks
//!
//! Everything here is created per run and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locality fields of a reverse-geocoded address.
///
/// Every key is optional; the geocoder returns whatever subset applies to the
/// clicked point. Keys this program does not use (road, postcode, ...) are
/// ignored on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddressRecord {
    pub suburb: Option<String>,
    pub city_district: Option<String>,
    pub town: Option<String>,
    pub city: Option<String>,
    pub county: Option<String>,
    pub state_district: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

impl AddressRecord {
    /// True when no field carries a non-blank value.
    pub fn is_empty(&self) -> bool {
        [
            &self.suburb,
            &self.city_district,
            &self.town,
            &self.city,
            &self.county,
            &self.state_district,
            &self.state,
            &self.country,
        ]
        .iter()
        .all(|f| f.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

/// Place names chosen from an [`AddressRecord`].
///
/// `local`, `regional` and `national` are display labels as well as query
/// inputs. `state` only feeds the fallback query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalityResolution {
    pub local: String,
    pub regional: String,
    pub national: String,
    pub state: String,
}

/// A feed search term: slugs joined with `+`.
///
/// Only [`crate::resolver`] builds these, so the contents are always
/// `[a-z0-9+-]*`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SearchQuery(String);

impl SearchQuery {
    pub(crate) fn from_slugs<'a>(slugs: impl IntoIterator<Item = &'a str>) -> Self {
        use itertools::Itertools;
        SearchQuery(slugs.into_iter().filter(|s| !s.is_empty()).join("+"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One headline taken from the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    pub title: String,
    /// Plain text pulled out of the HTML embedded in the feed entry.
    pub description: String,
    /// Destination URL with the aggregator redirect prefix removed.
    pub link: String,
    /// Always empty: there is no image source yet.
    pub image: String,
}

/// How a pipeline run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// The local + regional query produced articles.
    Primary,
    /// The primary query was empty-handed and the state + country query
    /// produced articles.
    Fallback,
    /// Neither query produced articles.
    Empty,
    /// A feed request failed; no articles are reported.
    FetchFailed { query: String, reason: String },
}

/// Result of one pipeline run, ready for display.
///
/// The labels always come from the original resolution, whichever query
/// produced the articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResult {
    pub articles: Vec<Article>,
    pub local: String,
    pub regional: String,
    pub national: String,
    pub outcome: Outcome,
    /// Queries attempted, in order.
    pub queries: Vec<SearchQuery>,
}

/// A clicked map position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Wrap the longitude into `[-180, 180]`, leaving `180` itself alone.
    pub fn wrapped(self) -> Self {
        let (min, max) = (-180.0_f64, 180.0_f64);
        let d = max - min;
        let lon = if self.lon == max {
            self.lon
        } else {
            ((self.lon - min) % d + d) % d + min
        };
        Coordinates { lat: self.lat, lon }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}
