//! Reverse geocoding of map coordinates into an [`AddressRecord`].
//!
//! Talks to a Nominatim-compatible `/reverse` endpoint. Only the `address`
//! object of the response matters; a response without one (open sea, poles)
//! yields an empty record rather than an error.

use crate::config::AppConfig;
use crate::error::GeocodeError;
use crate::models::{AddressRecord, Coordinates};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<AddressRecord>,
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Client,
    base_url: String,
    accept_language: String,
}

impl ReverseGeocoder {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.geocoder_url.clone(),
            accept_language: config.accept_language.clone(),
        })
    }

    /// Lookup URL for a point, with its longitude wrapped into range.
    pub fn reverse_url(&self, at: Coordinates) -> Result<Url, GeocodeError> {
        let at = at.wrapped();
        let mut url = Url::parse(&format!("{}/reverse", self.base_url.trim_end_matches('/')))?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &at.lat.to_string())
            .append_pair("lon", &at.lon.to_string())
            .append_pair("addressdetails", "1")
            .append_pair("accept-language", &self.accept_language);
        Ok(url)
    }

    /// Look up the address at `at`.
    ///
    /// # Errors
    ///
    /// Returns a [`GeocodeError`] on transport failure, non-success status or
    /// a body that is not JSON.
    #[instrument(level = "info", skip_all, fields(%at))]
    pub async fn reverse(&self, at: Coordinates) -> Result<AddressRecord, GeocodeError> {
        let url = self.reverse_url(at)?;
        debug!(%url, "Reverse geocoding");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Geocoder rejected request");
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: ReverseResponse = response.json().await?;
        let address = body.address.unwrap_or_default();
        if address.is_empty() {
            warn!("Geocoder returned no address data");
        } else {
            info!(?address, "Reverse geocoded");
        }
        Ok(address)
    }
}
