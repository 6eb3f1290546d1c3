//! Locality resolution and search-query construction.
//!
//! An [`AddressRecord`] is reduced to the most specific place names it
//! carries, using a fixed hierarchy:
//!
//! | Label | Candidates, most specific first |
//! |-------|---------------------------------|
//! | `local` | suburb, city_district, town, city |
//! | `regional` | county, state_district, state |
//! | `national` | country (with alias correction) |
//!
//! The primary query pairs the local and regional names; the fallback query
//! pairs the state with the country.

use crate::models::{AddressRecord, LocalityResolution, SearchQuery};
use crate::utils::slugify;
use tracing::{debug, instrument};

/// Country values the geocoder returns that make poor search terms.
const COUNTRY_ALIASES: &[(&str, &str)] = &[("PRC", "China")];

/// First candidate that holds a non-blank value, in the given order.
fn first_present(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|v| !v.is_empty())
        .unwrap_or_default()
        .to_string()
}

fn national_name(country: &Option<String>) -> String {
    let country = first_present(&[country]);
    COUNTRY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == country)
        .map(|(_, name)| name.to_string())
        .unwrap_or(country)
}

/// Pick the local, regional and national names for an address.
///
/// An address without any usable field resolves to all-empty names.
#[instrument(level = "debug", skip_all)]
pub fn resolve(address: &AddressRecord) -> LocalityResolution {
    let resolution = LocalityResolution {
        local: first_present(&[
            &address.suburb,
            &address.city_district,
            &address.town,
            &address.city,
        ]),
        regional: first_present(&[&address.county, &address.state_district, &address.state]),
        national: national_name(&address.country),
        state: first_present(&[&address.state]),
    };
    debug!(?resolution, "Resolved locality");
    resolution
}

/// Local + regional query, degrading to the country alone when neither
/// local nor regional names produce a slug.
pub fn build_primary_query(resolution: &LocalityResolution) -> SearchQuery {
    let local = slugify(&resolution.local);
    let regional = slugify(&resolution.regional);
    if local.is_empty() && regional.is_empty() {
        SearchQuery::from_slugs([slugify(&resolution.national).as_str()])
    } else {
        SearchQuery::from_slugs([local.as_str(), regional.as_str()])
    }
}

/// State + country query, used once when the primary query finds nothing.
pub fn build_fallback_query(resolution: &LocalityResolution) -> SearchQuery {
    let state = slugify(&resolution.state);
    let national = slugify(&resolution.national);
    SearchQuery::from_slugs([state.as_str(), national.as_str()])
}
