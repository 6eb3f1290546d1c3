//! Command-line interface definitions.
//!
//! A run is started either from map coordinates (reverse geocoded first) or
//! from an address record saved as JSON.

use crate::models::Coordinates;
use clap::{Parser, ValueEnum};

/// How results are printed to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Command-line arguments for geo_headlines.
///
/// # Examples
///
/// ```sh
/// # Headlines for a point near Leeds
/// geo_headlines --at 53.8,-1.55
///
/// # Several points at once, as JSON
/// geo_headlines --at 53.8,-1.55 --at 39.9,116.4 --format json
///
/// # Skip geocoding and use a saved address
/// geo_headlines --address-file address.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Map point as `lat,lon`; may be repeated
    #[arg(long = "at", value_name = "LAT,LON", value_parser = parse_coordinates,
          required_unless_present = "address_file")]
    pub points: Vec<Coordinates>,

    /// JSON file holding an address record (the geocoder's `address` object)
    #[arg(short, long, conflicts_with = "points")]
    pub address_file: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format for stdout
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// Also write a JSON report per run into this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Maximum number of points processed at the same time
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub concurrency: u16,
}

/// Parse `lat,lon` into [`Coordinates`].
pub fn parse_coordinates(s: &str) -> Result<Coordinates, String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON, got {s:?}"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude {lat:?}: {e}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude {lon:?}: {e}"))?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} is outside [-90, 90]"));
    }
    if !lon.is_finite() {
        return Err(format!("longitude {lon} is not finite"));
    }
    Ok(Coordinates { lat, lon })
}
