//! # geo_headlines
//!
//! Local news headlines for a point on the map.
//!
//! ## Usage
//!
//! ```sh
//! geo_headlines --at 53.8,-1.55
//! ```
//!
//! ## Architecture
//!
//! Each point goes through the same pipeline:
//! 1. **Geocoding**: the point is reverse geocoded into an address record
//! 2. **Resolution**: the most specific local, regional and national names
//!    are picked and turned into a search query
//! 3. **Fetching**: the feed for that query is downloaded
//! 4. **Parsing**: up to five articles are extracted; if there are none, a
//!    broader state + country query is tried once
//! 5. **Output**: the result is printed as Markdown or JSON, and optionally
//!    written as a JSON report
//!
//! Several points are processed concurrently; each run is independent.

use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod feed;
mod geocode;
mod models;
mod outputs;
mod pipeline;
mod resolver;
mod utils;

use cli::{Cli, OutputFormat};
use config::AppConfig;
use feed::{FeedClient, extractor_for};
use geocode::ReverseGeocoder;
use models::{AddressRecord, Coordinates, Outcome, PipelineResult};
use outputs::{json, markdown};
use pipeline::Pipeline;
use utils::ensure_writable_dir;

/// Everything a run needs, built once at startup and shared by all runs.
struct App {
    pipeline: Pipeline<FeedClient>,
    geocoder: ReverseGeocoder,
    format: OutputFormat,
    json_output_dir: Option<String>,
}

impl App {
    fn new(config: &AppConfig, args: &Cli) -> Result<Self, Box<dyn Error>> {
        let feed = FeedClient::new(config)?;
        let pipeline =
            Pipeline::new(feed).with_extractor(extractor_for(config.description_extractor));
        Ok(Self {
            pipeline,
            geocoder: ReverseGeocoder::new(config)?,
            format: args.format,
            json_output_dir: args.json_output_dir.clone(),
        })
    }

    /// Run the pipeline for one address and emit its output.
    async fn report(&self, at: Option<Coordinates>, address: &AddressRecord) -> PipelineResult {
        let result = self.pipeline.run(address).await;
        if let Outcome::FetchFailed { query, reason } = &result.outcome {
            error!(%query, %reason, "Feed fetch failed; showing no articles");
        }

        let report = json::Report::new(at, &result);
        match self.format {
            OutputFormat::Markdown => println!("{}", markdown::result_to_markdown(&result)),
            OutputFormat::Json => match json::to_json(&report) {
                Ok(text) => println!("{text}"),
                Err(e) => error!(error = %e, "Failed to serialize result"),
            },
        }

        if let Some(dir) = &self.json_output_dir {
            if let Err(e) = json::write_report(&report, dir).await {
                error!(error = %e, "Failed to write JSON report");
            }
        }
        result
    }

    /// Geocode a point, then report on it.
    #[instrument(level = "info", skip(self))]
    async fn report_point(&self, at: Coordinates) -> Option<PipelineResult> {
        match self.geocoder.reverse(at).await {
            Ok(address) => Some(self.report(Some(at), &address).await),
            Err(e) => {
                error!(error = %e, "Reverse geocoding failed; skipping point");
                None
            }
        }
    }
}

async fn read_address_file(path: &str) -> Result<AddressRecord, Box<dyn Error>> {
    let text = tokio::fs::read_to_string(path).await?;
    let address: AddressRecord = serde_json::from_str(&text)?;
    debug!(?address, "Loaded address file");
    Ok(address)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("geo_headlines starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = config::load_config(args.config.as_deref()).await?;

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let app = App::new(&config, &args)?;

    let (runs, with_articles) = if let Some(path) = &args.address_file {
        let address = read_address_file(path).await?;
        let result = app.report(None, &address).await;
        (1, usize::from(!result.articles.is_empty()))
    } else {
        let results: Vec<Option<PipelineResult>> = stream::iter(args.points.iter().copied())
            .map(|at| app.report_point(at))
            .buffer_unordered(usize::from(args.concurrency))
            .collect()
            .await;
        let failed = results.iter().filter(|r| r.is_none()).count();
        if failed > 0 {
            warn!(failed, "Some points could not be geocoded");
        }
        let with_articles = results
            .iter()
            .flatten()
            .filter(|r| !r.articles.is_empty())
            .count();
        (results.len(), with_articles)
    };

    let elapsed = start_time.elapsed();
    info!(
        runs,
        with_articles,
        ?elapsed,
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );
    Ok(())
}

