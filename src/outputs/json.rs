//! JSON reports of pipeline runs.
//!
//! A report wraps a [`PipelineResult`] with the point that was clicked and
//! the time of the run. Reports can be printed or written to disk:
//!
//! ```text
//! json_output_dir/
//! └── 2026-10-16/
//!     ├── leeds-west-yorkshire-united-kingdom_101500.json
//!     └── china_101503.json
//! ```

use crate::models::{Coordinates, PipelineResult};
use crate::outputs::markdown::sidebar_title;
use crate::utils::slugify;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub generated_at: DateTime<Utc>,
    /// Clicked point, when the address came from the geocoder.
    pub at: Option<Coordinates>,
    #[serde(flatten)]
    pub result: &'a PipelineResult,
}

impl<'a> Report<'a> {
    pub fn new(at: Option<Coordinates>, result: &'a PipelineResult) -> Self {
        Self {
            generated_at: Utc::now(),
            at,
            result,
        }
    }

    /// File name for this report: place slug plus the UTC time of day.
    pub fn file_name(&self) -> String {
        let title = sidebar_title(&self.result.local, &self.result.regional, &self.result.national);
        let slug = match slugify(&title) {
            s if s.is_empty() => "unknown".to_string(),
            s => s,
        };
        format!("{}_{}.json", slug, self.generated_at.format("%H%M%S"))
    }
}

pub fn to_json(report: &Report<'_>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Write a report under `{json_output_dir}/{date}/`.
///
/// # Returns
///
/// The path of the written file.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_report(
    report: &Report<'_>,
    json_output_dir: &str,
) -> Result<String, Box<dyn Error>> {
    let json = to_json(report)?;
    let dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        report.generated_at.format("%Y-%m-%d")
    );

    if let Err(e) = fs::create_dir_all(&dir).await {
        error!(%dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = format!("{}/{}", dir, report.file_name());
    fs::write(&path, json).await?;
    info!(%path, "Wrote JSON report");
    Ok(path)
}
