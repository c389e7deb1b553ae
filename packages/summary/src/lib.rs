#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Cleaned trip summaries for analysis.
//!
//! Each trip file is read, filtered for plausible values, and trimmed of
//! its fastest and slowest 1% of trips before being folded into the
//! running totals. Pickup locations are matched to neighborhoods purely by
//! looking up their rounded coordinate in the resolved-location cache; no
//! geometry is involved at this stage.

pub mod aggregate;
pub mod clean;
pub mod holidays;
pub mod output;
pub mod weather;

use std::path::PathBuf;

use taxi_nbhd_cache::{CacheError, LocationIndex};
use taxi_nbhd_progress::ProgressCallback;
use taxi_nbhd_trip::{TripError, TripFile};
use thiserror::Error;

pub use aggregate::{Summaries, SummaryBuilder};
pub use output::write_summaries;
pub use weather::WeatherTable;

/// Errors that can occur while building summaries.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading a trip file failed.
    #[error(transparent)]
    Trip(#[from] TripError),

    /// Reading the location cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// A weather row's first cell is not a date.
    #[error("{}:{line}: invalid weather date {value:?}", .path.display())]
    InvalidWeatherDate {
        /// Weather file.
        path: PathBuf,
        /// 1-based line number, counting the header.
        line: u64,
        /// The offending cell.
        value: String,
    },
}

/// Builds every summary table from `files`.
///
/// # Errors
///
/// Returns [`SummaryError::Trip`] if a trip file cannot be read.
pub fn summarize_files(
    files: &[TripFile],
    index: &LocationIndex,
    decimals: u32,
    progress: &dyn ProgressCallback,
) -> Result<Summaries, SummaryError> {
    let mut builder = SummaryBuilder::new(index);
    progress.set_total(files.len() as u64);

    for file in files {
        progress.set_message(format!("Summarizing {}", file.path.display()));

        let mut kept = Vec::new();
        let read = taxi_nbhd_trip::reader::for_each_trip(&file.path, |trip| {
            if let Some(clean) = clean::clean_trip(&trip, file.taxi_type, decimals) {
                kept.push(clean);
            }
        })?;
        let plausible = kept.len();
        let kept = clean::trim_speeds(kept);

        log::info!(
            "{}: {read} trips, {plausible} plausible, {} after speed trim",
            file.path.display(),
            kept.len()
        );
        for trip in &kept {
            builder.add(trip);
        }
        progress.inc(1);
    }

    progress.finish(format!("Summarized {} trips", builder.trips()));
    Ok(builder.finish())
}
