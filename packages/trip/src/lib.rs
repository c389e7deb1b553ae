#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi trip file access and coordinate deduplication.
//!
//! [`discover`] finds the trip files in the data directory, [`reader`]
//! streams them as normalized [`TripRecord`](taxi_nbhd_trip_models::TripRecord)s,
//! and [`dedup`] reduces every pickup and dropoff across the corpus to the
//! sorted set of distinct rounded coordinates that the resolver works on.

pub mod dedup;
pub mod discover;
pub mod reader;

use std::path::PathBuf;

use thiserror::Error;

pub use dedup::{CoordinateDeduplicator, CoordinateSelection, extract_unique_coordinates};
pub use discover::{TripFile, discover_trip_files};

/// Errors that can occur while reading trip data.
#[derive(Debug, Error)]
pub enum TripError {
    /// Reading a file or directory failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CSV stream could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A trip file lacks a column the pipeline cannot do without.
    #[error("{} is missing required column '{column}'", .path.display())]
    MissingColumn {
        /// File that was being read.
        path: PathBuf,
        /// Canonical name of the missing column.
        column: &'static str,
    },

    /// The requested rounding precision is not supported.
    #[error("Unsupported rounding precision: {0} decimals (maximum {max})", max = taxi_nbhd_geography_models::MAX_ROUNDING_DECIMALS)]
    InvalidPrecision(u32),
}
