#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Resolved-location cache.
//!
//! Persists the rounded coordinate to `(borough, neighborhood)` mapping
//! produced by the resolver so that later stages can join trips to
//! neighborhoods by exact key lookup, without any containment tests.
//!
//! The file is a CSV with the header
//! `rounded_lon,rounded_lat,borough,neighborhood`, coordinates written
//! with exactly as many fractional digits as they were rounded to. Only
//! resolved locations are ever written.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use taxi_nbhd_geography_models::{
    MAX_ROUNDING_DECIMALS, NeighborhoodLabel, ResolvedLocation, RoundedCoordinate,
};
use thiserror::Error;

/// Errors that can occur while reading or writing the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row could not be turned back into a resolved location.
    #[error("{}:{line}: {message}", .path.display())]
    InvalidRow {
        /// Cache file.
        path: PathBuf,
        /// 1-based line number, counting the header.
        line: u64,
        /// What was wrong with the row.
        message: String,
    },

    /// Rounding precision outside the supported range.
    #[error("Unsupported rounding precision: {0} decimals")]
    InvalidPrecision(u32),
}

/// One persisted row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CacheRow {
    rounded_lon: String,
    rounded_lat: String,
    borough: String,
    neighborhood: String,
}

/// Counts reported by [`persist`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    /// Rows written.
    pub written: u64,
    /// Unresolved locations that were left out.
    pub skipped: u64,
}

/// Writes the resolved entries of `locations` to `path`.
///
/// The file appears only once fully written; on failure any partial
/// output is removed.
///
/// # Errors
///
/// Returns [`CacheError`] if the file cannot be written.
pub fn persist(path: &Path, locations: &[ResolvedLocation]) -> Result<PersistSummary, CacheError> {
    let mut summary = PersistSummary::default();

    taxi_nbhd_storage::io::write_atomic(path, |out| {
        let mut wtr = csv::Writer::from_writer(out);
        // Header is written even when there are no rows.
        wtr.write_record(["rounded_lon", "rounded_lat", "borough", "neighborhood"])?;

        for location in locations {
            let Some(label) = &location.label else {
                summary.skipped += 1;
                continue;
            };
            wtr.write_record([
                location.coordinate.format_lon().as_str(),
                location.coordinate.format_lat().as_str(),
                label.borough.as_str(),
                label.neighborhood.as_str(),
            ])?;
            summary.written += 1;
        }

        wtr.flush()?;
        Ok::<_, CacheError>(())
    })?;

    if summary.skipped > 0 {
        log::debug!("Left {} unresolved location(s) out of the cache", summary.skipped);
    }
    log::info!("Wrote {} cached locations to {}", summary.written, path.display());
    Ok(summary)
}

/// Reads a cache written with coordinates rounded to `decimals` places.
///
/// # Errors
///
/// Returns [`CacheError::InvalidRow`] for a row whose coordinate does not
/// parse at that precision or whose names are empty, and
/// [`CacheError::Io`]/[`CacheError::Csv`] if the file cannot be read.
pub fn load(path: &Path, decimals: u32) -> Result<Vec<ResolvedLocation>, CacheError> {
    if decimals > MAX_ROUNDING_DECIMALS {
        return Err(CacheError::InvalidPrecision(decimals));
    }

    let reader = taxi_nbhd_storage::io::open_reader(path)?;
    let mut rdr = csv::Reader::from_reader(reader);
    let mut locations = Vec::new();

    for (i, row) in rdr.deserialize::<CacheRow>().enumerate() {
        let line = i as u64 + 2;
        let row = row?;
        let invalid = |message: String| CacheError::InvalidRow {
            path: path.to_path_buf(),
            line,
            message,
        };

        let lon = parse_units(&row.rounded_lon, decimals)
            .ok_or_else(|| invalid(format!("invalid longitude {:?}", row.rounded_lon)))?;
        let lat = parse_units(&row.rounded_lat, decimals)
            .ok_or_else(|| invalid(format!("invalid latitude {:?}", row.rounded_lat)))?;
        if row.borough.trim().is_empty() || row.neighborhood.trim().is_empty() {
            return Err(invalid("empty borough or neighborhood".to_string()));
        }

        let coordinate = RoundedCoordinate::from_units(lon, lat, decimals)
            .ok_or(CacheError::InvalidPrecision(decimals))?;
        locations.push(ResolvedLocation::resolved(
            coordinate,
            NeighborhoodLabel {
                borough: row.borough,
                neighborhood: row.neighborhood,
            },
        ));
    }

    log::info!("Loaded {} cached locations from {}", locations.len(), path.display());
    Ok(locations)
}

/// Parses a decimal string into units of `10^-decimals`, exactly.
///
/// Rejects anything with more fractional digits than `decimals`.
fn parse_units(cell: &str, decimals: u32) -> Option<i64> {
    let cell = cell.trim();
    let (negative, digits) = match cell.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cell.strip_prefix('+').unwrap_or(cell)),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > decimals as usize {
        return None;
    }
    if !whole.bytes().chain(frac.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let padding = std::iter::repeat_n(b'0', decimals as usize - frac.len());
    let mut units: i64 = 0;
    for b in whole.bytes().chain(frac.bytes()).chain(padding) {
        units = units.checked_mul(10)?.checked_add(i64::from(b - b'0'))?;
    }

    Some(if negative { -units } else { units })
}

/// In-memory exact-match index over cached locations.
#[derive(Debug, Clone, Default)]
pub struct LocationIndex {
    entries: HashMap<RoundedCoordinate, NeighborhoodLabel>,
}

impl LocationIndex {
    /// Indexes the resolved entries of `locations`.
    ///
    /// If a coordinate appears twice, the first entry wins.
    #[must_use]
    pub fn from_locations<I>(locations: I) -> Self
    where
        I: IntoIterator<Item = ResolvedLocation>,
    {
        let mut entries = HashMap::new();
        for location in locations {
            if let Some(label) = location.label {
                entries.entry(location.coordinate).or_insert(label);
            }
        }
        Self { entries }
    }

    /// Loads and indexes the cache at `path`.
    ///
    /// # Errors
    ///
    /// See [`load`].
    pub fn open(path: &Path, decimals: u32) -> Result<Self, CacheError> {
        Ok(Self::from_locations(load(path, decimals)?))
    }

    /// Neighborhood for `coord`, if cached.
    #[must_use]
    pub fn lookup(&self, coord: &RoundedCoordinate) -> Option<&NeighborhoodLabel> {
        self.entries.get(coord)
    }

    /// Number of indexed coordinates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
