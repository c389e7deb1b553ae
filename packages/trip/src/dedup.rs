//! Reduction of trip coordinates to a sorted set of distinct rounded keys.
//!
//! Rounding is what keeps geocoding tractable: however many trips the
//! corpus holds, the resolver only sees one entry per rounded bucket. The
//! output is sorted by longitude then latitude, which the resolver's
//! locality heuristic depends on.

use std::collections::BTreeSet;

use taxi_nbhd_geography_models::{MAX_ROUNDING_DECIMALS, RoundedCoordinate};
use taxi_nbhd_progress::ProgressCallback;
use taxi_nbhd_trip_models::TripRecord;

use crate::{TripError, TripFile};

/// Which trip endpoints contribute coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoordinateSelection {
    /// Pickup locations only.
    PickupOnly,
    /// Pickup and dropoff locations.
    #[default]
    PickupAndDropoff,
}

/// Accumulates distinct rounded coordinates across any number of trips.
#[derive(Debug, Clone)]
pub struct CoordinateDeduplicator {
    decimals: u32,
    selection: CoordinateSelection,
    coords: BTreeSet<RoundedCoordinate>,
    missing: u64,
}

impl CoordinateDeduplicator {
    /// Creates an empty deduplicator.
    ///
    /// # Errors
    ///
    /// Returns [`TripError::InvalidPrecision`] if `decimals` exceeds
    /// [`MAX_ROUNDING_DECIMALS`].
    pub fn new(decimals: u32, selection: CoordinateSelection) -> Result<Self, TripError> {
        if decimals > MAX_ROUNDING_DECIMALS {
            return Err(TripError::InvalidPrecision(decimals));
        }
        Ok(Self {
            decimals,
            selection,
            coords: BTreeSet::new(),
            missing: 0,
        })
    }

    /// Adds the selected endpoints of one trip.
    ///
    /// An endpoint with a missing or non-finite component is counted and
    /// otherwise ignored.
    pub fn observe(&mut self, trip: &TripRecord) {
        self.observe_pair(trip.pickup_longitude, trip.pickup_latitude);
        if self.selection == CoordinateSelection::PickupAndDropoff {
            self.observe_pair(trip.dropoff_longitude, trip.dropoff_latitude);
        }
    }

    fn observe_pair(&mut self, lon: Option<f64>, lat: Option<f64>) {
        match lon
            .zip(lat)
            .and_then(|(lon, lat)| RoundedCoordinate::from_degrees(lon, lat, self.decimals))
        {
            Some(coord) => {
                self.coords.insert(coord);
            }
            None => self.missing += 1,
        }
    }

    /// Adds every trip in `file`, returning the number of trips read.
    ///
    /// # Errors
    ///
    /// Returns [`TripError`] if the file cannot be read.
    pub fn observe_file(&mut self, file: &TripFile) -> Result<u64, TripError> {
        let before = self.coords.len();
        let count = crate::reader::for_each_trip(&file.path, |trip| self.observe(&trip))?;
        log::info!(
            "{}: {count} trips, {} new coordinates ({} total)",
            file.path.display(),
            self.coords.len() - before,
            self.coords.len()
        );
        Ok(count)
    }

    /// Number of distinct coordinates seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    /// Whether no coordinate has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Number of endpoints dropped for missing or non-numeric components.
    #[must_use]
    pub const fn missing(&self) -> u64 {
        self.missing
    }

    /// Returns the distinct coordinates sorted by longitude, then latitude.
    #[must_use]
    pub fn finish(self) -> Vec<RoundedCoordinate> {
        if self.missing > 0 {
            log::debug!("Dropped {} endpoint(s) with missing coordinates", self.missing);
        }
        self.coords.into_iter().collect()
    }
}

/// Distinct rounded coordinates of `trips`, sorted by longitude then
/// latitude.
///
/// # Errors
///
/// Returns [`TripError::InvalidPrecision`] if `decimals` exceeds
/// [`MAX_ROUNDING_DECIMALS`].
pub fn extract_unique_coordinates<'a, I>(
    trips: I,
    decimals: u32,
    selection: CoordinateSelection,
) -> Result<Vec<RoundedCoordinate>, TripError>
where
    I: IntoIterator<Item = &'a TripRecord>,
{
    let mut dedup = CoordinateDeduplicator::new(decimals, selection)?;
    for trip in trips {
        dedup.observe(trip);
    }
    Ok(dedup.finish())
}

/// Distinct rounded coordinates across every file in `files`.
///
/// # Errors
///
/// Returns [`TripError`] if the precision is unsupported or any file
/// cannot be read.
pub fn extract_from_files(
    files: &[TripFile],
    decimals: u32,
    selection: CoordinateSelection,
    progress: &dyn ProgressCallback,
) -> Result<Vec<RoundedCoordinate>, TripError> {
    let mut dedup = CoordinateDeduplicator::new(decimals, selection)?;
    progress.set_total(files.len() as u64);

    for file in files {
        progress.set_message(format!("Scanning {}", file.path.display()));
        dedup.observe_file(file)?;
        progress.inc(1);
    }

    let coords = dedup.finish();
    progress.finish(format!("{} unique coordinates", coords.len()));
    log::info!(
        "Collected {} unique coordinates from {} file(s)",
        coords.len(),
        files.len()
    );
    Ok(coords)
}
