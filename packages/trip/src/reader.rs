//! Streaming trip file reader.
//!
//! Headers are normalized with [`normalize_column_name`] before lookup, so
//! one reader handles every file vintage. Rows that the CSV parser rejects
//! (bad quoting, invalid UTF-8) are skipped and counted; I/O failures
//! abort the read.

use std::path::Path;

use csv::StringRecord;
use taxi_nbhd_trip_models::{TripRecord, columns, normalize_column_name, parse_number, parse_timestamp};

use crate::TripError;

/// Positions of the canonical columns within one file's header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripColumns {
    pickup_time: Option<usize>,
    dropoff_time: Option<usize>,
    passenger_count: Option<usize>,
    trip_distance: Option<usize>,
    pickup_longitude: Option<usize>,
    pickup_latitude: Option<usize>,
    dropoff_longitude: Option<usize>,
    dropoff_latitude: Option<usize>,
    fare_amount: Option<usize>,
    tip_amount: Option<usize>,
    total_amount: Option<usize>,
}

impl TripColumns {
    /// Locates the canonical columns in a raw header row.
    ///
    /// When a canonical name appears more than once, the first wins.
    #[must_use]
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut cols = Self::default();
        for (i, raw) in headers.into_iter().enumerate() {
            let slot = match normalize_column_name(raw).as_str() {
                columns::PICKUP_TIME => &mut cols.pickup_time,
                columns::DROPOFF_TIME => &mut cols.dropoff_time,
                columns::PASSENGER_COUNT => &mut cols.passenger_count,
                columns::TRIP_DISTANCE => &mut cols.trip_distance,
                columns::PICKUP_LONGITUDE => &mut cols.pickup_longitude,
                columns::PICKUP_LATITUDE => &mut cols.pickup_latitude,
                columns::DROPOFF_LONGITUDE => &mut cols.dropoff_longitude,
                columns::DROPOFF_LATITUDE => &mut cols.dropoff_latitude,
                columns::FARE_AMOUNT => &mut cols.fare_amount,
                columns::TIP_AMOUNT => &mut cols.tip_amount,
                columns::TOTAL_AMOUNT => &mut cols.total_amount,
                _ => continue,
            };
            slot.get_or_insert(i);
        }
        cols
    }

    /// Returns the first required column that is absent, if any.
    ///
    /// Pickup coordinates are required; everything else is optional.
    #[must_use]
    pub const fn first_missing_required(&self) -> Option<&'static str> {
        if self.pickup_longitude.is_none() {
            Some(columns::PICKUP_LONGITUDE)
        } else if self.pickup_latitude.is_none() {
            Some(columns::PICKUP_LATITUDE)
        } else {
            None
        }
    }

    /// Whether the file carries dropoff coordinates.
    #[must_use]
    pub const fn has_dropoffs(&self) -> bool {
        self.dropoff_longitude.is_some() && self.dropoff_latitude.is_some()
    }

    /// Builds a [`TripRecord`] from one data row.
    #[must_use]
    pub fn parse(&self, record: &StringRecord) -> TripRecord {
        let number = |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(parse_number);
        let timestamp =
            |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(parse_timestamp);

        TripRecord {
            pickup_time: timestamp(self.pickup_time),
            dropoff_time: timestamp(self.dropoff_time),
            passenger_count: number(self.passenger_count),
            trip_distance: number(self.trip_distance),
            pickup_longitude: number(self.pickup_longitude),
            pickup_latitude: number(self.pickup_latitude),
            dropoff_longitude: number(self.dropoff_longitude),
            dropoff_latitude: number(self.dropoff_latitude),
            fare_amount: number(self.fare_amount),
            tip_amount: number(self.tip_amount),
            total_amount: number(self.total_amount),
        }
    }
}

/// Streams every trip in `path` through `f`.
///
/// Returns the number of trips passed to `f`.
///
/// # Errors
///
/// Returns [`TripError`] if the file cannot be opened or read, or lacks
/// pickup coordinate columns.
pub fn for_each_trip<F>(path: &Path, mut f: F) -> Result<u64, TripError>
where
    F: FnMut(TripRecord),
{
    let reader = taxi_nbhd_storage::io::open_reader(path)?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let cols = TripColumns::from_headers(rdr.headers()?.iter());
    if let Some(column) = cols.first_missing_required() {
        return Err(TripError::MissingColumn {
            path: path.to_path_buf(),
            column,
        });
    }

    let mut count = 0u64;
    let mut skipped = 0u64;
    let mut record = StringRecord::new();

    loop {
        match rdr.read_record(&mut record) {
            Ok(true) => {
                f(cols.parse(&record));
                count += 1;
            }
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                skipped += 1;
                log::debug!("{}: skipping unreadable row: {e}", path.display());
            }
        }
    }

    if skipped > 0 {
        log::warn!("{}: skipped {skipped} unreadable row(s)", path.display());
    }
    log::debug!("{}: read {count} trips", path.display());

    Ok(count)
}

/// Reads every trip in `path` into memory.
///
/// # Errors
///
/// See [`for_each_trip`].
pub fn read_trips(path: &Path) -> Result<Vec<TripRecord>, TripError> {
    let mut trips = Vec::new();
    for_each_trip(path, |trip| trips.push(trip))?;
    Ok(trips)
}
