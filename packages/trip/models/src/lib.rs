#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Taxi trip record types.
//!
//! Trip files from different years name the same columns differently
//! (`Start_Lon` vs `pickup_longitude`, `Fare_Amt` vs `fare_amount`,
//! `lpep_pickup_datetime` vs `Trip_Pickup_DateTime`). [`normalize_column_name`]
//! maps every vintage onto one canonical set of names so that the rest of
//! the pipeline sees a single [`TripRecord`] shape.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Canonical column names after normalization.
pub mod columns {
    /// Pickup timestamp.
    pub const PICKUP_TIME: &str = "pickup_time";
    /// Dropoff timestamp.
    pub const DROPOFF_TIME: &str = "dropoff_time";
    /// Number of passengers.
    pub const PASSENGER_COUNT: &str = "passenger_count";
    /// Trip distance in miles.
    pub const TRIP_DISTANCE: &str = "trip_distance";
    /// Pickup longitude.
    pub const PICKUP_LONGITUDE: &str = "pickup_longitude";
    /// Pickup latitude.
    pub const PICKUP_LATITUDE: &str = "pickup_latitude";
    /// Dropoff longitude.
    pub const DROPOFF_LONGITUDE: &str = "dropoff_longitude";
    /// Dropoff latitude.
    pub const DROPOFF_LATITUDE: &str = "dropoff_latitude";
    /// Metered fare.
    pub const FARE_AMOUNT: &str = "fare_amount";
    /// Tip.
    pub const TIP_AMOUNT: &str = "tip_amount";
    /// Total charged.
    pub const TOTAL_AMOUNT: &str = "total_amount";
}

const SECONDS_PER_DAY: i64 = 86_400;

/// Timestamp layout used by every trip file vintage. Fractional seconds
/// are accepted when present.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Fleet a trip file belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaxiType {
    /// Medallion (yellow) cabs.
    Yellow,
    /// Boro (green) cabs.
    Green,
}

impl TaxiType {
    /// Infers the fleet from a trip file name: anything containing
    /// `green` is green, everything else yellow.
    #[must_use]
    pub fn from_file_name(name: &str) -> Self {
        if name.to_lowercase().contains("green") {
            Self::Green
        } else {
            Self::Yellow
        }
    }
}

/// One trip, with every field optional.
///
/// Cells that are empty or fail to parse become `None`; deciding what to
/// do about missing values is left to each consumer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripRecord {
    /// Pickup timestamp.
    pub pickup_time: Option<NaiveDateTime>,
    /// Dropoff timestamp.
    pub dropoff_time: Option<NaiveDateTime>,
    /// Number of passengers.
    pub passenger_count: Option<f64>,
    /// Trip distance in miles.
    pub trip_distance: Option<f64>,
    /// Pickup longitude in degrees.
    pub pickup_longitude: Option<f64>,
    /// Pickup latitude in degrees.
    pub pickup_latitude: Option<f64>,
    /// Dropoff longitude in degrees.
    pub dropoff_longitude: Option<f64>,
    /// Dropoff latitude in degrees.
    pub dropoff_latitude: Option<f64>,
    /// Metered fare.
    pub fare_amount: Option<f64>,
    /// Tip.
    pub tip_amount: Option<f64>,
    /// Total charged.
    pub total_amount: Option<f64>,
}

impl TripRecord {
    /// Pickup `(lon, lat)` if both components are present.
    #[must_use]
    pub fn pickup(&self) -> Option<(f64, f64)> {
        self.pickup_longitude.zip(self.pickup_latitude)
    }

    /// Dropoff `(lon, lat)` if both components are present.
    #[must_use]
    pub fn dropoff(&self) -> Option<(f64, f64)> {
        self.dropoff_longitude.zip(self.dropoff_latitude)
    }

    /// Seconds part of the trip duration, if both timestamps are present.
    ///
    /// Whole days are dropped, so the result is always in `0..86_400`: a
    /// trip logged as one day and ten minutes counts as 600 seconds, and a
    /// dropoff ten minutes before pickup as 85 800.
    #[must_use]
    pub fn duration_secs(&self) -> Option<i64> {
        let elapsed = (self.dropoff_time? - self.pickup_time?).num_seconds();
        Some(elapsed.rem_euclid(SECONDS_PER_DAY))
    }
}

/// Maps a raw header onto its canonical column name.
///
/// Trims and lowercases, expands `amt` to `amount`, renames the 2009-era
/// `start_*`/`end_*` coordinate columns, and collapses any
/// `*pickup_datetime`/`*dropoff_datetime` variant to
/// [`columns::PICKUP_TIME`]/[`columns::DROPOFF_TIME`].
#[must_use]
pub fn normalize_column_name(raw: &str) -> String {
    let name = raw
        .trim()
        .to_lowercase()
        .replace("amt", "amount")
        .replace("start_lon", columns::PICKUP_LONGITUDE)
        .replace("start_lat", columns::PICKUP_LATITUDE)
        .replace("end_lon", columns::DROPOFF_LONGITUDE)
        .replace("end_lat", columns::DROPOFF_LATITUDE);

    if name.contains("pickup_datetime") {
        columns::PICKUP_TIME.to_string()
    } else if name.contains("dropoff_datetime") {
        columns::DROPOFF_TIME.to_string()
    } else {
        name
    }
}

/// Parses a numeric cell, treating blanks and garbage as missing.
#[must_use]
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a timestamp cell in [`TIMESTAMP_FORMAT`].
#[must_use]
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(cell.trim(), TIMESTAMP_FORMAT).ok()
}
