//! Quantized coordinate keys and axis-aligned bounds.
//!
//! A [`RoundedCoordinate`] stores longitude and latitude as integers
//! scaled by `10^decimals`. Equality, hashing, and ordering all operate on
//! those integers, so two raw coordinates that round to the same bucket
//! are the same key, and sorting is exact (longitude first, then
//! latitude).

use std::fmt;

/// Default number of decimal places coordinates are rounded to
/// (about 100 m at city latitudes).
pub const DEFAULT_ROUNDING_DECIMALS: u32 = 3;

/// Largest supported rounding precision.
pub const MAX_ROUNDING_DECIMALS: u32 = 9;

const SCALES: [f64; 10] = [
    1.0,
    10.0,
    100.0,
    1_000.0,
    10_000.0,
    100_000.0,
    1_000_000.0,
    10_000_000.0,
    100_000_000.0,
    1_000_000_000.0,
];

/// Scaled values beyond this magnitude cannot be represented as `i64`.
const MAX_UNITS: f64 = 9.0e18;

/// A `(lon, lat)` pair rounded to a fixed number of decimal places.
///
/// Field order drives the derived ordering: longitude, then latitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundedCoordinate {
    lon_units: i64,
    lat_units: i64,
    decimals: u32,
}

impl RoundedCoordinate {
    /// Rounds raw degrees to `decimals` places (half away from zero).
    ///
    /// Returns `None` for non-finite components, values too large to
    /// scale, or `decimals` above [`MAX_ROUNDING_DECIMALS`].
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_degrees(lon: f64, lat: f64, decimals: u32) -> Option<Self> {
        let scale = scale(decimals)?;
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }

        let lon_scaled = (lon * scale).round();
        let lat_scaled = (lat * scale).round();
        if lon_scaled.abs() > MAX_UNITS || lat_scaled.abs() > MAX_UNITS {
            return None;
        }

        Some(Self {
            lon_units: lon_scaled as i64,
            lat_units: lat_scaled as i64,
            decimals,
        })
    }

    /// Builds a coordinate directly from scaled integer units.
    ///
    /// Returns `None` if `decimals` is above [`MAX_ROUNDING_DECIMALS`].
    #[must_use]
    pub const fn from_units(lon_units: i64, lat_units: i64, decimals: u32) -> Option<Self> {
        if decimals > MAX_ROUNDING_DECIMALS {
            return None;
        }
        Some(Self {
            lon_units,
            lat_units,
            decimals,
        })
    }

    /// Rounded longitude in degrees.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn lon(&self) -> f64 {
        self.lon_units as f64 / SCALES[self.decimals as usize]
    }

    /// Rounded latitude in degrees.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn lat(&self) -> f64 {
        self.lat_units as f64 / SCALES[self.decimals as usize]
    }

    /// Longitude scaled by `10^decimals`.
    #[must_use]
    pub const fn lon_units(&self) -> i64 {
        self.lon_units
    }

    /// Latitude scaled by `10^decimals`.
    #[must_use]
    pub const fn lat_units(&self) -> i64 {
        self.lat_units
    }

    /// Number of decimal places this coordinate was rounded to.
    #[must_use]
    pub const fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Longitude formatted with exactly `decimals` fractional digits.
    #[must_use]
    pub fn format_lon(&self) -> String {
        format!("{:.*}", self.decimals as usize, self.lon())
    }

    /// Latitude formatted with exactly `decimals` fractional digits.
    #[must_use]
    pub fn format_lat(&self) -> String {
        format!("{:.*}", self.decimals as usize, self.lat())
    }
}

impl fmt::Display for RoundedCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.format_lon(), self.format_lat())
    }
}

/// Returns `10^decimals`, or `None` when the precision is unsupported.
#[must_use]
pub fn scale(decimals: u32) -> Option<f64> {
    SCALES.get(decimals as usize).copied()
}

/// An axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Westmost longitude.
    pub min_lon: f64,
    /// Eastmost longitude.
    pub max_lon: f64,
    /// Southmost latitude.
    pub min_lat: f64,
    /// Northmost latitude.
    pub max_lat: f64,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty input.
    #[must_use]
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut points = points.into_iter();
        let (lon, lat) = points.next()?;
        let mut bounds = Self {
            min_lon: lon,
            max_lon: lon,
            min_lat: lat,
            max_lat: lat,
        };
        for (lon, lat) in points {
            bounds.min_lon = bounds.min_lon.min(lon);
            bounds.max_lon = bounds.max_lon.max(lon);
            bounds.min_lat = bounds.min_lat.min(lat);
            bounds.max_lat = bounds.max_lat.max(lat);
        }
        Some(bounds)
    }

    /// Whether the point lies strictly inside the box on all four sides.
    #[must_use]
    pub fn strictly_contains(&self, lon: f64, lat: f64) -> bool {
        self.min_lon < lon && lon < self.max_lon && self.min_lat < lat && lat < self.max_lat
    }
}
