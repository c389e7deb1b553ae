//! Per-trip plausibility filter and per-file speed trimming.

use chrono::{Datelike as _, NaiveDate, NaiveDateTime, Timelike as _};
use taxi_nbhd_geography_models::RoundedCoordinate;
use taxi_nbhd_trip_models::{TaxiType, TripRecord};

/// Lower speed percentile; trips at or below it are dropped.
pub const SPEED_LOW_PERCENTILE: f64 = 1.0;

/// Upper speed percentile; trips at or above it are dropped.
pub const SPEED_HIGH_PERCENTILE: f64 = 99.0;

/// A trip that passed the plausibility filter.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTrip {
    /// Fleet the trip came from.
    pub taxi_type: TaxiType,
    /// Pickup timestamp.
    pub pickup_time: NaiveDateTime,
    /// Rounded pickup location.
    pub coordinate: RoundedCoordinate,
    /// Passenger count.
    pub passengers: u64,
    /// Dropoff minus pickup, in seconds.
    pub trip_secs: i64,
    /// Distance in miles.
    pub distance: f64,
    /// Metered fare.
    pub fare: f64,
    /// Tip.
    pub tip: f64,
    /// Total charged.
    pub total: f64,
}

impl CleanTrip {
    /// Pickup date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.pickup_time.date()
    }

    /// Pickup hour, 0 to 23.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.pickup_time.hour()
    }

    /// Pickup day of week, Monday = 0.
    #[must_use]
    pub fn day_of_week(&self) -> u32 {
        self.pickup_time.weekday().num_days_from_monday()
    }

    /// Miles per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn speed(&self) -> f64 {
        self.distance / self.trip_secs as f64
    }
}

/// Applies the plausibility filter to one trip.
///
/// Returns `None` when any field the summaries need is missing or out of
/// range. Coordinate bounds apply to the rounded pickup location.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clean_trip(trip: &TripRecord, taxi_type: TaxiType, decimals: u32) -> Option<CleanTrip> {
    let (lon, lat) = trip.pickup()?;
    let coordinate = RoundedCoordinate::from_degrees(lon, lat, decimals)?;
    if !(-75.0 < coordinate.lon() && coordinate.lon() < -73.0) {
        return None;
    }
    if !(40.0 < coordinate.lat() && coordinate.lat() < 41.0) {
        return None;
    }

    let passengers = trip.passenger_count.filter(|&p| 0.0 < p && p < 20.0)?;
    let trip_secs = trip.duration_secs().filter(|&s| 0 < s && s < 7_200)?;
    let fare = trip.fare_amount.filter(|&f| 0.0 < f && f < 200.0)?;
    let total = trip.total_amount.filter(|&t| 0.0 < t && t < 200.0)?;
    let tip = trip.tip_amount.filter(|&t| (0.0..200.0).contains(&t))?;
    let distance = trip.trip_distance.filter(|&d| 0.0 < d && d < 50.0)?;

    Some(CleanTrip {
        taxi_type,
        pickup_time: trip.pickup_time?,
        coordinate,
        passengers: passengers.round() as u64,
        trip_secs,
        distance,
        fare,
        tip,
        total,
    })
}

/// Linear-interpolated percentile of already sorted `values`.
///
/// `pct` is in `0.0..=100.0`. Returns `None` for an empty slice.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (pct / 100.0).clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let weight = rank - rank.floor();
    Some((sorted[hi] - sorted[lo]).mul_add(weight, sorted[lo]))
}

/// Drops trips whose speed is not strictly between the 1st and 99th
/// percentiles of `trips`.
#[must_use]
pub fn trim_speeds(mut trips: Vec<CleanTrip>) -> Vec<CleanTrip> {
    let mut speeds: Vec<f64> = trips.iter().map(CleanTrip::speed).collect();
    speeds.sort_by(f64::total_cmp);

    let (Some(low), Some(high)) = (
        percentile(&speeds, SPEED_LOW_PERCENTILE),
        percentile(&speeds, SPEED_HIGH_PERCENTILE),
    ) else {
        return trips;
    };

    trips.retain(|t| {
        let speed = t.speed();
        low < speed && speed < high
    });
    trips
}

#[cfg(test)]
mod tests {
    use taxi_nbhd_trip_models::parse_timestamp;

    use super::*;

    fn raw_trip() -> TripRecord {
        TripRecord {
            pickup_time: parse_timestamp("2015-01-15 19:05:39"),
            dropoff_time: parse_timestamp("2015-01-15 19:23:42"),
            passenger_count: Some(2.0),
            trip_distance: Some(3.2),
            pickup_longitude: Some(-73.98512),
            pickup_latitude: Some(40.74811),
            dropoff_longitude: Some(-73.95),
            dropoff_latitude: Some(40.78),
            fare_amount: Some(14.5),
            tip_amount: Some(2.0),
            total_amount: Some(17.3),
        }
    }

    #[test]
    fn keeps_plausible_trip() {
        let trip = clean_trip(&raw_trip(), TaxiType::Yellow, 3).unwrap();
        assert_eq!(trip.passengers, 2);
        assert_eq!(trip.trip_secs, 1083);
        assert_eq!(trip.coordinate.lon_units(), -73_985);
        assert_eq!(trip.hour(), 19);
        // 2015-01-15 was a Thursday.
        assert_eq!(trip.day_of_week(), 3);
        assert_eq!(trip.date(), NaiveDate::from_ymd_opt(2015, 1, 15).unwrap());
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let cases: [fn(&mut TripRecord); 10] = [
            |t| t.passenger_count = Some(0.0),
            |t| t.passenger_count = Some(20.0),
            |t| t.pickup_longitude = Some(0.0),
            |t| t.pickup_latitude = Some(41.2),
            |t| t.dropoff_time = t.pickup_time,
            |t| t.fare_amount = Some(250.0),
            |t| t.total_amount = Some(0.0),
            |t| t.tip_amount = Some(-1.0),
            |t| t.trip_distance = Some(50.0),
            |t| t.fare_amount = None,
        ];
        for (i, mutate) in cases.iter().enumerate() {
            let mut trip = raw_trip();
            mutate(&mut trip);
            assert!(clean_trip(&trip, TaxiType::Green, 3).is_none(), "case {i}");
        }
    }

    #[test]
    fn multi_day_duration_counts_its_remainder() {
        let mut trip = raw_trip();
        trip.pickup_time = parse_timestamp("2015-01-15 19:00:00");
        trip.dropoff_time = parse_timestamp("2015-01-16 19:10:00");
        let kept = clean_trip(&trip, TaxiType::Yellow, 3).unwrap();
        assert_eq!(kept.trip_secs, 600);

        trip.dropoff_time = parse_timestamp("2015-01-15 18:50:00");
        assert!(clean_trip(&trip, TaxiType::Yellow, 3).is_none());
    }

    #[test]
    fn zero_tip_is_allowed() {
        let mut trip = raw_trip();
        trip.tip_amount = Some(0.0);
        assert!(clean_trip(&trip, TaxiType::Green, 3).is_some());
    }

    #[test]
    fn interpolates_percentiles() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 1.0).unwrap() - 1.04).abs() < 1e-9);
        assert!((percentile(&values, 99.0).unwrap() - 4.96).abs() < 1e-9);
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn trims_fastest_and_slowest_trips() {
        let base = clean_trip(&raw_trip(), TaxiType::Yellow, 3).unwrap();
        let trips: Vec<CleanTrip> = (1..=5)
            .map(|i| CleanTrip {
                distance: f64::from(i),
                trip_secs: 1_000,
                ..base.clone()
            })
            .collect();

        let kept: Vec<f64> = trim_speeds(trips).iter().map(|t| t.distance).collect();
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn single_trip_is_trimmed_away() {
        let base = clean_trip(&raw_trip(), TaxiType::Yellow, 3).unwrap();
        assert!(trim_speeds(vec![base]).is_empty());
        assert!(trim_speeds(Vec::new()).is_empty());
    }
}
