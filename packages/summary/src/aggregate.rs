//! Running totals across cleaned trips and the tables built from them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike as _, NaiveDate};
use serde::Serialize;
use taxi_nbhd_cache::LocationIndex;
use taxi_nbhd_geography_models::{NeighborhoodLabel, RoundedCoordinate};
use taxi_nbhd_trip_models::TaxiType;

use crate::clean::CleanTrip;
use crate::holidays::is_federal_holiday;

/// Passengers, time and distance by pickup location, day of week, and hour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickupsHdRow {
    /// Rounded pickup longitude.
    pub rounded_lon: String,
    /// Rounded pickup latitude.
    pub rounded_lat: String,
    /// Day of week, Monday = 0.
    pub day: u32,
    /// Hour of day.
    pub hour: u32,
    /// Total passengers.
    pub passenger_count: u64,
    /// Total trip seconds.
    pub trip_time_in_secs: i64,
    /// Total miles.
    pub trip_distance: f64,
    /// Borough of the pickup location.
    pub borough: String,
    /// Neighborhood of the pickup location.
    pub neighborhood: String,
}

/// Passengers by hour and pickup location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickupsHrRow {
    /// Hour of day.
    pub hour: u32,
    /// Rounded pickup latitude.
    pub rounded_lat: String,
    /// Rounded pickup longitude.
    pub rounded_lon: String,
    /// Total passengers.
    pub passenger_count: u64,
}

/// Per-date, per-fleet trip statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateAvgRow {
    /// Pickup date.
    pub date: NaiveDate,
    /// Fleet.
    #[serde(rename = "type")]
    pub taxi_type: TaxiType,
    /// Total passengers.
    pub passenger_count: u64,
    /// Mean fare.
    pub fare_amount: f64,
    /// Mean tip.
    pub tip_amount: f64,
    /// Mean distance in miles.
    pub trip_distance: f64,
    /// Number of trips.
    pub total_pickups: u64,
}

/// Passengers by neighborhood, date, and hour with calendar context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupsHdlRow {
    /// Borough and neighborhood.
    pub label: NeighborhoodLabel,
    /// Pickup date.
    pub date: NaiveDate,
    /// Hour of day.
    pub hour: u32,
    /// Total passengers, zero when no trip was observed.
    pub passenger_count: u64,
    /// Whether `date` is an observed federal holiday.
    pub holiday: bool,
    /// Day of week, Monday = 0.
    pub day_of_week: u32,
    /// Month, 1 to 12.
    pub month: u32,
}

/// All summary tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summaries {
    /// See [`PickupsHdRow`].
    pub pickups_hd: Vec<PickupsHdRow>,
    /// See [`PickupsHrRow`].
    pub pickups_hr: Vec<PickupsHrRow>,
    /// See [`DateAvgRow`].
    pub date_avgs: Vec<DateAvgRow>,
    /// See [`PickupsHdlRow`].
    pub pickups_hdl: Vec<PickupsHdlRow>,
}

#[derive(Debug, Clone, Copy, Default)]
struct LocationTotals {
    passengers: u64,
    trip_secs: i64,
    distance: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct DateTotals {
    passengers: u64,
    pickups: u64,
    fare: f64,
    tip: f64,
    distance: f64,
}

/// Accumulates cleaned trips from any number of files.
///
/// Pickup locations are joined to neighborhoods through `index`; trips
/// whose location is not cached still count towards the date averages.
pub struct SummaryBuilder<'a> {
    index: &'a LocationIndex,
    by_location: BTreeMap<(RoundedCoordinate, u32, u32), LocationTotals>,
    by_date: BTreeMap<(NaiveDate, TaxiType), DateTotals>,
    by_neighborhood: BTreeMap<(NeighborhoodLabel, NaiveDate, u32), u64>,
    trips: u64,
}

impl<'a> SummaryBuilder<'a> {
    /// Creates an empty builder joining against `index`.
    #[must_use]
    pub const fn new(index: &'a LocationIndex) -> Self {
        Self {
            index,
            by_location: BTreeMap::new(),
            by_date: BTreeMap::new(),
            by_neighborhood: BTreeMap::new(),
            trips: 0,
        }
    }

    /// Adds one cleaned trip.
    pub fn add(&mut self, trip: &CleanTrip) {
        self.trips += 1;
        let (date, hour) = (trip.date(), trip.hour());

        let loc = self
            .by_location
            .entry((trip.coordinate, trip.day_of_week(), hour))
            .or_default();
        loc.passengers += trip.passengers;
        loc.trip_secs += trip.trip_secs;
        loc.distance += trip.distance;

        let day = self.by_date.entry((date, trip.taxi_type)).or_default();
        day.passengers += trip.passengers;
        day.pickups += 1;
        day.fare += trip.fare;
        day.tip += trip.tip;
        day.distance += trip.distance;

        if let Some(label) = self.index.lookup(&trip.coordinate) {
            *self
                .by_neighborhood
                .entry((label.clone(), date, hour))
                .or_default() += trip.passengers;
        }
    }

    /// Number of trips added.
    #[must_use]
    pub const fn trips(&self) -> u64 {
        self.trips
    }

    /// Builds the summary tables.
    #[must_use]
    pub fn finish(self) -> Summaries {
        let pickups_hd = self.pickups_hd();
        let pickups_hr = pickups_hr(&self.by_location, self.index);
        let date_avgs = date_avgs(&self.by_date);
        let pickups_hdl = pickups_hdl(&self.by_neighborhood);

        log::info!(
            "Summarized {} trips: {} location rows, {} date rows, {} neighborhood rows",
            self.trips,
            pickups_hd.len(),
            date_avgs.len(),
            pickups_hdl.len()
        );

        Summaries {
            pickups_hd,
            pickups_hr,
            date_avgs,
            pickups_hdl,
        }
    }

    fn pickups_hd(&self) -> Vec<PickupsHdRow> {
        self.by_location
            .iter()
            .filter_map(|(&(coord, day, hour), totals)| {
                let label = self.index.lookup(&coord)?;
                Some(PickupsHdRow {
                    rounded_lon: coord.format_lon(),
                    rounded_lat: coord.format_lat(),
                    day,
                    hour,
                    passenger_count: totals.passengers,
                    trip_time_in_secs: totals.trip_secs,
                    trip_distance: totals.distance,
                    borough: label.borough.clone(),
                    neighborhood: label.neighborhood.clone(),
                })
            })
            .collect()
    }
}

fn pickups_hr(
    by_location: &BTreeMap<(RoundedCoordinate, u32, u32), LocationTotals>,
    index: &LocationIndex,
) -> Vec<PickupsHrRow> {
    let mut by_hour: BTreeMap<(u32, i64, i64), (RoundedCoordinate, u64)> = BTreeMap::new();
    for (&(coord, _, hour), totals) in by_location {
        if index.lookup(&coord).is_none() {
            continue;
        }
        by_hour
            .entry((hour, coord.lat_units(), coord.lon_units()))
            .or_insert((coord, 0))
            .1 += totals.passengers;
    }

    by_hour
        .into_iter()
        .map(|((hour, _, _), (coord, passengers))| PickupsHrRow {
            hour,
            rounded_lat: coord.format_lat(),
            rounded_lon: coord.format_lon(),
            passenger_count: passengers,
        })
        .collect()
}

#[allow(clippy::cast_precision_loss)]
fn date_avgs(by_date: &BTreeMap<(NaiveDate, TaxiType), DateTotals>) -> Vec<DateAvgRow> {
    let mut rows: Vec<DateAvgRow> = by_date
        .iter()
        .map(|(&(date, taxi_type), totals)| {
            let n = totals.pickups as f64;
            DateAvgRow {
                date,
                taxi_type,
                passenger_count: totals.passengers,
                fare_amount: totals.fare / n,
                tip_amount: totals.tip / n,
                trip_distance: totals.distance / n,
                total_pickups: totals.pickups,
            }
        })
        .collect();

    rows.sort_by_cached_key(|r| (r.date, r.taxi_type.to_string()));
    rows
}

/// Expands observed counts over every neighborhood, date, and hour seen,
/// filling gaps with zero. Hours in which no neighborhood saw a pickup
/// get no rows.
fn pickups_hdl(by_neighborhood: &BTreeMap<(NeighborhoodLabel, NaiveDate, u32), u64>) -> Vec<PickupsHdlRow> {
    let labels: BTreeSet<&NeighborhoodLabel> = by_neighborhood.keys().map(|(l, _, _)| l).collect();
    let dates: BTreeSet<NaiveDate> = by_neighborhood.keys().map(|&(_, d, _)| d).collect();
    let hours: BTreeSet<u32> = by_neighborhood.keys().map(|&(_, _, h)| h).collect();

    let mut rows = Vec::with_capacity(labels.len() * dates.len() * hours.len());
    for label in &labels {
        for &date in &dates {
            let holiday = is_federal_holiday(date);
            for &hour in &hours {
                let key = ((*label).clone(), date, hour);
                rows.push(PickupsHdlRow {
                    passenger_count: by_neighborhood.get(&key).copied().unwrap_or(0),
                    label: key.0,
                    date,
                    hour,
                    holiday,
                    day_of_week: date.weekday().num_days_from_monday(),
                    month: date.month(),
                });
            }
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use taxi_nbhd_geography_models::ResolvedLocation;

    use super::*;

    fn coord(lon: f64, lat: f64) -> RoundedCoordinate {
        RoundedCoordinate::from_degrees(lon, lat, 3).unwrap()
    }

    fn label(borough: &str, neighborhood: &str) -> NeighborhoodLabel {
        NeighborhoodLabel {
            borough: borough.to_string(),
            neighborhood: neighborhood.to_string(),
        }
    }

    fn index() -> LocationIndex {
        LocationIndex::from_locations(vec![
            ResolvedLocation::resolved(coord(-73.985, 40.748), label("Manhattan", "Midtown")),
            ResolvedLocation::resolved(coord(-73.944, 40.714), label("Brooklyn", "Williamsburg")),
        ])
    }

    fn trip(taxi_type: TaxiType, at: &str, lon: f64, lat: f64, passengers: u64) -> CleanTrip {
        CleanTrip {
            taxi_type,
            pickup_time: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
            coordinate: coord(lon, lat),
            passengers,
            trip_secs: 600,
            distance: 2.0,
            fare: 10.0,
            tip: 2.0,
            total: 12.5,
        }
    }

    fn build(trips: &[CleanTrip]) -> Summaries {
        let index = index();
        let mut builder = SummaryBuilder::new(&index);
        for t in trips {
            builder.add(t);
        }
        builder.finish()
    }

    #[test]
    fn location_totals_drop_uncached_coordinates() {
        let summaries = build(&[
            trip(TaxiType::Yellow, "2015-01-15 08:10:00", -73.985, 40.748, 1),
            trip(TaxiType::Green, "2015-01-15 08:50:00", -73.985, 40.748, 3),
            trip(TaxiType::Yellow, "2015-01-15 08:20:00", -73.5, 40.5, 2),
        ]);

        assert_eq!(summaries.pickups_hd.len(), 1);
        let row = &summaries.pickups_hd[0];
        assert_eq!(row.rounded_lon, "-73.985");
        assert_eq!(row.rounded_lat, "40.748");
        assert_eq!((row.day, row.hour), (3, 8));
        assert_eq!(row.passenger_count, 4);
        assert_eq!(row.trip_time_in_secs, 1_200);
        assert_eq!(row.neighborhood, "Midtown");

        assert_eq!(
            summaries.pickups_hr,
            vec![PickupsHrRow {
                hour: 8,
                rounded_lat: "40.748".to_string(),
                rounded_lon: "-73.985".to_string(),
                passenger_count: 4,
            }]
        );
    }

    #[test]
    fn date_averages_keep_every_clean_trip() {
        let mut cheap = trip(TaxiType::Yellow, "2015-01-15 08:20:00", -73.5, 40.5, 2);
        cheap.fare = 6.0;
        let summaries = build(&[
            trip(TaxiType::Yellow, "2015-01-15 08:10:00", -73.985, 40.748, 1),
            cheap,
            trip(TaxiType::Green, "2015-01-15 09:00:00", -73.944, 40.714, 1),
        ]);

        let types: Vec<TaxiType> = summaries.date_avgs.iter().map(|r| r.taxi_type).collect();
        assert_eq!(types, vec![TaxiType::Green, TaxiType::Yellow]);

        let yellow = &summaries.date_avgs[1];
        assert_eq!(yellow.total_pickups, 2);
        assert_eq!(yellow.passenger_count, 3);
        assert!((yellow.fare_amount - 8.0).abs() < 1e-9);
        assert!((yellow.tip_amount - 2.0).abs() < 1e-9);
    }

    #[test]
    fn neighborhood_table_is_zero_filled() {
        let summaries = build(&[
            trip(TaxiType::Yellow, "2015-07-03 08:10:00", -73.985, 40.748, 2),
            trip(TaxiType::Yellow, "2015-07-05 09:10:00", -73.944, 40.714, 1),
        ]);

        // 2 neighborhoods x 2 dates x 2 hours
        assert_eq!(summaries.pickups_hdl.len(), 8);
        let hours: BTreeSet<u32> = summaries.pickups_hdl.iter().map(|r| r.hour).collect();
        assert_eq!(hours, BTreeSet::from([8, 9]));
        let nonzero: Vec<&PickupsHdlRow> = summaries
            .pickups_hdl
            .iter()
            .filter(|r| r.passenger_count > 0)
            .collect();
        assert_eq!(nonzero.len(), 2);

        let first = &summaries.pickups_hdl[0];
        assert_eq!(first.label.borough, "Brooklyn");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2015, 7, 3).unwrap());
        assert_eq!(first.hour, 8);
        assert_eq!(first.passenger_count, 0);
        assert!(first.holiday);
        assert_eq!(first.day_of_week, 4);
        assert_eq!(first.month, 7);

        let last = summaries.pickups_hdl.last().unwrap();
        assert_eq!(last.label.neighborhood, "Midtown");
        assert!(!last.holiday);
        assert_eq!(last.day_of_week, 6);
    }

    #[test]
    fn empty_input_builds_empty_tables() {
        assert_eq!(build(&[]), Summaries::default());
    }
}
