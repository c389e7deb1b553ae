//! Subcommand implementations.

use std::path::Path;
use std::time::Instant;

use taxi_nbhd_cache::LocationIndex;
use taxi_nbhd_cli_utils::{IndicatifProgress, MultiProgress};
use taxi_nbhd_geography_models::RoundedCoordinate;
use taxi_nbhd_neighborhood::tables;
use taxi_nbhd_storage::paths;
use taxi_nbhd_summary::WeatherTable;
use taxi_nbhd_trip::{CoordinateSelection, discover_trip_files};

use crate::config::PipelineConfig;

type CommandResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Loads the boundary file and writes the centroid and border tables.
pub fn boundaries(config: &PipelineConfig) -> CommandResult {
    let start = Instant::now();
    let store =
        taxi_nbhd_neighborhood::load_store(&config.neighborhoods_path(), &config.properties)?;

    tables::write_centroids(
        &paths::centroids_path(&config.data_dir),
        &tables::centroid_table(&store),
    )?;
    tables::write_borders(
        &paths::borders_path(&config.data_dir),
        &tables::border_table(&store),
    )?;

    log::info!(
        "Boundary tables for {} polygons written in {:.1}s",
        store.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Resolves every distinct trip coordinate and writes the location cache.
pub fn locations(config: &PipelineConfig, multi: &MultiProgress) -> CommandResult {
    let start = Instant::now();
    let store =
        taxi_nbhd_neighborhood::load_store(&config.neighborhoods_path(), &config.properties)?;

    let files = discover_trip_files(&config.data_dir, &config.trip_globs)?;
    if files.is_empty() {
        log::warn!(
            "No trip files matching {:?} in {}",
            config.trip_globs,
            config.data_dir.display()
        );
    }

    let selection = if config.include_dropoffs {
        CoordinateSelection::PickupAndDropoff
    } else {
        CoordinateSelection::PickupOnly
    };
    let files_bar = IndicatifProgress::files_bar(multi, "Collecting coordinates");
    let coords = taxi_nbhd_trip::dedup::extract_from_files(
        &files,
        config.rounding_decimals,
        selection,
        &*files_bar,
    )?;

    let coords_bar = IndicatifProgress::coordinates_bar(multi, "Resolving neighborhoods");
    let resolution = if config.threads > 1 {
        taxi_nbhd_resolver::resolve_parallel(&coords, &store, config.threads, &*coords_bar)?
    } else {
        taxi_nbhd_resolver::resolve_with_progress(&coords, &store, &*coords_bar)
    };

    let resolved = taxi_nbhd_resolver::resolved_only(resolution.locations);
    taxi_nbhd_cache::persist(&paths::locations_path(&config.data_dir), &resolved)?;

    log::info!(
        "Location cache built in {:.1}s",
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Looks up one raw coordinate in the location cache.
pub fn lookup(config: &PipelineConfig, lon: f64, lat: f64) -> CommandResult<String> {
    let coord = RoundedCoordinate::from_degrees(lon, lat, config.rounding_decimals)
        .ok_or_else(|| format!("Invalid coordinate ({lon}, {lat})"))?;
    let index = LocationIndex::open(
        &paths::locations_path(&config.data_dir),
        config.rounding_decimals,
    )?;

    Ok(index.lookup(&coord).map_or_else(
        || format!("{coord}\tunresolved"),
        |label| format!("{coord}\t{}\t{}", label.borough, label.neighborhood),
    ))
}

/// Builds the trip summaries from the location cache.
pub fn summarize(
    config: &PipelineConfig,
    multi: &MultiProgress,
    weather: Option<&Path>,
) -> CommandResult {
    let start = Instant::now();
    let index = LocationIndex::open(
        &paths::locations_path(&config.data_dir),
        config.rounding_decimals,
    )?;
    let weather = weather.map(WeatherTable::load).transpose()?;

    let files = discover_trip_files(&config.data_dir, &config.trip_globs)?;
    let bar = IndicatifProgress::files_bar(multi, "Summarizing trips");
    let summaries =
        taxi_nbhd_summary::summarize_files(&files, &index, config.rounding_decimals, &*bar)?;
    taxi_nbhd_summary::write_summaries(&config.data_dir, &summaries, weather.as_ref())?;

    log::info!("Summaries written in {:.1}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Runs every stage in order.
pub fn all(config: &PipelineConfig, multi: &MultiProgress, weather: Option<&Path>) -> CommandResult {
    boundaries(config)?;
    locations(config, multi)?;
    summarize(config, multi, weather)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-74.0, 40.7], [-74.0, 40.8], [-73.9, 40.8], [-73.9, 40.7], [-74.0, 40.7]]]
            },
            "properties": { "neighborhood": "Alpha", "borough": "B1" }
        }]
    }"#;

    const TRIPS: &str = "\
        pickup_datetime,dropoff_datetime,passenger_count,trip_distance,pickup_longitude,pickup_latitude,\
        dropoff_longitude,dropoff_latitude,fare_amount,tip_amount,total_amount\n\
        2015-01-15 08:00:00,2015-01-15 08:10:00,1,2.0,-73.95012,40.75021,-73.5,40.5,9.5,1.0,11.3\n";

    fn setup() -> (tempfile::TempDir, PipelineConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nyc_neighborhoods.json"), SQUARE).unwrap();
        std::fs::write(dir.path().join("yellow_2015_01.csv"), TRIPS).unwrap();
        let config = PipelineConfig {
            data_dir: dir.path().to_path_buf(),
            ..PipelineConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn pipeline_builds_cache_and_answers_lookups() {
        let (dir, config) = setup();
        let multi = MultiProgress::new();

        all(&config, &multi, None).unwrap();

        for name in [
            paths::CENTROIDS_FILE,
            paths::BORDERS_FILE,
            paths::LOCATIONS_FILE,
            paths::PICKUPS_HDL_FILE,
        ] {
            assert!(dir.path().join(name).exists(), "{name}");
        }

        assert_eq!(
            lookup(&config, -73.9501, 40.7502).unwrap(),
            "(-73.950, 40.750)\tB1\tAlpha"
        );
        assert_eq!(
            lookup(&config, -73.5, 40.5).unwrap(),
            "(-73.500, 40.500)\tunresolved"
        );
    }

    #[test]
    fn parallel_resolution_writes_same_cache() {
        let (dir, config) = setup();
        let multi = MultiProgress::new();
        let cache = dir.path().join(paths::LOCATIONS_FILE);

        locations(&config, &multi).unwrap();
        let sequential = taxi_nbhd_cache::load(&cache, 3).unwrap();

        let parallel_config = PipelineConfig {
            threads: 4,
            ..config
        };
        locations(&parallel_config, &multi).unwrap();
        let parallel = taxi_nbhd_cache::load(&cache, 3).unwrap();

        assert_eq!(sequential.len(), 1);
        assert_eq!(sequential, parallel);
    }
}
