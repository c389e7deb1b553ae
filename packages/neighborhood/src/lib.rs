#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood boundary loading and export.
//!
//! Reads a `GeoJSON` `FeatureCollection` of neighborhood polygons,
//! normalizes each feature into a [`NeighborhoodPolygon`], and builds the
//! [`PolygonStore`] the resolver runs against. Also writes the derived
//! centroid and border tables consumed by downstream visualization.

pub mod normalize;
pub mod tables;

use std::io::Read as _;
use std::path::Path;

use taxi_nbhd_geography_models::NeighborhoodPolygon;
use taxi_nbhd_neighborhood_models::NeighborhoodFieldMapping;
use taxi_nbhd_spatial::{PolygonStore, SpatialError};
use thiserror::Error;

/// Errors that can occur during neighborhood operations.
#[derive(Debug, Error)]
pub enum NeighborhoodError {
    /// A feature lacks usable geometry or required properties. The whole
    /// collection is rejected.
    #[error("Malformed feature #{index}: {message}")]
    MalformedFeature {
        /// Position of the feature in the collection.
        index: usize,
        /// Description of what is missing.
        message: String,
    },

    /// The document is valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The polygon store could not be built.
    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Parses a `GeoJSON` document into neighborhood polygons.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the text is not a `FeatureCollection`
/// or any feature is malformed.
pub fn parse_polygons(
    text: &str,
    fields: &NeighborhoodFieldMapping,
) -> Result<Vec<NeighborhoodPolygon>, NeighborhoodError> {
    let geojson: geojson::GeoJson = text.parse()?;
    let geojson::GeoJson::FeatureCollection(collection) = geojson else {
        return Err(NeighborhoodError::NotFeatureCollection);
    };

    normalize::normalize_features(&collection.features, fields)
}

/// Reads neighborhood polygons from a `GeoJSON` file (optionally gzipped).
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the file cannot be read or parsed.
pub fn read_polygons(
    path: &Path,
    fields: &NeighborhoodFieldMapping,
) -> Result<Vec<NeighborhoodPolygon>, NeighborhoodError> {
    log::info!("Reading neighborhood boundaries from {}", path.display());

    let mut text = String::new();
    taxi_nbhd_storage::io::open_reader(path)?.read_to_string(&mut text)?;

    let polygons = parse_polygons(&text, fields)?;
    log::info!("Parsed {} neighborhood features", polygons.len());
    Ok(polygons)
}

/// Reads a boundary file and builds the [`PolygonStore`] from it.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if reading, parsing, or store
/// construction fails.
pub fn load_store(
    path: &Path,
    fields: &NeighborhoodFieldMapping,
) -> Result<PolygonStore, NeighborhoodError> {
    let polygons = read_polygons(path, fields)?;
    Ok(PolygonStore::load(polygons)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALPHA: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]
            },
            "properties": { "neighborhood": "Alpha", "borough": "B1" }
        }]
    }"#;

    #[test]
    fn parses_single_feature_collection() {
        let polygons = parse_polygons(ALPHA, &NeighborhoodFieldMapping::default()).unwrap();
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0].neighborhood, "Alpha");
        assert_eq!(polygons[0].borough, "B1");
        assert_eq!(polygons[0].vertices.len(), 5);
    }

    #[test]
    fn rejects_bare_geometry() {
        let text = r#"{ "type": "Point", "coordinates": [0, 0] }"#;
        let err = parse_polygons(text, &NeighborhoodFieldMapping::default()).unwrap_err();
        assert!(matches!(err, NeighborhoodError::NotFeatureCollection));
    }

    #[test]
    fn rejects_invalid_json() {
        let err = parse_polygons("{ not json", &NeighborhoodFieldMapping::default()).unwrap_err();
        assert!(matches!(err, NeighborhoodError::GeoJson(_)));
    }

    #[test]
    fn loads_store_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nyc_neighborhoods.json");
        std::fs::write(&path, ALPHA).unwrap();

        let store = load_store(&path, &NeighborhoodFieldMapping::default()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(0, 0.5, 0.5));
    }

    #[test]
    fn empty_collection_cannot_build_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{ "type": "FeatureCollection", "features": [] }"#).unwrap();

        let err = load_store(&path, &NeighborhoodFieldMapping::default()).unwrap_err();
        assert!(matches!(err, NeighborhoodError::Spatial(SpatialError::Empty)));
    }
}
