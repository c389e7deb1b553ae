#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared geographic types for the taxi neighborhood pipeline.
//!
//! Defines neighborhood polygons and the rows derived from them
//! (centroids, border points), plus the quantized [`RoundedCoordinate`]
//! key and the [`ResolvedLocation`] produced by assigning a coordinate to
//! a neighborhood.

pub mod coordinate;

use serde::{Deserialize, Serialize};

pub use coordinate::{
    Bounds, DEFAULT_ROUNDING_DECIMALS, MAX_ROUNDING_DECIMALS, RoundedCoordinate,
};

/// A neighborhood boundary as loaded from the feature collection.
///
/// The vertex ring is kept exactly as supplied, so a trailing vertex equal
/// to the first may or may not be present.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodPolygon {
    /// Outer ring as `(lon, lat)` pairs, in source order.
    pub vertices: Vec<(f64, f64)>,
    /// Neighborhood name. Not unique on its own across boroughs.
    pub neighborhood: String,
    /// Borough name.
    pub borough: String,
}

impl NeighborhoodPolygon {
    /// Returns the `(borough, neighborhood)` label for this polygon.
    #[must_use]
    pub fn label(&self) -> NeighborhoodLabel {
        NeighborhoodLabel {
            borough: self.borough.clone(),
            neighborhood: self.neighborhood.clone(),
        }
    }
}

/// The identity a coordinate resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeighborhoodLabel {
    /// Borough name.
    pub borough: String,
    /// Neighborhood name.
    pub neighborhood: String,
}

/// Planar centroid of one neighborhood polygon.
///
/// Field order matches the persisted centroid table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    /// Centroid longitude.
    pub lon: f64,
    /// Centroid latitude.
    pub lat: f64,
    /// Neighborhood name.
    pub neighborhood: String,
    /// Borough name.
    pub borough: String,
}

/// One vertex of a neighborhood border, as written to the border table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderPoint {
    /// Vertex longitude.
    pub lon: f64,
    /// Vertex latitude.
    pub lat: f64,
    /// Neighborhood name.
    pub neighborhood: String,
    /// Borough name.
    pub borough: String,
}

/// The outcome of resolving one [`RoundedCoordinate`].
///
/// `label` is `None` when no polygon contains the coordinate. Unresolved
/// locations are kept through resolution and dropped before persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedLocation {
    /// The coordinate that was resolved.
    pub coordinate: RoundedCoordinate,
    /// Containing neighborhood, if any.
    pub label: Option<NeighborhoodLabel>,
}

impl ResolvedLocation {
    /// Creates a location resolved to `label`.
    #[must_use]
    pub const fn resolved(coordinate: RoundedCoordinate, label: NeighborhoodLabel) -> Self {
        Self {
            coordinate,
            label: Some(label),
        }
    }

    /// Creates a location with no containing neighborhood.
    #[must_use]
    pub const fn unresolved(coordinate: RoundedCoordinate) -> Self {
        Self {
            coordinate,
            label: None,
        }
    }

    /// Whether a containing neighborhood was found.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.label.is_some()
    }

    /// Borough name, if resolved.
    #[must_use]
    pub fn borough(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.borough.as_str())
    }

    /// Neighborhood name, if resolved.
    #[must_use]
    pub fn neighborhood(&self) -> Option<&str> {
        self.label.as_ref().map(|l| l.neighborhood.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unresolved_location_has_no_names() {
        let coord = RoundedCoordinate::from_degrees(-73.9, 40.7, 3).unwrap();
        let loc = ResolvedLocation::unresolved(coord);
        assert!(!loc.is_resolved());
        assert_eq!(loc.borough(), None);
        assert_eq!(loc.neighborhood(), None);
    }

    #[test]
    fn resolved_location_exposes_names() {
        let coord = RoundedCoordinate::from_degrees(-73.9, 40.7, 3).unwrap();
        let loc = ResolvedLocation::resolved(
            coord,
            NeighborhoodLabel {
                borough: "Manhattan".to_string(),
                neighborhood: "Chelsea".to_string(),
            },
        );
        assert!(loc.is_resolved());
        assert_eq!(loc.borough(), Some("Manhattan"));
        assert_eq!(loc.neighborhood(), Some("Chelsea"));
    }

    #[test]
    fn polygon_label_copies_names() {
        let polygon = NeighborhoodPolygon {
            vertices: vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)],
            neighborhood: "Alpha".to_string(),
            borough: "B1".to_string(),
        };
        let label = polygon.label();
        assert_eq!(label.borough, "B1");
        assert_eq!(label.neighborhood, "Alpha");
    }
}
