#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory store of neighborhood polygons.
//!
//! Converts every loaded [`NeighborhoodPolygon`] into a [`geo::Polygon`]
//! once, computes its centroid, and records the union bounding box of all
//! vertices. The store is immutable after construction, so it can be
//! shared read-only across resolver workers.
//!
//! Polygons are addressed by their index in load order. The resolver
//! remembers the index of the last polygon that matched and retries it
//! first for the next coordinate.

use geo::{Centroid as _, Contains, LineString, Point, Polygon};
use taxi_nbhd_geography_models::{Bounds, Centroid, NeighborhoodLabel, NeighborhoodPolygon};
use thiserror::Error;

/// Errors that can occur while building a [`PolygonStore`].
#[derive(Debug, Error)]
pub enum SpatialError {
    /// No polygons were supplied, so the study area is undefined.
    #[error("Cannot build a polygon store from zero polygons")]
    Empty,
}

/// A polygon stored with its precomputed geometry and metadata.
#[derive(Debug)]
struct StoreEntry {
    source: NeighborhoodPolygon,
    label: NeighborhoodLabel,
    polygon: Polygon<f64>,
    centroid: (f64, f64),
}

/// Immutable collection of neighborhood polygons.
#[derive(Debug)]
pub struct PolygonStore {
    entries: Vec<StoreEntry>,
    bounds: Bounds,
}

impl PolygonStore {
    /// Builds the store, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::Empty`] if `polygons` is empty.
    pub fn load(polygons: Vec<NeighborhoodPolygon>) -> Result<Self, SpatialError> {
        let bounds = Bounds::from_points(polygons.iter().flat_map(|p| p.vertices.iter().copied()))
            .ok_or(SpatialError::Empty)?;

        let entries: Vec<StoreEntry> = polygons
            .into_iter()
            .map(|source| {
                let polygon = Polygon::new(LineString::from(source.vertices.clone()), vec![]);
                let centroid = planar_centroid(&polygon, &source.vertices);
                StoreEntry {
                    label: source.label(),
                    source,
                    polygon,
                    centroid,
                }
            })
            .collect();

        log::info!(
            "Loaded {} neighborhood polygons (lon {:.4}..{:.4}, lat {:.4}..{:.4})",
            entries.len(),
            bounds.min_lon,
            bounds.max_lon,
            bounds.min_lat,
            bounds.max_lat,
        );

        Ok(Self { entries, bounds })
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no polygons. Always `false` for a loaded store.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All polygons in load order.
    pub fn all_polygons(&self) -> impl Iterator<Item = &NeighborhoodPolygon> {
        self.entries.iter().map(|e| &e.source)
    }

    /// One centroid per polygon, in load order.
    #[must_use]
    pub fn centroids(&self) -> Vec<Centroid> {
        self.entries
            .iter()
            .map(|e| Centroid {
                lon: e.centroid.0,
                lat: e.centroid.1,
                neighborhood: e.source.neighborhood.clone(),
                borough: e.source.borough.clone(),
            })
            .collect()
    }

    /// Union bounding box of every polygon's vertices.
    ///
    /// A coarse admissibility filter: a point inside these bounds may
    /// still lie in no polygon.
    #[must_use]
    pub const fn global_bounds(&self) -> Bounds {
        self.bounds
    }

    /// Label of the polygon at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn label(&self, index: usize) -> &NeighborhoodLabel {
        &self.entries[index].label
    }

    /// Whether the polygon at `index` strictly contains the point.
    ///
    /// Points on the boundary are not contained. Out-of-range indices
    /// contain nothing.
    #[must_use]
    pub fn contains(&self, index: usize, lon: f64, lat: f64) -> bool {
        self.entries
            .get(index)
            .is_some_and(|e| e.polygon.contains(&Point::new(lon, lat)))
    }

    /// Index of the first polygon, in load order, that contains the point.
    #[must_use]
    pub fn first_containing(&self, lon: f64, lat: f64) -> Option<usize> {
        let point = Point::new(lon, lat);
        self.entries.iter().position(|e| e.polygon.contains(&point))
    }
}

/// Area-weighted centroid of a ring.
///
/// Falls back to the vertex average if `geo` cannot produce a centroid.
#[allow(clippy::cast_precision_loss)]
fn planar_centroid(polygon: &Polygon<f64>, vertices: &[(f64, f64)]) -> (f64, f64) {
    polygon.centroid().map_or_else(
        || {
            let n = vertices.len().max(1) as f64;
            let (sx, sy) = vertices
                .iter()
                .fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
            (sx / n, sy / n)
        },
        |p| (p.x(), p.y()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64, neighborhood: &str, borough: &str) -> NeighborhoodPolygon {
        NeighborhoodPolygon {
            vertices: vec![
                (x0, y0),
                (x0, y0 + size),
                (x0 + size, y0 + size),
                (x0 + size, y0),
            ],
            neighborhood: neighborhood.to_string(),
            borough: borough.to_string(),
        }
    }

    #[test]
    fn empty_store_is_rejected() {
        let err = PolygonStore::load(vec![]).unwrap_err();
        assert!(matches!(err, SpatialError::Empty));
    }

    #[test]
    fn debug_output_lists_polygons() {
        let store = PolygonStore::load(vec![square(0.0, 0.0, 1.0, "Alpha", "B1")]).unwrap();
        let text = format!("{store:?}");
        assert!(text.contains("Alpha"));
        assert!(text.contains("bounds"));
    }

    #[test]
    fn unit_square_centroid_is_its_center() {
        let store = PolygonStore::load(vec![square(0.0, 0.0, 1.0, "Alpha", "B1")]).unwrap();
        let centroids = store.centroids();
        assert_eq!(centroids.len(), 1);
        assert!((centroids[0].lon - 0.5).abs() < 1e-12);
        assert!((centroids[0].lat - 0.5).abs() < 1e-12);
        assert_eq!(centroids[0].neighborhood, "Alpha");
        assert_eq!(centroids[0].borough, "B1");
    }

    #[test]
    fn centroid_is_area_weighted_not_vertex_average() {
        // Extra collinear vertices along the bottom edge pull the vertex
        // average down but do not change the area centroid.
        let polygon = NeighborhoodPolygon {
            vertices: vec![
                (0.0, 0.0),
                (0.0, 2.0),
                (2.0, 2.0),
                (2.0, 0.0),
                (1.5, 0.0),
                (1.0, 0.0),
                (0.5, 0.0),
            ],
            neighborhood: "Skewed".to_string(),
            borough: "B1".to_string(),
        };
        let store = PolygonStore::load(vec![polygon]).unwrap();
        let c = &store.centroids()[0];
        assert!((c.lon - 1.0).abs() < 1e-12);
        assert!((c.lat - 1.0).abs() < 1e-12);
    }

    #[test]
    fn global_bounds_span_all_polygons() {
        let store = PolygonStore::load(vec![
            square(0.0, 0.0, 1.0, "A", "B1"),
            square(3.0, -2.0, 1.0, "B", "B2"),
        ])
        .unwrap();
        assert_eq!(
            store.global_bounds(),
            Bounds {
                min_lon: 0.0,
                max_lon: 4.0,
                min_lat: -2.0,
                max_lat: 1.0,
            }
        );
    }

    #[test]
    fn containment_is_per_polygon() {
        let store = PolygonStore::load(vec![
            square(0.0, 0.0, 1.0, "A", "B1"),
            square(2.0, 0.0, 1.0, "B", "B2"),
        ])
        .unwrap();
        assert!(store.contains(0, 0.5, 0.5));
        assert!(!store.contains(1, 0.5, 0.5));
        assert!(store.contains(1, 2.5, 0.5));
        assert!(!store.contains(7, 0.5, 0.5));
    }

    #[test]
    fn first_containing_prefers_earlier_polygon_on_overlap() {
        let store = PolygonStore::load(vec![
            square(0.0, 0.0, 2.0, "Big", "B1"),
            square(0.5, 0.5, 1.0, "Small", "B1"),
        ])
        .unwrap();
        assert_eq!(store.first_containing(1.0, 1.0), Some(0));
        assert_eq!(store.first_containing(5.0, 5.0), None);
    }

    #[test]
    fn preserves_load_order() {
        let store = PolygonStore::load(vec![
            square(0.0, 0.0, 1.0, "First", "B1"),
            square(2.0, 0.0, 1.0, "Second", "B2"),
        ])
        .unwrap();
        let names: Vec<&str> = store.all_polygons().map(|p| p.neighborhood.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(store.label(1).borough, "B2");
    }
}
