//! Centroid and border tables derived from the polygon store.
//!
//! Both tables use the columns `lon,lat,neighborhood,borough` and are
//! written as CSV (gzip when the path ends in `.gz`).

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;
use taxi_nbhd_geography_models::{BorderPoint, Centroid};
use taxi_nbhd_spatial::PolygonStore;

use crate::NeighborhoodError;

/// One centroid per `(borough, neighborhood)` pair, first polygon wins.
#[must_use]
pub fn centroid_table(store: &PolygonStore) -> Vec<Centroid> {
    let mut seen = BTreeSet::new();
    store
        .centroids()
        .into_iter()
        .filter(|c| seen.insert((c.borough.clone(), c.neighborhood.clone())))
        .collect()
}

/// Every polygon vertex as a border row, with exact duplicates removed.
#[must_use]
pub fn border_table(store: &PolygonStore) -> Vec<BorderPoint> {
    let mut seen = BTreeSet::new();
    let mut rows = Vec::new();

    for polygon in store.all_polygons() {
        for &(lon, lat) in &polygon.vertices {
            let key = (
                lon.to_bits(),
                lat.to_bits(),
                polygon.neighborhood.as_str(),
                polygon.borough.as_str(),
            );
            if seen.insert(key) {
                rows.push(BorderPoint {
                    lon,
                    lat,
                    neighborhood: polygon.neighborhood.clone(),
                    borough: polygon.borough.clone(),
                });
            }
        }
    }

    rows
}

/// Writes the centroid table to `path`.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the file cannot be written.
pub fn write_centroids(path: &Path, rows: &[Centroid]) -> Result<(), NeighborhoodError> {
    write_rows(path, rows)?;
    log::info!("Wrote {} centroids to {}", rows.len(), path.display());
    Ok(())
}

/// Writes the border table to `path`.
///
/// # Errors
///
/// Returns [`NeighborhoodError`] if the file cannot be written.
pub fn write_borders(path: &Path, rows: &[BorderPoint]) -> Result<(), NeighborhoodError> {
    write_rows(path, rows)?;
    log::info!("Wrote {} border points to {}", rows.len(), path.display());
    Ok(())
}

fn write_rows<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), NeighborhoodError> {
    taxi_nbhd_storage::io::write_atomic(path, |out| {
        let mut wtr = csv::Writer::from_writer(out);
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    })
}
