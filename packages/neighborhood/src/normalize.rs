//! Normalizes raw `GeoJSON` features into [`NeighborhoodPolygon`] values.
//!
//! Uses the configured [`NeighborhoodFieldMapping`] to pull the
//! neighborhood and borough names from each feature's properties, and
//! takes the outer ring of its `Polygon` geometry. Unlike a best-effort
//! import, any unusable feature rejects the whole collection: a partial
//! neighborhood map would silently misassign trips.

use geojson::{Feature, Value};
use taxi_nbhd_geography_models::NeighborhoodPolygon;
use taxi_nbhd_neighborhood_models::NeighborhoodFieldMapping;

use crate::NeighborhoodError;

/// Minimum number of vertices in an outer ring.
pub const MIN_RING_VERTICES: usize = 3;

/// Normalizes every feature, in order.
///
/// # Errors
///
/// Returns [`NeighborhoodError::MalformedFeature`] for the first feature
/// that cannot be normalized.
pub fn normalize_features(
    features: &[Feature],
    fields: &NeighborhoodFieldMapping,
) -> Result<Vec<NeighborhoodPolygon>, NeighborhoodError> {
    features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            normalize_feature(feature, fields)
                .map_err(|message| NeighborhoodError::MalformedFeature { index, message })
        })
        .collect()
}

/// Normalizes a single feature, describing the problem on failure.
fn normalize_feature(
    feature: &Feature,
    fields: &NeighborhoodFieldMapping,
) -> Result<NeighborhoodPolygon, String> {
    let neighborhood = string_property(feature, &fields.neighborhood)?;
    let borough = string_property(feature, &fields.borough)?;

    let geometry = feature
        .geometry
        .as_ref()
        .ok_or_else(|| "missing geometry".to_string())?;

    let Value::Polygon(rings) = &geometry.value else {
        return Err(format!(
            "expected Polygon geometry, found {}",
            geometry_kind(&geometry.value)
        ));
    };

    let outer = rings
        .first()
        .ok_or_else(|| "polygon has no rings".to_string())?;

    if outer.len() < MIN_RING_VERTICES {
        return Err(format!(
            "outer ring has {} vertices, need at least {MIN_RING_VERTICES}",
            outer.len()
        ));
    }

    let vertices = outer
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => Ok((*lon, *lat)),
            _ => Err("vertex has fewer than two ordinates".to_string()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NeighborhoodPolygon {
        vertices,
        neighborhood,
        borough,
    })
}

const fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

fn string_property(feature: &Feature, key: &str) -> Result<String, String> {
    feature
        .properties
        .as_ref()
        .and_then(|props| props.get(key))
        .and_then(serde_json::Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| format!("missing string property '{key}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(json: &str) -> Feature {
        json.parse().unwrap()
    }

    fn malformed_message(features: &[Feature]) -> (usize, String) {
        match normalize_features(features, &NeighborhoodFieldMapping::default()) {
            Err(NeighborhoodError::MalformedFeature { index, message }) => (index, message),
            other => panic!("expected malformed feature, got {other:?}"),
        }
    }

    const GOOD: &str = r#"{
        "type": "Feature",
        "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1]]] },
        "properties": { "neighborhood": "Alpha", "borough": "B1" }
    }"#;

    #[test]
    fn keeps_outer_ring_only() {
        let f = feature(
            r#"{
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0, 0], [0, 4], [4, 4], [4, 0], [0, 0]],
                    [[1, 1], [1, 2], [2, 2], [1, 1]]
                ]
            },
            "properties": { "neighborhood": "Holey", "borough": "B1" }
        }"#,
        );
        let polygons = normalize_features(&[f], &NeighborhoodFieldMapping::default()).unwrap();
        assert_eq!(polygons[0].vertices[1], (0.0, 4.0));
        assert_eq!(polygons[0].vertices.len(), 5);
    }

    #[test]
    fn uses_configured_property_names() {
        let f = feature(
            r#"{
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1]]] },
            "properties": { "ntaname": "Chelsea", "boroname": "Manhattan" }
        }"#,
        );
        let fields = NeighborhoodFieldMapping {
            neighborhood: "ntaname".to_string(),
            borough: "boroname".to_string(),
        };
        let polygons = normalize_features(&[f], &fields).unwrap();
        assert_eq!(polygons[0].neighborhood, "Chelsea");
        assert_eq!(polygons[0].borough, "Manhattan");
    }

    #[test]
    fn missing_geometry_is_malformed() {
        let bad = feature(
            r#"{ "type": "Feature", "geometry": null,
                 "properties": { "neighborhood": "A", "borough": "B" } }"#,
        );
        let (index, message) = malformed_message(&[feature(GOOD), bad]);
        assert_eq!(index, 1);
        assert!(message.contains("geometry"));
    }

    #[test]
    fn missing_borough_is_malformed() {
        let bad = feature(
            r#"{ "type": "Feature",
                 "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1]]] },
                 "properties": { "neighborhood": "A" } }"#,
        );
        let (index, message) = malformed_message(&[bad]);
        assert_eq!(index, 0);
        assert!(message.contains("borough"));
    }

    #[test]
    fn non_string_property_is_malformed() {
        let bad = feature(
            r#"{ "type": "Feature",
                 "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [0, 1], [1, 1]]] },
                 "properties": { "neighborhood": 7, "borough": "B" } }"#,
        );
        let (_, message) = malformed_message(&[bad]);
        assert!(message.contains("neighborhood"));
    }

    #[test]
    fn non_polygon_geometry_is_malformed() {
        let bad = feature(
            r#"{ "type": "Feature",
                 "geometry": { "type": "Point", "coordinates": [0, 0] },
                 "properties": { "neighborhood": "A", "borough": "B" } }"#,
        );
        let (_, message) = malformed_message(&[bad]);
        assert!(message.contains("Point"));
    }

    #[test]
    fn short_ring_is_malformed() {
        let bad = feature(
            r#"{ "type": "Feature",
                 "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [0, 1]]] },
                 "properties": { "neighborhood": "A", "borough": "B" } }"#,
        );
        let (_, message) = malformed_message(&[bad]);
        assert!(message.contains("at least 3"));
    }
}
