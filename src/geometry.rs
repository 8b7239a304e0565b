//! Geometry helpers for sector shapes.
//!
//! Shapes travel as GeoJSON `Feature`s wrapping a single `Polygon` whose outer
//! ring is closed (first position repeated at the end). Area and intersection
//! tests are delegated to the `geo` crate.

use geo::{ChamberlainDuquetteArea, Contains, Intersects, Line, LineString, Point, Polygon};
use geojson::{Feature, Geometry, JsonObject, PolygonType, Position, Value};
use serde::{Deserialize, Serialize};

/// Minimum number of distinct vertices for a drawn polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Minimum number of positions in a closed ring (triangle plus closing point).
pub const MIN_RING_POSITIONS: usize = MIN_POLYGON_VERTICES + 1;

const SQUARE_METERS_PER_SQUARE_KM: f64 = 1_000_000.0;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    fn to_position(self) -> Position {
        vec![self.lng, self.lat]
    }

    fn to_point(self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

/// Errors raised when a shape does not satisfy the sector geometry rules.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Feature has no geometry")]
    MissingGeometry,

    #[error("Unsupported geometry type '{0}', expected Polygon")]
    NotAPolygon(String),

    #[error("Polygon has no outer ring")]
    MissingRing,

    #[error("Ring has {found} positions, at least {MIN_RING_POSITIONS} are required")]
    TooFewPositions { found: usize },

    #[error("Ring is not closed")]
    OpenRing,

    #[error("Position {index} is not a valid longitude/latitude pair")]
    InvalidPosition { index: usize },

    #[error("Polygon edges must not intersect")]
    SelfIntersecting,
}

/// Build a polygon feature from drawn vertices.
///
/// The vertices form an open ring; the closing position is appended here. A
/// ring that is already closed is accepted as well.
pub fn feature_from_vertices(vertices: &[LngLat]) -> Result<Feature, GeometryError> {
    let mut open: Vec<LngLat> = vertices.to_vec();
    if open.len() > 1 && open.first() == open.last() {
        open.pop();
    }
    if open.len() < MIN_POLYGON_VERTICES {
        return Err(GeometryError::TooFewPositions {
            found: open.len() + 1,
        });
    }
    if let Some(index) = open.iter().position(|v| !v.lng.is_finite() || !v.lat.is_finite()) {
        return Err(GeometryError::InvalidPosition { index });
    }
    if ring_self_intersects(&open) {
        return Err(GeometryError::SelfIntersecting);
    }

    let mut ring: Vec<Position> = open.iter().map(|v| v.to_position()).collect();
    ring.push(open[0].to_position());

    Ok(Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    })
}

/// Coordinate rings of a polygon feature, outer ring first.
pub fn polygon_rings(feature: &Feature) -> Option<&PolygonType> {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Polygon(rings)) => Some(rings),
        _ => None,
    }
}

/// Outer ring of a polygon feature.
pub fn outer_ring(feature: &Feature) -> Option<&Vec<Position>> {
    polygon_rings(feature).and_then(|rings| rings.first())
}

/// Vertices of the outer ring without the closing position.
pub fn ring_vertices(feature: &Feature) -> Vec<LngLat> {
    let Some(ring) = outer_ring(feature) else {
        return Vec::new();
    };
    let mut vertices: Vec<LngLat> = ring
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| LngLat::new(p[0], p[1]))
        .collect();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}

/// Check that a feature holds a closed polygon ring with enough positions.
pub fn validate_polygon(feature: &Feature) -> Result<(), GeometryError> {
    let geometry = feature
        .geometry
        .as_ref()
        .ok_or(GeometryError::MissingGeometry)?;
    let rings = match &geometry.value {
        Value::Polygon(rings) => rings,
        other => return Err(GeometryError::NotAPolygon(value_type_name(other).to_string())),
    };
    let ring = rings.first().ok_or(GeometryError::MissingRing)?;
    if ring.len() < MIN_RING_POSITIONS {
        return Err(GeometryError::TooFewPositions { found: ring.len() });
    }
    if let Some(index) = ring
        .iter()
        .position(|p| p.len() < 2 || !p[0].is_finite() || !p[1].is_finite())
    {
        return Err(GeometryError::InvalidPosition { index });
    }
    if ring.first().map(|p| &p[..2]) != ring.last().map(|p| &p[..2]) {
        return Err(GeometryError::OpenRing);
    }
    Ok(())
}

/// Convert a polygon feature into a `geo` polygon.
pub fn to_geo_polygon(feature: &Feature) -> Result<Polygon<f64>, GeometryError> {
    let rings = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Polygon(rings)) => rings,
        Some(other) => return Err(GeometryError::NotAPolygon(value_type_name(other).to_string())),
        None => return Err(GeometryError::MissingGeometry),
    };
    let mut line_strings = rings
        .iter()
        .map(|ring| ring_to_line_string(ring))
        .collect::<Result<Vec<_>, _>>()?;
    if line_strings.is_empty() {
        return Err(GeometryError::MissingRing);
    }
    let exterior = line_strings.remove(0);
    Ok(Polygon::new(exterior, line_strings))
}

fn value_type_name(value: &Value) -> &'static str {
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

fn ring_to_line_string(ring: &[Position]) -> Result<LineString<f64>, GeometryError> {
    ring.iter()
        .enumerate()
        .map(|(index, p)| match p.as_slice() {
            [lng, lat, ..] if lng.is_finite() && lat.is_finite() => Ok((*lng, *lat)),
            _ => Err(GeometryError::InvalidPosition { index }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::from)
}

/// Area of a polygon feature in square kilometers, rounded to two decimals.
///
/// Uses the spherical Chamberlain-Duquette formula on the WGS84 equatorial
/// radius. Malformed shapes yield `0.0`; the failure is logged.
pub fn area_km2(feature: &Feature) -> f64 {
    match to_geo_polygon(feature) {
        Ok(polygon) => {
            let square_meters = polygon.chamberlain_duquette_unsigned_area();
            if square_meters.is_finite() {
                round_to_hundredths(square_meters / SQUARE_METERS_PER_SQUARE_KM)
            } else {
                log::error!("Area computation produced a non-finite value");
                0.0
            }
        }
        Err(e) => {
            log::error!("Error calculating area: {}", e);
            0.0
        }
    }
}

/// Round to two decimal places.
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Whether a position lies inside the polygon (holes excluded).
pub fn contains(feature: &Feature, position: LngLat) -> bool {
    to_geo_polygon(feature)
        .map(|polygon| polygon.contains(&position.to_point()))
        .unwrap_or(false)
}

/// Whether the closed ring through `vertices` has crossing edges.
///
/// Adjacent edges share an endpoint and are not compared.
pub fn ring_self_intersects(vertices: &[LngLat]) -> bool {
    let n = vertices.len();
    if n < 4 {
        return false;
    }
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| {
            let a = vertices[i];
            let b = vertices[(i + 1) % n];
            Line::new((a.lng, a.lat), (b.lng, b.lat))
        })
        .collect();

    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                return true;
            }
        }
    }
    false
}

/// Whether extending the open path `vertices` to `next` makes the new edge
/// cross one of the existing edges.
///
/// The last existing edge shares an endpoint with the new one and is skipped.
pub fn extension_crosses_path(vertices: &[LngLat], next: LngLat) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let last = vertices[n - 1];
    let new_edge = Line::new((last.lng, last.lat), (next.lng, next.lat));
    vertices[..n - 1].windows(2).any(|pair| {
        Line::new((pair[0].lng, pair[0].lat), (pair[1].lng, pair[1].lat)).intersects(&new_edge)
    })
}

/// Return a copy of the feature with a `style` object merged into its properties.
pub fn with_style(feature: &Feature, style: serde_json::Value) -> Feature {
    let mut styled = feature.clone();
    styled
        .properties
        .get_or_insert_with(JsonObject::new)
        .insert("style".to_string(), style);
    styled
}

/// Format a `[lng, lat]` position for display as `"lat, lng"` with four decimals.
pub fn format_position(position: &[f64]) -> String {
    match position {
        [lng, lat, ..] => format!("{:.4}, {:.4}", lat, lng),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Side length in degrees of a 1 km square on the equator.
    fn one_km_in_degrees() -> f64 {
        (1000.0_f64 / 6_378_137.0).to_degrees()
    }

    fn square(side: f64) -> Vec<LngLat> {
        vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(side, 0.0),
            LngLat::new(side, side),
            LngLat::new(0.0, side),
        ]
    }

    #[test]
    fn test_feature_from_vertices_closes_ring() {
        let feature = feature_from_vertices(&square(1.0)).unwrap();
        let ring = outer_ring(&feature).unwrap();
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        assert!(validate_polygon(&feature).is_ok());
    }

    #[test]
    fn test_feature_from_already_closed_ring() {
        let mut vertices = square(1.0);
        vertices.push(vertices[0]);
        let feature = feature_from_vertices(&vertices).unwrap();
        assert_eq!(outer_ring(&feature).unwrap().len(), 5);
    }

    #[test]
    fn test_too_few_vertices_rejected() {
        let err = feature_from_vertices(&[LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0)]);
        assert!(matches!(err, Err(GeometryError::TooFewPositions { .. })));
    }

    #[test]
    fn test_bow_tie_rejected() {
        let bow_tie = vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(1.0, 1.0),
            LngLat::new(1.0, 0.0),
            LngLat::new(0.0, 1.0),
        ];
        assert!(ring_self_intersects(&bow_tie));
        assert_eq!(
            feature_from_vertices(&bow_tie),
            Err(GeometryError::SelfIntersecting)
        );
        assert!(!ring_self_intersects(&square(1.0)));
    }

    #[test]
    fn test_one_km_square_area() {
        let feature = feature_from_vertices(&square(one_km_in_degrees())).unwrap();
        let area = area_km2(&feature);
        assert!((area - 1.0).abs() < 0.011, "area was {}", area);
    }

    fn feature_with(value: Option<Value>) -> Feature {
        Feature {
            bbox: None,
            geometry: value.map(Geometry::new),
            id: None,
            properties: None,
            foreign_members: None,
        }
    }

    #[test]
    fn test_area_fails_soft() {
        let point = feature_with(Some(Value::Point(vec![175.0, -37.0])));
        assert_eq!(area_km2(&point), 0.0);
        assert_eq!(area_km2(&feature_with(None)), 0.0);
        assert_eq!(
            validate_polygon(&point),
            Err(GeometryError::NotAPolygon("Point".to_string()))
        );
    }

    #[test]
    fn test_validate_open_ring() {
        let feature = feature_with(Some(Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
        ]])));
        assert_eq!(validate_polygon(&feature), Err(GeometryError::OpenRing));
    }

    #[test]
    fn test_contains() {
        let feature = feature_from_vertices(&square(1.0)).unwrap();
        assert!(contains(&feature, LngLat::new(0.5, 0.5)));
        assert!(!contains(&feature, LngLat::new(1.5, 0.5)));
    }

    #[test]
    fn test_ring_vertices_drops_closing_point() {
        let feature = feature_from_vertices(&square(2.0)).unwrap();
        assert_eq!(ring_vertices(&feature), square(2.0));
    }

    #[test]
    fn test_with_style_keeps_existing_properties() {
        let mut feature = feature_from_vertices(&square(1.0)).unwrap();
        feature
            .properties
            .get_or_insert_with(JsonObject::new)
            .insert("source".to_string(), serde_json::json!("survey"));
        let styled = with_style(&feature, serde_json::json!({ "color": "red" }));
        let props = styled.properties.unwrap();
        assert_eq!(props["source"], "survey");
        assert_eq!(props["style"]["color"], "red");
    }

    #[test]
    fn test_format_position() {
        assert_eq!(format_position(&[175.2793, -37.787]), "-37.7870, 175.2793");
        assert_eq!(format_position(&[1.0]), "");
    }

    #[test]
    fn test_extension_crossing() {
        // Open path 0,0 -> 2,0 -> 2,2 -> 1,-1 would cross the first edge.
        let path = vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(2.0, 0.0),
            LngLat::new(2.0, 2.0),
        ];
        assert!(extension_crosses_path(&path, LngLat::new(1.0, -1.0)));
        assert!(!extension_crosses_path(&path, LngLat::new(0.0, 2.0)));
        assert!(!extension_crosses_path(&path[..2], LngLat::new(1.0, -1.0)));
    }
}
