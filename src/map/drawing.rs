//! Polygon drawing state machine.
//!
//! Click to add vertices; clicking near the first vertex (or finishing
//! explicitly) closes the ring. Edges may not cross.

use geojson::Feature;

use crate::constants::POLYGON_CLOSE_THRESHOLD;
use crate::geometry::{self, GeometryError, LngLat, MIN_POLYGON_VERTICES};
use crate::map::basemap::BaseMapView;

/// State of the polygon tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrawingState {
    /// Not currently drawing anything.
    #[default]
    Idle,
    /// Drawing a polygon - stores vertices added so far.
    Polygon { vertices: Vec<LngLat> },
}

/// Result of a click while the polygon tool is active.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawStep {
    Started,
    VertexAdded(usize),
    /// The click would break the polygon; nothing changed.
    Rejected(GeometryError),
    /// The ring was closed and the shape is complete.
    Closed(Feature),
}

impl DrawingState {
    /// Check if we're currently drawing something.
    pub fn is_drawing(&self) -> bool {
        !matches!(self, DrawingState::Idle)
    }

    /// Vertices placed so far.
    pub fn vertices(&self) -> &[LngLat] {
        match self {
            DrawingState::Idle => &[],
            DrawingState::Polygon { vertices } => vertices,
        }
    }

    /// Handle a click at `position`.
    pub fn click(&mut self, position: LngLat, view: &BaseMapView) -> DrawStep {
        let vertices = match self {
            DrawingState::Idle => {
                *self = DrawingState::Polygon {
                    vertices: vec![position],
                };
                log::info!("Polygon: started at ({:.5}, {:.5})", position.lng, position.lat);
                return DrawStep::Started;
            }
            DrawingState::Polygon { vertices } => vertices,
        };

        if vertices.len() >= MIN_POLYGON_VERTICES {
            let first = view.to_screen(vertices[0]);
            let dist = first.distance_to(&view.to_screen(position));
            if dist < f64::from(POLYGON_CLOSE_THRESHOLD) {
                return match self.finish() {
                    Ok(feature) => DrawStep::Closed(feature),
                    Err(e) => DrawStep::Rejected(e),
                };
            }
        }

        if geometry::extension_crosses_path(vertices, position) {
            log::debug!("Polygon: rejected crossing edge");
            return DrawStep::Rejected(GeometryError::SelfIntersecting);
        }
        vertices.push(position);
        log::debug!(
            "Polygon: added vertex {} at ({:.5}, {:.5})",
            vertices.len(),
            position.lng,
            position.lat
        );
        DrawStep::VertexAdded(vertices.len())
    }

    /// Close the ring and return the finished shape.
    ///
    /// On error the drawing continues unchanged.
    pub fn finish(&mut self) -> Result<Feature, GeometryError> {
        let feature = geometry::feature_from_vertices(self.vertices())?;
        log::info!("Polygon: finalized with {} vertices", self.vertices().len());
        *self = DrawingState::Idle;
        Ok(feature)
    }

    /// Remove the most recent vertex. Removing the only vertex stops drawing.
    pub fn undo_last(&mut self) -> bool {
        let DrawingState::Polygon { vertices } = self else {
            return false;
        };
        vertices.pop();
        if vertices.is_empty() {
            *self = DrawingState::Idle;
        }
        true
    }

    /// Cancel the current drawing.
    pub fn cancel(&mut self) {
        if self.is_drawing() {
            log::debug!("Polygon: cancelled");
        }
        *self = DrawingState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> BaseMapView {
        BaseMapView::default()
    }

    fn at(dx: f64, dy: f64) -> LngLat {
        LngLat::new(175.27 + dx, -37.78 + dy)
    }

    #[test]
    fn test_click_near_first_vertex_closes() {
        let view = view();
        let mut state = DrawingState::default();
        assert_eq!(state.click(at(0.0, 0.0), &view), DrawStep::Started);
        assert_eq!(state.click(at(0.01, 0.0), &view), DrawStep::VertexAdded(2));
        assert_eq!(state.click(at(0.01, -0.01), &view), DrawStep::VertexAdded(3));

        let DrawStep::Closed(feature) = state.click(at(0.0001, 0.0001), &view) else {
            panic!("expected the ring to close");
        };
        assert!(!state.is_drawing());
        let ring = geometry::outer_ring(&feature).unwrap();
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_close_needs_three_vertices() {
        let view = view();
        let mut state = DrawingState::default();
        state.click(at(0.0, 0.0), &view);
        state.click(at(0.01, 0.0), &view);
        // Near the first vertex but only two placed: treated as a new vertex.
        assert_eq!(state.click(at(0.0001, 0.0001), &view), DrawStep::VertexAdded(3));
    }

    #[test]
    fn test_crossing_edge_rejected() {
        let view = view();
        let mut state = DrawingState::default();
        state.click(at(0.0, 0.0), &view);
        state.click(at(0.02, 0.0), &view);
        state.click(at(0.02, 0.02), &view);
        assert_eq!(
            state.click(at(0.01, -0.01), &view),
            DrawStep::Rejected(GeometryError::SelfIntersecting)
        );
        assert_eq!(state.vertices().len(), 3);
    }

    #[test]
    fn test_finish_with_too_few_vertices_keeps_drawing() {
        let view = view();
        let mut state = DrawingState::default();
        state.click(at(0.0, 0.0), &view);
        state.click(at(0.01, 0.0), &view);
        assert!(state.finish().is_err());
        assert!(state.is_drawing());
    }

    #[test]
    fn test_undo_and_cancel() {
        let view = view();
        let mut state = DrawingState::default();
        state.click(at(0.0, 0.0), &view);
        state.click(at(0.01, 0.0), &view);
        assert!(state.undo_last());
        assert_eq!(state.vertices(), &[at(0.0, 0.0)]);
        assert!(state.undo_last());
        assert!(!state.is_drawing());

        state.click(at(0.0, 0.0), &view);
        state.cancel();
        assert_eq!(state, DrawingState::Idle);
    }
}
