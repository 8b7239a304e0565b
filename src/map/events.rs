//! Structured events produced by the map surface.

use geojson::Feature;

use crate::model::SectorId;

/// What a gesture on the map means for the sector store.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// A new shape was drawn.
    ShapeCreated { geometry: Feature },
    /// An existing shape was reshaped. One event per shape per edit session.
    ShapeEdited { id: SectorId, geometry: Feature },
    /// A shape was clicked.
    ShapeClicked { id: SectorId },
    /// The empty map was clicked while a sector was selected.
    BackgroundClicked,
}
