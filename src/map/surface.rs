//! The interactive map surface.
//!
//! Turns pointer gestures into [`MapEvent`]s and derives the render model of
//! every shape from the store. Only the selected shape is editable; an edit
//! session works on a private copy of its ring until it is saved.

use serde::Serialize;

use crate::constants::{
    DEFAULT_FILL_OPACITY, DEFAULT_OPACITY, DEFAULT_WEIGHT, SELECTED_FILL_OPACITY,
    SELECTED_OPACITY, SELECTED_WEIGHT, VERTEX_HANDLE_RADIUS,
};
use crate::geometry::{self, GeometryError, LngLat, MIN_POLYGON_VERTICES};
use crate::map::basemap::{BaseMapView, ScreenPoint};
use crate::map::drawing::{DrawStep, DrawingState};
use crate::map::events::MapEvent;
use crate::model::SectorId;
use crate::state::SectorStore;

/// Stroke and fill of a rendered shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl ShapeStyle {
    pub fn for_selection(selected: bool) -> Self {
        if selected {
            Self {
                weight: SELECTED_WEIGHT,
                opacity: SELECTED_OPACITY,
                fill_opacity: SELECTED_FILL_OPACITY,
            }
        } else {
            Self {
                weight: DEFAULT_WEIGHT,
                opacity: DEFAULT_OPACITY,
                fill_opacity: DEFAULT_FILL_OPACITY,
            }
        }
    }
}

/// Render model of one sector on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeView {
    pub id: SectorId,
    pub name: String,
    /// CSS color of stroke and fill
    pub color: String,
    pub style: ShapeStyle,
    /// Whether the shape shows edit handles
    pub editable: bool,
    /// Outer ring without the closing position
    pub vertices: Vec<LngLat>,
}

/// Which drawing toolbar actions are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolbarState {
    pub draw_polygon: bool,
    pub edit: bool,
    pub remove: bool,
}

/// Reasons an edit gesture is refused.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("No shape is being edited")]
    NoSession,

    #[error("Vertex {0} does not exist")]
    NoSuchVertex(usize),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Work-in-progress reshaping of the selected sector.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    id: SectorId,
    vertices: Vec<LngLat>,
    modified: bool,
}

impl EditSession {
    pub fn id(&self) -> &SectorId {
        &self.id
    }

    pub fn vertices(&self) -> &[LngLat] {
        &self.vertices
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Apply a change to a copy of the ring and keep it only if still valid.
    fn try_change(
        &mut self,
        index: usize,
        change: impl FnOnce(&mut Vec<LngLat>),
    ) -> Result<(), EditError> {
        if index >= self.vertices.len() {
            return Err(EditError::NoSuchVertex(index));
        }
        let mut candidate = self.vertices.clone();
        change(&mut candidate);
        if candidate.len() < MIN_POLYGON_VERTICES {
            return Err(GeometryError::TooFewPositions {
                found: candidate.len() + 1,
            }
            .into());
        }
        if geometry::ring_self_intersects(&candidate) {
            return Err(GeometryError::SelfIntersecting.into());
        }
        self.vertices = candidate;
        self.modified = true;
        Ok(())
    }
}

/// Map surface state: camera, polygon tool and edit session.
#[derive(Debug, Clone, Default)]
pub struct MapSurface {
    view: BaseMapView,
    /// Polygon tool armed; clicks place vertices instead of selecting
    tool_active: bool,
    drawing: DrawingState,
    edit: Option<EditSession>,
}

impl MapSurface {
    pub fn new(view: BaseMapView) -> Self {
        Self {
            view,
            tool_active: false,
            drawing: DrawingState::default(),
            edit: None,
        }
    }

    pub fn view(&self) -> &BaseMapView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut BaseMapView {
        &mut self.view
    }

    pub fn drawing(&self) -> &DrawingState {
        &self.drawing
    }

    pub fn is_tool_active(&self) -> bool {
        self.tool_active
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render model of every sector, in list order.
    pub fn shapes(&self, store: &SectorStore) -> Vec<ShapeView> {
        let selected = store.selected();
        store
            .sectors()
            .iter()
            .map(|sector| {
                let is_selected = selected == Some(&sector.id);
                let vertices = match &self.edit {
                    Some(session) if session.id == sector.id => session.vertices.clone(),
                    _ => geometry::ring_vertices(&sector.geometry),
                };
                ShapeView {
                    id: sector.id.clone(),
                    name: sector.name.clone(),
                    color: sector.color.css().to_string(),
                    style: ShapeStyle::for_selection(is_selected),
                    editable: is_selected,
                    vertices,
                }
            })
            .collect()
    }

    /// Toolbar availability: editing needs a selection, removal lives in the panel.
    pub fn toolbar(&self, store: &SectorStore) -> ToolbarState {
        ToolbarState {
            draw_polygon: self.edit.is_none(),
            edit: store.selected().is_some(),
            remove: false,
        }
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Handle a click on the map.
    ///
    /// While drawing, clicks place vertices. A click on the editable shape is
    /// consumed. Otherwise the topmost read-only shape under the pointer is
    /// reported, or a background click if something is selected.
    pub fn click(&mut self, store: &SectorStore, position: LngLat) -> Option<MapEvent> {
        if self.tool_active {
            return self.draw_vertex(position);
        }
        if self.on_editable_shape(store, position) {
            return None;
        }

        if let Some(id) = self.hit_test(store, position) {
            log::debug!("🖱️ Clicked shape {}", id);
            return Some(MapEvent::ShapeClicked { id });
        }
        store.selected().map(|_| MapEvent::BackgroundClicked)
    }

    /// Topmost read-only sector containing `position`. The selected sector is
    /// never a hit.
    pub fn hit_test(&self, store: &SectorStore, position: LngLat) -> Option<SectorId> {
        let selected = store.selected();
        store
            .sectors()
            .iter()
            .rev()
            .filter(|sector| Some(&sector.id) != selected)
            .find(|sector| geometry::contains(&sector.geometry, position))
            .map(|sector| sector.id.clone())
    }

    /// Whether `position` lies on the selected shape, as currently edited.
    fn on_editable_shape(&self, store: &SectorStore, position: LngLat) -> bool {
        let Some(selected) = store.selected() else {
            return false;
        };
        match &self.edit {
            Some(session) if &session.id == selected => {
                geometry::feature_from_vertices(&session.vertices)
                    .is_ok_and(|feature| geometry::contains(&feature, position))
            }
            _ => store
                .get(selected)
                .is_some_and(|sector| geometry::contains(&sector.geometry, position)),
        }
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Activate the polygon tool. Ignored while an edit session is open.
    pub fn start_drawing(&mut self) -> bool {
        if self.edit.is_some() {
            return false;
        }
        self.drawing = DrawingState::default();
        self.tool_active = true;
        true
    }

    /// Place a vertex with the polygon tool, arming it if needed.
    ///
    /// The tool disarms once a shape is complete.
    pub fn draw_vertex(&mut self, position: LngLat) -> Option<MapEvent> {
        if self.edit.is_some() {
            return None;
        }
        self.tool_active = true;
        match self.drawing.click(position, &self.view) {
            DrawStep::Closed(geometry) => {
                self.tool_active = false;
                Some(MapEvent::ShapeCreated { geometry })
            }
            DrawStep::Rejected(e) => {
                log::debug!("Vertex refused: {}", e);
                None
            }
            DrawStep::Started | DrawStep::VertexAdded(_) => None,
        }
    }

    /// Close the ring being drawn.
    pub fn finish_drawing(&mut self) -> Result<MapEvent, GeometryError> {
        let geometry = self.drawing.finish()?;
        self.tool_active = false;
        Ok(MapEvent::ShapeCreated { geometry })
    }

    pub fn undo_vertex(&mut self) -> bool {
        self.drawing.undo_last()
    }

    pub fn cancel_drawing(&mut self) {
        self.drawing.cancel();
        self.tool_active = false;
    }

    // ========================================================================
    // Editing
    // ========================================================================

    /// Open an edit session on the selected sector.
    pub fn begin_edit(&mut self, store: &SectorStore) -> bool {
        let Some(sector) = store.selected().and_then(|id| store.get(id)) else {
            return false;
        };
        self.cancel_drawing();
        self.edit = Some(EditSession {
            id: sector.id.clone(),
            vertices: geometry::ring_vertices(&sector.geometry),
            modified: false,
        });
        log::debug!("✏️ Editing sector {}", sector.id);
        true
    }

    fn session_mut(&mut self) -> Result<&mut EditSession, EditError> {
        self.edit.as_mut().ok_or(EditError::NoSession)
    }

    /// Move vertex `index` of the edited ring.
    pub fn move_vertex(&mut self, index: usize, position: LngLat) -> Result<(), EditError> {
        self.session_mut()?
            .try_change(index, |ring| ring[index] = position)
    }

    /// Insert a vertex after `index` (the midpoint handle of that edge).
    pub fn insert_vertex(&mut self, index: usize, position: LngLat) -> Result<(), EditError> {
        self.session_mut()?
            .try_change(index, |ring| ring.insert(index + 1, position))
    }

    /// Remove vertex `index`; a triangle cannot lose a vertex.
    pub fn remove_vertex(&mut self, index: usize) -> Result<(), EditError> {
        self.session_mut()?.try_change(index, |ring| {
            ring.remove(index);
        })
    }

    /// Index of the edit handle under a screen point, if any.
    pub fn handle_at(&self, point: ScreenPoint) -> Option<usize> {
        let session = self.edit.as_ref()?;
        session.vertices.iter().position(|vertex| {
            self.view.to_screen(*vertex).distance_to(&point) <= f64::from(VERTEX_HANDLE_RADIUS)
        })
    }

    /// Close the session and report the reshaped sectors.
    pub fn save_edit(&mut self) -> Vec<MapEvent> {
        let Some(session) = self.edit.take() else {
            return Vec::new();
        };
        if !session.modified {
            return Vec::new();
        }
        match geometry::feature_from_vertices(&session.vertices) {
            Ok(geometry) => vec![MapEvent::ShapeEdited {
                id: session.id,
                geometry,
            }],
            Err(e) => {
                log::warn!("Discarding edit of sector {}: {}", session.id, e);
                Vec::new()
            }
        }
    }

    /// Drop the session without touching the store.
    pub fn cancel_edit(&mut self) {
        if let Some(session) = self.edit.take() {
            log::debug!("Cancelled edit of sector {}", session.id);
        }
    }

    /// Keep the session in line with the store: it only lives while its sector
    /// is the selected one.
    pub fn sync_selection(&mut self, store: &SectorStore) {
        let keep = self
            .edit
            .as_ref()
            .is_some_and(|session| store.selected() == Some(&session.id));
        if !keep {
            self.cancel_edit();
        }
    }
}
