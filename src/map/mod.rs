//! Interactive map surface: base map, drawing and editing of sector shapes.

mod basemap;
mod drawing;
mod events;
mod surface;

pub use basemap::{BaseMapView, ScreenPoint, TileId};
pub use drawing::{DrawStep, DrawingState};
pub use events::MapEvent;
pub use surface::{EditError, EditSession, MapSurface, ShapeStyle, ShapeView, ToolbarState};
