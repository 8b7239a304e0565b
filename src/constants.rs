//! Global constants for the Hamilton map editor

/// Title shown in the page header
pub const APP_TITLE: &str = "Hamilton Map Editor";

/// Subtitle shown under the title
pub const APP_SUBTITLE: &str = "Hamilton, New Zealand";

/// Initial map centre (latitude, longitude)
pub const DEFAULT_CENTER: (f64, f64) = (-37.7870, 175.2793);

/// Initial map zoom level
pub const DEFAULT_ZOOM: u8 = 13;

/// OpenStreetMap tile template
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Attribution required by the tile server
pub const DEFAULT_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Tile server subdomains substituted for `{s}`
pub const TILE_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// Side length of a map tile in pixels
pub const TILE_SIZE: u32 = 256;

/// Highest zoom level served by the tile server
pub const MAX_ZOOM: u8 = 19;

/// Largest viewport edge in pixels.
pub const MAX_VIEWPORT_EDGE: u32 = 8192;

// Shape styles

/// Stroke weight of the selected shape
pub const SELECTED_WEIGHT: f64 = 4.0;

/// Stroke opacity of the selected shape
pub const SELECTED_OPACITY: f64 = 1.0;

/// Fill opacity of the selected shape
pub const SELECTED_FILL_OPACITY: f64 = 0.4;

/// Stroke weight of unselected shapes
pub const DEFAULT_WEIGHT: f64 = 2.0;

/// Stroke opacity of unselected shapes
pub const DEFAULT_OPACITY: f64 = 0.8;

/// Fill opacity of unselected shapes
pub const DEFAULT_FILL_OPACITY: f64 = 0.2;

// Drawing

/// Distance in screen pixels within which a click on the first vertex closes the polygon
pub const POLYGON_CLOSE_THRESHOLD: f32 = 15.0;

/// Distance in screen pixels within which a click grabs an edit handle
pub const VERTEX_HANDLE_RADIUS: f32 = 8.0;
