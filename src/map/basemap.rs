//! Base map view: the initial view over the city and Web Mercator tile math.

use std::f64::consts::PI;

use crate::config::MapConfig;
use crate::constants::{MAX_VIEWPORT_EDGE, MAX_ZOOM, TILE_SIZE, TILE_SUBDOMAINS};
use crate::geometry::LngLat;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Address of one map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// A point in viewport pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &ScreenPoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Camera over the tiled base map.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseMapView {
    center: LngLat,
    zoom: u8,
    tile_url: String,
    attribution: String,
    viewport: (u32, u32),
}

impl BaseMapView {
    pub fn from_config(config: &MapConfig) -> Self {
        let [lat, lng] = config.center;
        Self {
            center: LngLat::new(lng, lat),
            zoom: config.zoom.min(MAX_ZOOM),
            tile_url: config.tile_url.clone(),
            attribution: config.attribution.clone(),
            viewport: (1024, 768),
        }
    }

    pub fn center(&self) -> LngLat {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn attribution(&self) -> &str {
        &self.attribution
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Set the viewport size, clamped to `1..=MAX_VIEWPORT_EDGE` per edge.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (
            width.clamp(1, MAX_VIEWPORT_EDGE),
            height.clamp(1, MAX_VIEWPORT_EDGE),
        );
    }

    pub fn set_center(&mut self, center: LngLat) {
        self.center = center;
    }

    /// Set the zoom level, clamped to what the tile server provides.
    pub fn set_zoom(&mut self, zoom: u8) {
        self.zoom = zoom.min(MAX_ZOOM);
    }

    /// Size of the world in pixels at the current zoom.
    fn world_size(&self) -> f64 {
        f64::from(TILE_SIZE) * f64::from(1u32 << self.zoom)
    }

    /// Project a position to world pixel coordinates at the current zoom.
    pub fn project(&self, position: LngLat) -> (f64, f64) {
        let lat = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let size = self.world_size();
        let x = (position.lng + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        (x, y)
    }

    /// Inverse of [`Self::project`].
    pub fn unproject(&self, x: f64, y: f64) -> LngLat {
        let size = self.world_size();
        let lng = x / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * y / size);
        let lat = n.sinh().atan().to_degrees();
        LngLat::new(lng, lat)
    }

    /// Viewport position of a geographic position.
    pub fn to_screen(&self, position: LngLat) -> ScreenPoint {
        let (cx, cy) = self.project(self.center);
        let (x, y) = self.project(position);
        ScreenPoint::new(
            x - cx + f64::from(self.viewport.0) / 2.0,
            y - cy + f64::from(self.viewport.1) / 2.0,
        )
    }

    /// Geographic position under a viewport pixel.
    pub fn to_lng_lat(&self, point: ScreenPoint) -> LngLat {
        let (cx, cy) = self.project(self.center);
        self.unproject(
            point.x - f64::from(self.viewport.0) / 2.0 + cx,
            point.y - f64::from(self.viewport.1) / 2.0 + cy,
        )
    }

    /// Tile containing a position at the current zoom.
    pub fn tile_for(&self, position: LngLat) -> TileId {
        let (x, y) = self.project(position);
        let tiles = 1u32 << self.zoom;
        let tile = f64::from(TILE_SIZE);
        TileId {
            z: self.zoom,
            x: ((x / tile).floor().max(0.0) as u32).min(tiles - 1),
            y: ((y / tile).floor().max(0.0) as u32).min(tiles - 1),
        }
    }

    /// Tiles covering the viewport, row by row.
    pub fn visible_tiles(&self) -> Vec<TileId> {
        let top_left = self.to_lng_lat(ScreenPoint::new(0.0, 0.0));
        let bottom_right = self.to_lng_lat(ScreenPoint::new(
            f64::from(self.viewport.0),
            f64::from(self.viewport.1),
        ));
        let first = self.tile_for(top_left);
        let last = self.tile_for(bottom_right);
        (first.y..=last.y)
            .flat_map(|y| {
                (first.x..=last.x).map(move |x| TileId {
                    z: self.zoom,
                    x,
                    y,
                })
            })
            .collect()
    }

    /// Fill the URL template for a tile, rotating through the subdomains.
    pub fn tile_url(&self, tile: TileId) -> String {
        let subdomain = TILE_SUBDOMAINS[((tile.x + tile.y) as usize) % TILE_SUBDOMAINS.len()];
        self.tile_url
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl Default for BaseMapView {
    fn default() -> Self {
        Self::from_config(&MapConfig::default())
    }
}
