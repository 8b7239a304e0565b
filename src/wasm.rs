//! Browser bindings.
//!
//! The page owns the DOM and the tile layer; it forwards input to a
//! [`SectorEditor`] and re-renders from the JSON view models it returns.

use wasm_bindgen::prelude::*;

use crate::app::{Effect, SectorApp};
use crate::config::AppConfig;
use crate::geometry::LngLat;
use crate::map::ScreenPoint;
use crate::message::{MapMessage, Message};
use crate::model::{FrequencyField, SectorColor, SectorId};
use crate::panel::{Confirm, PanelCommand, PanelMessage};
use crate::storage::{KeyValueStore, LocalStorageStore, MemoryStore};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Asks through `window.confirm`. Declines when no window is available.
struct BrowserConfirm;

impl Confirm for BrowserConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|window| window.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }
}

fn init_logging(config: &AppConfig) {
    let level = config
        .preferences
        .log_level
        .to_level_filter()
        .to_level()
        .unwrap_or(log::Level::Error);
    // A second editor on the same page keeps the first logger
    let _ = console_log::init_with_level(level);
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The map editor as seen from JavaScript.
#[wasm_bindgen]
pub struct SectorEditor {
    app: SectorApp,
}

#[wasm_bindgen]
impl SectorEditor {
    /// Open the editor on `localStorage`, falling back to an in-memory slot.
    #[wasm_bindgen(constructor)]
    pub fn new() -> SectorEditor {
        let storage: Box<dyn KeyValueStore> = match LocalStorageStore::open() {
            Ok(storage) => Box::new(storage),
            Err(e) => {
                web_sys::console::warn_1(&format!("{}, changes will not persist", e).into());
                Box::new(MemoryStore::new())
            }
        };
        let config = AppConfig::load_from_storage(storage.as_ref()).unwrap_or_default();
        init_logging(&config);
        log::info!("🗺️ {} starting", config.app_name);

        SectorEditor {
            app: SectorApp::new(config, storage, Box::new(BrowserConfirm)),
        }
    }

    pub fn title(&self) -> String {
        self.app.title().to_string()
    }

    pub fn subtitle(&self) -> String {
        self.app.subtitle().to_string()
    }

    // --- map input ---

    /// Click at a geographic position.
    pub fn click(&mut self, lng: f64, lat: f64) {
        self.send(Message::click(LngLat::new(lng, lat)));
    }

    /// Click at a viewport pixel.
    pub fn click_screen(&mut self, x: f64, y: f64) {
        let position = self.app.surface().view().to_lng_lat(ScreenPoint::new(x, y));
        self.send(Message::click(position));
    }

    /// Index of the edit handle under a viewport pixel, or -1.
    pub fn handle_at(&self, x: f64, y: f64) -> i32 {
        self.app
            .surface()
            .handle_at(ScreenPoint::new(x, y))
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(-1)
    }

    pub fn start_drawing(&mut self) {
        self.send(Message::Map(MapMessage::StartDrawing));
    }

    pub fn finish_drawing(&mut self) {
        self.send(Message::Map(MapMessage::FinishDrawing));
    }

    pub fn undo_vertex(&mut self) {
        self.send(Message::Map(MapMessage::UndoVertex));
    }

    pub fn cancel_drawing(&mut self) {
        self.send(Message::Map(MapMessage::CancelDrawing));
    }

    pub fn begin_edit(&mut self) {
        self.send(Message::Map(MapMessage::BeginEdit));
    }

    pub fn move_vertex(&mut self, index: usize, lng: f64, lat: f64) {
        self.send(Message::Map(MapMessage::MoveVertex {
            index,
            position: LngLat::new(lng, lat),
        }));
    }

    pub fn insert_vertex(&mut self, index: usize, lng: f64, lat: f64) {
        self.send(Message::Map(MapMessage::InsertVertex {
            index,
            position: LngLat::new(lng, lat),
        }));
    }

    pub fn remove_vertex(&mut self, index: usize) {
        self.send(Message::Map(MapMessage::RemoveVertex(index)));
    }

    pub fn save_edit(&mut self) {
        self.send(Message::Map(MapMessage::SaveEdit));
    }

    pub fn cancel_edit(&mut self) {
        self.send(Message::Map(MapMessage::CancelEdit));
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.send(Message::Map(MapMessage::Resize { width, height }));
    }

    pub fn set_view(&mut self, lng: f64, lat: f64, zoom: u8) {
        self.send(Message::Map(MapMessage::SetView {
            center: LngLat::new(lng, lat),
            zoom,
        }));
    }

    // --- panel input ---

    pub fn select(&mut self, id: String) {
        self.send(Message::command(PanelCommand::Select(SectorId::from(id))));
    }

    pub fn start_editing_name(&mut self) {
        self.send(Message::Panel(PanelMessage::StartEditingName));
    }

    pub fn name_changed(&mut self, text: String) {
        self.send(Message::Panel(PanelMessage::NameChanged(text)));
    }

    pub fn commit_name(&mut self) {
        self.send(Message::Panel(PanelMessage::CommitName));
    }

    pub fn cancel_editing_name(&mut self) {
        self.send(Message::Panel(PanelMessage::CancelEditingName));
    }

    pub fn recolor(&mut self, id: String, color: String) {
        self.send(Message::command(PanelCommand::Recolor {
            id: SectorId::from(id),
            color: SectorColor::from(color),
        }));
    }

    /// Raw input of the `days` or `offset` field.
    pub fn frequency_input(&mut self, field: String, input: String) -> Result<(), JsValue> {
        let field: FrequencyField = field.parse().map_err(|e: String| JsValue::from_str(&e))?;
        self.send(Message::Panel(PanelMessage::FrequencyInput { field, input }));
        Ok(())
    }

    pub fn delete(&mut self, id: String) {
        self.send(Message::command(PanelCommand::Delete(SectorId::from(id))));
    }

    pub fn reset(&mut self) {
        self.send(Message::command(PanelCommand::ResetToSeed));
    }

    pub fn export(&mut self) {
        self.send(Message::command(PanelCommand::Export));
    }

    // --- view models ---

    pub fn shapes_json(&self) -> Result<String, JsValue> {
        to_js(&self.app.shapes())
    }

    pub fn toolbar_json(&self) -> Result<String, JsValue> {
        to_js(&self.app.toolbar())
    }

    pub fn panel_json(&self) -> Result<String, JsValue> {
        to_js(&self.app.panel_view())
    }

    /// Vertices placed so far by the polygon tool.
    pub fn drawing_json(&self) -> Result<String, JsValue> {
        to_js(&self.app.surface().drawing().vertices())
    }

    /// Vertices of the open edit session, or `null`.
    pub fn edit_json(&self) -> Result<String, JsValue> {
        to_js(&self.app.surface().edit_session().map(|edit| edit.vertices()))
    }

    /// Tiles covering the viewport: `[{url, z, x, y}]`.
    pub fn tiles_json(&self) -> Result<String, JsValue> {
        let view = self.app.surface().view();
        let tiles: Vec<serde_json::Value> = view
            .visible_tiles()
            .into_iter()
            .map(|tile| {
                serde_json::json!({
                    "url": view.tile_url(tile),
                    "z": tile.z,
                    "x": tile.x,
                    "y": tile.y,
                })
            })
            .collect();
        to_js(&tiles)
    }

    pub fn attribution(&self) -> String {
        self.app.surface().view().attribution().to_string()
    }
}

impl SectorEditor {
    fn send(&mut self, message: Message) {
        if let Some(Effect::Download(file)) = self.app.update(message) {
            if let Err(e) = crate::wasm_file::download(&file) {
                log::error!("Export download failed: {:?}", e);
            }
        }
    }
}

impl Default for SectorEditor {
    fn default() -> Self {
        Self::new()
    }
}
