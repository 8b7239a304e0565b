//! Message handlers for the map editor.
//!
//! Each handler processes a specific category of messages,
//! keeping the main SectorApp update function clean and organized.

use crate::format::{self, ExportFile, FormatError};
use crate::map::{MapEvent, MapSurface};
use crate::message::MapMessage;
use crate::model::SectorDraft;
use crate::panel::{Confirm, DELETE_PROMPT, PanelCommand, RESET_PROMPT};
use crate::state::SectorStore;

/// Handle raw map input, returning the structured events it produced.
pub fn handle_map_message(
    msg: MapMessage,
    surface: &mut MapSurface,
    store: &SectorStore,
) -> Vec<MapEvent> {
    match msg {
        MapMessage::Click(position) => surface.click(store, position).into_iter().collect(),
        MapMessage::StartDrawing => {
            if surface.start_drawing() {
                log::debug!("✏️ Polygon tool armed");
            }
            Vec::new()
        }
        MapMessage::FinishDrawing => match surface.finish_drawing() {
            Ok(event) => vec![event],
            Err(e) => {
                log::debug!("Cannot finish polygon yet: {}", e);
                Vec::new()
            }
        },
        MapMessage::UndoVertex => {
            surface.undo_vertex();
            Vec::new()
        }
        MapMessage::CancelDrawing => {
            surface.cancel_drawing();
            Vec::new()
        }
        MapMessage::BeginEdit => {
            if !surface.begin_edit(store) {
                log::debug!("Nothing selected to edit");
            }
            Vec::new()
        }
        MapMessage::MoveVertex { index, position } => {
            if let Err(e) = surface.move_vertex(index, position) {
                log::debug!("Vertex move refused: {}", e);
            }
            Vec::new()
        }
        MapMessage::InsertVertex { index, position } => {
            if let Err(e) = surface.insert_vertex(index, position) {
                log::debug!("Vertex insert refused: {}", e);
            }
            Vec::new()
        }
        MapMessage::RemoveVertex(index) => {
            if let Err(e) = surface.remove_vertex(index) {
                log::debug!("Vertex removal refused: {}", e);
            }
            Vec::new()
        }
        MapMessage::SaveEdit => surface.save_edit(),
        MapMessage::CancelEdit => {
            surface.cancel_edit();
            Vec::new()
        }
        MapMessage::Resize { width, height } => {
            surface.view_mut().set_viewport(width, height);
            Vec::new()
        }
        MapMessage::SetView { center, zoom } => {
            let view = surface.view_mut();
            view.set_center(center);
            view.set_zoom(zoom);
            log::debug!("🔍 View: ({:.4}, {:.4}) z{}", center.lat, center.lng, view.zoom());
            Vec::new()
        }
    }
}

/// Apply a structured map event to the store.
pub fn handle_map_event(event: MapEvent, store: &mut SectorStore) {
    match event {
        MapEvent::ShapeCreated { geometry } => {
            store.create_and_select(SectorDraft::new(geometry));
        }
        MapEvent::ShapeEdited { id, geometry } => {
            store.update_geometry(&id, geometry);
        }
        MapEvent::ShapeClicked { id } => store.select(&id),
        MapEvent::BackgroundClicked => {
            if store.selected().is_some() {
                store.deselect();
            }
        }
    }
}

/// Apply a panel command to the store.
///
/// Destructive commands ask `confirm` first; declining leaves everything
/// untouched. Returns the export file when one was requested.
pub fn handle_command(
    command: PanelCommand,
    store: &mut SectorStore,
    confirm: &mut dyn Confirm,
    confirm_deletes: bool,
) -> Option<ExportFile> {
    match command {
        PanelCommand::Select(id) => store.select(&id),
        PanelCommand::Rename { id, name } => {
            let name = name.trim();
            if name.is_empty() {
                log::debug!("Ignoring empty name for sector {}", id);
            } else {
                store.rename(&id, name);
            }
        }
        PanelCommand::Recolor { id, color } => {
            store.recolor(&id, color);
        }
        PanelCommand::SetFrequency { id, field, value } => {
            store.set_frequency(&id, field, value);
        }
        PanelCommand::Delete(id) => {
            if !store.contains(&id) {
                log::debug!("Ignoring delete of unknown sector {}", id);
            } else if !confirm_deletes || confirm.confirm(DELETE_PROMPT) {
                store.delete(&id);
            } else {
                log::debug!("Delete of sector {} cancelled", id);
            }
        }
        PanelCommand::ResetToSeed => {
            if confirm.confirm(RESET_PROMPT) {
                store.reset_to_seed();
            } else {
                log::debug!("Reset cancelled");
            }
        }
        PanelCommand::Export => match format::export_file(store.sectors()) {
            Ok(file) => {
                log::debug!("📤 Export ready: {} ({} bytes)", file.filename, file.contents.len());
                return Some(file);
            }
            Err(FormatError::EmptyExport) => log::debug!("Nothing to export"),
            Err(e) => log::error!("Export failed: {}", e),
        },
    }
    None
}
