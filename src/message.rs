//! Application message types.
//!
//! All user input is represented as messages in the Elm architecture style.

use crate::geometry::LngLat;
use crate::map::MapEvent;
use crate::panel::{PanelCommand, PanelMessage};

/// Gestures and tool actions on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum MapMessage {
    /// Click at a geographic position
    Click(LngLat),
    /// Arm the polygon tool
    StartDrawing,
    /// Close the polygon being drawn
    FinishDrawing,
    /// Drop the last placed vertex
    UndoVertex,
    CancelDrawing,
    /// Open an edit session on the selected shape
    BeginEdit,
    MoveVertex { index: usize, position: LngLat },
    InsertVertex { index: usize, position: LngLat },
    RemoveVertex(usize),
    /// Save the edit session
    SaveEdit,
    CancelEdit,
    /// Viewport resized (pixels)
    Resize { width: u32, height: u32 },
    /// Pan and zoom
    SetView { center: LngLat, zoom: u8 },
}

/// Messages that can be sent to update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Raw input on the map
    Map(MapMessage),
    /// Structured event from the map surface
    MapEvent(MapEvent),
    /// Input on the panel's own controls
    Panel(PanelMessage),
    /// Store-level command from the panel
    Command(PanelCommand),
}

impl Message {
    pub fn click(position: LngLat) -> Self {
        Message::Map(MapMessage::Click(position))
    }

    pub fn command(command: PanelCommand) -> Self {
        Message::Command(command)
    }
}
