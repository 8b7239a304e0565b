//! Data models for the sector map editor.

mod palette;
mod sector;

pub use palette::SectorColor;
pub use sector::{FrequencyField, SectorDraft, SectorId, SectorInfo, SectorPatch, SectorRecord};
