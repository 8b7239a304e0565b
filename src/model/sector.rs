//! Sector records and the read-only projections derived from them.

use std::fmt;
use std::str::FromStr;

use geojson::{Feature, PolygonType};
use serde::{Deserialize, Serialize};

use super::palette::SectorColor;

/// Opaque, stable identifier of a sector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorId(String);

impl SectorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SectorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One named polygon region with recurrence metadata.
///
/// Field names on the wire follow the browser storage layout
/// (`frequencyInDays`, `geoJSON`, ...). Optional fields are filled in at
/// deserialization time so every record in memory is fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorRecord {
    pub id: SectorId,
    pub name: String,
    #[serde(default)]
    pub color: SectorColor,
    #[serde(default)]
    pub frequency_in_days: u32,
    #[serde(default)]
    pub frequency_offset: u32,
    /// Polygon boundary wrapped in a GeoJSON feature.
    #[serde(rename = "geoJSON")]
    pub geometry: Feature,
}

impl SectorRecord {
    /// Read one of the two recurrence fields.
    pub fn frequency(&self, field: FrequencyField) -> u32 {
        match field {
            FrequencyField::InDays => self.frequency_in_days,
            FrequencyField::Offset => self.frequency_offset,
        }
    }

    pub(crate) fn set_frequency(&mut self, field: FrequencyField, value: u32) {
        match field {
            FrequencyField::InDays => self.frequency_in_days = value,
            FrequencyField::Offset => self.frequency_offset = value,
        }
    }
}

/// A shape handed to the store for creation.
///
/// `id` is only set by legacy callers that route a finished edit through the
/// create path; the store then treats the draft as a geometry update.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorDraft {
    pub id: Option<SectorId>,
    pub geometry: Feature,
}

impl SectorDraft {
    pub fn new(geometry: Feature) -> Self {
        Self { id: None, geometry }
    }

    pub fn with_id(mut self, id: SectorId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Batch of field edits applied to a single sector in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorPatch {
    pub name: Option<String>,
    pub color: Option<SectorColor>,
    pub frequency_in_days: Option<u32>,
    pub frequency_offset: Option<u32>,
}

impl SectorPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.color.is_none()
            && self.frequency_in_days.is_none()
            && self.frequency_offset.is_none()
    }
}

/// Which recurrence field a frequency edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyField {
    #[serde(rename = "frequencyInDays")]
    InDays,
    #[serde(rename = "frequencyOffset")]
    Offset,
}

impl FrequencyField {
    pub fn label(&self) -> &'static str {
        match self {
            FrequencyField::InDays => "Frequency in Days",
            FrequencyField::Offset => "Frequency Offset",
        }
    }
}

impl FromStr for FrequencyField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "days" | "in-days" | "frequencyInDays" => Ok(FrequencyField::InDays),
            "offset" | "frequencyOffset" => Ok(FrequencyField::Offset),
            other => Err(format!(
                "unknown frequency field '{}' (expected 'days' or 'offset')",
                other
            )),
        }
    }
}

/// Read-only view of the selected sector shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorInfo {
    pub id: SectorId,
    pub name: String,
    /// Area in square kilometers, rounded to two decimals.
    pub area: f64,
    pub coordinates: PolygonType,
    pub color: SectorColor,
    pub frequency_in_days: u32,
    pub frequency_offset: u32,
}

impl SectorInfo {
    /// Number of positions in the outer ring (closing point included).
    pub fn point_count(&self) -> usize {
        self.coordinates.first().map_or(0, Vec::len)
    }
}
