//! The `{ "list": [...] }` document used for the seed dataset and exports.

use geojson::Feature;
use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::geometry;
use crate::model::{SectorColor, SectorId, SectorRecord};

/// File name offered for the export download.
pub const EXPORT_FILENAME: &str = "hamilton_polygons.json";

/// One sector inside a list document. Ids are not part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorEntry {
    pub name: String,
    #[serde(default)]
    pub color: SectorColor,
    #[serde(default)]
    pub frequency_in_days: u32,
    #[serde(default)]
    pub frequency_offset: u32,
    pub geometry: Feature,
}

impl From<&SectorRecord> for SectorEntry {
    fn from(record: &SectorRecord) -> Self {
        Self {
            name: record.name.clone(),
            color: record.color.clone(),
            frequency_in_days: record.frequency_in_days,
            frequency_offset: record.frequency_offset,
            geometry: record.geometry.clone(),
        }
    }
}

/// A list of sectors in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorList {
    pub list: Vec<SectorEntry>,
}

impl SectorList {
    pub fn from_records(records: &[SectorRecord]) -> Self {
        Self {
            list: records.iter().map(SectorEntry::from).collect(),
        }
    }

    /// Parse a document and check that every entry holds a valid polygon.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let document: Self = serde_json::from_str(json)?;
        for (index, entry) in document.list.iter().enumerate() {
            geometry::validate_polygon(&entry.geometry).map_err(|e| {
                FormatError::invalid_format(format!(
                    "entry {} ('{}'): {}",
                    index, entry.name, e
                ))
            })?;
        }
        Ok(document)
    }

    pub fn to_json_pretty(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Turn the entries into records with ids `<prefix><index>`.
    pub fn into_records(self, id_prefix: &str) -> Vec<SectorRecord> {
        self.list
            .into_iter()
            .enumerate()
            .map(|(index, entry)| SectorRecord {
                id: SectorId::new(format!("{}{}", id_prefix, index)),
                name: entry.name,
                color: entry.color,
                frequency_in_days: entry.frequency_in_days,
                frequency_offset: entry.frequency_offset,
                geometry: entry.geometry,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

/// A ready-to-save export document.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub contents: String,
}

impl ExportFile {
    /// Write the document to `path`, or into `path/<filename>` when `path` is a directory.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn write(&self, path: &std::path::Path) -> Result<std::path::PathBuf, FormatError> {
        let target = if path.is_dir() {
            path.join(&self.filename)
        } else {
            path.to_path_buf()
        };
        std::fs::write(&target, &self.contents)?;
        log::info!("📤 Exported sectors to {:?}", target);
        Ok(target)
    }
}

/// Serialize all sectors into the export document.
///
/// Exporting an empty list is refused.
pub fn export_file(records: &[SectorRecord]) -> Result<ExportFile, FormatError> {
    if records.is_empty() {
        return Err(FormatError::EmptyExport);
    }
    let contents = SectorList::from_records(records).to_json_pretty()?;
    log::info!("📤 Prepared export of {} sectors", records.len());
    Ok(ExportFile {
        filename: EXPORT_FILENAME.to_string(),
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LngLat, feature_from_vertices};
    use pretty_assertions::assert_eq;

    fn record(id: &str, name: &str, color: SectorColor) -> SectorRecord {
        SectorRecord {
            id: SectorId::from(id),
            name: name.to_string(),
            color,
            frequency_in_days: 7,
            frequency_offset: 2,
            geometry: feature_from_vertices(&[
                LngLat::new(175.27, -37.78),
                LngLat::new(175.28, -37.78),
                LngLat::new(175.28, -37.79),
            ])
            .unwrap(),
        }
    }

    #[test]
    fn test_export_shape() {
        let records = vec![
            record("polygon-1", "North", SectorColor::Red),
            record("polygon-2", "South", SectorColor::Other("teal".into())),
        ];
        let export = export_file(&records).unwrap();
        assert_eq!(export.filename, "hamilton_polygons.json");

        let value: serde_json::Value = serde_json::from_str(&export.contents).unwrap();
        let list = value["list"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["name"], "North");
        assert_eq!(list[0]["color"], "red");
        assert_eq!(list[0]["frequencyInDays"], 7);
        assert_eq!(list[0]["frequencyOffset"], 2);
        assert_eq!(list[0]["geometry"]["type"], "Feature");
        assert!(list[0].get("id").is_none());
        assert_eq!(list[1]["color"], "teal");
    }

    #[test]
    fn test_empty_export_refused() {
        assert!(matches!(export_file(&[]), Err(FormatError::EmptyExport)));
    }

    #[test]
    fn test_export_reimports_as_records() {
        let records = vec![record("polygon-9", "Only", SectorColor::Cyan)];
        let export = export_file(&records).unwrap();
        let reimported = SectorList::from_json(&export.contents)
            .unwrap()
            .into_records("sector-");
        assert_eq!(reimported.len(), 1);
        assert_eq!(reimported[0].id.as_str(), "sector-0");
        assert_eq!(reimported[0].name, records[0].name);
        assert_eq!(reimported[0].geometry, records[0].geometry);
    }

    #[test]
    fn test_missing_fields_are_normalized() {
        let json = r#"{ "list": [ {
            "name": "Bare",
            "geometry": { "type": "Feature", "properties": {}, "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]
            } }
        } ] }"#;
        let records = SectorList::from_json(json).unwrap().into_records("sector-");
        assert_eq!(records[0].color, SectorColor::Green);
        assert_eq!(records[0].frequency_in_days, 0);
        assert_eq!(records[0].frequency_offset, 0);
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let json = r#"{ "list": [ {
            "name": "Line",
            "geometry": { "type": "Feature", "properties": {}, "geometry": {
                "type": "LineString",
                "coordinates": [[0, 0], [1, 0]]
            } }
        } ] }"#;
        assert!(matches!(
            SectorList::from_json(json),
            Err(FormatError::InvalidFormat { .. })
        ));
    }
}
