//! Read-only view models of the list and detail panel.

use serde::Serialize;

use crate::geometry;
use crate::model::{SectorColor, SectorId};
use crate::panel::state::PanelState;
use crate::state::SectorStore;

pub const PANEL_TITLE: &str = "Polygons";
pub const EMPTY_TITLE: &str = "No polygons created yet";
pub const EMPTY_HINT: &str =
    "Use the drawing tools in the top-right corner of the map to create polygons";

/// One entry of the sector list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow {
    pub id: SectorId,
    pub name: String,
    pub color: String,
    pub selected: bool,
}

/// One swatch of the color picker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorChoice {
    pub color: SectorColor,
    pub selected: bool,
}

/// Edit form of the selected sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub id: SectorId,
    pub name: String,
    pub editing_name: bool,
    pub colors: Vec<ColorChoice>,
    pub frequency_in_days: u32,
    pub frequency_offset: u32,
    /// Square kilometers, two decimals
    pub area: f64,
    pub point_count: usize,
    /// First ring position as "lat, lng"
    pub first_position: String,
}

impl DetailView {
    pub fn area_label(&self) -> String {
        format!("{} km²", self.area)
    }
}

/// Everything the panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub rows: Vec<ListRow>,
    pub detail: Option<DetailView>,
    /// The download button only appears when there is something to export
    pub export_enabled: bool,
}

impl PanelView {
    pub fn build(store: &SectorStore, state: &PanelState) -> Self {
        let selected = store.selected();
        let rows = store
            .sectors()
            .iter()
            .map(|sector| ListRow {
                id: sector.id.clone(),
                name: sector.name.clone(),
                color: sector.color.css().to_string(),
                selected: selected == Some(&sector.id),
            })
            .collect();

        let detail = store.selected_info().map(|info| DetailView {
            name: if state.shown() == Some(&info.id) {
                state.name_buffer().to_string()
            } else {
                info.name.clone()
            },
            editing_name: state.shown() == Some(&info.id) && state.is_editing_name(),
            colors: SectorColor::PALETTE
                .iter()
                .map(|color| ColorChoice {
                    color: color.clone(),
                    selected: *color == info.color,
                })
                .collect(),
            frequency_in_days: info.frequency_in_days,
            frequency_offset: info.frequency_offset,
            area: info.area,
            point_count: info.point_count(),
            first_position: info
                .coordinates
                .first()
                .and_then(|ring| ring.first())
                .map(|p| geometry::format_position(p))
                .unwrap_or_default(),
            id: info.id,
        });

        Self {
            rows,
            detail,
            export_enabled: !store.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::seed_sectors;
    use crate::state::SectorDefaults;

    fn store() -> SectorStore {
        SectorStore::new(seed_sectors(), SectorDefaults::default())
    }

    #[test]
    fn test_rows_follow_store_order() {
        let store = store();
        let view = PanelView::build(&store, &PanelState::new());
        assert_eq!(view.rows.len(), store.len());
        assert_eq!(view.rows[0].name, "Flagstaff");
        assert_eq!(view.rows[0].color, "purple");
        assert!(view.detail.is_none());
        assert!(view.export_enabled);
    }

    #[test]
    fn test_detail_of_selection() {
        let mut store = store();
        let mut state = PanelState::new();
        let id = SectorId::from("sector-0");
        store.select(&id);
        state.sync(&store);

        let view = PanelView::build(&store, &state);
        assert!(view.rows[0].selected);
        let detail = view.detail.unwrap();
        assert_eq!(detail.id, id);
        assert_eq!(detail.name, "Flagstaff");
        assert_eq!(detail.point_count, 6);
        assert!(detail.area > 0.0);
        assert!(detail.area_label().ends_with(" km²"));
        assert_eq!(detail.colors.len(), 9);
        assert_eq!(
            detail.colors.iter().filter(|c| c.selected).count(),
            1
        );
    }

    #[test]
    fn test_empty_list() {
        let mut store = SectorStore::new(Vec::new(), SectorDefaults::default());
        let view = PanelView::build(&store, &PanelState::new());
        assert!(view.is_empty());
        assert!(!view.export_enabled);
        store.reset_to_seed();
        assert!(PanelView::build(&store, &PanelState::new()).is_empty());
    }
}
