//! Transient panel state: the name edit buffer and its focus rules.
//!
//! None of this is part of the sector data. It follows the store's selection
//! and is reset whenever the selection changes.

use crate::model::{FrequencyField, SectorId};
use crate::panel::command::{PanelCommand, parse_frequency_input};
use crate::state::SectorStore;

/// Input from the panel's own controls.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelMessage {
    /// Pencil button or click on the read-only name field
    StartEditingName,
    NameChanged(String),
    /// Check button or Enter
    CommitName,
    CancelEditingName,
    /// Raw text typed into a frequency field
    FrequencyInput { field: FrequencyField, input: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelState {
    /// Sector the detail form currently shows
    shown: Option<SectorId>,
    name_buffer: String,
    editing_name: bool,
    /// Newly created sector whose name field was already opened
    auto_focused: Option<SectorId>,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shown(&self) -> Option<&SectorId> {
        self.shown.as_ref()
    }

    pub fn name_buffer(&self) -> &str {
        &self.name_buffer
    }

    pub fn is_editing_name(&self) -> bool {
        self.editing_name
    }

    /// Bring the view state in line with the store after any change.
    pub fn sync(&mut self, store: &SectorStore) {
        let selected = store.selected().cloned();
        let name = selected
            .as_ref()
            .and_then(|id| store.get(id))
            .map(|sector| sector.name.clone())
            .unwrap_or_default();

        if selected != self.shown {
            self.shown = selected.clone();
            self.editing_name = false;
        }
        if !self.editing_name {
            self.name_buffer = name.clone();
        }

        // A freshly drawn and selected sector opens its name for editing once.
        if let Some(id) = store.newly_created() {
            if selected.as_ref() == Some(id) && self.auto_focused.as_ref() != Some(id) {
                log::debug!("📝 Opening name editor for new sector {}", id);
                self.auto_focused = Some(id.clone());
                self.editing_name = true;
                self.name_buffer = name;
            }
        }
    }

    /// Handle panel input, returning the store command it produces, if any.
    pub fn handle(&mut self, message: PanelMessage, store: &SectorStore) -> Option<PanelCommand> {
        let id = self.shown.clone()?;
        match message {
            PanelMessage::StartEditingName => {
                self.editing_name = true;
                self.name_buffer = store.get(&id)?.name.clone();
                None
            }
            PanelMessage::NameChanged(text) => {
                if self.editing_name {
                    self.name_buffer = text;
                }
                None
            }
            PanelMessage::CommitName => {
                let name = self.name_buffer.trim();
                if !self.editing_name || name.is_empty() {
                    return None;
                }
                let name = name.to_string();
                self.editing_name = false;
                self.name_buffer = name.clone();
                Some(PanelCommand::Rename { id, name })
            }
            PanelMessage::CancelEditingName => {
                self.editing_name = false;
                self.name_buffer = store.get(&id).map(|s| s.name.clone()).unwrap_or_default();
                None
            }
            PanelMessage::FrequencyInput { field, input } => Some(PanelCommand::SetFrequency {
                id,
                field,
                value: parse_frequency_input(&input),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::seed_sectors;
    use crate::geometry::{LngLat, feature_from_vertices};
    use crate::model::SectorDraft;
    use crate::state::SectorDefaults;

    fn store() -> SectorStore {
        SectorStore::new(seed_sectors(), SectorDefaults::default())
    }

    fn draft() -> SectorDraft {
        SectorDraft::new(
            feature_from_vertices(&[
                LngLat::new(175.20, -37.70),
                LngLat::new(175.21, -37.70),
                LngLat::new(175.21, -37.71),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_new_sector_opens_name_editor() {
        let mut store = store();
        let mut panel = PanelState::new();
        let id = store.create_and_select(draft());
        panel.sync(&store);

        assert_eq!(panel.shown(), Some(&id));
        assert!(panel.is_editing_name());
        assert_eq!(panel.name_buffer(), store.get(&id).unwrap().name);
    }

    #[test]
    fn test_existing_sector_does_not_open_editor() {
        let mut store = store();
        let mut panel = PanelState::new();
        store.select(&SectorId::from("sector-0"));
        panel.sync(&store);
        assert!(!panel.is_editing_name());
        assert_eq!(panel.name_buffer(), "Flagstaff");
    }

    #[test]
    fn test_commit_trims_and_renames() {
        let mut store = store();
        let mut panel = PanelState::new();
        let id = store.create_and_select(draft());
        panel.sync(&store);

        panel.handle(PanelMessage::NameChanged("  Depot run  ".into()), &store);
        let command = panel.handle(PanelMessage::CommitName, &store);
        assert_eq!(
            command,
            Some(PanelCommand::Rename {
                id,
                name: "Depot run".into()
            })
        );
        assert!(!panel.is_editing_name());
    }

    #[test]
    fn test_blank_name_is_ignored() {
        let mut store = store();
        let mut panel = PanelState::new();
        store.select(&SectorId::from("sector-1"));
        panel.sync(&store);
        panel.handle(PanelMessage::StartEditingName, &store);
        panel.handle(PanelMessage::NameChanged("   ".into()), &store);

        assert_eq!(panel.handle(PanelMessage::CommitName, &store), None);
        assert!(panel.is_editing_name());
    }

    #[test]
    fn test_typing_requires_edit_mode() {
        let mut store = store();
        let mut panel = PanelState::new();
        store.select(&SectorId::from("sector-1"));
        panel.sync(&store);
        panel.handle(PanelMessage::NameChanged("x".into()), &store);
        assert_eq!(panel.name_buffer(), "Rototuna");
        assert_eq!(panel.handle(PanelMessage::CommitName, &store), None);
    }

    #[test]
    fn test_selection_change_resets_editing() {
        let mut store = store();
        let mut panel = PanelState::new();
        store.select(&SectorId::from("sector-0"));
        panel.sync(&store);
        panel.handle(PanelMessage::StartEditingName, &store);
        panel.handle(PanelMessage::NameChanged("half typed".into()), &store);

        store.select(&SectorId::from("sector-2"));
        panel.sync(&store);
        assert!(!panel.is_editing_name());
        assert_eq!(panel.name_buffer(), "Nawton");
    }

    #[test]
    fn test_auto_focus_happens_once() {
        let mut store = store();
        let mut panel = PanelState::new();
        store.create_and_select(draft());
        panel.sync(&store);
        panel.handle(PanelMessage::CancelEditingName, &store);
        panel.sync(&store);
        assert!(!panel.is_editing_name());
    }

    #[test]
    fn test_frequency_input() {
        let mut store = store();
        let mut panel = PanelState::new();
        let id = SectorId::from("sector-3");
        store.select(&id);
        panel.sync(&store);

        let command = panel.handle(
            PanelMessage::FrequencyInput {
                field: FrequencyField::Offset,
                input: "-4".into(),
            },
            &store,
        );
        assert_eq!(
            command,
            Some(PanelCommand::SetFrequency {
                id,
                field: FrequencyField::Offset,
                value: 0
            })
        );
    }

    #[test]
    fn test_no_selection_no_commands() {
        let store = store();
        let mut panel = PanelState::new();
        panel.sync(&store);
        assert_eq!(panel.handle(PanelMessage::StartEditingName, &store), None);
        assert_eq!(
            panel.handle(
                PanelMessage::FrequencyInput {
                    field: FrequencyField::InDays,
                    input: "3".into()
                },
                &store
            ),
            None
        );
    }
}
