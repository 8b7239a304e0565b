//! The sector store: single source of truth for the sector list and selection.
//!
//! All operations are synchronous, in-memory and all-or-nothing. Every list
//! mutation records a pending write which the caller flushes to durable
//! storage (see [`super::persistence`]).

use geojson::Feature;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::geometry;
use crate::model::{
    FrequencyField, SectorColor, SectorDraft, SectorId, SectorInfo, SectorPatch, SectorRecord,
};

/// Prefix of ids allocated for newly drawn sectors.
pub const CREATED_ID_PREFIX: &str = "polygon-";

/// Recurrence values given to newly drawn sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorDefaults {
    #[serde(default = "default_frequency_in_days")]
    pub frequency_in_days: u32,
    #[serde(default)]
    pub frequency_offset: u32,
}

fn default_frequency_in_days() -> u32 {
    7
}

impl Default for SectorDefaults {
    fn default() -> Self {
        Self {
            frequency_in_days: default_frequency_in_days(),
            frequency_offset: 0,
        }
    }
}

/// What the durable slot needs after the latest mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWrite {
    /// Serialize the full list into the slot.
    Save,
    /// Remove the slot (after a reset to the seed dataset).
    Clear,
}

/// Owns the live sector list, the selection and the newly-created marker.
#[derive(Debug)]
pub struct SectorStore {
    sectors: Vec<SectorRecord>,
    seed: Vec<SectorRecord>,
    selected: Option<SectorId>,
    newly_created: Option<SectorId>,
    defaults: SectorDefaults,
    rng: StdRng,
    last_id_millis: u64,
    pending_write: Option<PendingWrite>,
}

impl SectorStore {
    /// Create a store showing the seed dataset.
    pub fn new(seed: Vec<SectorRecord>, defaults: SectorDefaults) -> Self {
        Self {
            sectors: seed.clone(),
            seed,
            selected: None,
            newly_created: None,
            defaults,
            rng: StdRng::from_entropy(),
            last_id_millis: 0,
            pending_write: None,
        }
    }

    /// Create a store showing previously saved sectors, keeping `seed` for resets.
    pub fn with_saved(
        saved: Vec<SectorRecord>,
        seed: Vec<SectorRecord>,
        defaults: SectorDefaults,
    ) -> Self {
        let mut store = Self::new(seed, defaults);
        store.sectors = saved;
        store
    }

    /// Use a deterministic color generator.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// All sectors in creation order.
    pub fn sectors(&self) -> &[SectorRecord] {
        &self.sectors
    }

    /// The seed dataset restored by [`Self::reset_to_seed`].
    pub fn seed(&self) -> &[SectorRecord] {
        &self.seed
    }

    pub fn get(&self, id: &SectorId) -> Option<&SectorRecord> {
        self.sectors.iter().find(|s| &s.id == id)
    }

    pub fn contains(&self, id: &SectorId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }

    /// Currently selected sector id.
    pub fn selected(&self) -> Option<&SectorId> {
        self.selected.as_ref()
    }

    /// Id of the sector created most recently, until the user moves on.
    pub fn newly_created(&self) -> Option<&SectorId> {
        self.newly_created.as_ref()
    }

    pub fn defaults(&self) -> SectorDefaults {
        self.defaults
    }

    /// Name given to the next created sector.
    pub fn next_default_name(&self) -> String {
        format!("Polygon {}", self.sectors.len() + 1)
    }

    /// Derived read-only view of a sector, if it exists.
    pub fn info(&self, id: &SectorId) -> Option<SectorInfo> {
        let sector = self.get(id)?;
        Some(SectorInfo {
            id: sector.id.clone(),
            name: sector.name.clone(),
            area: geometry::area_km2(&sector.geometry),
            coordinates: geometry::polygon_rings(&sector.geometry)
                .cloned()
                .unwrap_or_default(),
            color: sector.color.clone(),
            frequency_in_days: sector.frequency_in_days,
            frequency_offset: sector.frequency_offset,
        })
    }

    /// View of the selected sector; `None` when nothing is selected or the id is stale.
    pub fn selected_info(&self) -> Option<SectorInfo> {
        self.selected.as_ref().and_then(|id| self.info(id))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a drawn shape as a new sector and return its id.
    ///
    /// A draft carrying the id of an existing sector only replaces that
    /// sector's geometry. The new sector is marked as newly created but is not
    /// selected; see [`Self::create_and_select`].
    pub fn create(&mut self, draft: SectorDraft) -> SectorId {
        if let Some(id) = draft.id.as_ref().filter(|id| self.contains(id)) {
            let id = id.clone();
            self.update_geometry(&id, draft.geometry);
            return id;
        }

        let id = self.allocate_id();
        let record = SectorRecord {
            id: id.clone(),
            name: self.next_default_name(),
            color: SectorColor::random(&mut self.rng),
            frequency_in_days: self.defaults.frequency_in_days,
            frequency_offset: self.defaults.frequency_offset,
            geometry: draft.geometry,
        };
        log::info!(
            "✅ Created sector {} '{}' ({})",
            record.id,
            record.name,
            record.color
        );
        self.sectors.push(record);
        self.newly_created = Some(id.clone());
        self.mark_changed();
        id
    }

    /// Create a sector and select it in one step.
    ///
    /// When the draft is routed as a geometry update the selection is left alone.
    pub fn create_and_select(&mut self, draft: SectorDraft) -> SectorId {
        let is_update = draft.id.as_ref().is_some_and(|id| self.contains(id));
        let id = self.create(draft);
        if !is_update {
            self.selected = Some(id.clone());
            self.newly_created = Some(id.clone());
            log::debug!("🔍 Selected new sector {}", id);
        }
        id
    }

    /// Replace the geometry of a sector. Returns false if the id is unknown.
    pub fn update_geometry(&mut self, id: &SectorId, geometry: Feature) -> bool {
        let Some(sector) = self.get_mut(id) else {
            log::debug!("Ignoring geometry update for unknown sector {}", id);
            return false;
        };
        sector.geometry = geometry;
        log::info!("✏️ Updated shape of sector {}", id);
        self.mark_changed();
        true
    }

    /// Toggle selection of a sector.
    ///
    /// Selecting the selected sector clears the selection. The newly-created
    /// marker survives only if it names the sector being selected. Unknown ids
    /// are ignored.
    pub fn select(&mut self, id: &SectorId) {
        if !self.contains(id) {
            log::debug!("Ignoring selection of unknown sector {}", id);
            return;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            log::debug!("🔍 Deselected sector {}", id);
        } else {
            self.selected = Some(id.clone());
            log::debug!("🔍 Selected sector {}", id);
        }
        if self.newly_created.as_ref() != Some(id) {
            self.newly_created = None;
        }
    }

    /// Clear the selection, if any, with the same marker rules as [`Self::select`].
    pub fn deselect(&mut self) {
        if let Some(id) = self.selected.clone() {
            self.select(&id);
        }
    }

    /// Remove a sector. Clears the selection and marker when they name it.
    pub fn delete(&mut self, id: &SectorId) -> Option<SectorRecord> {
        let index = self.sectors.iter().position(|s| &s.id == id)?;
        let removed = self.sectors.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.newly_created.as_ref() == Some(id) {
            self.newly_created = None;
        }
        log::info!("🗑️ Deleted sector {} '{}'", removed.id, removed.name);
        self.mark_changed();
        Some(removed)
    }

    /// Rename a sector. Naming the newly created sector clears the marker.
    pub fn rename(&mut self, id: &SectorId, name: impl Into<String>) -> bool {
        let name = name.into();
        let Some(sector) = self.get_mut(id) else {
            return false;
        };
        log::debug!("🏷️ Renamed sector {}: '{}' -> '{}'", id, sector.name, name);
        sector.name = name;
        if self.newly_created.as_ref() == Some(id) {
            self.newly_created = None;
        }
        self.mark_changed();
        true
    }

    pub fn recolor(&mut self, id: &SectorId, color: SectorColor) -> bool {
        let Some(sector) = self.get_mut(id) else {
            return false;
        };
        log::debug!("🎨 Sector {} color: {}", id, color);
        sector.color = color;
        self.mark_changed();
        true
    }

    /// Set one recurrence field. Callers clamp input to non-negative values.
    pub fn set_frequency(&mut self, id: &SectorId, field: FrequencyField, value: u32) -> bool {
        let Some(sector) = self.get_mut(id) else {
            return false;
        };
        sector.set_frequency(field, value);
        log::debug!("📅 Sector {} {:?} = {}", id, field, value);
        self.mark_changed();
        true
    }

    /// Apply several field edits to one sector at once.
    pub fn apply_patch(&mut self, id: &SectorId, patch: SectorPatch) -> bool {
        if patch.is_empty() || !self.contains(id) {
            return false;
        }
        if let Some(name) = patch.name {
            self.rename(id, name);
        }
        if let Some(color) = patch.color {
            self.recolor(id, color);
        }
        if let Some(days) = patch.frequency_in_days {
            self.set_frequency(id, FrequencyField::InDays, days);
        }
        if let Some(offset) = patch.frequency_offset {
            self.set_frequency(id, FrequencyField::Offset, offset);
        }
        true
    }

    /// Discard every change and restore the seed dataset.
    ///
    /// The durable slot is scheduled for removal rather than rewritten.
    pub fn reset_to_seed(&mut self) {
        self.sectors = self.seed.clone();
        self.selected = None;
        self.newly_created = None;
        self.pending_write = Some(PendingWrite::Clear);
        log::info!("🔄 Reset to {} seed sectors", self.sectors.len());
    }

    // ========================================================================
    // Persistence bookkeeping
    // ========================================================================

    /// Whether there is a write waiting to be flushed.
    pub fn has_pending_write(&self) -> bool {
        self.pending_write.is_some()
    }

    /// Take the pending write, leaving none.
    pub fn take_pending_write(&mut self) -> Option<PendingWrite> {
        self.pending_write.take()
    }

    fn mark_changed(&mut self) {
        self.pending_write = Some(PendingWrite::Save);
    }

    fn get_mut(&mut self, id: &SectorId) -> Option<&mut SectorRecord> {
        self.sectors.iter_mut().find(|s| &s.id == id)
    }

    /// Allocate a time-based id, strictly increasing within this session.
    fn allocate_id(&mut self) -> SectorId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut millis = now.max(self.last_id_millis + 1);
        loop {
            let id = SectorId::new(format!("{}{}", CREATED_ID_PREFIX, millis));
            if !self.contains(&id) {
                self.last_id_millis = millis;
                return id;
            }
            millis += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{LngLat, feature_from_vertices};
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn triangle(offset: f64) -> Feature {
        feature_from_vertices(&[
            LngLat::new(175.27 + offset, -37.78),
            LngLat::new(175.28 + offset, -37.78),
            LngLat::new(175.28 + offset, -37.79),
        ])
        .unwrap()
    }

    fn seed() -> Vec<SectorRecord> {
        (0..3)
            .map(|i| SectorRecord {
                id: SectorId::new(format!("sector-{}", i)),
                name: format!("Seed {}", i),
                color: SectorColor::Green,
                frequency_in_days: 0,
                frequency_offset: 0,
                geometry: triangle(i as f64 * 0.1),
            })
            .collect()
    }

    fn store() -> SectorStore {
        SectorStore::new(seed(), SectorDefaults::default()).with_rng_seed(42)
    }

    #[test]
    fn test_create_appends_with_defaults() {
        let mut store = store();
        let geometry = triangle(1.0);
        let id = store.create(SectorDraft::new(geometry.clone()));

        assert_eq!(store.len(), 4);
        let created = store.get(&id).unwrap();
        assert_eq!(created.name, "Polygon 4");
        assert_eq!(created.geometry, geometry);
        assert_eq!(created.frequency_in_days, 7);
        assert_eq!(created.frequency_offset, 0);
        assert!(created.color.is_palette());
        assert!(created.id.as_str().starts_with(CREATED_ID_PREFIX));
        assert_eq!(store.newly_created(), Some(&id));
        assert_eq!(store.selected(), None);
        assert_eq!(store.take_pending_write(), Some(PendingWrite::Save));
    }

    #[test]
    fn test_create_ids_are_unique() {
        let mut store = store();
        let ids: HashSet<SectorId> = (0..20)
            .map(|i| store.create(SectorDraft::new(triangle(i as f64))))
            .collect();
        assert_eq!(ids.len(), 20);
        assert_eq!(store.len(), 23);
    }

    #[test]
    fn test_create_with_existing_id_updates_geometry_only() {
        let mut store = store();
        let target = SectorId::from("sector-1");
        store.rename(&target, "Kept");
        let new_shape = triangle(5.0);

        let id = store.create(SectorDraft::new(new_shape.clone()).with_id(target.clone()));

        assert_eq!(id, target);
        assert_eq!(store.len(), 3);
        let sector = store.get(&target).unwrap();
        assert_eq!(sector.geometry, new_shape);
        assert_eq!(sector.name, "Kept");
        assert_eq!(store.newly_created(), None);
    }

    #[test]
    fn test_create_with_unknown_id_creates() {
        let mut store = store();
        let id = store.create(SectorDraft::new(triangle(2.0)).with_id(SectorId::from("ghost")));
        assert_ne!(id.as_str(), "ghost");
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_create_and_select() {
        let mut store = store();
        let id = store.create_and_select(SectorDraft::new(triangle(1.0)));
        assert_eq!(store.selected(), Some(&id));
        assert_eq!(store.newly_created(), Some(&id));
        assert!(store.selected_info().is_some());
    }

    #[test]
    fn test_select_toggles() {
        let mut store = store();
        let id = SectorId::from("sector-0");
        store.select(&id);
        assert_eq!(store.selected(), Some(&id));
        store.select(&id);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_select_other_replaces() {
        let mut store = store();
        store.select(&SectorId::from("sector-0"));
        store.select(&SectorId::from("sector-2"));
        assert_eq!(store.selected(), Some(&SectorId::from("sector-2")));
    }

    #[test]
    fn test_select_unknown_is_ignored() {
        let mut store = store();
        store.select(&SectorId::from("sector-0"));
        store.select(&SectorId::from("nope"));
        assert_eq!(store.selected(), Some(&SectorId::from("sector-0")));
    }

    #[test]
    fn test_select_other_sector_clears_marker() {
        let mut store = store();
        store.create_and_select(SectorDraft::new(triangle(1.0)));

        store.select(&SectorId::from("sector-0"));
        assert_eq!(store.newly_created(), None);
    }

    #[test]
    fn test_select_new_sector_keeps_marker() {
        let mut store = store();
        let id = store.create(SectorDraft::new(triangle(1.0)));
        store.select(&id);
        assert_eq!(store.newly_created(), Some(&id));
        assert_eq!(store.selected(), Some(&id));
    }

    #[test]
    fn test_selection_does_not_schedule_write() {
        let mut store = store();
        store.select(&SectorId::from("sector-0"));
        assert!(!store.has_pending_write());
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut store = store();
        let id = SectorId::from("sector-1");
        store.select(&id);
        let removed = store.delete(&id).unwrap();
        assert_eq!(removed.id, id);
        assert_eq!(store.selected(), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_other_keeps_selection() {
        let mut store = store();
        let selected = SectorId::from("sector-1");
        store.select(&selected);
        store.delete(&SectorId::from("sector-2"));
        assert_eq!(store.selected(), Some(&selected));
    }

    #[test]
    fn test_delete_newly_created_clears_marker() {
        let mut store = store();
        let id = store.create(SectorDraft::new(triangle(1.0)));
        store.delete(&id);
        assert_eq!(store.newly_created(), None);
        assert!(store.delete(&id).is_none());
    }

    #[test]
    fn test_field_updates_ignore_unknown_ids() {
        let mut store = store();
        let ghost = SectorId::from("ghost");
        assert!(!store.rename(&ghost, "x"));
        assert!(!store.recolor(&ghost, SectorColor::Red));
        assert!(!store.set_frequency(&ghost, FrequencyField::InDays, 3));
        assert!(!store.has_pending_write());
    }

    #[test]
    fn test_sequential_recolor_keeps_last() {
        let mut store = store();
        let id = SectorId::from("sector-0");
        store.recolor(&id, SectorColor::Red);
        store.recolor(&id, SectorColor::Black);
        assert_eq!(store.get(&id).unwrap().color, SectorColor::Black);
        assert_eq!(store.sectors().iter().filter(|s| s.id == id).count(), 1);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_rename_clears_marker() {
        let mut store = store();
        let id = store.create_and_select(SectorDraft::new(triangle(1.0)));
        store.rename(&id, "Depot");
        assert_eq!(store.newly_created(), None);
        assert_eq!(store.selected(), Some(&id));
    }

    #[test]
    fn test_apply_patch() {
        let mut store = store();
        let id = SectorId::from("sector-2");
        let patch = SectorPatch {
            name: Some("Renamed".into()),
            color: Some(SectorColor::Pink),
            frequency_in_days: Some(14),
            frequency_offset: Some(3),
        };
        assert!(store.apply_patch(&id, patch));
        let sector = store.get(&id).unwrap();
        assert_eq!(sector.name, "Renamed");
        assert_eq!(sector.color, SectorColor::Pink);
        assert_eq!(sector.frequency(FrequencyField::InDays), 14);
        assert_eq!(sector.frequency(FrequencyField::Offset), 3);
    }

    #[test]
    fn test_reset_to_seed() {
        let mut store = store();
        let id = store.create_and_select(SectorDraft::new(triangle(1.0)));
        store.rename(&SectorId::from("sector-0"), "Changed");
        store.delete(&SectorId::from("sector-1"));
        store.take_pending_write();

        store.reset_to_seed();

        assert_eq!(store.sectors(), seed().as_slice());
        assert_eq!(store.selected(), None);
        assert_eq!(store.newly_created(), None);
        assert!(!store.contains(&id));
        assert_eq!(store.take_pending_write(), Some(PendingWrite::Clear));
    }

    #[test]
    fn test_selected_info() {
        let mut store = store();
        assert_eq!(store.selected_info(), None);

        let id = SectorId::from("sector-0");
        store.select(&id);
        let info = store.selected_info().unwrap();
        assert_eq!(info.id, id);
        assert_eq!(info.name, "Seed 0");
        assert_eq!(info.point_count(), 4);
        assert!(info.area > 0.0);
    }

    #[test]
    fn test_info_for_stale_id() {
        let store = store();
        assert_eq!(store.info(&SectorId::from("gone")), None);
    }
}
