//! Loading and saving the sector list through a durable key-value slot.
//!
//! The slot holds a JSON array of sector records. On startup an absent, empty
//! or malformed slot silently falls back to the seed dataset.

use std::collections::HashSet;

use crate::geometry::{self, GeometryError};
use crate::model::{SectorId, SectorRecord};
use crate::state::store::{PendingWrite, SectorDefaults, SectorStore};
use crate::storage::{KeyValueStore, StorageError};

/// Default storage key of the sector list.
pub const DEFAULT_STORAGE_KEY: &str = "hamiltonMapPolygons";

/// Reasons a persisted sector list is rejected.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Stored sectors are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Stored sector list is empty")]
    Empty,

    #[error("Stored sector list contains duplicate id '{0}'")]
    DuplicateId(SectorId),

    #[error("Stored sector '{id}' has invalid geometry: {source}")]
    InvalidGeometry {
        id: SectorId,
        #[source]
        source: GeometryError,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Serialize sectors for the storage slot.
pub fn encode_sectors(sectors: &[SectorRecord]) -> Result<String, serde_json::Error> {
    serde_json::to_string(sectors)
}

/// Parse and check a stored sector list.
pub fn decode_sectors(json: &str) -> Result<Vec<SectorRecord>, StoreError> {
    let sectors: Vec<SectorRecord> = serde_json::from_str(json)?;
    if sectors.is_empty() {
        return Err(StoreError::Empty);
    }
    let mut seen = HashSet::new();
    for sector in &sectors {
        if !seen.insert(&sector.id) {
            return Err(StoreError::DuplicateId(sector.id.clone()));
        }
        geometry::validate_polygon(&sector.geometry).map_err(|source| {
            StoreError::InvalidGeometry {
                id: sector.id.clone(),
                source,
            }
        })?;
    }
    Ok(sectors)
}

/// Read the saved list. `Ok(None)` means the slot is absent.
pub fn read_saved_sectors(
    storage: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<Vec<SectorRecord>>, StoreError> {
    match storage.get(key)? {
        Some(json) => decode_sectors(&json).map(Some),
        None => Ok(None),
    }
}

/// Build the store from storage, falling back to the seed dataset.
pub fn load_store(
    storage: &dyn KeyValueStore,
    key: &str,
    seed: Vec<SectorRecord>,
    defaults: SectorDefaults,
) -> SectorStore {
    match read_saved_sectors(storage, key) {
        Ok(Some(saved)) => {
            log::info!("📂 Loaded {} saved sectors", saved.len());
            SectorStore::with_saved(saved, seed, defaults)
        }
        Ok(None) => {
            log::info!("📂 No saved sectors, starting from {} seed sectors", seed.len());
            SectorStore::new(seed, defaults)
        }
        Err(e) => {
            log::warn!("Discarding saved sectors: {}", e);
            SectorStore::new(seed, defaults)
        }
    }
}

/// Apply the store's pending write to the slot, if any.
///
/// Returns the write that was performed.
pub fn flush(
    store: &mut SectorStore,
    storage: &mut dyn KeyValueStore,
    key: &str,
) -> Result<Option<PendingWrite>, StoreError> {
    let Some(write) = store.take_pending_write() else {
        return Ok(None);
    };
    match write {
        PendingWrite::Save => {
            let json = encode_sectors(store.sectors())?;
            storage.set(key, &json)?;
            log::debug!("💾 Saved {} sectors", store.len());
        }
        PendingWrite::Clear => {
            storage.remove(key)?;
            log::debug!("💾 Cleared saved sectors");
        }
    }
    Ok(Some(write))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::seed_sectors;
    use crate::geometry::{LngLat, feature_from_vertices};
    use crate::model::{SectorColor, SectorDraft};
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    const KEY: &str = DEFAULT_STORAGE_KEY;

    fn square() -> SectorDraft {
        SectorDraft::new(
            feature_from_vertices(&[
                LngLat::new(175.25, -37.77),
                LngLat::new(175.26, -37.77),
                LngLat::new(175.26, -37.78),
                LngLat::new(175.25, -37.78),
            ])
            .unwrap(),
        )
    }

    fn load(storage: &MemoryStore) -> SectorStore {
        load_store(storage, KEY, seed_sectors(), SectorDefaults::default())
    }

    #[test]
    fn test_absent_slot_uses_seed() {
        let store = load(&MemoryStore::new());
        assert_eq!(store.sectors(), seed_sectors().as_slice());
    }

    #[test]
    fn test_empty_array_uses_seed() {
        let store = load(&MemoryStore::with_entry(KEY, "[]"));
        assert_eq!(store.sectors(), seed_sectors().as_slice());
    }

    #[test]
    fn test_malformed_slot_uses_seed() {
        for bad in ["not json", "{\"list\": []}", "[{\"id\": 3}]", "null"] {
            let store = load(&MemoryStore::with_entry(KEY, bad));
            assert_eq!(store.len(), seed_sectors().len(), "input: {}", bad);
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut seed = seed_sectors();
        seed.truncate(1);
        seed.push(seed[0].clone());
        let json = encode_sectors(&seed).unwrap();
        assert!(matches!(
            decode_sectors(&json),
            Err(StoreError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let mut storage = MemoryStore::new();
        let mut store = load(&storage);
        store.create(square());
        let first = store.sectors()[0].id.clone();
        store.recolor(&first, SectorColor::Other("teal".into()));
        flush(&mut store, &mut storage, KEY).unwrap();

        let before = store.sectors().to_vec();
        drop(store);

        let reloaded = load(&storage);
        assert_eq!(reloaded.sectors(), before.as_slice());
    }

    #[test]
    fn test_round_trip_keeps_full_precision_coordinates() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(42);
        let mut storage = MemoryStore::new();
        let mut store = load(&storage);
        for _ in 0..200 {
            let lng = 175.2 + rng.gen_range(0.0..0.1);
            let lat = -37.8 + rng.gen_range(0.0..0.1);
            let d = rng.gen_range(0.001..0.01);
            let triangle = [
                LngLat::new(lng, lat),
                LngLat::new(lng + d, lat),
                LngLat::new(lng, lat + d),
            ];
            store.create(SectorDraft::new(feature_from_vertices(&triangle).unwrap()));
        }
        flush(&mut store, &mut storage, KEY).unwrap();

        let reloaded = load(&storage);
        assert_eq!(reloaded.sectors(), store.sectors());
    }

    #[test]
    fn test_flush_without_changes_writes_nothing() {
        let mut storage = MemoryStore::new();
        let mut store = load(&storage);
        assert_eq!(flush(&mut store, &mut storage, KEY).unwrap(), None);
        assert!(!storage.contains_key(KEY));
    }

    #[test]
    fn test_reset_clears_slot() {
        let mut storage = MemoryStore::new();
        let mut store = load(&storage);
        store.create(square());
        flush(&mut store, &mut storage, KEY).unwrap();
        assert!(storage.contains_key(KEY));

        store.reset_to_seed();
        assert_eq!(
            flush(&mut store, &mut storage, KEY).unwrap(),
            Some(PendingWrite::Clear)
        );
        assert!(!storage.contains_key(KEY));
        assert_eq!(store.sectors(), seed_sectors().as_slice());
    }
}
