//! The seed dataset bundled with the application.

use crate::format::sector_list::SectorList;
use crate::model::SectorRecord;

/// Prefix of the ids given to seed sectors (`sector-0`, `sector-1`, ...).
pub const SEED_ID_PREFIX: &str = "sector-";

const SEED_JSON: &str = include_str!("../../assets/sectors.json");

/// Parse the bundled seed dataset.
///
/// The result is deterministic: two calls return equal lists.
pub fn seed_sectors() -> Vec<SectorRecord> {
    match SectorList::from_json(SEED_JSON) {
        Ok(document) => document.into_records(SEED_ID_PREFIX),
        Err(e) => {
            log::error!("Bundled seed dataset is invalid: {}", e);
            Vec::new()
        }
    }
}
