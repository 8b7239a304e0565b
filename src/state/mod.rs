//! Editor state: the sector store and its persistence.

pub mod persistence;
mod store;

pub use persistence::{DEFAULT_STORAGE_KEY, StoreError, flush, load_store};
pub use store::{CREATED_ID_PREFIX, PendingWrite, SectorDefaults, SectorStore};
