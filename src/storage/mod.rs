//! Durable key-value slots for persisted editor state.
//!
//! The browser build writes to `localStorage`; the native build keeps one JSON
//! file per key in the data directory. Tests use the in-memory store.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

#[cfg(target_arch = "wasm32")]
mod local;

pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore;

/// A string-valued key-value store.
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Errors that can occur when accessing a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error on the native data directory
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend could not be reached (no window, storage disabled, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The backend rejected the operation (quota exceeded, ...)
    #[error("Storage error: {0}")]
    Backend(String),
}
