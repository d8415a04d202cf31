//! Durable key-value storage for simulated state.
//!
//! Defines [`KeyValueStore`], a small synchronous string store in the shape of
//! browser `localStorage`: one string value per namespaced key. Settings and
//! the persisted mode override each occupy a single key.
//!
//! Implementations:
//! - [`MemoryStore`]: `DashMap`-backed, for tests and ephemeral sessions
//! - [`FileStore`]: one file per key in a directory, survives restarts

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a [`KeyValueStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid storage key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },
}

/// Synchronous string key-value store.
///
/// All operations complete without suspension, so callers may hold a
/// `parking_lot` lock across a read-modify-write sequence.
///
/// Wrapped in `Arc<dyn KeyValueStore>` for sharing across tasks.
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing medium rejects the removal.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
