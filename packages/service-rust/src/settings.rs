//! Durable settings record for the simulated data path.
//!
//! [`SettingsPersistence`] owns one key in a [`KeyValueStore`]. Reads never
//! fail: a missing record yields the default template, and an unreadable one
//! is replaced by the template on the spot so the next read is clean. Writes
//! run read-merge-write under a mutex, so concurrent writers to different
//! sections never lose each other's updates.

use std::sync::Arc;

use backoffice_core::{SettingsPatch, SettingsRecord};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::LocalStateError;
use crate::storage::KeyValueStore;

/// Settings record persisted under a single namespaced key.
pub struct SettingsPersistence {
    store: Arc<dyn KeyValueStore>,
    key: String,
    /// Serializes read-merge-write; the store itself is never awaited on.
    write_lock: Mutex<()>,
}

impl SettingsPersistence {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Key the record is stored under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current record merged onto the default template.
    pub fn read(&self) -> SettingsRecord {
        let _guard = self.write_lock.lock();
        self.read_locked()
    }

    /// Deep-merges `patch` into the stored record, persists and returns the result.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStateError::Settings`] if the patch does not fit the record
    /// schema, or [`LocalStateError::Store`] if the merged record cannot be
    /// written. The stored record is unchanged in both cases.
    pub fn write(&self, patch: &SettingsPatch) -> Result<SettingsRecord, LocalStateError> {
        let _guard = self.write_lock.lock();
        let merged = self.read_locked().merged(patch)?;
        let raw = merged.to_stored()?;
        if let Err(e) = self.store.set(&self.key, &raw) {
            error!(key = %self.key, error = %e, "failed to persist settings");
            return Err(e.into());
        }
        debug!(key = %self.key, bytes = raw.len(), "settings written");
        Ok(merged)
    }

    /// Clears the stored record and returns the default template.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStateError::Store`] if the record cannot be removed.
    pub fn reset(&self) -> Result<SettingsRecord, LocalStateError> {
        let _guard = self.write_lock.lock();
        self.store.remove(&self.key)?;
        info!(key = %self.key, "settings reset to defaults");
        Ok(SettingsRecord::default())
    }

    fn read_locked(&self) -> SettingsRecord {
        match self.store.get(&self.key) {
            Ok(None) => SettingsRecord::default(),
            Ok(Some(raw)) => match SettingsRecord::from_stored(&raw) {
                Ok(record) => record,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "stored settings are unreadable; restoring defaults");
                    self.heal();
                    SettingsRecord::default()
                }
            },
            Err(e) => {
                // Medium unreadable: leave whatever is there for a later read.
                warn!(key = %self.key, error = %e, "could not read stored settings; using defaults");
                SettingsRecord::default()
            }
        }
    }

    fn heal(&self) {
        let result = SettingsRecord::default()
            .to_stored()
            .map_err(LocalStateError::from)
            .and_then(|raw| self.store.set(&self.key, &raw).map_err(LocalStateError::from));
        if let Err(e) = result {
            error!(key = %self.key, error = %e, "failed to replace corrupt settings");
        }
    }
}

impl std::fmt::Debug for SettingsPersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsPersistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
