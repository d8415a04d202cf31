//! Settings facade. The mock path reads and writes the durable local record.

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{SettingsPatch, SettingsRecord};
use tracing::debug;

use super::service_names;
use crate::backend::Backend;
use crate::error::DataError;
use crate::mode::ModeStore;
use crate::service::registry::{ManagedService, ServiceContext};
use crate::service::router::{DataRouter, Route};
use crate::settings::SettingsPersistence;

pub struct SettingsService {
    router: DataRouter<dyn Backend>,
    local: Arc<SettingsPersistence>,
}

impl SettingsService {
    #[must_use]
    pub fn new(
        mode: Arc<ModeStore>,
        backend: Arc<dyn Backend>,
        local: Arc<SettingsPersistence>,
    ) -> Self {
        Self {
            router: DataRouter::new(service_names::SETTINGS, mode, backend),
            local,
        }
    }

    /// Current settings. The mock path always yields a complete record.
    ///
    /// # Errors
    ///
    /// Remote failure on the live path only.
    pub async fn get(&self) -> Result<SettingsRecord, DataError> {
        self.router
            .run("get", |route| async move {
                match route {
                    Route::Live(backend) => backend.load_settings().await.map_err(DataError::from),
                    Route::Mock => Ok(self.local.read()),
                }
            })
            .await
    }

    /// Deep-merges `patch` into the current settings and returns the result.
    ///
    /// # Errors
    ///
    /// Local-state failure if the patch does not fit the record or cannot be
    /// stored; remote failure on the live path.
    pub async fn update(&self, patch: &SettingsPatch) -> Result<SettingsRecord, DataError> {
        self.router
            .run("update", |route| async move {
                match route {
                    Route::Live(backend) => {
                        backend.update_settings(patch).await.map_err(DataError::from)
                    }
                    Route::Mock => self.local.write(patch).map_err(DataError::from),
                }
            })
            .await
    }

    /// Restores the default template.
    ///
    /// # Errors
    ///
    /// Local-state failure if the stored record cannot be cleared; remote
    /// failure on the live path.
    pub async fn reset(&self) -> Result<SettingsRecord, DataError> {
        self.router
            .run("reset", |route| async move {
                match route {
                    Route::Live(backend) => backend.reset_settings().await.map_err(DataError::from),
                    Route::Mock => self.local.reset().map_err(DataError::from),
                }
            })
            .await
    }
}

#[async_trait]
impl ManagedService for SettingsService {
    fn name(&self) -> &'static str {
        service_names::SETTINGS
    }

    async fn init(&self, ctx: &ServiceContext) -> anyhow::Result<()> {
        debug!(key = self.local.key(), mode = %ctx.mode.current(), "settings service ready");
        Ok(())
    }

    /// Settings are durable; a simulation reset leaves them alone.
    async fn reset(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn shutdown(&self, _terminate: bool) -> anyhow::Result<()> {
        Ok(())
    }
}
