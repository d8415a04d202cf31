//! Archived products facade.

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::{ArchiveRequest, ArchivedItem, Domain, Product};
use tracing::debug;

use super::service_names;
use crate::backend::Backend;
use crate::error::DataError;
use crate::mock::MockDataProvider;
use crate::mode::ModeStore;
use crate::service::registry::{ManagedService, ServiceContext};
use crate::service::router::{DataRouter, Route};

pub struct ArchiveService {
    router: DataRouter<dyn Backend>,
    mock: Arc<MockDataProvider>,
}

impl ArchiveService {
    #[must_use]
    pub fn new(mode: Arc<ModeStore>, backend: Arc<dyn Backend>, mock: Arc<MockDataProvider>) -> Self {
        Self {
            router: DataRouter::new(service_names::ARCHIVE, mode, backend),
            mock,
        }
    }

    /// # Errors
    ///
    /// Remote failure on the live path.
    pub async fn list(&self) -> Result<Vec<ArchivedItem>, DataError> {
        self.router
            .run("list", |route| async move {
                match route {
                    Route::Live(backend) => backend.list_archived().await.map_err(DataError::from),
                    Route::Mock => Ok(self.mock.archived()),
                }
            })
            .await
    }

    /// Takes a product out of the active catalogue and keeps it for restoration.
    ///
    /// # Errors
    ///
    /// Not-found for an unknown product, or a remote failure.
    pub async fn archive(&self, request: &ArchiveRequest) -> Result<ArchivedItem, DataError> {
        self.router
            .run("archive", |route| async move {
                match route {
                    Route::Live(backend) => {
                        backend.archive_product(request).await.map_err(DataError::from)
                    }
                    Route::Mock => self.mock.archive_product(request).map_err(DataError::from),
                }
            })
            .await
    }

    /// Puts an archived product back into the catalogue.
    ///
    /// # Errors
    ///
    /// Not-found for an unknown archive entry, or a remote failure.
    pub async fn restore(&self, id: &str) -> Result<Product, DataError> {
        self.router
            .run("restore", |route| async move {
                match route {
                    Route::Live(backend) => backend.restore_archived(id).await.map_err(DataError::from),
                    Route::Mock => self.mock.restore_archived(id).map_err(DataError::from),
                }
            })
            .await
    }

    /// Deletes an archive entry for good.
    ///
    /// # Errors
    ///
    /// Not-found for an unknown archive entry, or a remote failure.
    pub async fn purge(&self, id: &str) -> Result<(), DataError> {
        self.router
            .run("purge", |route| async move {
                match route {
                    Route::Live(backend) => backend.purge_archived(id).await.map_err(DataError::from),
                    Route::Mock => self.mock.purge_archived(id).map_err(DataError::from),
                }
            })
            .await
    }
}

#[async_trait]
impl ManagedService for ArchiveService {
    fn name(&self) -> &'static str {
        service_names::ARCHIVE
    }

    async fn init(&self, ctx: &ServiceContext) -> anyhow::Result<()> {
        debug!(mode = %ctx.mode.current(), "archive service ready");
        Ok(())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        self.mock.reset_domain(Domain::Archived);
        Ok(())
    }

    async fn shutdown(&self, _terminate: bool) -> anyhow::Result<()> {
        Ok(())
    }
}
