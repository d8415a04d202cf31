//! Product catalogue facade.

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::analytics;
use backoffice_core::{Domain, InventorySummary, NewProduct, Product, ProductPatch};
use tracing::debug;

use super::service_names;
use crate::backend::Backend;
use crate::error::DataError;
use crate::mock::MockDataProvider;
use crate::mode::ModeStore;
use crate::service::registry::{ManagedService, ServiceContext};
use crate::service::router::{DataRouter, Route};

pub struct ProductService {
    router: DataRouter<dyn Backend>,
    mock: Arc<MockDataProvider>,
}

impl ProductService {
    #[must_use]
    pub fn new(mode: Arc<ModeStore>, backend: Arc<dyn Backend>, mock: Arc<MockDataProvider>) -> Self {
        Self {
            router: DataRouter::new(service_names::PRODUCTS, mode, backend),
            mock,
        }
    }

    /// # Errors
    ///
    /// Remote failure on the live path.
    pub async fn list(&self) -> Result<Vec<Product>, DataError> {
        self.router
            .run("list", |route| async move {
                match route {
                    Route::Live(backend) => backend.list_products().await.map_err(DataError::from),
                    Route::Mock => Ok(self.mock.products()),
                }
            })
            .await
    }

    /// # Errors
    ///
    /// Not-found on either path, or a remote failure.
    pub async fn get(&self, id: &str) -> Result<Product, DataError> {
        self.router
            .run("get", |route| async move {
                match route {
                    Route::Live(backend) => backend.get_product(id).await.map_err(DataError::from),
                    Route::Mock => self.mock.product(id).map_err(DataError::from),
                }
            })
            .await
    }

    /// # Errors
    ///
    /// Invalid input on the mock path, or a remote failure.
    pub async fn create(&self, product: NewProduct) -> Result<Product, DataError> {
        self.router
            .run("create", |route| async move {
                match route {
                    Route::Live(backend) => {
                        backend.create_product(&product).await.map_err(DataError::from)
                    }
                    Route::Mock => self.mock.create_product(product).map_err(DataError::from),
                }
            })
            .await
    }

    /// # Errors
    ///
    /// Not-found or invalid input, or a remote failure.
    pub async fn update(&self, id: &str, patch: &ProductPatch) -> Result<Product, DataError> {
        self.router
            .run("update", |route| async move {
                match route {
                    Route::Live(backend) => {
                        backend.update_product(id, patch).await.map_err(DataError::from)
                    }
                    Route::Mock => self.mock.update_product(id, patch).map_err(DataError::from),
                }
            })
            .await
    }

    /// # Errors
    ///
    /// Not-found on either path, or a remote failure.
    pub async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.router
            .run("delete", |route| async move {
                match route {
                    Route::Live(backend) => backend.delete_product(id).await.map_err(DataError::from),
                    Route::Mock => self.mock.delete_product(id).map_err(DataError::from),
                }
            })
            .await
    }

    /// Stock totals per category. Computed locally on both paths.
    ///
    /// # Errors
    ///
    /// Remote failure while listing products on the live path.
    pub async fn inventory_summary(&self) -> Result<InventorySummary, DataError> {
        self.router
            .run("inventory_summary", |route| async move {
                match route {
                    Route::Live(backend) => backend
                        .list_products()
                        .await
                        .map(|products| analytics::inventory_summary(&products))
                        .map_err(DataError::from),
                    Route::Mock => Ok(self.mock.inventory_summary()),
                }
            })
            .await
    }

    /// Products with stock at or below `threshold`, lowest first.
    ///
    /// # Errors
    ///
    /// Remote failure while listing products on the live path.
    pub async fn low_stock(&self, threshold: u32) -> Result<Vec<Product>, DataError> {
        self.router
            .run("low_stock", |route| async move {
                match route {
                    Route::Live(backend) => backend
                        .list_products()
                        .await
                        .map(|products| analytics::low_stock(&products, threshold))
                        .map_err(DataError::from),
                    Route::Mock => Ok(self.mock.low_stock(threshold)),
                }
            })
            .await
    }
}

#[async_trait]
impl ManagedService for ProductService {
    fn name(&self) -> &'static str {
        service_names::PRODUCTS
    }

    async fn init(&self, ctx: &ServiceContext) -> anyhow::Result<()> {
        debug!(mode = %ctx.mode.current(), "product service ready");
        Ok(())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        self.mock.reset_domain(Domain::Products);
        Ok(())
    }

    async fn shutdown(&self, _terminate: bool) -> anyhow::Result<()> {
        Ok(())
    }
}
