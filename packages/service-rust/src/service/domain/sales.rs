//! Sales ledger facade, including the dashboard aggregations.

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_core::analytics;
use backoffice_core::{CategorySales, Domain, HourlySales, NewSale, Sale, SalesSummary};
use tracing::debug;

use super::service_names;
use crate::backend::Backend;
use crate::error::DataError;
use crate::mock::MockDataProvider;
use crate::mode::ModeStore;
use crate::service::registry::{ManagedService, ServiceContext};
use crate::service::router::{DataRouter, Route};

pub struct SalesService {
    router: DataRouter<dyn Backend>,
    mock: Arc<MockDataProvider>,
}

impl SalesService {
    #[must_use]
    pub fn new(mode: Arc<ModeStore>, backend: Arc<dyn Backend>, mock: Arc<MockDataProvider>) -> Self {
        Self {
            router: DataRouter::new(service_names::SALES, mode, backend),
            mock,
        }
    }

    /// # Errors
    ///
    /// Remote failure on the live path.
    pub async fn list(&self) -> Result<Vec<Sale>, DataError> {
        self.router
            .run("list", |route| async move {
                match route {
                    Route::Live(backend) => backend.list_sales().await.map_err(DataError::from),
                    Route::Mock => Ok(self.mock.sales()),
                }
            })
            .await
    }

    /// Records a sale. On the mock path the sold units leave stock.
    ///
    /// # Errors
    ///
    /// Invalid lines or an unknown product on the mock path, or a remote failure.
    pub async fn create(&self, sale: NewSale) -> Result<Sale, DataError> {
        self.router
            .run("create", |route| async move {
                match route {
                    Route::Live(backend) => backend.create_sale(&sale).await.map_err(DataError::from),
                    Route::Mock => self.mock.create_sale(sale).map_err(DataError::from),
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
                    Route::Live(backend) => backend.delete_sale(id).await.map_err(DataError::from),
                    Route::Mock => self.mock.delete_sale(id).map_err(DataError::from),
                }
            })
            .await
    }

    /// Sale count and revenue per UTC hour of day; always 24 buckets.
    ///
    /// # Errors
    ///
    /// Remote failure on the live path.
    pub async fn sales_by_hour(&self) -> Result<Vec<HourlySales>, DataError> {
        self.router
            .run("sales_by_hour", |route| async move {
                match route {
                    Route::Live(backend) => backend
                        .list_sales()
                        .await
                        .map(|sales| analytics::sales_by_hour(&sales))
                        .map_err(DataError::from),
                    Route::Mock => Ok(self.mock.sales_by_hour()),
                }
            })
            .await
    }

    /// Units and revenue per category, highest revenue first.
    ///
    /// # Errors
    ///
    /// Remote failure on the live path.
    pub async fn sales_by_category(&self) -> Result<Vec<CategorySales>, DataError> {
        self.router
            .run("sales_by_category", |route| async move {
                match route {
                    Route::Live(backend) => backend
                        .list_sales()
                        .await
                        .map(|sales| analytics::sales_by_category(&sales))
                        .map_err(DataError::from),
                    Route::Mock => Ok(self.mock.sales_by_category()),
                }
            })
            .await
    }

    /// # Errors
    ///
    /// Remote failure on the live path.
    pub async fn summary(&self) -> Result<SalesSummary, DataError> {
        self.router
            .run("summary", |route| async move {
                match route {
                    Route::Live(backend) => backend
                        .list_sales()
                        .await
                        .map(|sales| analytics::sales_summary(&sales))
                        .map_err(DataError::from),
                    Route::Mock => Ok(self.mock.sales_summary()),
                }
            })
            .await
    }
}

#[async_trait]
impl ManagedService for SalesService {
    fn name(&self) -> &'static str {
        service_names::SALES
    }

    async fn init(&self, ctx: &ServiceContext) -> anyhow::Result<()> {
        debug!(mode = %ctx.mode.current(), "sales service ready");
        Ok(())
    }

    async fn reset(&self) -> anyhow::Result<()> {
        self.mock.reset_domain(Domain::Sales);
        Ok(())
    }

    async fn shutdown(&self, _terminate: bool) -> anyhow::Result<()> {
        Ok(())
    }
}
