//! Backend for deployments without a live service.
//!
//! [`OfflineBackend`] fails every call with [`RemoteError::Unreachable`], so a
//! data layer built for demos or offline use still has a live path to route
//! to, and an accidental switch to live mode surfaces as a retryable remote
//! failure instead of a panic.

use async_trait::async_trait;
use backoffice_core::{
    ArchiveRequest, ArchivedItem, NewProduct, NewSale, Product, ProductPatch, Sale,
    SettingsPatch, SettingsRecord,
};

use super::{ArchiveBackend, ProductBackend, RemoteError, SalesBackend, SettingsBackend};

/// Live backend that is never reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineBackend;

fn offline<T>() -> Result<T, RemoteError> {
    Err(RemoteError::Unreachable {
        message: "no live backend configured".to_string(),
    })
}

#[async_trait]
impl ProductBackend for OfflineBackend {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError> {
        offline()
    }

    async fn get_product(&self, _id: &str) -> Result<Product, RemoteError> {
        offline()
    }

    async fn create_product(&self, _product: &NewProduct) -> Result<Product, RemoteError> {
        offline()
    }

    async fn update_product(
        &self,
        _id: &str,
        _patch: &ProductPatch,
    ) -> Result<Product, RemoteError> {
        offline()
    }

    async fn delete_product(&self, _id: &str) -> Result<(), RemoteError> {
        offline()
    }
}

#[async_trait]
impl SalesBackend for OfflineBackend {
    async fn list_sales(&self) -> Result<Vec<Sale>, RemoteError> {
        offline()
    }

    async fn create_sale(&self, _sale: &NewSale) -> Result<Sale, RemoteError> {
        offline()
    }

    async fn delete_sale(&self, _id: &str) -> Result<(), RemoteError> {
        offline()
    }
}

#[async_trait]
impl SettingsBackend for OfflineBackend {
    async fn load_settings(&self) -> Result<SettingsRecord, RemoteError> {
        offline()
    }

    async fn update_settings(
        &self,
        _patch: &SettingsPatch,
    ) -> Result<SettingsRecord, RemoteError> {
        offline()
    }

    async fn reset_settings(&self) -> Result<SettingsRecord, RemoteError> {
        offline()
    }
}

#[async_trait]
impl ArchiveBackend for OfflineBackend {
    async fn list_archived(&self) -> Result<Vec<ArchivedItem>, RemoteError> {
        offline()
    }

    async fn archive_product(
        &self,
        _request: &ArchiveRequest,
    ) -> Result<ArchivedItem, RemoteError> {
        offline()
    }

    async fn restore_archived(&self, _id: &str) -> Result<Product, RemoteError> {
        offline()
    }

    async fn purge_archived(&self, _id: &str) -> Result<(), RemoteError> {
        offline()
    }
}
