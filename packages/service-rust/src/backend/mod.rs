//! Live backend boundary.
//!
//! One async trait per domain. The facades only depend on these traits, so
//! any client (REST, SQL, an in-process fake) can serve the live path as long
//! as its failures are expressed as [`RemoteError`].
//!
//! Implementations:
//! - [`RestBackend`]: JSON over HTTP via `reqwest`
//! - [`OfflineBackend`]: rejects every call, for mock-only deployments

mod offline;
mod rest;

pub use offline::OfflineBackend;
pub use rest::RestBackend;

use async_trait::async_trait;
use backoffice_core::{
    ArchiveRequest, ArchivedItem, NewProduct, NewSale, Product, ProductPatch, Sale,
    SettingsPatch, SettingsRecord,
};

/// Failure reported by a live backend.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The backend could not be reached (connect error, timeout, no backend configured).
    #[error("backend unreachable: {message}")]
    Unreachable { message: String },
    /// The backend answered with a non-success status.
    #[error("backend rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
    /// The addressed resource does not exist.
    #[error("backend resource not found: {resource}")]
    NotFound { resource: String },
    /// The response body could not be decoded.
    #[error("backend response could not be decoded: {message}")]
    Decode { message: String },
}

/// Product catalogue operations.
#[async_trait]
pub trait ProductBackend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>, RemoteError>;

    async fn get_product(&self, id: &str) -> Result<Product, RemoteError>;

    async fn create_product(&self, product: &NewProduct) -> Result<Product, RemoteError>;

    /// Applies a partial update and returns the stored product.
    async fn update_product(&self, id: &str, patch: &ProductPatch)
        -> Result<Product, RemoteError>;

    async fn delete_product(&self, id: &str) -> Result<(), RemoteError>;
}

/// Sales ledger operations.
#[async_trait]
pub trait SalesBackend: Send + Sync {
    async fn list_sales(&self) -> Result<Vec<Sale>, RemoteError>;

    async fn create_sale(&self, sale: &NewSale) -> Result<Sale, RemoteError>;

    async fn delete_sale(&self, id: &str) -> Result<(), RemoteError>;
}

/// Settings record operations. The backend owns merge semantics on the live path.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    async fn load_settings(&self) -> Result<SettingsRecord, RemoteError>;

    async fn update_settings(&self, patch: &SettingsPatch)
        -> Result<SettingsRecord, RemoteError>;

    async fn reset_settings(&self) -> Result<SettingsRecord, RemoteError>;
}

/// Archived product operations.
#[async_trait]
pub trait ArchiveBackend: Send + Sync {
    async fn list_archived(&self) -> Result<Vec<ArchivedItem>, RemoteError>;

    /// Moves a product out of the active catalogue.
    async fn archive_product(&self, request: &ArchiveRequest)
        -> Result<ArchivedItem, RemoteError>;

    /// Moves an archived product back into the catalogue.
    async fn restore_archived(&self, id: &str) -> Result<Product, RemoteError>;

    /// Deletes an archive entry permanently.
    async fn purge_archived(&self, id: &str) -> Result<(), RemoteError>;
}

/// A client serving every domain.
pub trait Backend:
    ProductBackend + SalesBackend + SettingsBackend + ArchiveBackend + 'static
{
}

impl<T> Backend for T where
    T: ProductBackend + SalesBackend + SettingsBackend + ArchiveBackend + 'static
{
}
