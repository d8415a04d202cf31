//! Backoffice data layer: per-call mock/live dispatch, durable simulated settings,
//! seeded simulation of the product, sales and archive collections.
//!
//! Start from [`DataLayer`]; it owns the shared [`ModeStore`] and the four
//! domain facades.

pub mod backend;
pub mod config;
pub mod error;
pub mod layer;
pub mod mock;
pub mod mode;
pub mod observability;
pub mod service;
pub mod settings;
pub mod storage;

pub use backend::{Backend, OfflineBackend, RemoteError, RestBackend};
pub use config::{BackendConfig, DataConfig, MockConfig};
pub use error::{DataError, ErrorKind, LocalStateError};
pub use layer::{BuildError, DataLayer, DataLayerBuilder};
pub use mock::MockDataProvider;
pub use mode::{EnvModeProbe, ModeProbe, ModeSource, ModeState, ModeStore, ProbeError};
pub use service::{
    ArchiveService, ManagedService, ProductService, SalesService, ServiceRegistry,
    SettingsService,
};
pub use settings::SettingsPersistence;
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
