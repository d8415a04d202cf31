//! Domain facades.
//!
//! Each facade implements `ManagedService` (lifecycle) and exposes the async
//! operations application code calls. Every operation goes through the
//! facade's [`DataRouter`](crate::service::router::DataRouter), which picks
//! the live backend or the local simulation once per call.

pub mod archive;
pub mod products;
pub mod sales;
pub mod settings;

pub use archive::ArchiveService;
pub use products::ProductService;
pub use sales::SalesService;
pub use settings::SettingsService;

/// Well-known facade names, used for registry lookup and metric labels.
pub mod service_names {
    pub const PRODUCTS: &str = "products";
    pub const SALES: &str = "sales";
    pub const SETTINGS: &str = "settings";
    pub const ARCHIVE: &str = "archive";
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use backoffice_core::{FixedClock, Mode};

    use crate::backend::{Backend, OfflineBackend};
    use crate::config::{DataConfig, MockConfig};
    use crate::mock::MockDataProvider;
    use crate::mode::ModeStore;
    use crate::service::registry::ServiceContext;

    pub(crate) const ANCHOR: i64 = 1_700_000_000_000;

    /// Shared pieces for facade tests: a pinned mode store, an offline
    /// backend and a mock provider on a fixed clock.
    pub(crate) struct Fixture {
        pub mode: Arc<ModeStore>,
        pub backend: Arc<dyn Backend>,
        pub mock: Arc<MockDataProvider>,
    }

    impl Fixture {
        pub(crate) fn new(mode: Mode) -> Self {
            Self {
                mode: Arc::new(ModeStore::fixed(mode)),
                backend: Arc::new(OfflineBackend),
                mock: Arc::new(MockDataProvider::new(
                    MockConfig::default(),
                    Arc::new(FixedClock::new(ANCHOR)),
                )),
            }
        }

        pub(crate) fn context(&self) -> ServiceContext {
            ServiceContext {
                config: Arc::new(DataConfig::default()),
                mode: Arc::clone(&self.mode),
            }
        }
    }
}
