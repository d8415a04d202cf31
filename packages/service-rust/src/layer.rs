//! Assembly of the complete data layer.
//!
//! [`DataLayerBuilder`] resolves every collaborator (key-value store, live
//! backend, clock, mode probe) from explicit overrides or from the
//! [`DataConfig`], then wires one shared [`ModeStore`] into all four facades.
//! Application code holds a [`DataLayer`] and calls the facades; nothing
//! else decides between the live and simulated paths.

use std::sync::Arc;

use backoffice_core::{ClockSource, Mode, SystemClock};
use tracing::info;

use crate::backend::{Backend, OfflineBackend, RemoteError, RestBackend};
use crate::config::DataConfig;
use crate::mock::MockDataProvider;
use crate::mode::{EnvModeProbe, ModeProbe, ModeStore};
use crate::service::{
    ArchiveService, ProductService, SalesService, ServiceContext, ServiceRegistry,
    SettingsService,
};
use crate::settings::SettingsPersistence;
use crate::storage::{FileStore, KeyValueStore, MemoryStore, StoreError};

/// Reasons a [`DataLayer`] could not be assembled.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to open state directory: {0}")]
    Store(#[from] StoreError),
    #[error("failed to create backend client: {0}")]
    Backend(#[from] RemoteError),
}

/// Collects overrides before building a [`DataLayer`].
///
/// Anything not overridden is derived from the config:
/// - store: [`FileStore`] in `state_dir`, else [`MemoryStore`]
/// - backend: [`RestBackend`] for `backend.base_url`, else [`OfflineBackend`]
/// - clock: [`SystemClock`]
/// - probe: [`EnvModeProbe`] on `mode_env_var`, if set
pub struct DataLayerBuilder {
    config: DataConfig,
    store: Option<Arc<dyn KeyValueStore>>,
    backend: Option<Arc<dyn Backend>>,
    clock: Option<Arc<dyn ClockSource>>,
    probe: Option<Arc<dyn ModeProbe>>,
    mode: Option<Arc<ModeStore>>,
}

impl DataLayerBuilder {
    #[must_use]
    pub fn new(config: DataConfig) -> Self {
        Self {
            config,
            store: None,
            backend: None,
            clock: None,
            probe: None,
            mode: None,
        }
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn ClockSource>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replaces the environment probe.
    #[must_use]
    pub fn probe(mut self, probe: Arc<dyn ModeProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Uses an existing mode store; probe and persistence settings are then ignored.
    #[must_use]
    pub fn mode_store(mut self, mode: Arc<ModeStore>) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Wires the layer.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if the state directory cannot be opened or the
    /// HTTP client cannot be created.
    pub fn build(self) -> Result<DataLayer, BuildError> {
        let config = Arc::new(self.config);

        let store: Arc<dyn KeyValueStore> = match (self.store, &config.state_dir) {
            (Some(store), _) => store,
            (None, Some(dir)) => Arc::new(FileStore::open(dir)?),
            (None, None) => Arc::new(MemoryStore::new()),
        };

        let backend: Arc<dyn Backend> = match (self.backend, &config.backend.base_url) {
            (Some(backend), _) => backend,
            (None, Some(url)) => Arc::new(RestBackend::new(
                url.as_str(),
                config.backend.api_key.clone(),
                config.backend.request_timeout,
            )?),
            (None, None) => Arc::new(OfflineBackend),
        };

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn ClockSource>);

        let mode = match self.mode {
            Some(mode) => mode,
            None => {
                let probe = self.probe.or_else(|| {
                    config
                        .mode_env_var
                        .as_deref()
                        .map(|var| Arc::new(EnvModeProbe::new(var)) as Arc<dyn ModeProbe>)
                });
                let mut mode = ModeStore::new(config.initial_mode);
                if let Some(probe) = probe {
                    mode = mode.with_probe(probe, config.probe_timeout);
                }
                if config.persist_mode_override {
                    mode = mode.with_persistence(Arc::clone(&store), config.mode_key());
                }
                Arc::new(mode)
            }
        };

        let mock = Arc::new(MockDataProvider::new(config.mock.clone(), clock));
        let local_settings = Arc::new(SettingsPersistence::new(
            Arc::clone(&store),
            config.settings_key(),
        ));

        let products = Arc::new(ProductService::new(
            Arc::clone(&mode),
            Arc::clone(&backend),
            Arc::clone(&mock),
        ));
        let sales = Arc::new(SalesService::new(
            Arc::clone(&mode),
            Arc::clone(&backend),
            Arc::clone(&mock),
        ));
        let settings = Arc::new(SettingsService::new(
            Arc::clone(&mode),
            Arc::clone(&backend),
            local_settings,
        ));
        let archive = Arc::new(ArchiveService::new(
            Arc::clone(&mode),
            Arc::clone(&backend),
            Arc::clone(&mock),
        ));

        let registry = ServiceRegistry::new();
        registry.register(Arc::clone(&products));
        registry.register(Arc::clone(&sales));
        registry.register(Arc::clone(&settings));
        registry.register(Arc::clone(&archive));

        Ok(DataLayer {
            config,
            mode,
            store,
            mock,
            registry,
            products,
            sales,
            settings,
            archive,
        })
    }
}

/// The assembled data layer: one mode store, four facades.
pub struct DataLayer {
    config: Arc<DataConfig>,
    mode: Arc<ModeStore>,
    store: Arc<dyn KeyValueStore>,
    mock: Arc<MockDataProvider>,
    registry: ServiceRegistry,
    products: Arc<ProductService>,
    sales: Arc<SalesService>,
    settings: Arc<SettingsService>,
    archive: Arc<ArchiveService>,
}

impl DataLayer {
    /// Builds a layer from `config` with no overrides.
    ///
    /// # Errors
    ///
    /// See [`DataLayerBuilder::build`].
    pub fn from_config(config: DataConfig) -> Result<Self, BuildError> {
        DataLayerBuilder::new(config).build()
    }

    #[must_use]
    pub fn builder(config: DataConfig) -> DataLayerBuilder {
        DataLayerBuilder::new(config)
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.products
    }

    #[must_use]
    pub fn sales(&self) -> &SalesService {
        &self.sales
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsService {
        &self.settings
    }

    #[must_use]
    pub fn archive(&self) -> &ArchiveService {
        &self.archive
    }

    #[must_use]
    pub fn mode(&self) -> Arc<ModeStore> {
        Arc::clone(&self.mode)
    }

    #[must_use]
    pub fn config(&self) -> Arc<DataConfig> {
        Arc::clone(&self.config)
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn mock(&self) -> Arc<MockDataProvider> {
        Arc::clone(&self.mock)
    }

    #[must_use]
    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Resolves the mode the next facade call would use.
    pub async fn is_mock_mode(&self) -> bool {
        self.mode.is_mock_mode().await
    }

    /// Pins the mode for every facade.
    pub fn set_mode(&self, mode: Mode) {
        self.mode.set_mode(mode);
    }

    /// Initializes every facade in registration order.
    ///
    /// # Errors
    ///
    /// Propagates the first facade `init` failure.
    pub async fn init(&self) -> anyhow::Result<()> {
        let ctx = ServiceContext {
            config: Arc::clone(&self.config),
            mode: Arc::clone(&self.mode),
        };
        self.registry.init_all(&ctx).await?;
        info!(
            namespace = %self.config.namespace,
            mode = %self.mode.current(),
            services = ?self.registry.names(),
            "data layer ready"
        );
        Ok(())
    }

    /// Regenerates every simulated collection. Settings are kept.
    ///
    /// # Errors
    ///
    /// Propagates the first facade `reset` failure.
    pub async fn reset_simulation(&self) -> anyhow::Result<()> {
        self.registry.reset_all().await?;
        info!("simulation reset");
        Ok(())
    }

    /// Shuts every facade down in reverse registration order.
    ///
    /// # Errors
    ///
    /// Propagates the first facade `shutdown` failure.
    pub async fn shutdown(&self, terminate: bool) -> anyhow::Result<()> {
        self.registry.shutdown_all(terminate).await
    }
}

impl std::fmt::Debug for DataLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataLayer")
            .field("namespace", &self.config.namespace)
            .field("mode", &self.mode)
            .field("services", &self.registry.names())
            .finish_non_exhaustive()
    }
}
