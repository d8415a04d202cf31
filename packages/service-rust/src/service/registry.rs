use std::any::{Any, TypeId};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::DataConfig;
use crate::mode::ModeStore;

// ---------------------------------------------------------------------------
// ServiceContext
// ---------------------------------------------------------------------------

/// Context provided to services during initialization.
#[derive(Debug, Clone)]
pub struct ServiceContext {
    pub config: Arc<DataConfig>,
    pub mode: Arc<ModeStore>,
}

// ---------------------------------------------------------------------------
// ManagedService trait
// ---------------------------------------------------------------------------

/// Lifecycle-managed service trait. All domain facades implement this.
///
/// Services are registered with a `ServiceRegistry`, initialized in registration
/// order, and shut down in reverse registration order. The `Any` bound enables
/// type-based lookup via `ServiceRegistry::get::<T>()`.
#[async_trait]
pub trait ManagedService: Send + Sync + Any {
    /// Returns the unique name of this service (e.g., `"products"`, `"settings"`).
    fn name(&self) -> &'static str;

    /// Initialize the service with the given context.
    async fn init(&self, ctx: &ServiceContext) -> anyhow::Result<()>;

    /// Return the service's simulated state to its freshly generated form.
    async fn reset(&self) -> anyhow::Result<()>;

    /// Shut down the service. If `terminate` is true, skip graceful cleanup.
    async fn shutdown(&self, terminate: bool) -> anyhow::Result<()>;
}

// ---------------------------------------------------------------------------
// ServiceRegistry
// ---------------------------------------------------------------------------

/// Registry for lifecycle-managed services.
///
/// Provides two lookup mechanisms:
/// - **By name** (`get_by_name`): uses the service's `name()` string
/// - **By type** (`get::<T>`): uses `TypeId`
///
/// Services are initialized in registration order and shut down in reverse order.
pub struct ServiceRegistry {
    by_name: DashMap<&'static str, Arc<dyn ManagedService>>,
    by_type: DashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    /// Registration order for deterministic init/shutdown sequencing.
    init_order: RwLock<Vec<&'static str>>,
}

impl ServiceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_name: DashMap::new(),
            by_type: DashMap::new(),
            init_order: RwLock::new(Vec::new()),
        }
    }

    /// Register a shared service. The caller may keep its own handle; the
    /// registry hands out clones of the same `Arc`.
    pub fn register<T: ManagedService>(&self, service: Arc<T>) {
        let name = service.name();
        self.by_name.insert(name, service.clone());
        self.by_type.insert(TypeId::of::<T>(), service);
        let mut order = self.init_order.write();
        if !order.contains(&name) {
            order.push(name);
        }
    }

    /// Retrieve a service by its concrete type.
    pub fn get<T: ManagedService>(&self) -> Option<Arc<T>> {
        self.by_type
            .get(&TypeId::of::<T>())
            .and_then(|entry| entry.value().clone().downcast::<T>().ok())
    }

    /// Retrieve a service by its name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn ManagedService>> {
        self.by_name.get(name).map(|entry| entry.value().clone())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.init_order.read().clone()
    }

    /// Initialize all registered services in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if any service's `init()` call fails.
    pub async fn init_all(&self, ctx: &ServiceContext) -> anyhow::Result<()> {
        for name in self.names() {
            if let Some(service) = self.get_by_name(name) {
                service.init(ctx).await?;
                debug!(service = name, "service initialized");
            }
        }
        Ok(())
    }

    /// Reset all registered services in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if any service's `reset()` call fails.
    pub async fn reset_all(&self) -> anyhow::Result<()> {
        for name in self.names() {
            if let Some(service) = self.get_by_name(name) {
                service.reset().await?;
            }
        }
        Ok(())
    }

    /// Shut down all registered services in reverse registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if any service's `shutdown()` call fails.
    pub async fn shutdown_all(&self, terminate: bool) -> anyhow::Result<()> {
        for name in self.names().into_iter().rev() {
            if let Some(service) = self.get_by_name(name) {
                service.shutdown(terminate).await?;
            }
        }
        Ok(())
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("services", &self.names())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
