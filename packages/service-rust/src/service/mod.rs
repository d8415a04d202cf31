//! Domain facades and their lifecycle.
//!
//! 1. **Routing** (`router`): one mode resolution per call, then live or mock dispatch
//! 2. **Domain facades** (`domain`): products, sales, settings, archive
//! 3. **Registry** (`registry`): lookup by name or type, ordered init/reset/shutdown

pub mod domain;
pub mod registry;
pub mod router;

pub use domain::{service_names, ArchiveService, ProductService, SalesService, SettingsService};
pub use registry::{ManagedService, ServiceContext, ServiceRegistry};
pub use router::{DataRouter, Route};
