//! Backoffice core: domain entities, data mode, settings record and merge rules, analytics.
//!
//! This crate performs no I/O. The service crate layers mode resolution,
//! persistence, simulation and backend dispatch on top of these types.

pub mod analytics;
pub mod clock;
pub mod mode;
pub mod settings;
pub mod types;

pub use analytics::{
    CategorySales, CategoryStock, HourlySales, InventorySummary, SalesSummary,
};
pub use clock::{ClockSource, FixedClock, SystemClock};
pub use mode::{Mode, ParseModeError};
pub use settings::{Branding, Profile, SettingsError, SettingsPatch, SettingsRecord};
pub use types::{
    ArchiveRequest, ArchivedItem, Domain, NewProduct, NewSale, PaymentMethod, Product,
    ProductPatch, Sale, SaleLine, SimulatedEntity,
};
