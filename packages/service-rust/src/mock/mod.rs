//! In-process simulation of the product, sales and archive collections.
//!
//! Collections are generated lazily on first access from the configured seed
//! and a single clock reading, then kept for the life of the provider. Every
//! read within a session returns the same identifiers and field values until
//! a mutation or an explicit reset. Nothing here touches the network or disk.

mod seed;

use std::sync::Arc;

use backoffice_core::analytics;
use backoffice_core::{
    ArchiveRequest, ArchivedItem, CategorySales, ClockSource, Domain, HourlySales,
    InventorySummary, NewProduct, NewSale, Product, ProductPatch, Sale, SalesSummary,
    SimulatedEntity,
};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::MockConfig;
use crate::error::LocalStateError;

/// Generated collections plus identifier counters.
#[derive(Debug, Clone)]
struct MockState {
    /// Clock reading the generated history ends at.
    anchor: i64,
    products: Vec<Product>,
    sales: Vec<Sale>,
    archived: Vec<ArchivedItem>,
    next_product: usize,
    next_sale: usize,
    next_archive: usize,
}

/// Session-scoped simulated data.
pub struct MockDataProvider {
    config: MockConfig,
    clock: Arc<dyn ClockSource>,
    state: RwLock<Option<MockState>>,
}

impl MockDataProvider {
    #[must_use]
    pub fn new(config: MockConfig, clock: Arc<dyn ClockSource>) -> Self {
        Self {
            config,
            clock,
            state: RwLock::new(None),
        }
    }

    /// Whether the collections have been generated yet.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    /// Every entity of `domain`, in collection order.
    pub fn list(&self, domain: Domain) -> Vec<SimulatedEntity> {
        self.read(|state| match domain {
            Domain::Products => state
                .products
                .iter()
                .cloned()
                .map(SimulatedEntity::Product)
                .collect(),
            Domain::Sales => state.sales.iter().cloned().map(SimulatedEntity::Sale).collect(),
            Domain::Archived => state
                .archived
                .iter()
                .cloned()
                .map(SimulatedEntity::Archived)
                .collect(),
        })
    }

    /// Drops every collection; the next access regenerates from the seed.
    pub fn reset(&self) {
        *self.state.write() = None;
        info!("simulated collections reset");
    }

    /// Regenerates one collection from the seed, keeping the others as they are.
    pub fn reset_domain(&self, domain: Domain) {
        let mut guard = self.state.write();
        let Some(state) = guard.as_mut() else {
            return;
        };
        let fresh = seed::generate(&self.config, state.anchor);
        match domain {
            Domain::Products => {
                // A seeded product that is currently archived stays archived.
                let archived = &state.archived;
                state.products = fresh
                    .products
                    .into_iter()
                    .filter(|p| !archived.iter().any(|a| a.product.id == p.id))
                    .collect();
                state.next_product = state.next_product.max(fresh.next_product);
            }
            Domain::Sales => {
                state.sales = fresh.sales;
                state.next_sale = fresh.next_sale;
            }
            Domain::Archived => {
                // A seeded archive entry whose product was restored is not archived twice.
                let products = &state.products;
                state.archived = fresh
                    .archived
                    .into_iter()
                    .filter(|a| !products.iter().any(|p| p.id == a.product.id))
                    .collect();
                state.next_archive = fresh.next_archive;
            }
        }
        info!(domain = %domain, "simulated collection reset");
    }

    // -- products --

    pub fn products(&self) -> Vec<Product> {
        self.read(|state| state.products.clone())
    }

    /// # Errors
    ///
    /// [`LocalStateError::NotFound`] if no product has `id`.
    pub fn product(&self, id: &str) -> Result<Product, LocalStateError> {
        self.read(|state| {
            state
                .products
                .iter()
                .find(|p| p.id == id)
                .cloned()
                .ok_or_else(|| not_found(Domain::Products, id))
        })
    }

    /// # Errors
    ///
    /// [`LocalStateError::Invalid`] if the name is blank.
    pub fn create_product(&self, new: NewProduct) -> Result<Product, LocalStateError> {
        if new.name.trim().is_empty() {
            return Err(invalid(Domain::Products, "product name must not be empty"));
        }
        let now = self.clock.now_millis();
        self.write(|state| {
            let id = seed::product_id(state.next_product);
            state.next_product += 1;
            let product = new.into_product(id, now);
            debug!(id = %product.id, "simulated product created");
            state.products.push(product.clone());
            Ok(product)
        })
    }

    /// # Errors
    ///
    /// [`LocalStateError::NotFound`] for an unknown `id`, [`LocalStateError::Invalid`]
    /// if the patch blanks the name.
    pub fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product, LocalStateError> {
        if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(invalid(Domain::Products, "product name must not be empty"));
        }
        let now = self.clock.now_millis();
        self.write(|state| {
            let product = state
                .products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| not_found(Domain::Products, id))?;
            patch.apply(product, now);
            Ok(product.clone())
        })
    }

    /// # Errors
    ///
    /// [`LocalStateError::NotFound`] for an unknown `id`.
    pub fn delete_product(&self, id: &str) -> Result<(), LocalStateError> {
        self.write(|state| {
            take(&mut state.products, |p| p.id == id)
                .map(drop)
                .ok_or_else(|| not_found(Domain::Products, id))
        })
    }

    pub fn inventory_summary(&self) -> InventorySummary {
        self.read(|state| analytics::inventory_summary(&state.products))
    }

    /// Products with stock at or below `threshold`, lowest first.
    pub fn low_stock(&self, threshold: u32) -> Vec<Product> {
        self.read(|state| analytics::low_stock(&state.products, threshold))
    }

    // -- sales --

    pub fn sales(&self) -> Vec<Sale> {
        self.read(|state| state.sales.clone())
    }

    /// Records a sale and takes the sold units out of stock.
    ///
    /// # Errors
    ///
    /// [`LocalStateError::Invalid`] if the sale has no lines, a line has zero
    /// quantity, or a line names an unknown product.
    pub fn create_sale(&self, new: NewSale) -> Result<Sale, LocalStateError> {
        if new.lines.is_empty() {
            return Err(invalid(Domain::Sales, "sale must have at least one line"));
        }
        if new.lines.iter().any(|line| line.quantity == 0) {
            return Err(invalid(Domain::Sales, "line quantity must be positive"));
        }
        let now = self.clock.now_millis();
        self.write(|state| {
            if let Some(line) = new
                .lines
                .iter()
                .find(|line| !state.products.iter().any(|p| p.id == line.product_id))
            {
                return Err(invalid(
                    Domain::Sales,
                    format!("unknown product {:?}", line.product_id),
                ));
            }
            for line in &new.lines {
                if let Some(product) = state.products.iter_mut().find(|p| p.id == line.product_id) {
                    product.stock = product.stock.saturating_sub(line.quantity);
                    product.updated_at = now;
                }
            }
            let id = seed::sale_id(state.next_sale);
            state.next_sale += 1;
            let sale = new.into_sale(id, now);
            debug!(id = %sale.id, total_cents = sale.total_cents, "simulated sale created");
            state.sales.push(sale.clone());
            Ok(sale)
        })
    }

    /// # Errors
    ///
    /// [`LocalStateError::NotFound`] for an unknown `id`.
    pub fn delete_sale(&self, id: &str) -> Result<(), LocalStateError> {
        self.write(|state| {
            take(&mut state.sales, |s| s.id == id)
                .map(drop)
                .ok_or_else(|| not_found(Domain::Sales, id))
        })
    }

    pub fn sales_by_hour(&self) -> Vec<HourlySales> {
        self.read(|state| analytics::sales_by_hour(&state.sales))
    }

    pub fn sales_by_category(&self) -> Vec<CategorySales> {
        self.read(|state| analytics::sales_by_category(&state.sales))
    }

    pub fn sales_summary(&self) -> SalesSummary {
        self.read(|state| analytics::sales_summary(&state.sales))
    }

    // -- archive --

    pub fn archived(&self) -> Vec<ArchivedItem> {
        self.read(|state| state.archived.clone())
    }

    /// Moves a product from the catalogue into the archive.
    ///
    /// # Errors
    ///
    /// [`LocalStateError::NotFound`] if the product is not in the catalogue.
    pub fn archive_product(&self, request: &ArchiveRequest) -> Result<ArchivedItem, LocalStateError> {
        let now = self.clock.now_millis();
        self.write(|state| {
            let product = take(&mut state.products, |p| p.id == request.product_id)
                .ok_or_else(|| not_found(Domain::Products, &request.product_id))?;
            let item = ArchivedItem {
                id: seed::archive_id(state.next_archive),
                product,
                reason: request.reason.clone(),
                archived_at: now,
            };
            state.next_archive += 1;
            state.archived.push(item.clone());
            Ok(item)
        })
    }

    /// Moves an archived product back into the catalogue.
    ///
    /// # Errors
    ///
    /// [`LocalStateError::NotFound`] for an unknown archive entry.
    pub fn restore_archived(&self, id: &str) -> Result<Product, LocalStateError> {
        let now = self.clock.now_millis();
        self.write(|state| {
            let item = take(&mut state.archived, |a| a.id == id)
                .ok_or_else(|| not_found(Domain::Archived, id))?;
            let mut product = item.product;
            product.updated_at = now;
            state.products.push(product.clone());
            Ok(product)
        })
    }

    /// # Errors
    ///
    /// [`LocalStateError::NotFound`] for an unknown archive entry.
    pub fn purge_archived(&self, id: &str) -> Result<(), LocalStateError> {
        self.write(|state| {
            take(&mut state.archived, |a| a.id == id)
                .map(drop)
                .ok_or_else(|| not_found(Domain::Archived, id))
        })
    }

    fn read<R>(&self, f: impl FnOnce(&MockState) -> R) -> R {
        {
            let guard = self.state.read();
            if let Some(state) = guard.as_ref() {
                return f(state);
            }
        }
        let mut guard = self.state.write();
        f(guard.get_or_insert_with(|| self.generate()))
    }

    fn write<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        let mut guard = self.state.write();
        f(guard.get_or_insert_with(|| self.generate()))
    }

    fn generate(&self) -> MockState {
        let anchor = self.clock.now_millis();
        let state = seed::generate(&self.config, anchor);
        info!(
            seed = self.config.seed,
            products = state.products.len(),
            sales = state.sales.len(),
            archived = state.archived.len(),
            "generated simulated collections"
        );
        state
    }
}

impl std::fmt::Debug for MockDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDataProvider")
            .field("config", &self.config)
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

/// Removes and returns the first element matching `pred`.
fn take<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> Option<T> {
    let index = items.iter().position(pred)?;
    Some(items.remove(index))
}

fn not_found(domain: Domain, id: &str) -> LocalStateError {
    LocalStateError::NotFound {
        domain,
        id: id.to_string(),
    }
}

fn invalid(domain: Domain, reason: impl Into<String>) -> LocalStateError {
    LocalStateError::Invalid {
        domain,
        reason: reason.into(),
    }
}
