//! Seeded generation of the simulated collections.

use backoffice_core::{ArchivedItem, PaymentMethod, Product, Sale, SaleLine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::MockState;
use crate::config::MockConfig;

const MILLIS_PER_DAY: i64 = 86_400_000;

struct CatalogEntry {
    name: &'static str,
    category: &'static str,
    base_price_cents: u64,
}

const fn entry(name: &'static str, category: &'static str, base_price_cents: u64) -> CatalogEntry {
    CatalogEntry {
        name,
        category,
        base_price_cents,
    }
}

const CATALOG: &[CatalogEntry] = &[
    entry("Espresso", "Coffee", 250),
    entry("Cappuccino", "Coffee", 380),
    entry("Flat White", "Coffee", 400),
    entry("Cold Brew", "Coffee", 450),
    entry("Green Tea", "Tea", 300),
    entry("Chai Latte", "Tea", 420),
    entry("Earl Grey", "Tea", 280),
    entry("Croissant", "Bakery", 320),
    entry("Pain au Chocolat", "Bakery", 360),
    entry("Blueberry Muffin", "Bakery", 340),
    entry("Sourdough Loaf", "Bakery", 650),
    entry("Club Sandwich", "Kitchen", 890),
    entry("Caesar Salad", "Kitchen", 950),
    entry("Tomato Soup", "Kitchen", 620),
    entry("Avocado Toast", "Kitchen", 780),
    entry("Orange Juice", "Drinks", 390),
    entry("Sparkling Water", "Drinks", 220),
    entry("Lemonade", "Drinks", 350),
    entry("Coffee Beans 1kg", "Retail", 2_400),
    entry("Ceramic Mug", "Retail", 1_500),
    entry("Travel Tumbler", "Retail", 2_200),
];

const ARCHIVE_REASONS: &[&str] = &["Discontinued", "Seasonal item", "Supplier change"];

const PAYMENT_METHODS: [PaymentMethod; 3] =
    [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Transfer];

/// Builds every collection from `config.seed`, with history ending at `anchor`.
///
/// Output depends only on `config` and `anchor`.
pub(super) fn generate(config: &MockConfig, anchor: i64) -> MockState {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let history = i64::from(config.history_days.max(1)) * MILLIS_PER_DAY;

    let products: Vec<Product> = (0..config.product_count)
        .map(|index| product(&mut rng, index, anchor - history))
        .collect();

    let mut sales: Vec<Sale> = if products.is_empty() {
        Vec::new()
    } else {
        (0..config.sale_count)
            .map(|_| sale(&mut rng, &products, anchor, history))
            .collect()
    };
    // Oldest first, so identifiers follow the timeline.
    sales.sort_by_key(|s| s.created_at);
    for (index, sale) in sales.iter_mut().enumerate() {
        sale.id = sale_id(index + 1);
    }

    let archived = (0..config.archived_count)
        .map(|k| {
            let product = product(&mut rng, config.product_count + k, anchor - history);
            ArchivedItem {
                id: archive_id(k + 1),
                product,
                reason: Some(ARCHIVE_REASONS[k % ARCHIVE_REASONS.len()].to_string()),
                archived_at: anchor - rng.random_range(0..history),
            }
        })
        .collect();

    MockState {
        anchor,
        products,
        sales,
        archived,
        next_product: config.product_count + config.archived_count + 1,
        next_sale: config.sale_count + 1,
        next_archive: config.archived_count + 1,
    }
}

pub(super) fn product_id(n: usize) -> String {
    format!("PRD-{n:04}")
}

pub(super) fn sale_id(n: usize) -> String {
    format!("SAL-{n:04}")
}

pub(super) fn archive_id(n: usize) -> String {
    format!("ARC-{n:04}")
}

fn product(rng: &mut StdRng, index: usize, created_before: i64) -> Product {
    let entry = &CATALOG[index % CATALOG.len()];
    let edition = index / CATALOG.len();
    let name = if edition == 0 {
        entry.name.to_string()
    } else {
        format!("{} No. {}", entry.name, edition + 1)
    };
    let jitter = rng.random_range(0..=entry.base_price_cents / 10);
    let created_at = created_before - rng.random_range(0..MILLIS_PER_DAY);

    Product {
        id: product_id(index + 1),
        sku: format!("SKU-{:05}", 10_000 + index),
        name,
        category: entry.category.to_string(),
        price_cents: entry.base_price_cents + jitter,
        stock: rng.random_range(0..=80),
        created_at,
        updated_at: created_at,
    }
}

fn sale(rng: &mut StdRng, products: &[Product], anchor: i64, history: i64) -> Sale {
    let line_count = rng.random_range(1..=3);
    let lines: Vec<SaleLine> = (0..line_count)
        .map(|_| {
            let product = &products[rng.random_range(0..products.len())];
            SaleLine {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                category: product.category.clone(),
                quantity: rng.random_range(1..=4),
                unit_price_cents: product.price_cents,
            }
        })
        .collect();
    let total_cents = lines.iter().map(SaleLine::total_cents).sum();

    Sale {
        // Assigned after sorting.
        id: String::new(),
        lines,
        payment_method: PAYMENT_METHODS[rng.random_range(0..PAYMENT_METHODS.len())],
        total_cents,
        created_at: anchor - rng.random_range(0..history),
    }
}
