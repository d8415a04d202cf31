//! Dashboard aggregations over sales and inventory.
//!
//! All functions are pure and order-independent with respect to their input:
//! buckets are accumulated in `BTreeMap`s and sorted with full tie-breaking,
//! so the same collection always yields identical output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Product, Sale};

const MILLIS_PER_HOUR: i64 = 3_600_000;
const MILLIS_PER_DAY: i64 = 24 * MILLIS_PER_HOUR;

/// Sales that fell into one UTC hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySales {
    /// Hour of day, `0..24`.
    pub hour: u8,
    pub sale_count: u32,
    pub revenue_cents: u64,
}

/// Units and revenue per product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySales {
    pub category: String,
    pub units: u64,
    pub revenue_cents: u64,
}

/// Headline sales figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub sale_count: u64,
    pub revenue_cents: u64,
    /// Integer mean of sale totals; 0 when there are no sales.
    pub average_ticket_cents: u64,
}

/// Stock held in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryStock {
    pub category: String,
    pub product_count: u64,
    pub units: u64,
}

/// Headline inventory figures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: u64,
    pub total_units: u64,
    /// Sum of `price * stock` over all products.
    pub stock_value_cents: u64,
    /// Sorted by category name.
    pub categories: Vec<CategoryStock>,
}

/// Hour of day (UTC) for a millisecond timestamp. Negative timestamps wrap.
#[must_use]
pub fn hour_of_day(millis: i64) -> u8 {
    // rem_euclid keeps the result in 0..24, which always fits in u8.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let hour = (millis.rem_euclid(MILLIS_PER_DAY) / MILLIS_PER_HOUR) as u8;
    hour
}

/// Groups sales into 24 hourly buckets. Empty hours are included.
#[must_use]
pub fn sales_by_hour(sales: &[Sale]) -> Vec<HourlySales> {
    let mut buckets: Vec<HourlySales> = (0..24)
        .map(|hour| HourlySales {
            hour,
            sale_count: 0,
            revenue_cents: 0,
        })
        .collect();

    for sale in sales {
        let bucket = &mut buckets[usize::from(hour_of_day(sale.created_at))];
        bucket.sale_count = bucket.sale_count.saturating_add(1);
        bucket.revenue_cents = bucket.revenue_cents.saturating_add(sale.total_cents);
    }

    buckets
}

/// Units and revenue per category, highest revenue first (ties by name).
#[must_use]
pub fn sales_by_category(sales: &[Sale]) -> Vec<CategorySales> {
    let mut totals: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for line in sales.iter().flat_map(|s| &s.lines) {
        let entry = totals.entry(line.category.as_str()).or_default();
        entry.0 = entry.0.saturating_add(u64::from(line.quantity));
        entry.1 = entry.1.saturating_add(line.total_cents());
    }

    let mut out: Vec<CategorySales> = totals
        .into_iter()
        .map(|(category, (units, revenue_cents))| CategorySales {
            category: category.to_string(),
            units,
            revenue_cents,
        })
        .collect();
    out.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.category.cmp(&b.category))
    });
    out
}

/// Count, revenue and average ticket.
#[must_use]
pub fn sales_summary(sales: &[Sale]) -> SalesSummary {
    let sale_count = sales.len() as u64;
    let revenue_cents = sales
        .iter()
        .fold(0u64, |acc, s| acc.saturating_add(s.total_cents));
    let average_ticket_cents = revenue_cents.checked_div(sale_count).unwrap_or(0);
    SalesSummary {
        sale_count,
        revenue_cents,
        average_ticket_cents,
    }
}

/// Totals and per-category stock.
#[must_use]
pub fn inventory_summary(products: &[Product]) -> InventorySummary {
    let mut categories: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    let mut summary = InventorySummary::default();

    for product in products {
        let units = u64::from(product.stock);
        summary.product_count += 1;
        summary.total_units = summary.total_units.saturating_add(units);
        summary.stock_value_cents = summary
            .stock_value_cents
            .saturating_add(product.price_cents.saturating_mul(units));

        let entry = categories.entry(product.category.as_str()).or_default();
        entry.0 += 1;
        entry.1 = entry.1.saturating_add(units);
    }

    summary.categories = categories
        .into_iter()
        .map(|(category, (product_count, units))| CategoryStock {
            category: category.to_string(),
            product_count,
            units,
        })
        .collect();
    summary
}

/// Products with `stock <= threshold`, lowest stock first (ties by id).
#[must_use]
pub fn low_stock(products: &[Product], threshold: u32) -> Vec<Product> {
    let mut out: Vec<Product> = products
        .iter()
        .filter(|p| p.stock <= threshold)
        .cloned()
        .collect();
    out.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.id.cmp(&b.id)));
    out
}
