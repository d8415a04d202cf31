//! Domain entities shared by the live and simulated data paths.
//!
//! Money is carried in integer cents and timestamps in milliseconds since the
//! Unix epoch, so aggregations over the same collection are reproducible.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A catalogue item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identifier.
    pub id: String,
    /// Stock-keeping unit code.
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price_cents: u64,
    /// Units on hand.
    pub stock: u32,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields for a product that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price_cents: u64,
    pub stock: u32,
}

impl NewProduct {
    /// Materializes the product with the given identifier and creation time.
    #[must_use]
    pub fn into_product(self, id: String, now: i64) -> Product {
        Product {
            id,
            sku: self.sku,
            name: self.name,
            category: self.category,
            price_cents: self.price_cents,
            stock: self.stock,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
}

impl ProductPatch {
    /// Applies the present fields to `product` and bumps `updated_at`.
    pub fn apply(&self, product: &mut Product, now: i64) {
        if let Some(sku) = &self.sku {
            product.sku.clone_from(sku);
        }
        if let Some(name) = &self.name {
            product.name.clone_from(name);
        }
        if let Some(category) = &self.category {
            product.category.clone_from(category);
        }
        if let Some(price) = self.price_cents {
            product.price_cents = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        product.updated_at = now;
    }

    /// Returns `true` if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sku.is_none()
            && self.name.is_none()
            && self.category.is_none()
            && self.price_cents.is_none()
            && self.stock.is_none()
    }
}

/// How a sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
}

/// One product line on a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
}

impl SaleLine {
    /// Quantity times unit price, saturating.
    #[must_use]
    pub fn total_cents(&self) -> u64 {
        self.unit_price_cents.saturating_mul(u64::from(self.quantity))
    }
}

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub lines: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
    pub total_cents: u64,
    pub created_at: i64,
}

/// Fields for a sale that does not exist yet. The total is derived from the lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub lines: Vec<SaleLine>,
    pub payment_method: PaymentMethod,
}

impl NewSale {
    /// Sum of all line totals, saturating.
    #[must_use]
    pub fn total_cents(&self) -> u64 {
        self.lines
            .iter()
            .fold(0u64, |acc, line| acc.saturating_add(line.total_cents()))
    }

    /// Materializes the sale with the given identifier and creation time.
    #[must_use]
    pub fn into_sale(self, id: String, now: i64) -> Sale {
        let total_cents = self.total_cents();
        Sale {
            id,
            lines: self.lines,
            payment_method: self.payment_method,
            total_cents,
            created_at: now,
        }
    }
}

/// A product removed from the active catalogue but kept for restoration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedItem {
    /// Identifier of the archive entry (not of the product).
    pub id: String,
    /// Snapshot of the product at archive time.
    pub product: Product,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub archived_at: i64,
}

/// Request to move a product into the archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Simulated collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Products,
    Sales,
    Archived,
}

impl Domain {
    /// Stable lowercase name, used in logs and metrics labels.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Products => "products",
            Domain::Sales => "sales",
            Domain::Archived => "archived",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Any entity held by the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SimulatedEntity {
    Product(Product),
    Sale(Sale),
    Archived(ArchivedItem),
}

impl SimulatedEntity {
    /// Identifier of the wrapped entity.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            SimulatedEntity::Product(p) => &p.id,
            SimulatedEntity::Sale(s) => &s.id,
            SimulatedEntity::Archived(a) => &a.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        NewProduct {
            sku: "SKU-1".to_string(),
            name: "Espresso".to_string(),
            category: "Coffee".to_string(),
            price_cents: 250,
            stock: 10,
        }
        .into_product("PRD-0001".to_string(), 1_000)
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut p = product();
        let patch = ProductPatch {
            stock: Some(3),
            ..ProductPatch::default()
        };
        patch.apply(&mut p, 2_000);

        assert_eq!(p.stock, 3);
        assert_eq!(p.name, "Espresso");
        assert_eq!(p.created_at, 1_000);
        assert_eq!(p.updated_at, 2_000);
    }

    #[test]
    fn empty_patch_detected() {
        assert!(ProductPatch::default().is_empty());
        let patch = ProductPatch {
            name: Some("x".to_string()),
            ..ProductPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn sale_total_is_sum_of_lines() {
        let sale = NewSale {
            lines: vec![
                SaleLine {
                    product_id: "PRD-0001".to_string(),
                    product_name: "Espresso".to_string(),
                    category: "Coffee".to_string(),
                    quantity: 2,
                    unit_price_cents: 250,
                },
                SaleLine {
                    product_id: "PRD-0002".to_string(),
                    product_name: "Croissant".to_string(),
                    category: "Bakery".to_string(),
                    quantity: 1,
                    unit_price_cents: 300,
                },
            ],
            payment_method: PaymentMethod::Card,
        }
        .into_sale("SAL-0001".to_string(), 5_000);

        assert_eq!(sale.total_cents, 800);
        assert_eq!(sale.created_at, 5_000);
    }

    #[test]
    fn product_serializes_camel_case() {
        let json = serde_json::to_value(product()).unwrap();
        assert_eq!(json["priceCents"], 250);
        assert_eq!(json["createdAt"], 1_000);
    }

    #[test]
    fn simulated_entity_tagged_by_kind() {
        let entity = SimulatedEntity::Product(product());
        let json = serde_json::to_value(&entity).unwrap();
        assert_eq!(json["kind"], "product");
        assert_eq!(entity.id(), "PRD-0001");
    }
}
