//! Product and variant models
//!
//! Stock and order-bound figures are read-only snapshots from the remote
//! product service; the engine never reserves inventory.

use serde::{Deserialize, Serialize};

/// Fallback bound when the product service omits a quantity limit
pub const UNBOUNDED_QTY: u32 = 999;

/// Product entity (catalog snapshot)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    /// Category reference (String ID)
    pub category: String,
    pub is_active: bool,
}

/// Variant entity: a specific purchasable SKU of a product
/// (e.g., a weight/pack size) with its own price, stock, and bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub product_id: String,
    /// Display name including pack size, e.g. "Tomatoes 500g"
    pub name: String,
    pub unit_price: f64,
    /// Minimum purchasable quantity per line (defaults to 1)
    #[serde(default = "default_min_order_qty")]
    pub min_order_qty: u32,
    /// Per-order quantity ceiling; absent means effectively unbounded
    #[serde(default)]
    pub max_order_qty: Option<u32>,
    /// Stock snapshot; absent means effectively unbounded
    #[serde(default)]
    pub available_stock: Option<u32>,
    pub is_active: bool,
}

fn default_min_order_qty() -> u32 {
    1
}

impl Variant {
    /// Per-order quantity limit with the unbounded fallback applied
    pub fn max_order_qty_or_default(&self) -> u32 {
        self.max_order_qty.unwrap_or(UNBOUNDED_QTY)
    }

    /// Stock ceiling with the unbounded fallback applied
    pub fn available_stock_or_default(&self) -> u32 {
        self.available_stock.unwrap_or(UNBOUNDED_QTY)
    }

    /// Whether this variant currently has any purchasable stock
    pub fn in_stock(&self) -> bool {
        self.available_stock_or_default() > 0
    }
}
