//! Cart models
//!
//! [`CartLine`] is the client-side aggregate line; [`CartSnapshot`] is the
//! authoritative server cart as it arrives on the wire. The server snapshot
//! is the only source of free-product lines and server-computed pricing.

use super::product::UNBOUNDED_QTY;
use serde::{Deserialize, Serialize};

/// One product/variant entry in the cart with its own quantity and bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Server-assigned line id; `None` until the line has synced remotely
    #[serde(default)]
    pub line_id: Option<String>,
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default = "default_min_order_qty")]
    pub min_order_qty: u32,
    #[serde(default = "default_unbounded")]
    pub max_order_qty: u32,
    #[serde(default = "default_unbounded")]
    pub available_stock: u32,
    #[serde(default)]
    pub category: Option<String>,
    /// Promotional line injected by the server; never user-editable,
    /// excluded from the subtotal
    #[serde(default)]
    pub is_free_product: bool,
}

fn default_min_order_qty() -> u32 {
    1
}

fn default_unbounded() -> u32 {
    UNBOUNDED_QTY
}

impl CartLine {
    /// Identity used to match lines across local and server state:
    /// the variant id when present, else the product id
    pub fn key(&self) -> &str {
        self.variant_id.as_deref().unwrap_or(&self.product_id)
    }

    /// Effective upper bound: `min(max_order_qty, available_stock)`
    pub fn effective_max(&self) -> u32 {
        self.max_order_qty.min(self.available_stock)
    }
}

/// Server-computed pricing block carried on the cart snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartPricing {
    #[serde(default)]
    pub subtotal: f64,
    #[serde(default)]
    pub delivery_charge: f64,
    #[serde(default)]
    pub discount: f64,
    /// Server total including promotional/threshold logic the client
    /// does not reimplement; preferred over any client-side sum
    #[serde(default)]
    pub total_amount: Option<f64>,
    /// Amount still needed to unlock the next free-product tier
    #[serde(default)]
    pub reward_threshold: Option<f64>,
    #[serde(default)]
    pub free_delivery_threshold: Option<f64>,
}

/// Authoritative server cart as returned by `GET /api/cart`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub lines: Vec<CartLine>,
    #[serde(default)]
    pub item_count: u32,
    #[serde(flatten)]
    pub pricing: CartPricing,
}

impl CartSnapshot {
    /// A snapshot with neither a positive subtotal nor a positive item
    /// count is treated as an empty cart
    pub fn is_effectively_empty(&self) -> bool {
        self.pricing.subtotal <= 0.0 && self.item_count == 0
    }
}
