//! Order models
//!
//! Orders carry immutable line snapshots taken at submission time, decoupled
//! from the live cart so later cart changes never alter order history.
//! `status` and `payment_status` are raw server tokens; the client never
//! interprets them beyond display normalization.

use super::address::DeliveryAddress;
use super::payment::GatewayData;
use serde::{Deserialize, Serialize};

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    CashOnDelivery,
    OnlinePayment,
}

/// Immutable snapshot of one cart line at submission time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLineSnapshot {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub is_free_product: bool,
}

/// Pricing block frozen at submission time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: f64,
    pub delivery_charge: f64,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub discount: Option<f64>,
    pub total_amount: f64,
}

/// Per-stage fulfillment timestamps (epoch millis); richer than the coarse
/// status token when present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderTimeline {
    #[serde(default)]
    pub placed: Option<i64>,
    #[serde(default)]
    pub packed: Option<i64>,
    #[serde(default)]
    pub dispatched: Option<i64>,
    #[serde(default)]
    pub delivered: Option<i64>,
}

/// An order as returned by the storefront
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    /// Raw status token from the server, e.g. `PAYMENT_PENDING`, `PACKED`
    pub status: String,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: Option<String>,
    pub items: Vec<OrderLineSnapshot>,
    pub pricing: OrderPricing,
    pub delivery_address: DeliveryAddress,
    /// Creation time (epoch millis)
    pub created_at: i64,
    #[serde(default)]
    pub timeline: Option<OrderTimeline>,
}

/// Gateway hand-off block returned alongside an online-payment order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInit {
    pub gateway_data: GatewayData,
}

/// Response payload of `POST /api/orders`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderResponse {
    pub order: Order,
    /// Present only when the payment method is online
    #[serde(default)]
    pub payment: Option<PaymentInit>,
}
