//! Request payloads for the storefront API
//!
//! Validation derives are enforced server-side; the engine builds these
//! payloads and the storefront validates them on arrival.

use crate::models::PaymentMethod;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// `POST /api/cart/add`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddCartItemRequest {
    #[validate(length(min = 1))]
    pub variant_id: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
    #[serde(default)]
    pub address_id: Option<String>,
}

/// One `{variant, quantity}` pair of an order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub variant_id: String,
    pub quantity: u32,
}

/// `POST /api/orders`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PlaceOrderRequest {
    #[validate(length(min = 1))]
    pub store_id: String,
    #[validate(length(min = 1))]
    pub delivery_address_id: String,
    pub payment_method: PaymentMethod,
    /// Explicit line inputs; the server may also derive them from its own
    /// cart when omitted
    #[serde(default)]
    pub items: Option<Vec<OrderItemInput>>,
}

/// `POST /api/payments/verify`
///
/// `payment_data` is absent when the gateway surface was dismissed or
/// reported failure; verification is still mandatory in that case and is
/// expected to reject.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyPaymentRequest {
    #[validate(length(min = 1))]
    pub order_id: String,
    #[serde(default)]
    pub payment_data: Option<Value>,
    #[validate(length(min = 1))]
    pub gateway: String,
}

/// `POST /api/service-area/check`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServiceabilityRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}
