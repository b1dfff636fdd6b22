//! Payment models
//!
//! Payment processing itself is delegated to a hosted gateway script; these
//! types only bind the hosted UI to a specific charge and carry the opaque
//! completion payload through to server-side verification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway parameters returned by order creation for online payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayData {
    /// Publishable key for the hosted checkout script
    pub key_id: String,
    /// Payment-provider-side order handle binding the hosted UI
    /// to a specific charge amount
    pub gateway_order_id: String,
    /// Charge amount in minor currency units
    pub amount: i64,
    pub currency: String,
}

/// Opaque payment completion payload from the hosted gateway
///
/// Never interpreted client-side; forwarded verbatim to verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentCompletion(pub Value);

/// Result of server-side payment verification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOutcome {
    pub verified: bool,
    /// Raw order status after verification, e.g. `PAYMENT_CONFIRMED`
    #[serde(default)]
    pub order_status: Option<String>,
}

/// Serviceability check result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceabilityResult {
    pub available: bool,
    #[serde(default)]
    pub estimated_delivery_minutes: Option<u32>,
}
