//! Cart money math using rust_decimal for precision
//!
//! All arithmetic is done in `Decimal` and rounded half-up to 2 decimal
//! places before being converted back to `f64` model fields. The server
//! total, when present, is preferred over any client-side sum because the
//! server applies promotional/threshold logic the client does not
//! reimplement.

use rust_decimal::prelude::*;
use shared::models::{CartLine, CartPricing};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert an f64 model field into a Decimal
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert back to f64, rounded half-up to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Derived cart totals surfaced to the host UI
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartTotals {
    /// Sum over non-free lines only
    pub subtotal: f64,
    pub delivery_charge: f64,
    pub discount: f64,
    pub total_amount: f64,
    pub reward_threshold: Option<f64>,
    pub free_delivery_threshold: Option<f64>,
}

/// `subtotal = Σ unit_price × quantity` over non-free lines
pub fn subtotal(lines: &[CartLine]) -> Decimal {
    lines
        .iter()
        .filter(|l| !l.is_free_product)
        .map(|l| to_decimal(l.unit_price) * Decimal::from(l.quantity))
        .sum()
}

/// Compute display totals from the line set and the server pricing block
pub fn compute(lines: &[CartLine], pricing: &CartPricing) -> CartTotals {
    let subtotal = subtotal(lines);
    let delivery = to_decimal(pricing.delivery_charge);
    let discount = to_decimal(pricing.discount);

    let total = match pricing.total_amount {
        Some(server_total) => to_decimal(server_total),
        None => subtotal + delivery - discount,
    };

    CartTotals {
        subtotal: to_f64(subtotal),
        delivery_charge: to_f64(delivery),
        discount: to_f64(discount),
        total_amount: to_f64(total),
        reward_threshold: pricing.reward_threshold,
        free_delivery_threshold: pricing.free_delivery_threshold,
    }
}
