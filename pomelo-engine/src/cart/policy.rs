//! Quantity policy
//!
//! Pure validation rules for line-item quantity changes. No side effects;
//! the cart store applies these before every mutation. Removal confirmation
//! is gated at the UI boundary, not here.

use shared::models::CartLine;

/// Why an increment was denied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// `quantity + 1` would exceed the per-order limit
    OrderLimit,
    /// `quantity + 1` would exceed the stock snapshot
    OutOfStock,
    /// Free-product lines are never quantity-editable
    FreeProduct,
}

/// Outcome of [`can_increment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementDecision {
    pub allowed: bool,
    pub reason: Option<DenyReason>,
}

impl IncrementDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Outcome of [`can_decrement`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecrementDecision {
    pub allowed: bool,
    /// `quantity - 1` would fall below the minimum: the caller must run a
    /// removal flow instead of clamping to the minimum
    pub requires_removal: bool,
}

/// Whether one more unit may be added to this line.
///
/// Both denial reasons are terminal for the gesture: no retry, no partial
/// increment. The order-limit check runs before the stock check, matching
/// the message the user should see when both would deny.
pub fn can_increment(line: &CartLine) -> IncrementDecision {
    if line.is_free_product {
        return IncrementDecision::deny(DenyReason::FreeProduct);
    }
    let next = line.quantity + 1;
    if next > line.max_order_qty {
        return IncrementDecision::deny(DenyReason::OrderLimit);
    }
    if next > line.available_stock {
        return IncrementDecision::deny(DenyReason::OutOfStock);
    }
    IncrementDecision::allow()
}

/// Whether one unit may be removed from this line.
pub fn can_decrement(line: &CartLine) -> DecrementDecision {
    if line.is_free_product {
        return DecrementDecision {
            allowed: false,
            requires_removal: false,
        };
    }
    // quantity == 0 is synonymous with removal and must not exist
    let requires_removal = line.quantity <= line.min_order_qty;
    DecrementDecision {
        allowed: true,
        requires_removal,
    }
}
