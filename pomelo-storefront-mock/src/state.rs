//! Mock storefront state
//!
//! Single-tenant in-memory backend with scriptable failure injection, used
//! by the engine's integration tests. Pricing math here is intentionally
//! plain f64: the mock only needs to be self-consistent, not exact.

use dashmap::DashMap;
use parking_lot::Mutex;
use shared::models::{CartLine, CartPricing, CartSnapshot, Order, Variant};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Free-product promotion: `variant` is injected into every cart whose
/// subtotal reaches `threshold`
#[derive(Debug, Clone)]
pub struct FreeReward {
    pub threshold: f64,
    pub variant: Variant,
}

/// One line of the server-side cart
#[derive(Debug, Clone)]
pub struct ServerLine {
    pub line_id: String,
    pub variant_id: String,
    pub quantity: u32,
}

pub struct MockStorefront {
    pub catalog: DashMap<String, Variant>,
    pub cart: Mutex<Vec<ServerLine>>,
    pub orders: DashMap<String, Order>,

    pub delivery_charge: f64,
    pub free_delivery_threshold: f64,
    pub free_reward: Option<FreeReward>,

    // ========== Failure injection ==========
    pub fail_next_order: AtomicBool,
    pub fail_verify: AtomicBool,
    pub fail_cart_mutations: AtomicBool,
    pub serviceable: AtomicBool,

    // ========== Observability for assertions ==========
    pub cart_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,

    order_seq: AtomicU64,
    line_seq: AtomicU64,
}

impl Default for MockStorefront {
    fn default() -> Self {
        Self {
            catalog: DashMap::new(),
            cart: Mutex::new(Vec::new()),
            orders: DashMap::new(),
            delivery_charge: 15.0,
            free_delivery_threshold: 500.0,
            free_reward: None,
            fail_next_order: AtomicBool::new(false),
            fail_verify: AtomicBool::new(false),
            fail_cart_mutations: AtomicBool::new(false),
            serviceable: AtomicBool::new(true),
            cart_calls: AtomicUsize::new(0),
            verify_calls: AtomicUsize::new(0),
            order_seq: AtomicU64::new(1000),
            line_seq: AtomicU64::new(0),
        }
    }
}

impl MockStorefront {
    pub fn with_catalog(variants: impl IntoIterator<Item = Variant>) -> Self {
        let state = Self::default();
        for v in variants {
            state.catalog.insert(v.id.clone(), v);
        }
        state
    }

    pub fn next_line_id(&self) -> String {
        format!("line-{}", self.line_seq.fetch_add(1, Ordering::SeqCst))
    }

    pub fn next_order_id(&self) -> (String, String) {
        let n = self.order_seq.fetch_add(1, Ordering::SeqCst);
        (format!("ord-{}", n), format!("PM-{}", n))
    }

    /// Current server cart as the wire snapshot, free reward included
    pub fn snapshot(&self) -> CartSnapshot {
        let cart = self.cart.lock();
        let mut lines: Vec<CartLine> = Vec::new();
        let mut subtotal = 0.0;

        for line in cart.iter() {
            let Some(variant) = self.catalog.get(&line.variant_id) else {
                continue;
            };
            subtotal += variant.unit_price * line.quantity as f64;
            lines.push(CartLine {
                line_id: Some(line.line_id.clone()),
                product_id: variant.product_id.clone(),
                variant_id: Some(variant.id.clone()),
                name: variant.name.clone(),
                unit_price: variant.unit_price,
                quantity: line.quantity,
                min_order_qty: variant.min_order_qty,
                max_order_qty: variant.max_order_qty_or_default(),
                available_stock: variant.available_stock_or_default(),
                category: None,
                is_free_product: false,
            });
        }

        let mut reward_threshold = None;
        if let Some(reward) = &self.free_reward {
            if subtotal >= reward.threshold {
                lines.push(CartLine {
                    line_id: Some(format!("free-{}", reward.variant.id)),
                    product_id: reward.variant.product_id.clone(),
                    variant_id: Some(reward.variant.id.clone()),
                    name: reward.variant.name.clone(),
                    unit_price: reward.variant.unit_price,
                    quantity: 1,
                    min_order_qty: 1,
                    max_order_qty: 1,
                    available_stock: 1,
                    category: None,
                    is_free_product: true,
                });
            } else {
                reward_threshold = Some(reward.threshold - subtotal);
            }
        }

        let item_count = cart.len() as u32;
        let delivery_charge = if subtotal > 0.0 && subtotal < self.free_delivery_threshold {
            self.delivery_charge
        } else {
            0.0
        };
        let total = subtotal + delivery_charge;

        CartSnapshot {
            lines,
            item_count,
            pricing: CartPricing {
                subtotal,
                delivery_charge,
                discount: 0.0,
                total_amount: Some(total),
                reward_threshold,
                free_delivery_threshold: Some(self.free_delivery_threshold),
            },
        }
    }
}
