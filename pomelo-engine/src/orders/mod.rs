//! Order lifecycle tracker
//!
//! Holds the engine's order list (fed by checkout completions and remote
//! history fetches), normalizes raw statuses for display, and gates the
//! reorder action. Order status is mutated only by server-confirmed
//! transitions; the client never guesses beyond display normalization.

pub mod stage;

use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::remote::{CartRemote, OrderRemote};
use parking_lot::RwLock;
use shared::models::Order;
use stage::StageView;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Result of replaying a delivered order into the cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReorderReport {
    pub added: usize,
    /// Variants the storefront rejected (out of stock since, delisted, …)
    pub failed: Vec<String>,
}

pub struct OrderLifecycleTracker {
    orders: RwLock<Vec<Order>>,
    remote: Arc<dyn OrderRemote>,
    events: broadcast::Sender<EngineEvent>,
}

impl OrderLifecycleTracker {
    pub fn new(remote: Arc<dyn OrderRemote>, events: broadcast::Sender<EngineEvent>) -> Self {
        Self {
            orders: RwLock::new(Vec::new()),
            remote,
            events,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Tracked orders, newest first
    pub fn all(&self) -> Vec<Order> {
        self.orders.read().clone()
    }

    pub fn get(&self, order_id: &str) -> Option<Order> {
        self.orders.read().iter().find(|o| o.id == order_id).cloned()
    }

    /// Four-row display pipeline for an order
    pub fn progress(&self, order_id: &str) -> EngineResult<Vec<StageView>> {
        let order = self
            .get(order_id)
            .ok_or_else(|| EngineError::OrderNotFound(order_id.into()))?;
        Ok(stage::pipeline(&order.status, order.timeline.as_ref()))
    }

    pub fn is_reorder_eligible(&self, order_id: &str) -> bool {
        self.get(order_id)
            .is_some_and(|o| stage::is_reorder_eligible(&o.status))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Insert or replace an order, keeping newest-first ordering
    pub fn upsert(&self, order: Order) {
        let order_id = order.id.clone();
        {
            let mut orders = self.orders.write();
            match orders.iter_mut().find(|o| o.id == order.id) {
                Some(existing) => *existing = order,
                None => {
                    orders.push(order);
                    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                }
            }
        }
        let _ = self.events.send(EngineEvent::OrderUpdated { order_id });
    }

    /// Refresh the tracked list from the remote history endpoint
    pub async fn refresh(&self) -> EngineResult<()> {
        let mut fetched = self.remote.history().await?;
        fetched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        *self.orders.write() = fetched;
        let _ = self.events.send(EngineEvent::OrderUpdated {
            order_id: String::new(),
        });
        Ok(())
    }

    /// Re-fetch one order (e.g. after a fulfillment push)
    pub async fn refresh_order(&self, order_id: &str) -> EngineResult<Order> {
        let order = self.remote.order(order_id).await?;
        self.upsert(order.clone());
        Ok(order)
    }

    /// Replay a delivered order's line snapshots into the server cart.
    ///
    /// Strictly gated on the raw delivered token. Each line is re-added
    /// through the delta-based cart contract and is subject to current
    /// stock and policy; lines the server rejects are reported, not
    /// retried. The caller reconciles the cart afterwards.
    pub async fn reorder(
        &self,
        order_id: &str,
        cart_remote: &dyn CartRemote,
    ) -> EngineResult<ReorderReport> {
        let order = self
            .get(order_id)
            .ok_or_else(|| EngineError::OrderNotFound(order_id.into()))?;

        if !stage::is_reorder_eligible(&order.status) {
            return Err(EngineError::ReorderNotEligible);
        }

        let mut report = ReorderReport::default();
        for item in order.items.iter().filter(|i| !i.is_free_product) {
            let variant_id = item.variant_id.as_deref().unwrap_or(&item.product_id);
            match cart_remote.add(variant_id, item.quantity, None).await {
                Ok(_) => report.added += 1,
                Err(e) => {
                    tracing::warn!(variant = %variant_id, error = %e, "Reorder line rejected");
                    report.failed.push(variant_id.to_string());
                }
            }
        }

        tracing::info!(
            order_id = %order_id,
            added = report.added,
            failed = report.failed.len(),
            "Reorder replayed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RemoteError, RemoteResult};
    use async_trait::async_trait;
    use shared::models::{
        AddressType, CartSnapshot, DeliveryAddress, OrderLineSnapshot, OrderPricing,
        PaymentMethod, PlaceOrderResponse, VerifyOutcome,
    };
    use shared::request::{PlaceOrderRequest, VerifyPaymentRequest};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeOrderRemote {
        orders: Vec<Order>,
    }

    #[async_trait]
    impl OrderRemote for FakeOrderRemote {
        async fn place_order(
            &self,
            _req: &PlaceOrderRequest,
        ) -> RemoteResult<PlaceOrderResponse> {
            Err(RemoteError::InvalidResponse("not used".into()))
        }

        async fn verify_payment(
            &self,
            _req: &VerifyPaymentRequest,
        ) -> RemoteResult<VerifyOutcome> {
            Err(RemoteError::InvalidResponse("not used".into()))
        }

        async fn history(&self) -> RemoteResult<Vec<Order>> {
            Ok(self.orders.clone())
        }

        async fn order(&self, order_id: &str) -> RemoteResult<Order> {
            self.orders
                .iter()
                .find(|o| o.id == order_id)
                .cloned()
                .ok_or_else(|| RemoteError::Api {
                    code: 4001,
                    message: "not found".into(),
                })
        }
    }

    #[derive(Default)]
    struct CountingCartRemote {
        adds: AtomicUsize,
        reject: Option<&'static str>,
    }

    #[async_trait]
    impl CartRemote for CountingCartRemote {
        async fn fetch(&self) -> RemoteResult<Option<CartSnapshot>> {
            Ok(None)
        }

        async fn add(
            &self,
            variant_id: &str,
            _quantity: u32,
            _address_id: Option<&str>,
        ) -> RemoteResult<String> {
            if Some(variant_id) == self.reject {
                return Err(RemoteError::Api {
                    code: 3001,
                    message: "out of stock".into(),
                });
            }
            self.adds.fetch_add(1, Ordering::SeqCst);
            Ok(format!("srv-{}", variant_id))
        }

        async fn increment(&self, _line_id: &str) -> RemoteResult<()> {
            Ok(())
        }

        async fn decrement(&self, _line_id: &str) -> RemoteResult<()> {
            Ok(())
        }

        async fn remove(&self, _line_id: &str) -> RemoteResult<()> {
            Ok(())
        }
    }

    fn address() -> DeliveryAddress {
        DeliveryAddress {
            id: "addr-1".into(),
            address_type: AddressType::Home,
            line1: "12 Lake Rd".into(),
            line2: None,
            landmark: None,
            coordinates: None,
            is_default: true,
        }
    }

    fn order(id: &str, status: &str, created_at: i64) -> Order {
        Order {
            id: id.into(),
            order_number: format!("PM-{}", id),
            status: status.into(),
            payment_method: PaymentMethod::CashOnDelivery,
            payment_status: None,
            items: vec![
                OrderLineSnapshot {
                    product_id: "p-1".into(),
                    variant_id: Some("v-1".into()),
                    name: "Tomatoes 500g".into(),
                    unit_price: 30.0,
                    quantity: 2,
                    is_free_product: false,
                },
                OrderLineSnapshot {
                    product_id: "p-free".into(),
                    variant_id: Some("f-1".into()),
                    name: "Free coriander".into(),
                    unit_price: 10.0,
                    quantity: 1,
                    is_free_product: true,
                },
            ],
            pricing: OrderPricing {
                subtotal: 60.0,
                delivery_charge: 15.0,
                tax: None,
                discount: None,
                total_amount: 75.0,
            },
            delivery_address: address(),
            created_at,
            timeline: None,
        }
    }

    fn tracker(orders: Vec<Order>) -> OrderLifecycleTracker {
        OrderLifecycleTracker::new(
            Arc::new(FakeOrderRemote { orders }),
            crate::events::channel(),
        )
    }

    #[tokio::test]
    async fn test_refresh_sorts_newest_first() {
        let t = tracker(vec![order("a", "DELIVERED", 100), order("b", "PACKED", 200)]);
        t.refresh().await.unwrap();
        let ids: Vec<String> = t.all().into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn test_upsert_replaces_by_id() {
        let t = tracker(vec![]);
        t.upsert(order("a", "PAYMENT_PENDING", 100));
        t.upsert(order("a", "PAYMENT_CONFIRMED", 100));
        assert_eq!(t.all().len(), 1);
        assert_eq!(t.get("a").unwrap().status, "PAYMENT_CONFIRMED");
    }

    #[test]
    fn test_progress_uses_status_and_timeline() {
        let t = tracker(vec![]);
        let mut o = order("a", "CONFIRMED", 100);
        o.timeline = Some(shared::models::OrderTimeline {
            placed: Some(1),
            packed: Some(2),
            dispatched: None,
            delivered: None,
        });
        t.upsert(o);

        let rows = t.progress("a").unwrap();
        assert!(rows[1].completed); // timeline wins over coarse status
        assert!(!rows[2].completed);
    }

    #[tokio::test]
    async fn test_reorder_requires_delivered() {
        let t = tracker(vec![]);
        t.upsert(order("a", "PACKED", 100));

        let cart = CountingCartRemote::default();
        let err = t.reorder("a", &cart).await.unwrap_err();
        assert!(matches!(err, EngineError::ReorderNotEligible));
        assert_eq!(cart.adds.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_reorder_skips_free_lines_and_reports_failures() {
        let t = tracker(vec![]);
        let mut o = order("a", "DELIVERED", 100);
        o.items.push(OrderLineSnapshot {
            product_id: "p-2".into(),
            variant_id: Some("v-2".into()),
            name: "Onions 1kg".into(),
            unit_price: 40.0,
            quantity: 1,
            is_free_product: false,
        });
        t.upsert(o);

        let cart = CountingCartRemote {
            adds: AtomicUsize::new(0),
            reject: Some("v-2"),
        };
        let report = t.reorder("a", &cart).await.unwrap();

        // Free line never replayed; v-1 added, v-2 reported
        assert_eq!(report.added, 1);
        assert_eq!(report.failed, vec!["v-2".to_string()]);
        assert_eq!(cart.adds.load(Ordering::SeqCst), 1);
    }
}
