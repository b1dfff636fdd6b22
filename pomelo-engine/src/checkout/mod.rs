//! Checkout orchestrator
//!
//! State machine over a single checkout attempt:
//!
//! ```text
//! Idle → AddressMissing | Assembling → Submitted →
//!     { Finalized (cash) | AwaitingGateway (online) } → Verifying →
//!     { Completed | Failed }
//! ```
//!
//! Order creation is non-idempotent from the client's perspective: a
//! submitted-but-unacknowledged request is never auto-retried, since a
//! retry could create a duplicate order. Only an explicit user-initiated
//! resubmission after a definite failure is allowed. The cart is cleared
//! only on a confirmed `Finalized`/`Completed` outcome; every other
//! terminal state leaves it bit-for-bit untouched.

pub mod bridge;

use crate::cart::CartStore;
use crate::error::{EngineError, EngineResult};
use crate::events::{CheckoutPhase, EngineEvent};
use crate::orders::OrderLifecycleTracker;
use crate::remote::{OrderRemote, ServiceabilityRemote, check_with_timeout};
use bridge::{GatewayOutcome, PaymentGatewayBridge, PaymentSession};
use parking_lot::RwLock;
use shared::models::{DeliveryAddress, Order, PaymentMethod};
use shared::request::{PlaceOrderRequest, VerifyPaymentRequest};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

pub struct CheckoutOrchestrator {
    cart: Arc<CartStore>,
    orders_remote: Arc<dyn OrderRemote>,
    serviceability: Arc<dyn ServiceabilityRemote>,
    bridge: PaymentGatewayBridge,
    tracker: Arc<OrderLifecycleTracker>,
    selected_address: Arc<RwLock<Option<DeliveryAddress>>>,
    events: broadcast::Sender<EngineEvent>,
    phase: RwLock<CheckoutPhase>,
    /// One attempt at a time; the engine stays re-entrant across the
    /// attempt's own suspension points
    attempt_gate: tokio::sync::Mutex<()>,
    store_id: String,
    gateway_name: String,
    serviceability_timeout: Duration,
}

impl CheckoutOrchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cart: Arc<CartStore>,
        orders_remote: Arc<dyn OrderRemote>,
        serviceability: Arc<dyn ServiceabilityRemote>,
        bridge: PaymentGatewayBridge,
        tracker: Arc<OrderLifecycleTracker>,
        selected_address: Arc<RwLock<Option<DeliveryAddress>>>,
        events: broadcast::Sender<EngineEvent>,
        store_id: String,
        gateway_name: String,
        serviceability_timeout: Duration,
    ) -> Self {
        Self {
            cart,
            orders_remote,
            serviceability,
            bridge,
            tracker,
            selected_address,
            events,
            phase: RwLock::new(CheckoutPhase::Idle),
            attempt_gate: tokio::sync::Mutex::new(()),
            store_id,
            gateway_name,
            serviceability_timeout,
        }
    }

    /// Current phase of the latest attempt
    pub fn phase(&self) -> CheckoutPhase {
        *self.phase.read()
    }

    fn set_phase(&self, phase: CheckoutPhase) {
        *self.phase.write() = phase;
        let _ = self.events.send(EngineEvent::CheckoutChanged(phase));
    }

    /// Run one checkout attempt end to end.
    ///
    /// Returns the created order on `Finalized` (cash) or `Completed`
    /// (verified online payment). Every error return leaves the cart in
    /// its pre-checkout state.
    pub async fn submit(&self, payment_method: PaymentMethod) -> EngineResult<Order> {
        let _attempt = self.attempt_gate.lock().await;
        let attempt_id = Uuid::new_v4();

        let Some(address) = self.selected_address.read().clone() else {
            // Terminal for this attempt; no server call is made
            self.set_phase(CheckoutPhase::AddressMissing);
            tracing::warn!(attempt = %attempt_id, "Checkout attempted with no delivery address");
            return Err(EngineError::AddressMissing);
        };

        self.set_phase(CheckoutPhase::Assembling);

        if let Some(point) = address.coordinates {
            let available =
                check_with_timeout(&*self.serviceability, point, self.serviceability_timeout)
                    .await;
            if !available {
                self.set_phase(CheckoutPhase::Failed);
                tracing::warn!(attempt = %attempt_id, address = %address.id, "Address not serviceable");
                return Err(EngineError::NotServiceable);
            }
        }

        if self.cart.is_empty() {
            self.set_phase(CheckoutPhase::Failed);
            return Err(EngineError::CartEmpty);
        }

        let request = PlaceOrderRequest {
            store_id: self.store_id.clone(),
            delivery_address_id: address.id.clone(),
            payment_method,
            items: Some(self.cart.order_items()),
        };

        // Posted exactly once; an unacknowledged submission is surfaced as
        // Failed, never silently retried
        self.set_phase(CheckoutPhase::Submitted);
        let response = match self.orders_remote.place_order(&request).await {
            Ok(resp) => resp,
            Err(e) => {
                self.set_phase(CheckoutPhase::Failed);
                tracing::error!(attempt = %attempt_id, error = %e, "Order submission failed");
                return Err(EngineError::SubmissionFailed(e.to_string()));
            }
        };

        match payment_method {
            PaymentMethod::CashOnDelivery => self.finalize_cash(attempt_id, response.order),
            PaymentMethod::OnlinePayment => {
                let order = response.order;
                let Some(payment) = response.payment else {
                    // Order exists server-side but cannot be paid; cart stays
                    self.set_phase(CheckoutPhase::Failed);
                    tracing::error!(attempt = %attempt_id, order = %order.id, "Gateway parameters missing from order response");
                    return Err(EngineError::SubmissionFailed(
                        "gateway parameters missing".into(),
                    ));
                };
                self.run_gateway(attempt_id, order, payment.gateway_data).await
            }
        }
    }

    fn finalize_cash(&self, attempt_id: Uuid, order: Order) -> EngineResult<Order> {
        self.cart.clear();
        self.tracker.upsert(order.clone());
        self.set_phase(CheckoutPhase::Finalized);
        tracing::info!(
            attempt = %attempt_id,
            order = %order.id,
            order_number = %order.order_number,
            "Cash order placed"
        );
        Ok(order)
    }

    /// Online path: hand control to the gateway surface, then verify the
    /// reported outcome server-side exactly once. Only a success carries
    /// completion data; failure and dismissal verify without any, so the
    /// server records the attempt as unpaid.
    async fn run_gateway(
        &self,
        attempt_id: Uuid,
        mut order: Order,
        gateway: shared::models::GatewayData,
    ) -> EngineResult<Order> {
        let session = PaymentSession::new(order.id.clone(), &gateway);

        self.set_phase(CheckoutPhase::AwaitingGateway);
        let description = format!("Order {}", order.order_number);
        let outcome = self.bridge.present(&session, &description).await;

        let payment_data = match outcome {
            GatewayOutcome::Success(completion) => Some(completion.0),
            GatewayOutcome::Failure(payload) => {
                // The failure payload is diagnostic only; forwarding it as
                // payment data would let the server verify a declined payment
                tracing::warn!(
                    attempt = %attempt_id,
                    order = %order.id,
                    payload = ?payload,
                    "Gateway reported payment failure"
                );
                None
            }
            GatewayOutcome::Dismissed => {
                tracing::warn!(attempt = %attempt_id, order = %order.id, "Gateway dismissed by user");
                None
            }
        };

        self.set_phase(CheckoutPhase::Verifying);
        let verify_req = VerifyPaymentRequest {
            order_id: session.order_id.clone(),
            payment_data,
            gateway: self.gateway_name.clone(),
        };
        // The session is consumed by this single verification call and
        // discarded regardless of the result
        drop(session);

        match self.orders_remote.verify_payment(&verify_req).await {
            Ok(outcome) if outcome.verified => {
                if let Some(status) = outcome.order_status {
                    order.status = status;
                }
                order.payment_status = Some("PAID".into());
                self.cart.clear();
                self.tracker.upsert(order.clone());
                self.set_phase(CheckoutPhase::Completed);
                tracing::info!(attempt = %attempt_id, order = %order.id, "Payment verified");
                Ok(order)
            }
            Ok(outcome) => {
                // Order stays unconfirmed for later reconciliation
                if let Some(status) = outcome.order_status {
                    order.status = status;
                }
                self.tracker.upsert(order.clone());
                self.set_phase(CheckoutPhase::Failed);
                tracing::warn!(attempt = %attempt_id, order = %order.id, "Verification rejected");
                Err(EngineError::VerificationFailed("rejected by server".into()))
            }
            Err(e) => {
                self.tracker.upsert(order.clone());
                self.set_phase(CheckoutPhase::Failed);
                tracing::error!(attempt = %attempt_id, order = %order.id, error = %e, "Verification errored");
                Err(EngineError::VerificationFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::QtyDelta;
    use crate::error::{RemoteError, RemoteResult};
    use crate::remote::CartRemote;
    use crate::token::StaticTokenProvider;
    use async_trait::async_trait;
    use bridge::{GatewayOptions, GatewaySurface, OutcomeHandle};
    use parking_lot::Mutex as PlMutex;
    use shared::models::{
        AddressType, CartSnapshot, GatewayData, GeoPoint, OrderPricing, PaymentCompletion,
        PaymentInit, PlaceOrderResponse, Product, ServiceabilityResult, Variant, VerifyOutcome,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ========================================================================
    // Fakes
    // ========================================================================

    struct NullCartRemote;

    #[async_trait]
    impl CartRemote for NullCartRemote {
        async fn fetch(&self) -> RemoteResult<Option<CartSnapshot>> {
            Ok(None)
        }
        async fn add(&self, v: &str, _q: u32, _a: Option<&str>) -> RemoteResult<String> {
            Ok(format!("srv-{}", v))
        }
        async fn increment(&self, _l: &str) -> RemoteResult<()> {
            Ok(())
        }
        async fn decrement(&self, _l: &str) -> RemoteResult<()> {
            Ok(())
        }
        async fn remove(&self, _l: &str) -> RemoteResult<()> {
            Ok(())
        }
    }

    /// Scriptable order remote counting every call
    struct FakeOrderRemote {
        submits: AtomicUsize,
        verifies: AtomicUsize,
        fail_submit: bool,
        verify_ok: bool,
        online: bool,
        last_verify: PlMutex<Option<VerifyPaymentRequest>>,
    }

    impl FakeOrderRemote {
        fn new(online: bool) -> Self {
            Self {
                submits: AtomicUsize::new(0),
                verifies: AtomicUsize::new(0),
                fail_submit: false,
                verify_ok: true,
                online,
                last_verify: PlMutex::new(None),
            }
        }
    }

    #[async_trait]
    impl OrderRemote for FakeOrderRemote {
        async fn place_order(&self, req: &PlaceOrderRequest) -> RemoteResult<PlaceOrderResponse> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            if self.fail_submit {
                return Err(RemoteError::Api {
                    code: 4002,
                    message: "rejected".into(),
                });
            }
            let order = Order {
                id: "ord-1".into(),
                order_number: "PM-1001".into(),
                status: if self.online {
                    "PAYMENT_PENDING".into()
                } else {
                    "CONFIRMED".into()
                },
                payment_method: req.payment_method,
                payment_status: None,
                items: vec![],
                pricing: OrderPricing {
                    subtotal: 60.0,
                    delivery_charge: 15.0,
                    tax: None,
                    discount: None,
                    total_amount: 75.0,
                },
                delivery_address: address(true),
                created_at: 1_700_000_000_000,
                timeline: None,
            };
            let payment = self.online.then(|| PaymentInit {
                gateway_data: GatewayData {
                    key_id: "rzp_test_key".into(),
                    gateway_order_id: "gw-ord-77".into(),
                    amount: 7_500,
                    currency: "INR".into(),
                },
            });
            Ok(PlaceOrderResponse { order, payment })
        }

        async fn verify_payment(&self, req: &VerifyPaymentRequest) -> RemoteResult<VerifyOutcome> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            *self.last_verify.lock() = Some(req.clone());
            if self.verify_ok && req.payment_data.is_some() {
                Ok(VerifyOutcome {
                    verified: true,
                    order_status: Some("PAYMENT_CONFIRMED".into()),
                })
            } else {
                Ok(VerifyOutcome {
                    verified: false,
                    order_status: Some("PAYMENT_PENDING".into()),
                })
            }
        }

        async fn history(&self) -> RemoteResult<Vec<Order>> {
            Ok(vec![])
        }

        async fn order(&self, _id: &str) -> RemoteResult<Order> {
            Err(RemoteError::Api {
                code: 4001,
                message: "not found".into(),
            })
        }
    }

    struct FixedServiceability(bool);

    #[async_trait]
    impl ServiceabilityRemote for FixedServiceability {
        async fn check(&self, _p: GeoPoint) -> RemoteResult<ServiceabilityResult> {
            Ok(ServiceabilityResult {
                available: self.0,
                estimated_delivery_minutes: Some(30),
            })
        }
    }

    /// Surface that resolves with a fixed outcome
    struct AutoSurface(GatewayOutcome);

    #[async_trait]
    impl GatewaySurface for AutoSurface {
        async fn present(&self, _options: GatewayOptions, outcome: OutcomeHandle) {
            match &self.0 {
                GatewayOutcome::Success(p) => outcome.success(p.clone()),
                GatewayOutcome::Failure(p) => outcome.failure(p.clone()),
                GatewayOutcome::Dismissed => outcome.dismissed(),
            }
        }
    }

    // ========================================================================
    // Harness
    // ========================================================================

    fn address(with_coords: bool) -> DeliveryAddress {
        DeliveryAddress {
            id: "addr-1".into(),
            address_type: AddressType::Home,
            line1: "12 Lake Rd".into(),
            line2: None,
            landmark: None,
            coordinates: with_coords.then_some(GeoPoint {
                latitude: 12.97,
                longitude: 77.59,
            }),
            is_default: true,
        }
    }

    struct Harness {
        orchestrator: CheckoutOrchestrator,
        cart: Arc<CartStore>,
        orders: Arc<FakeOrderRemote>,
        tracker: Arc<OrderLifecycleTracker>,
    }

    async fn harness(
        orders: FakeOrderRemote,
        serviceable: bool,
        outcome: GatewayOutcome,
        selected: Option<DeliveryAddress>,
    ) -> Harness {
        let events = crate::events::channel();
        let selected_address = Arc::new(RwLock::new(selected));
        let cart = Arc::new(CartStore::new(
            Arc::new(NullCartRemote),
            Arc::new(StaticTokenProvider::new(Some("t".into()))),
            selected_address.clone(),
            events.clone(),
        ));

        // Two paid lines in the cart before every attempt
        let product = Product {
            id: "p-1".into(),
            name: "Tomatoes".into(),
            image: None,
            category: "vegetables".into(),
            is_active: true,
        };
        let v1 = Variant {
            id: "v-1".into(),
            product_id: "p-1".into(),
            name: "Tomatoes 500g".into(),
            unit_price: 30.0,
            min_order_qty: 1,
            max_order_qty: None,
            available_stock: None,
            is_active: true,
        };
        let v2 = Variant {
            id: "v-2".into(),
            name: "Onions 1kg".into(),
            ..v1.clone()
        };
        cart.add_line(&product, &v1, 2).await.unwrap();
        cart.add_line(&product, &v2, 1).await.unwrap();

        let orders = Arc::new(orders);
        let tracker = Arc::new(OrderLifecycleTracker::new(orders.clone(), events.clone()));
        let orchestrator = CheckoutOrchestrator::new(
            cart.clone(),
            orders.clone(),
            Arc::new(FixedServiceability(serviceable)),
            PaymentGatewayBridge::new(Arc::new(AutoSurface(outcome))),
            tracker.clone(),
            selected_address,
            events,
            "store-1".into(),
            "razorpay".into(),
            Duration::from_secs(1),
        );

        Harness {
            orchestrator,
            cart,
            orders,
            tracker,
        }
    }

    fn cart_fingerprint(cart: &CartStore) -> Vec<(String, u32)> {
        cart.lines()
            .into_iter()
            .map(|l| (l.key().to_string(), l.quantity))
            .collect()
    }

    // ========================================================================
    // Tests
    // ========================================================================

    #[tokio::test]
    async fn test_address_missing_makes_no_network_call() {
        // Scenario C
        let h = harness(
            FakeOrderRemote::new(false),
            true,
            GatewayOutcome::Dismissed,
            None,
        )
        .await;
        let before = cart_fingerprint(&h.cart);

        let err = h.orchestrator.submit(PaymentMethod::CashOnDelivery).await.unwrap_err();

        assert!(matches!(err, EngineError::AddressMissing));
        assert_eq!(h.orchestrator.phase(), CheckoutPhase::AddressMissing);
        assert_eq!(h.orders.submits.load(Ordering::SeqCst), 0);
        assert_eq!(cart_fingerprint(&h.cart), before);
    }

    #[tokio::test]
    async fn test_cash_path_finalizes_and_clears_cart() {
        let h = harness(
            FakeOrderRemote::new(false),
            true,
            GatewayOutcome::Dismissed,
            Some(address(true)),
        )
        .await;

        let order = h.orchestrator.submit(PaymentMethod::CashOnDelivery).await.unwrap();

        assert_eq!(h.orchestrator.phase(), CheckoutPhase::Finalized);
        assert!(h.cart.is_empty());
        assert!(h.tracker.get(&order.id).is_some());
        assert_eq!(h.orders.verifies.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_submission_failure_preserves_cart() {
        let mut remote = FakeOrderRemote::new(false);
        remote.fail_submit = true;
        let h = harness(remote, true, GatewayOutcome::Dismissed, Some(address(true))).await;
        let before = cart_fingerprint(&h.cart);

        let err = h.orchestrator.submit(PaymentMethod::CashOnDelivery).await.unwrap_err();

        assert!(matches!(err, EngineError::SubmissionFailed(_)));
        assert_eq!(h.orchestrator.phase(), CheckoutPhase::Failed);
        assert_eq!(cart_fingerprint(&h.cart), before);
    }

    #[tokio::test]
    async fn test_not_serviceable_fails_before_submit() {
        let h = harness(
            FakeOrderRemote::new(false),
            false,
            GatewayOutcome::Dismissed,
            Some(address(true)),
        )
        .await;
        let before = cart_fingerprint(&h.cart);

        let err = h.orchestrator.submit(PaymentMethod::CashOnDelivery).await.unwrap_err();

        assert!(matches!(err, EngineError::NotServiceable));
        assert_eq!(h.orders.submits.load(Ordering::SeqCst), 0);
        assert_eq!(cart_fingerprint(&h.cart), before);
    }

    #[tokio::test]
    async fn test_online_success_verifies_once_and_completes() {
        let payload = PaymentCompletion(serde_json::json!({"payment_id": "pay_1"}));
        let h = harness(
            FakeOrderRemote::new(true),
            true,
            GatewayOutcome::Success(payload),
            Some(address(true)),
        )
        .await;

        let order = h.orchestrator.submit(PaymentMethod::OnlinePayment).await.unwrap();

        assert_eq!(h.orchestrator.phase(), CheckoutPhase::Completed);
        assert_eq!(h.orders.verifies.load(Ordering::SeqCst), 1);
        assert!(h.cart.is_empty());
        assert_eq!(order.status, "PAYMENT_CONFIRMED");

        let verify = h.orders.last_verify.lock().clone().unwrap();
        assert!(verify.payment_data.is_some());
        assert_eq!(verify.order_id, "ord-1");
    }

    #[tokio::test]
    async fn test_online_dismissal_verifies_once_and_preserves_cart() {
        // Scenario D
        let h = harness(
            FakeOrderRemote::new(true),
            true,
            GatewayOutcome::Dismissed,
            Some(address(true)),
        )
        .await;
        let before = cart_fingerprint(&h.cart);

        let err = h.orchestrator.submit(PaymentMethod::OnlinePayment).await.unwrap_err();

        assert!(matches!(err, EngineError::VerificationFailed(_)));
        assert_eq!(h.orchestrator.phase(), CheckoutPhase::Failed);
        assert_eq!(h.orders.verifies.load(Ordering::SeqCst), 1);
        assert_eq!(cart_fingerprint(&h.cart), before);

        // Verification was called with an absent payload
        let verify = h.orders.last_verify.lock().clone().unwrap();
        assert!(verify.payment_data.is_none());

        // Order remains tracked, unconfirmed
        assert_eq!(h.tracker.get("ord-1").unwrap().status, "PAYMENT_PENDING");
    }

    #[tokio::test]
    async fn test_gateway_failure_also_verifies_exactly_once() {
        let h = harness(
            FakeOrderRemote::new(true),
            true,
            GatewayOutcome::Failure(Some(serde_json::json!({"error": "card_declined"}))),
            Some(address(true)),
        )
        .await;

        let before = cart_fingerprint(&h.cart);
        let err = h.orchestrator.submit(PaymentMethod::OnlinePayment).await.unwrap_err();

        assert!(matches!(err, EngineError::VerificationFailed(_)));
        assert_eq!(h.orders.verifies.load(Ordering::SeqCst), 1);
        // The declined-card payload must not be passed off as payment data
        let verify = h.orders.last_verify.lock().clone().unwrap();
        assert!(verify.payment_data.is_none());
        assert_eq!(h.orchestrator.phase(), CheckoutPhase::Failed);
        assert_eq!(cart_fingerprint(&h.cart), before);
    }

    #[tokio::test]
    async fn test_cart_can_be_mutated_after_failed_attempt() {
        // Every failure must leave a re-attemptable state
        let mut remote = FakeOrderRemote::new(false);
        remote.fail_submit = true;
        let h = harness(remote, true, GatewayOutcome::Dismissed, Some(address(true))).await;

        let _ = h.orchestrator.submit(PaymentMethod::CashOnDelivery).await;
        h.cart.change_quantity("v-1", QtyDelta::Increment).await.unwrap();
        assert_eq!(h.cart.line("v-1").unwrap().quantity, 3);
    }
}
