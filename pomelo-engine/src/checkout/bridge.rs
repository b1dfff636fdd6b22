//! Payment gateway bridge
//!
//! Hosts a third-party, amount/order-bound checkout script inside an
//! isolated web surface (behind [`GatewaySurface`]) and translates its
//! postMessage-style callbacks into exactly one [`GatewayOutcome`].
//!
//! The bridge copies the amount and gateway order id verbatim from the
//! payment session into the hosted script's options, and never interprets
//! payment payloads: they pass through opaquely to verification. There is
//! no engine-imposed timeout on the surface — forcibly expiring an
//! in-progress payment risks funds-captured/order-not-recorded divergence;
//! the interaction is bounded only by user dismissal or the script's own
//! lifecycle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::{GatewayData, PaymentCompletion};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// Transient per-checkout-attempt payment binding.
///
/// Exists only between order creation and verification; discarded after
/// verification succeeds, fails, or the user dismisses the gateway UI.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    pub order_id: String,
    pub gateway_order_id: String,
    /// Charge amount in minor currency units
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

impl PaymentSession {
    pub fn new(order_id: impl Into<String>, gateway: &GatewayData) -> Self {
        Self {
            order_id: order_id.into(),
            gateway_order_id: gateway.gateway_order_id.clone(),
            amount: gateway.amount,
            currency: gateway.currency.clone(),
            key_id: gateway.key_id.clone(),
        }
    }
}

/// Options handed to the hosted checkout script.
///
/// `amount` and `gateway_order_id` must match the payment session exactly;
/// a mismatch binds the hosted UI to the wrong charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOptions {
    pub key_id: String,
    pub gateway_order_id: String,
    pub amount: i64,
    pub currency: String,
    /// Cosmetic: shown in the hosted UI header
    pub description: String,
}

/// Terminal outcome of one gateway interaction
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayOutcome {
    /// Script reported success; payload is opaque to the engine
    Success(PaymentCompletion),
    /// Script reported an explicit failure
    Failure(Option<Value>),
    /// User closed the surface without completing payment
    Dismissed,
}

/// Single-resolution handle given to the surface.
///
/// The first call to [`success`](Self::success), [`failure`](Self::failure)
/// or [`dismissed`](Self::dismissed) wins; every later message from the
/// same surface is a no-op.
#[derive(Clone)]
pub struct OutcomeHandle {
    tx: Arc<Mutex<Option<oneshot::Sender<GatewayOutcome>>>>,
}

impl OutcomeHandle {
    fn new(tx: oneshot::Sender<GatewayOutcome>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub fn success(&self, payload: PaymentCompletion) {
        self.resolve(GatewayOutcome::Success(payload));
    }

    pub fn failure(&self, payload: Option<Value>) {
        self.resolve(GatewayOutcome::Failure(payload));
    }

    pub fn dismissed(&self) {
        self.resolve(GatewayOutcome::Dismissed);
    }

    fn resolve(&self, outcome: GatewayOutcome) {
        let sender = self.tx.lock().ok().and_then(|mut guard| guard.take());
        match sender {
            Some(tx) => {
                let _ = tx.send(outcome);
            }
            None => {
                tracing::debug!("Gateway outcome already resolved, ignoring message");
            }
        }
    }
}

/// The isolated web surface that renders the hosted checkout script
#[async_trait]
pub trait GatewaySurface: Send + Sync {
    /// Present the hosted script with the given options. Resolution happens
    /// through the handle, possibly after this call returns.
    async fn present(&self, options: GatewayOptions, outcome: OutcomeHandle);
}

/// Bridge between the checkout orchestrator and the gateway surface
pub struct PaymentGatewayBridge {
    surface: Arc<dyn GatewaySurface>,
}

impl PaymentGatewayBridge {
    pub fn new(surface: Arc<dyn GatewaySurface>) -> Self {
        Self { surface }
    }

    /// Run one gateway interaction to its terminal outcome.
    ///
    /// A surface that tears down without ever resolving counts as a
    /// dismissal: the user-visible effect is identical.
    pub async fn present(&self, session: &PaymentSession, description: &str) -> GatewayOutcome {
        let options = GatewayOptions {
            key_id: session.key_id.clone(),
            gateway_order_id: session.gateway_order_id.clone(),
            amount: session.amount,
            currency: session.currency.clone(),
            description: description.to_string(),
        };

        let (tx, rx) = oneshot::channel();
        let handle = OutcomeHandle::new(tx);

        tracing::info!(
            gateway_order_id = %options.gateway_order_id,
            amount = options.amount,
            "Presenting payment gateway"
        );
        self.surface.present(options, handle).await;

        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => GatewayOutcome::Dismissed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as PlMutex;

    /// Surface that records the options it was given and resolves per script
    struct ScriptedSurface {
        seen: PlMutex<Option<GatewayOptions>>,
        script: fn(&OutcomeHandle),
    }

    impl ScriptedSurface {
        fn new(script: fn(&OutcomeHandle)) -> Self {
            Self {
                seen: PlMutex::new(None),
                script,
            }
        }
    }

    #[async_trait]
    impl GatewaySurface for ScriptedSurface {
        async fn present(&self, options: GatewayOptions, outcome: OutcomeHandle) {
            *self.seen.lock() = Some(options);
            (self.script)(&outcome);
        }
    }

    fn session() -> PaymentSession {
        PaymentSession {
            order_id: "ord-1".into(),
            gateway_order_id: "gw-ord-77".into(),
            amount: 12_350,
            currency: "INR".into(),
            key_id: "rzp_test_key".into(),
        }
    }

    fn completion() -> PaymentCompletion {
        PaymentCompletion(serde_json::json!({"payment_id": "pay_123", "signature": "sig"}))
    }

    #[tokio::test]
    async fn test_options_match_session_exactly() {
        let surface = Arc::new(ScriptedSurface::new(|h| {
            h.success(PaymentCompletion(serde_json::json!({})))
        }));
        let bridge = PaymentGatewayBridge::new(surface.clone());
        let session = session();

        bridge.present(&session, "Pomelo order").await;

        let seen = surface.seen.lock().clone().unwrap();
        assert_eq!(seen.amount, session.amount);
        assert_eq!(seen.gateway_order_id, session.gateway_order_id);
        assert_eq!(seen.key_id, session.key_id);
        assert_eq!(seen.currency, session.currency);
    }

    #[tokio::test]
    async fn test_first_outcome_wins() {
        let surface = Arc::new(ScriptedSurface::new(|h| {
            h.dismissed();
            // Late messages from the same surface are ignored
            h.success(PaymentCompletion(serde_json::json!({"late": true})));
            h.failure(None);
        }));
        let bridge = PaymentGatewayBridge::new(surface);

        let outcome = bridge.present(&session(), "Pomelo order").await;
        assert_eq!(outcome, GatewayOutcome::Dismissed);
    }

    #[tokio::test]
    async fn test_success_payload_passes_through_opaquely() {
        let surface = Arc::new(ScriptedSurface::new(|h| {
            h.success(PaymentCompletion(serde_json::json!({
                "payment_id": "pay_123",
                "signature": "sig"
            })))
        }));
        let bridge = PaymentGatewayBridge::new(surface);

        let outcome = bridge.present(&session(), "Pomelo order").await;
        assert_eq!(outcome, GatewayOutcome::Success(completion()));
    }

    #[tokio::test]
    async fn test_torn_down_surface_counts_as_dismissal() {
        struct SilentSurface;

        #[async_trait]
        impl GatewaySurface for SilentSurface {
            async fn present(&self, _options: GatewayOptions, outcome: OutcomeHandle) {
                drop(outcome);
            }
        }

        let bridge = PaymentGatewayBridge::new(Arc::new(SilentSurface));
        let outcome = bridge.present(&session(), "Pomelo order").await;
        assert_eq!(outcome, GatewayOutcome::Dismissed);
    }
}
