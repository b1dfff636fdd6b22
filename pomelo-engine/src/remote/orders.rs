//! Remote order gateway: submission, verification, and history

use crate::error::RemoteResult;
use crate::remote::http::StorefrontHttpClient;
use async_trait::async_trait;
use shared::models::{Order, PlaceOrderResponse, VerifyOutcome};
use shared::request::{PlaceOrderRequest, VerifyPaymentRequest};

/// Interface to the storefront order endpoints
#[async_trait]
pub trait OrderRemote: Send + Sync {
    /// Submit an order. Non-idempotent from the client's perspective:
    /// callers must never auto-retry an unacknowledged submission.
    async fn place_order(&self, req: &PlaceOrderRequest) -> RemoteResult<PlaceOrderResponse>;

    /// Verify a reported payment outcome server-side. Mandatory exactly
    /// once per terminal gateway outcome, payload or not.
    async fn verify_payment(&self, req: &VerifyPaymentRequest) -> RemoteResult<VerifyOutcome>;

    /// Recent orders, newest first
    async fn history(&self) -> RemoteResult<Vec<Order>>;

    async fn order(&self, order_id: &str) -> RemoteResult<Order>;
}

/// HTTP implementation against the storefront backend
pub struct HttpOrderRemote {
    http: StorefrontHttpClient,
}

impl HttpOrderRemote {
    pub fn new(http: StorefrontHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl OrderRemote for HttpOrderRemote {
    async fn place_order(&self, req: &PlaceOrderRequest) -> RemoteResult<PlaceOrderResponse> {
        self.http.post("/api/orders", req).await
    }

    async fn verify_payment(&self, req: &VerifyPaymentRequest) -> RemoteResult<VerifyOutcome> {
        self.http.post("/api/payments/verify", req).await
    }

    async fn history(&self) -> RemoteResult<Vec<Order>> {
        self.http.get("/api/orders/history").await
    }

    async fn order(&self, order_id: &str) -> RemoteResult<Order> {
        self.http.get(&format!("/api/orders/{}", order_id)).await
    }
}
