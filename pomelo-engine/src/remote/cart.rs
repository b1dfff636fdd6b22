//! Remote cart gateway
//!
//! The authoritative server cart. Mutations are single-step and
//! line-scoped; none accept a target quantity, which is why the cart
//! store computes deltas rather than absolutes.

use crate::error::RemoteResult;
use crate::remote::http::StorefrontHttpClient;
use async_trait::async_trait;
use serde::Deserialize;
use shared::models::CartSnapshot;
use shared::request::AddCartItemRequest;

/// Interface to the authoritative server cart
#[async_trait]
pub trait CartRemote: Send + Sync {
    /// Fetch the current server cart; `None` when the server has no cart.
    /// Idempotent, safe to poll on every screen focus.
    async fn fetch(&self) -> RemoteResult<Option<CartSnapshot>>;

    /// Add a variant; returns the server-assigned line id
    async fn add(
        &self,
        variant_id: &str,
        quantity: u32,
        address_id: Option<&str>,
    ) -> RemoteResult<String>;

    async fn increment(&self, line_id: &str) -> RemoteResult<()>;

    async fn decrement(&self, line_id: &str) -> RemoteResult<()>;

    async fn remove(&self, line_id: &str) -> RemoteResult<()>;
}

/// HTTP implementation against the storefront backend
pub struct HttpCartRemote {
    http: StorefrontHttpClient,
}

impl HttpCartRemote {
    pub fn new(http: StorefrontHttpClient) -> Self {
        Self { http }
    }
}

#[derive(Debug, Deserialize)]
struct AddLineResponse {
    line_id: String,
}

#[async_trait]
impl CartRemote for HttpCartRemote {
    async fn fetch(&self) -> RemoteResult<Option<CartSnapshot>> {
        let snapshot: CartSnapshot = self.http.get("/api/cart").await?;
        // The server answers an empty envelope cart rather than a 404
        if snapshot.is_effectively_empty() && snapshot.lines.is_empty() {
            return Ok(None);
        }
        Ok(Some(snapshot))
    }

    async fn add(
        &self,
        variant_id: &str,
        quantity: u32,
        address_id: Option<&str>,
    ) -> RemoteResult<String> {
        let req = AddCartItemRequest {
            variant_id: variant_id.to_string(),
            quantity,
            address_id: address_id.map(str::to_string),
        };
        let resp: AddLineResponse = self.http.post("/api/cart/add", &req).await?;
        Ok(resp.line_id)
    }

    async fn increment(&self, line_id: &str) -> RemoteResult<()> {
        self.http
            .patch_unit(&format!("/api/cart/item/{}/increment", line_id))
            .await
    }

    async fn decrement(&self, line_id: &str) -> RemoteResult<()> {
        self.http
            .patch_unit(&format!("/api/cart/item/{}/decrement", line_id))
            .await
    }

    async fn remove(&self, line_id: &str) -> RemoteResult<()> {
        self.http
            .delete_unit(&format!("/api/cart/item/{}", line_id))
            .await
    }
}
