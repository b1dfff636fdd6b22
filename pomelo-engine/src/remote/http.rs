//! Shared HTTP client for the storefront backend
//!
//! All remote gateways go through [`StorefrontHttpClient`]: bearer header
//! attachment, `ApiResponse` envelope decoding, and envelope-code
//! classification into [`RemoteError`] live here.

use crate::error::{RemoteError, RemoteResult};
use crate::token::TokenProvider;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiResponse;
use std::sync::Arc;

/// HTTP client bound to one storefront base URL
#[derive(Clone)]
pub struct StorefrontHttpClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl StorefrontHttpClient {
    pub fn new(base_url: &str, tokens: Arc<dyn TokenProvider>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn auth_header(&self) -> Option<String> {
        self.tokens.bearer_token().map(|t| format!("Bearer {}", t))
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.request(method, &url);

        if let Some(auth) = self.auth_header() {
            req = req.header(reqwest::header::AUTHORIZATION, auth);
        }
        req
    }

    /// GET with a typed data payload
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        Self::decode(resp).await
    }

    /// POST with a typed data payload
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RemoteResult<T> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::decode(resp).await
    }

    /// POST where success carries no data
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> RemoteResult<()> {
        let resp = self
            .request(reqwest::Method::POST, path)
            .json(body)
            .send()
            .await?;
        Self::decode_unit(resp).await
    }

    /// Body-less PATCH where success carries no data
    pub async fn patch_unit(&self, path: &str) -> RemoteResult<()> {
        let resp = self.request(reqwest::Method::PATCH, path).send().await?;
        Self::decode_unit(resp).await
    }

    /// DELETE where success carries no data
    pub async fn delete_unit(&self, path: &str) -> RemoteResult<()> {
        let resp = self.request(reqwest::Method::DELETE, path).send().await?;
        Self::decode_unit(resp).await
    }

    /// Decode the `ApiResponse` envelope and classify non-zero codes.
    ///
    /// Error envelopes ride on non-2xx statuses, so the body is decoded
    /// regardless of status and the envelope code is authoritative.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> RemoteResult<T> {
        let status = resp.status();
        let text = resp.text().await?;

        let envelope: ApiResponse<T> = serde_json::from_str(&text).map_err(|e| {
            RemoteError::InvalidResponse(format!("status {}: {}", status.as_u16(), e))
        })?;

        match envelope.code.unwrap_or(0) {
            0 => envelope
                .data
                .ok_or_else(|| RemoteError::InvalidResponse("missing data field".into())),
            code => Err(RemoteError::from_envelope(code, envelope.message)),
        }
    }

    /// Like [`Self::decode`] but tolerates an absent data field
    async fn decode_unit(resp: reqwest::Response) -> RemoteResult<()> {
        let status = resp.status();
        let text = resp.text().await?;

        let envelope: ApiResponse<serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| {
                RemoteError::InvalidResponse(format!("status {}: {}", status.as_u16(), e))
            })?;

        match envelope.code.unwrap_or(0) {
            0 => Ok(()),
            code => Err(RemoteError::from_envelope(code, envelope.message)),
        }
    }
}
