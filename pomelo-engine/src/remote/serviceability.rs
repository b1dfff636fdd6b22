//! Serviceability gateway
//!
//! Gates both add-to-cart and checkout. Checks carry a caller-imposed
//! timeout; on expiry the location is treated as not serviceable
//! (failed-safe) rather than hanging the flow.

use crate::error::RemoteResult;
use crate::remote::http::StorefrontHttpClient;
use async_trait::async_trait;
use shared::models::{GeoPoint, ServiceabilityResult};
use shared::request::ServiceabilityRequest;
use std::time::Duration;

/// Interface to the delivery-zone check
#[async_trait]
pub trait ServiceabilityRemote: Send + Sync {
    async fn check(&self, point: GeoPoint) -> RemoteResult<ServiceabilityResult>;
}

/// HTTP implementation against the storefront backend
pub struct HttpServiceabilityRemote {
    http: StorefrontHttpClient,
}

impl HttpServiceabilityRemote {
    pub fn new(http: StorefrontHttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ServiceabilityRemote for HttpServiceabilityRemote {
    async fn check(&self, point: GeoPoint) -> RemoteResult<ServiceabilityResult> {
        let req = ServiceabilityRequest {
            latitude: point.latitude,
            longitude: point.longitude,
        };
        self.http.post("/api/service-area/check", &req).await
    }
}

/// Run a serviceability check with the failed-safe timeout applied.
///
/// Timeout, transport failure, and an explicit "not available" answer all
/// collapse to `false` — the flow must never proceed on an unconfirmed zone.
pub async fn check_with_timeout(
    remote: &dyn ServiceabilityRemote,
    point: GeoPoint,
    timeout: Duration,
) -> bool {
    match tokio::time::timeout(timeout, remote.check(point)).await {
        Ok(Ok(result)) => result.available,
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Serviceability check failed, assuming not serviceable");
            false
        }
        Err(_) => {
            tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Serviceability check timed out, assuming not serviceable"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;

    struct SlowRemote;

    #[async_trait]
    impl ServiceabilityRemote for SlowRemote {
        async fn check(&self, _point: GeoPoint) -> RemoteResult<ServiceabilityResult> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ServiceabilityResult {
                available: true,
                estimated_delivery_minutes: None,
            })
        }
    }

    struct FailingRemote;

    #[async_trait]
    impl ServiceabilityRemote for FailingRemote {
        async fn check(&self, _point: GeoPoint) -> RemoteResult<ServiceabilityResult> {
            Err(RemoteError::InvalidResponse("boom".into()))
        }
    }

    fn point() -> GeoPoint {
        GeoPoint {
            latitude: 12.97,
            longitude: 77.59,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_failed_safe() {
        let available =
            check_with_timeout(&SlowRemote, point(), Duration::from_millis(100)).await;
        assert!(!available);
    }

    #[tokio::test]
    async fn test_remote_error_is_failed_safe() {
        let available =
            check_with_timeout(&FailingRemote, point(), Duration::from_secs(1)).await;
        assert!(!available);
    }
}
