//! Engine error types
//!
//! Two layers, like the remote side: [`RemoteError`] classifies transport
//! and envelope failures on gateway calls; [`EngineError`] is what engine
//! operations return to the host, with a stable [`ErrorCode`] mapping.

use shared::ErrorCode;
use thiserror::Error;

/// Failure of a remote storefront call
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Transport-level failure (connection, timeout, TLS)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Body was not a well-formed `ApiResponse` envelope
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Envelope carried the not-authenticated code
    #[error("Authentication required")]
    NotAuthenticated,

    /// Envelope carried the not-serviceable code
    #[error("Location is not serviceable")]
    NotServiceable,

    /// Any other non-zero envelope code
    #[error("API error {code}: {message}")]
    Api { code: u16, message: String },
}

impl RemoteError {
    /// Classify a non-zero envelope code into the matching variant
    pub fn from_envelope(code: u16, message: String) -> Self {
        match ErrorCode::try_from(code) {
            Ok(ErrorCode::NotAuthenticated)
            | Ok(ErrorCode::TokenExpired)
            | Ok(ErrorCode::TokenInvalid) => Self::NotAuthenticated,
            Ok(ErrorCode::NotServiceable) => Self::NotServiceable,
            _ => Self::Api { code, message },
        }
    }

    /// The envelope code, when this error originated from one
    pub fn envelope_code(&self) -> Option<u16> {
        match self {
            Self::Api { code, .. } => Some(*code),
            Self::NotAuthenticated => Some(ErrorCode::NotAuthenticated.code()),
            Self::NotServiceable => Some(ErrorCode::NotServiceable.code()),
            _ => None,
        }
    }
}

/// Result type for remote gateway calls
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error type returned by engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    // ========== Cart ==========
    #[error("Out of stock: {name}")]
    OutOfStock { name: String },

    #[error("Order quantity limit reached for {name}")]
    OrderLimitExceeded { name: String },

    #[error("Free products cannot be modified")]
    FreeProductImmutable,

    #[error("Cart line not found: {0}")]
    LineNotFound(String),

    #[error("Cart is empty")]
    CartEmpty,

    /// Remote mutation failed after the optimistic local change; the local
    /// change was reverted
    #[error("Cart update failed: {0}")]
    CartSyncFailed(#[source] RemoteError),

    // ========== Checkout ==========
    #[error("No delivery address selected")]
    AddressMissing,

    #[error("Delivery is not available at this location")]
    NotServiceable,

    #[error("Order could not be placed: {0}")]
    SubmissionFailed(String),

    #[error("Payment could not be verified: {0}")]
    VerificationFailed(String),

    // ========== Orders ==========
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Only delivered orders can be reordered")]
    ReorderNotEligible,

    // ========== Ambient ==========
    #[error("Authentication required")]
    NotAuthenticated,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Cache error: {0}")]
    Cache(String),
}

impl EngineError {
    /// Stable error code for surfacing to the host UI
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfStock { .. } => ErrorCode::OutOfStock,
            Self::OrderLimitExceeded { .. } => ErrorCode::OrderLimitExceeded,
            Self::FreeProductImmutable => ErrorCode::FreeProductImmutable,
            Self::LineNotFound(_) => ErrorCode::LineNotFound,
            Self::CartEmpty => ErrorCode::CartEmpty,
            Self::CartSyncFailed(_) => ErrorCode::CartSyncFailed,
            Self::AddressMissing => ErrorCode::AddressMissing,
            Self::NotServiceable => ErrorCode::NotServiceable,
            Self::SubmissionFailed(_) => ErrorCode::SubmissionFailed,
            Self::VerificationFailed(_) => ErrorCode::VerificationFailed,
            Self::OrderNotFound(_) => ErrorCode::OrderNotFound,
            Self::ReorderNotEligible => ErrorCode::ReorderNotEligible,
            Self::NotAuthenticated => ErrorCode::NotAuthenticated,
            Self::Remote(RemoteError::NotAuthenticated) => ErrorCode::NotAuthenticated,
            Self::Remote(RemoteError::NotServiceable) => ErrorCode::NotServiceable,
            Self::Remote(_) => ErrorCode::RemoteUnavailable,
            Self::Cache(_) => ErrorCode::CacheError,
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_classification() {
        assert!(matches!(
            RemoteError::from_envelope(1001, "auth".into()),
            RemoteError::NotAuthenticated
        ));
        assert!(matches!(
            RemoteError::from_envelope(2001, "zone".into()),
            RemoteError::NotServiceable
        ));
        assert!(matches!(
            RemoteError::from_envelope(3001, "stock".into()),
            RemoteError::Api { code: 3001, .. }
        ));
    }

    #[test]
    fn test_engine_error_codes() {
        let err = EngineError::OutOfStock { name: "Tomatoes".into() };
        assert_eq!(err.code(), ErrorCode::OutOfStock);
        assert_eq!(EngineError::AddressMissing.code(), ErrorCode::AddressMissing);
        assert_eq!(
            EngineError::Remote(RemoteError::NotAuthenticated).code(),
            ErrorCode::NotAuthenticated
        );
    }
}
