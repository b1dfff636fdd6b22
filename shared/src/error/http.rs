//! HTTP status mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the HTTP status code this error maps to on the wire
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,

            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::InvalidFormat
            | Self::RequiredField
            | Self::ValueOutOfRange => StatusCode::BAD_REQUEST,

            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            Self::NotFound | Self::LineNotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists => StatusCode::CONFLICT,

            Self::NotServiceable
            | Self::LocationUnavailable
            | Self::OutOfStock
            | Self::OrderLimitExceeded
            | Self::CartEmpty
            | Self::FreeProductImmutable
            | Self::CartSyncFailed
            | Self::SubmissionFailed
            | Self::ReorderNotEligible
            | Self::AddressMissing
            | Self::PaymentFailed
            | Self::VerificationFailed
            | Self::GatewayDismissed
            | Self::PaymentSessionMissing => StatusCode::UNPROCESSABLE_ENTITY,

            Self::ServiceabilityTimeout | Self::Timeout => StatusCode::GATEWAY_TIMEOUT,

            Self::RemoteUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            Self::Unknown | Self::InternalError | Self::CacheError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
