//! Unified error codes for the Pomelo ordering client
//!
//! This module defines all error codes used across the engine, the host UI,
//! and the storefront backend. Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Serviceability errors
//! - 3xxx: Cart errors
//! - 4xxx: Order errors
//! - 5xxx: Payment errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// Caller holds no bearer credential
    NotAuthenticated = 1001,
    /// Invalid credentials
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,

    // ==================== 2xxx: Serviceability ====================
    /// Location is outside every active delivery zone
    NotServiceable = 2001,
    /// Serviceability check did not answer within the caller-imposed timeout
    ServiceabilityTimeout = 2002,
    /// No usable coordinates for the selected address
    LocationUnavailable = 2003,

    // ==================== 3xxx: Cart ====================
    /// Variant has no available stock (or the increment would exceed it)
    OutOfStock = 3001,
    /// Increment would exceed the per-order quantity limit
    OrderLimitExceeded = 3002,
    /// Cart line not found
    LineNotFound = 3003,
    /// Cart has no purchasable lines
    CartEmpty = 3004,
    /// Promotional free-product lines are not quantity-editable
    FreeProductImmutable = 3005,
    /// Remote cart mutation failed; local change was reverted
    CartSyncFailed = 3006,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order creation was rejected or the submission never got an answer
    SubmissionFailed = 4002,
    /// Reorder requested for an order that is not delivered
    ReorderNotEligible = 4003,
    /// Checkout attempted with no selected delivery address
    AddressMissing = 4004,

    // ==================== 5xxx: Payment ====================
    /// Hosted gateway reported a failed payment
    PaymentFailed = 5001,
    /// Server-side verification rejected or errored
    VerificationFailed = 5002,
    /// User dismissed the hosted gateway surface
    GatewayDismissed = 5003,
    /// No payment session exists for this checkout attempt
    PaymentSessionMissing = 5004,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Remote storefront unavailable (network / transport failure)
    RemoteUnavailable = 9002,
    /// Operation timed out
    Timeout = 9003,
    /// Persisted cache could not be read or written
    CacheError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::AlreadyExists => "Resource already exists",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidFormat => "Invalid format",
            Self::RequiredField => "Required field missing",
            Self::ValueOutOfRange => "Value out of range",

            Self::NotAuthenticated => "Not authenticated",
            Self::InvalidCredentials => "Invalid credentials",
            Self::TokenExpired => "Token expired",
            Self::TokenInvalid => "Token invalid",

            Self::NotServiceable => "Delivery is not available at this location",
            Self::ServiceabilityTimeout => "Serviceability check timed out",
            Self::LocationUnavailable => "Location unavailable",

            Self::OutOfStock => "Out of stock",
            Self::OrderLimitExceeded => "Order quantity limit reached",
            Self::LineNotFound => "Cart item not found",
            Self::CartEmpty => "Cart is empty",
            Self::FreeProductImmutable => "Free products cannot be modified",
            Self::CartSyncFailed => "Cart update failed",

            Self::OrderNotFound => "Order not found",
            Self::SubmissionFailed => "Order could not be placed",
            Self::ReorderNotEligible => "Only delivered orders can be reordered",
            Self::AddressMissing => "Please select a delivery address",

            Self::PaymentFailed => "Payment failed",
            Self::VerificationFailed => "Payment could not be verified",
            Self::GatewayDismissed => "Payment was cancelled",
            Self::PaymentSessionMissing => "No payment in progress",

            Self::InternalError => "Internal error",
            Self::RemoteUnavailable => "Service unavailable",
            Self::Timeout => "Operation timed out",
            Self::CacheError => "Cache error",
        }
    }

    /// Classify this code into its domain category
    pub fn category(&self) -> super::category::ErrorCategory {
        super::category::ErrorCategory::from_code(self.code())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 does not map to a known [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            6 => Self::InvalidFormat,
            7 => Self::RequiredField,
            8 => Self::ValueOutOfRange,

            1001 => Self::NotAuthenticated,
            1002 => Self::InvalidCredentials,
            1003 => Self::TokenExpired,
            1004 => Self::TokenInvalid,

            2001 => Self::NotServiceable,
            2002 => Self::ServiceabilityTimeout,
            2003 => Self::LocationUnavailable,

            3001 => Self::OutOfStock,
            3002 => Self::OrderLimitExceeded,
            3003 => Self::LineNotFound,
            3004 => Self::CartEmpty,
            3005 => Self::FreeProductImmutable,
            3006 => Self::CartSyncFailed,

            4001 => Self::OrderNotFound,
            4002 => Self::SubmissionFailed,
            4003 => Self::ReorderNotEligible,
            4004 => Self::AddressMissing,

            5001 => Self::PaymentFailed,
            5002 => Self::VerificationFailed,
            5003 => Self::GatewayDismissed,
            5004 => Self::PaymentSessionMissing,

            9001 => Self::InternalError,
            9002 => Self::RemoteUnavailable,
            9003 => Self::Timeout,
            9004 => Self::CacheError,

            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_through_u16() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::NotAuthenticated,
            ErrorCode::NotServiceable,
            ErrorCode::OutOfStock,
            ErrorCode::SubmissionFailed,
            ErrorCode::VerificationFailed,
            ErrorCode::RemoteUnavailable,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(ErrorCode::try_from(8765), Err(InvalidErrorCode(8765)));
    }

    #[test]
    fn test_display_format() {
        assert_eq!(ErrorCode::OutOfStock.to_string(), "E3001");
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
    }
}
