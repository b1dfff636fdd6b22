//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Serviceability errors
/// - 3xxx: Cart errors
/// - 4xxx: Order errors
/// - 5xxx: Payment errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Serviceability errors (2xxx)
    Serviceability,
    /// Cart errors (3xxx)
    Cart,
    /// Order errors (4xxx)
    Order,
    /// Payment errors (5xxx)
    Payment,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Serviceability,
            3000..4000 => Self::Cart,
            4000..5000 => Self::Order,
            5000..6000 => Self::Payment,
            _ => Self::System,
        }
    }

    /// Determine category from an [`ErrorCode`]
    pub fn of(code: ErrorCode) -> Self {
        Self::from_code(code.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCategory::of(ErrorCode::ValidationFailed), ErrorCategory::General);
        assert_eq!(ErrorCategory::of(ErrorCode::NotAuthenticated), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::of(ErrorCode::NotServiceable), ErrorCategory::Serviceability);
        assert_eq!(ErrorCategory::of(ErrorCode::OutOfStock), ErrorCategory::Cart);
        assert_eq!(ErrorCategory::of(ErrorCode::SubmissionFailed), ErrorCategory::Order);
        assert_eq!(ErrorCategory::of(ErrorCode::VerificationFailed), ErrorCategory::Payment);
        assert_eq!(ErrorCategory::of(ErrorCode::InternalError), ErrorCategory::System);
    }
}
