//! Shared types for the Pomelo grocery-ordering client
//!
//! This crate holds the domain models, the unified error system, and the
//! wire envelope/request shapes used by both the transaction engine and
//! the mock storefront backend.

pub mod error;
pub mod models;
pub mod request;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
