//! Unified error system for the Reef concierge
//!
//! This module provides the error handling surface shared by the gateway
//! and the bridge:
//! - [`ErrorCode`]: standardized error codes for all error types
//! - [`ErrorCategory`]: classification of errors by domain
//! - [`AppError`]: rich error type with codes, messages, and details
//! - [`ApiResponse`]: unified API response format
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Cart / upstream commerce errors
//! - 2xxx: Bridge / origin errors
//! - 3xxx: Catalog errors
//! - 4xxx: Throttling errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! // Create a simple error
//! let err = AppError::new(ErrorCode::CatalogUnavailable);
//!
//! // Create an error with custom message and details
//! let err = AppError::invalid_variant("gid://shopify/Product/none")
//!     .with_detail("quantity", 2);
//!
//! // Convert to API response
//! let response = ApiResponse::<()>::error(&err);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::ErrorCode;
pub use types::{ApiResponse, AppError, AppResult};
