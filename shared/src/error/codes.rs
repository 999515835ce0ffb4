//! Unified error codes for the Reef concierge
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Cart / upstream commerce errors
//! - 2xxx: Bridge / origin errors
//! - 3xxx: Catalog errors
//! - 4xxx: Throttling errors
//! - 9xxx: System errors

use http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (the bridge script consumes them too).
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
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 1xxx: Cart ====================
    /// Variant reference has no extractable numeric id
    InvalidVariantRef = 1001,
    /// Upstream commerce backend unreachable or 5xx
    UpstreamUnavailable = 1002,
    /// Upstream rejected the mutation (e.g. sold out)
    UpstreamRejected = 1003,

    // ==================== 2xxx: Bridge ====================
    /// Message origin is not on the allow-list
    UnauthorizedOrigin = 2001,

    // ==================== 3xxx: Catalog ====================
    /// Catalog source failed and no snapshot exists to serve
    CatalogUnavailable = 3001,

    // ==================== 4xxx: Throttle ====================
    /// Caller exceeded the request window
    RateLimited = 4001,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default human-readable message for this code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "OK",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::InvalidVariantRef => "Variant reference is not valid",
            Self::UpstreamUnavailable => "Commerce backend is unavailable",
            Self::UpstreamRejected => "Commerce backend rejected the request",
            Self::UnauthorizedOrigin => "Message origin is not allowed",
            Self::CatalogUnavailable => "Product catalog is unavailable",
            Self::RateLimited => "Too many requests",
            Self::InternalError => "Internal server error",
        }
    }

    /// Get the HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::InvalidVariantRef => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
            Self::UpstreamRejected => StatusCode::UNPROCESSABLE_ENTITY,
            Self::UnauthorizedOrigin => StatusCode::FORBIDDEN,
            Self::CatalogUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

impl TryFrom<u16> for ErrorCode {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),
            1001 => Ok(Self::InvalidVariantRef),
            1002 => Ok(Self::UpstreamUnavailable),
            1003 => Ok(Self::UpstreamRejected),
            2001 => Ok(Self::UnauthorizedOrigin),
            3001 => Ok(Self::CatalogUnavailable),
            4001 => Ok(Self::RateLimited),
            9001 => Ok(Self::InternalError),
            _ => Err(format!("unknown error code: {}", value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.message(), self.code())
    }
}
