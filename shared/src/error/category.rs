//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Cart errors
/// - 2xxx: Bridge errors
/// - 3xxx: Catalog errors
/// - 4xxx: Throttling errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Cart / upstream commerce errors (1xxx)
    Cart,
    /// Bridge / origin errors (2xxx)
    Bridge,
    /// Catalog errors (3xxx)
    Catalog,
    /// Throttling errors (4xxx)
    Throttle,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Cart,
            2000..3000 => Self::Bridge,
            3000..4000 => Self::Catalog,
            4000..5000 => Self::Throttle,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Cart => "cart",
            Self::Bridge => "bridge",
            Self::Catalog => "catalog",
            Self::Throttle => "throttle",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
