//! Shared types for the Reef storefront concierge.
//!
//! Everything that crosses a process boundary lives here so the gateway
//! and the host-page bridge agree on wire shapes:
//!
//! - **Errors** (`error`): unified error codes, [`AppError`] and the
//!   [`ApiResponse`] envelope used by the gateway HTTP API
//! - **Models** (`models`): catalog entries and snapshots, canonical cart
//!   state, bridge session state
//! - **Bridge protocol** (`bridge`): the closed, versioned message enum
//!   exchanged between host page and widget iframe

pub mod bridge;
pub mod error;
pub mod models;

pub use bridge::{BridgeMessage, PROTOCOL_VERSION};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::cart::{CartLine, CartState, CartSummary, SessionCookies, VariantRef};
pub use models::catalog::{CatalogEntry, CatalogSnapshot, CollectionRef, ScoredEntry};
pub use models::session::{BridgeSession, SessionPatch, WidgetVisibility};
