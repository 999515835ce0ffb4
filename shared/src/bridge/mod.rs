//! Bridge message protocol
//!
//! The closed set of messages exchanged between the host page and the
//! widget iframe over the postMessage channel. Every message carries an
//! explicit `type` discriminator; anything outside this enum is ignored
//! by receivers rather than treated as an error.

use crate::models::cart::{CartSummary, VariantRef};
use crate::models::session::{BridgeSession, SessionPatch};
use serde::{Deserialize, Serialize};

/// Protocol version
///
/// Bumped whenever a message shape changes incompatibly; both sides log a
/// warning on mismatch during `INIT_SESSION`.
pub const PROTOCOL_VERSION: u16 = 1;

/// Messages crossing the host-page / iframe boundary
///
/// Wire names follow the historical protocol: geometry messages are
/// lowercase, session and cart messages are upper snake case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BridgeMessage {
    /// iframe → host: widget opened, grow the iframe
    #[serde(rename = "expand")]
    Expand,
    /// iframe → host: widget closed, shrink the iframe
    #[serde(rename = "minimize")]
    Minimize,
    /// iframe → host: ask for the current session snapshot
    #[serde(rename = "REQUEST_SESSION")]
    RequestSession,
    /// iframe → host: add a variant to the shopper's cart
    #[serde(rename = "ADD_TO_CART")]
    AddToCart { variant_ref: VariantRef, quantity: u32 },
    /// host → iframe: session bootstrap on bridge startup
    #[serde(rename = "INIT_SESSION")]
    InitSession {
        version: u16,
        session: BridgeSession,
    },
    /// host ↔ iframe: partial session fields, merged last-write-wins
    #[serde(rename = "SESSION_UPDATE")]
    SessionUpdate { patch: SessionPatch },
    /// host → iframe: cart changed, update any cart-count UI
    #[serde(rename = "CART_UPDATE")]
    CartUpdate { summary: CartSummary },
    /// host → iframe: the requested add succeeded
    #[serde(rename = "ADD_TO_CART_SUCCESS")]
    AddToCartSuccess { summary: CartSummary },
    /// host → iframe: the requested add failed
    #[serde(rename = "ADD_TO_CART_ERROR")]
    AddToCartError { message: String },
}

impl BridgeMessage {
    /// Decode a raw message body.
    ///
    /// Returns `None` for malformed JSON and for `type` values outside the
    /// protocol enum; callers drop those silently.
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// Encode for the wire
    pub fn encode(&self) -> String {
        serde_json::to_string(self).expect("bridge message serializes")
    }

    /// Wire name of the `type` discriminator, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Expand => "expand",
            Self::Minimize => "minimize",
            Self::RequestSession => "REQUEST_SESSION",
            Self::AddToCart { .. } => "ADD_TO_CART",
            Self::InitSession { .. } => "INIT_SESSION",
            Self::SessionUpdate { .. } => "SESSION_UPDATE",
            Self::CartUpdate { .. } => "CART_UPDATE",
            Self::AddToCartSuccess { .. } => "ADD_TO_CART_SUCCESS",
            Self::AddToCartError { .. } => "ADD_TO_CART_ERROR",
        }
    }
}
