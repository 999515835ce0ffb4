//! Bridge Session Models
//!
//! State held by the host-page bridge and mirrored into the iframe via
//! `INIT_SESSION` / `SESSION_UPDATE` messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Widget visibility state
///
/// Transitions are driven by `expand` / `minimize` messages from the
/// iframe: `Hidden → Minimized → Expanded → Minimized → …`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetVisibility {
    Hidden,
    Minimized,
    Expanded,
}

/// Session state owned by the host-page bridge
///
/// Created when the bridge boots, destroyed on page unload. The bridge is
/// the only component that reads host-page cookies directly; `cart_token`
/// is whatever the cart-identity cookie last held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSession {
    pub visibility: WidgetVisibility,
    pub cart_token: Option<String>,
    pub shop_domain: Option<String>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl BridgeSession {
    pub fn new(shop_domain: Option<String>) -> Self {
        Self {
            visibility: WidgetVisibility::Hidden,
            cart_token: None,
            shop_domain,
            last_synced_at: None,
        }
    }

    /// Convert the full session into a patch carrying every field, for
    /// `REQUEST_SESSION` replies.
    pub fn as_patch(&self) -> SessionPatch {
        SessionPatch {
            visibility: Some(self.visibility),
            cart_token: self.cart_token.clone(),
            shop_domain: self.shop_domain.clone(),
            last_synced_at: self.last_synced_at,
        }
    }
}

impl Default for BridgeSession {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Partial session update, merged last-write-wins per field.
///
/// No ordering is guaranteed across the message channel beyond delivery
/// order, so patches must be idempotent merges, never deltas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<WidgetVisibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cart_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_domain: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl BridgeSession {
    /// Apply a patch, keeping existing values for absent fields
    pub fn apply(&mut self, patch: &SessionPatch) {
        if let Some(v) = patch.visibility {
            self.visibility = v;
        }
        if let Some(token) = &patch.cart_token {
            self.cart_token = Some(token.clone());
        }
        if let Some(domain) = &patch.shop_domain {
            self.shop_domain = Some(domain.clone());
        }
        if let Some(ts) = patch.last_synced_at {
            self.last_synced_at = Some(ts);
        }
    }
}
