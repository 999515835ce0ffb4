//! Cart Models
//!
//! Canonical cart state as exposed by the gateway. Whatever shape the
//! upstream backend answers in, callers only ever see these types. Cart
//! state is a mirror of upstream truth, never computed locally.

use serde::{Deserialize, Serialize};

/// A purchasable variant reference as received from callers.
///
/// Observed in two shapes: a raw numeric id (`"12345"`) or a compound
/// resource identifier embedding the numeric id as its last path segment
/// (`"gid://shopify/ProductVariant/12345"`). The upstream REST endpoint
/// only accepts the numeric form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantRef(pub String);

impl VariantRef {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Extract the numeric variant id, if one is present.
    ///
    /// Normalization is idempotent: a bare numeric id parses to itself.
    pub fn numeric_id(&self) -> Option<u64> {
        let raw = self.0.trim();
        let candidate = match raw.rsplit_once('/') {
            Some((_, tail)) => tail,
            None => raw,
        };
        candidate.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VariantRef {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for VariantRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One (variant, quantity) pair within a cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Normalized numeric variant id
    pub variant_id: u64,
    pub quantity: u32,
    /// Unit price in minor units (øre, cents)
    pub unit_price_minor_units: i64,
    pub title: String,
}

/// Canonical cart state
///
/// A cached mirror of the upstream backend's cart; always re-fetched or
/// reconciled after a mutation, since the upstream may reject, merge, or
/// coalesce lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartState {
    /// Upstream cart identity (REST token or GraphQL cart id)
    pub cart_id: String,
    pub lines: Vec<CartLine>,
    pub total_quantity: u32,
    pub checkout_url: String,
    pub currency: String,
}

impl CartState {
    /// An empty cart with no upstream identity yet
    pub fn empty(currency: impl Into<String>, checkout_url: impl Into<String>) -> Self {
        Self {
            cart_id: String::new(),
            lines: Vec::new(),
            total_quantity: 0,
            checkout_url: checkout_url.into(),
            currency: currency.into(),
        }
    }

    /// Total cart value in minor units
    pub fn total_minor_units(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| l.unit_price_minor_units * l.quantity as i64)
            .sum()
    }
}

/// Badge-count projection of a cart, small enough to broadcast freely
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub total_quantity: u32,
    pub total_minor_units: i64,
    pub currency: String,
    pub checkout_url: String,
}

impl From<&CartState> for CartSummary {
    fn from(state: &CartState) -> Self {
        Self {
            total_quantity: state.total_quantity,
            total_minor_units: state.total_minor_units(),
            currency: state.currency.clone(),
            checkout_url: state.checkout_url.clone(),
        }
    }
}

/// Session cookies forwarded between caller and upstream.
///
/// The gateway never mints cart tokens itself; it only carries the
/// caller's cookie header to the upstream and the upstream's `Set-Cookie`
/// values back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCookies {
    header: String,
}

impl SessionCookies {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.header.trim().is_empty()
    }

    /// The raw `Cookie` header value to forward upstream
    pub fn as_header(&self) -> &str {
        &self.header
    }

    /// Look up a single cookie value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.header.split(';').find_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            (k.trim() == name).then_some(v.trim())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_id_from_bare_form() {
        assert_eq!(VariantRef::from("12345").numeric_id(), Some(12345));
    }

    #[test]
    fn test_numeric_id_from_compound_form() {
        let r = VariantRef::from("gid://shopify/ProductVariant/12345");
        assert_eq!(r.numeric_id(), Some(12345));
    }

    #[test]
    fn test_numeric_id_idempotent() {
        let compound = VariantRef::from("gid://shopify/ProductVariant/987");
        let bare = VariantRef::new(compound.numeric_id().unwrap().to_string());
        assert_eq!(bare.numeric_id(), compound.numeric_id());
    }

    #[test]
    fn test_numeric_id_rejects_non_numeric_suffix() {
        assert_eq!(VariantRef::from("gid://shopify/Product/abc").numeric_id(), None);
        assert_eq!(VariantRef::from("not-a-variant").numeric_id(), None);
        assert_eq!(VariantRef::from("").numeric_id(), None);
        assert_eq!(VariantRef::from("gid://shopify/ProductVariant/").numeric_id(), None);
    }

    #[test]
    fn test_cart_total_minor_units() {
        let state = CartState {
            cart_id: "token".into(),
            lines: vec![
                CartLine {
                    variant_id: 1,
                    quantity: 2,
                    unit_price_minor_units: 10000,
                    title: "A".into(),
                },
                CartLine {
                    variant_id: 2,
                    quantity: 1,
                    unit_price_minor_units: 5000,
                    title: "B".into(),
                },
            ],
            total_quantity: 3,
            checkout_url: "https://shop.example/cart".into(),
            currency: "NOK".into(),
        };
        assert_eq!(state.total_minor_units(), 25000);

        let summary = CartSummary::from(&state);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.total_minor_units, 25000);
    }

    #[test]
    fn test_session_cookies_lookup() {
        let cookies = SessionCookies::new("cart=abc123; _session=xyz; cartId=gid-1");
        assert_eq!(cookies.get("cart"), Some("abc123"));
        assert_eq!(cookies.get("cartId"), Some("gid-1"));
        assert_eq!(cookies.get("missing"), None);
        assert!(!cookies.is_empty());
        assert!(SessionCookies::default().is_empty());
    }
}
