//! Upstream cart wire shapes and the transport seam
//!
//! Two historical integration paths exist against the commerce backend: a
//! REST path (`cart/add.js` / `cart.js`, cart identity via cookies) and a
//! GraphQL path (cart mutations addressed by an opaque cart id). Both
//! arrive here as [`UpstreamCart`] and leave through one normalization
//! step; nothing downstream branches on wire shape.

use async_trait::async_trait;
use serde::Deserialize;
use shared::{CartLine, CartState};
use std::collections::HashMap;
use thiserror::Error;

/// Upstream transport error
#[derive(Debug, Clone, Error)]
pub enum UpstreamError {
    /// Network failure or 5xx; the mutation may or may not have applied
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    /// Upstream refused the request and said why (e.g. sold out)
    #[error("{0}")]
    Rejected(String),
}

/// Raw upstream reply: a cart in whichever shape the serving path
/// produced, plus any `Set-Cookie` values to forward to the caller.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub cart: UpstreamCart,
    pub set_cookies: Vec<String>,
}

/// The two cart shapes observed at the ingress boundary
#[derive(Debug, Clone)]
pub enum UpstreamCart {
    Rest(RestCart),
    Graphql(GraphqlCart),
}

// =============================================================================
// REST shape (cart.js)
// =============================================================================

/// Cart as returned by the REST `cart.js` endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RestCart {
    pub token: Option<String>,
    #[serde(default)]
    pub items: Vec<RestLine>,
    #[serde(default)]
    pub item_count: u32,
    #[serde(default)]
    pub currency: String,
}

/// One line in a REST cart; prices arrive in minor units already
#[derive(Debug, Clone, Deserialize)]
pub struct RestLine {
    pub variant_id: u64,
    pub quantity: u32,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub title: String,
}

// =============================================================================
// GraphQL shape (cartCreate / cartLinesAdd / cart query)
// =============================================================================

/// Cart as returned by the GraphQL cart operations
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlCart {
    pub id: String,
    #[serde(rename = "checkoutUrl", default)]
    pub checkout_url: String,
    #[serde(rename = "totalQuantity", default)]
    pub total_quantity: u32,
    #[serde(default)]
    pub lines: GraphqlLines,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphqlLines {
    #[serde(default)]
    pub edges: Vec<GraphqlLineEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlLineEdge {
    pub node: GraphqlLine,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlLine {
    pub quantity: u32,
    pub merchandise: GraphqlMerchandise,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlMerchandise {
    /// Compound variant id (`gid://…/ProductVariant/<n>`)
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub price: Option<GraphqlMoney>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlMoney {
    pub amount: String,
    #[serde(rename = "currencyCode")]
    pub currency_code: String,
}

/// Parse a decimal money string (`"129.50"`) into minor units (`12950`).
///
/// Truncates beyond two fraction digits; the storefront API never sends
/// more for the currencies in play.
pub fn decimal_to_minor_units(amount: &str) -> Option<i64> {
    let amount = amount.trim();
    let (whole, frac) = match amount.split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount, ""),
    };
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let negative = whole.starts_with('-');
    let whole: i64 = whole.parse().ok()?;
    let frac = format!("{:0<2}", frac);
    let cents: i64 = frac[..2].parse().ok()?;
    let magnitude = whole.abs() * 100 + cents;
    Some(if negative { -magnitude } else { magnitude })
}

// =============================================================================
// Normalization
// =============================================================================

impl UpstreamCart {
    /// Normalize either wire shape into the canonical [`CartState`].
    ///
    /// `fallback_checkout_url` and `fallback_currency` cover the REST
    /// shape, which carries neither.
    pub fn normalize(self, fallback_checkout_url: &str, fallback_currency: &str) -> CartState {
        match self {
            UpstreamCart::Rest(cart) => {
                let lines = cart
                    .items
                    .into_iter()
                    .map(|item| CartLine {
                        variant_id: item.variant_id,
                        quantity: item.quantity,
                        unit_price_minor_units: item.price,
                        title: item.title,
                    })
                    .collect();
                let currency = if cart.currency.is_empty() {
                    fallback_currency.to_string()
                } else {
                    cart.currency
                };
                CartState {
                    cart_id: cart.token.unwrap_or_default(),
                    lines,
                    total_quantity: cart.item_count,
                    checkout_url: fallback_checkout_url.to_string(),
                    currency,
                }
            }
            UpstreamCart::Graphql(cart) => {
                let mut currency = String::new();
                let lines = cart
                    .lines
                    .edges
                    .into_iter()
                    .filter_map(|edge| {
                        let node = edge.node;
                        let variant_ref = shared::VariantRef::new(node.merchandise.id.clone());
                        let Some(variant_id) = variant_ref.numeric_id() else {
                            tracing::warn!(
                                merchandise = %node.merchandise.id,
                                "Dropping cart line with non-numeric merchandise id"
                            );
                            return None;
                        };
                        let unit_price = node
                            .merchandise
                            .price
                            .as_ref()
                            .and_then(|m| {
                                if currency.is_empty() {
                                    currency = m.currency_code.clone();
                                }
                                decimal_to_minor_units(&m.amount)
                            })
                            .unwrap_or(0);
                        Some(CartLine {
                            variant_id,
                            quantity: node.quantity,
                            unit_price_minor_units: unit_price,
                            title: node.merchandise.title,
                        })
                    })
                    .collect();
                if currency.is_empty() {
                    currency = fallback_currency.to_string();
                }
                let checkout_url = if cart.checkout_url.is_empty() {
                    fallback_checkout_url.to_string()
                } else {
                    cart.checkout_url
                };
                CartState {
                    cart_id: cart.id,
                    lines,
                    total_quantity: cart.total_quantity,
                    checkout_url,
                    currency,
                }
            }
        }
    }
}

// =============================================================================
// Transport seam
// =============================================================================

/// Operations the gateway needs from the upstream commerce backend.
///
/// The production implementation is [`super::HttpCartUpstream`]; tests use
/// mocks with call counters.
#[async_trait]
pub trait CartUpstream: Send + Sync {
    /// REST add: `POST /cart/add.js` with a numeric variant id.
    /// Not idempotent upstream; callers must not auto-retry.
    async fn rest_add_line(
        &self,
        variant_id: u64,
        quantity: u32,
        cookies: &shared::SessionCookies,
    ) -> Result<UpstreamReply, UpstreamError>;

    /// REST read: `GET /cart.js`. Pure read, safe to retry.
    async fn rest_get_cart(
        &self,
        cookies: &shared::SessionCookies,
    ) -> Result<UpstreamReply, UpstreamError>;

    /// Theme section fragments: `GET /?section_id=<id>`
    async fn rest_sections(
        &self,
        section_ids: &[String],
        cookies: &shared::SessionCookies,
    ) -> Result<HashMap<String, String>, UpstreamError>;

    /// GraphQL `cartCreate`
    async fn graphql_cart_create(&self) -> Result<UpstreamReply, UpstreamError>;

    /// GraphQL `cartLinesAdd` against an existing cart id
    async fn graphql_add_line(
        &self,
        cart_id: &str,
        merchandise_gid: &str,
        quantity: u32,
    ) -> Result<UpstreamReply, UpstreamError>;

    /// GraphQL cart query
    async fn graphql_get_cart(&self, cart_id: &str) -> Result<UpstreamReply, UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_to_minor_units() {
        assert_eq!(decimal_to_minor_units("129.50"), Some(12950));
        assert_eq!(decimal_to_minor_units("129"), Some(12900));
        assert_eq!(decimal_to_minor_units("0.5"), Some(50));
        assert_eq!(decimal_to_minor_units("-3.25"), Some(-325));
        assert_eq!(decimal_to_minor_units("abc"), None);
    }

    #[test]
    fn test_normalize_rest_shape() {
        let cart = UpstreamCart::Rest(RestCart {
            token: Some("tok-1".into()),
            items: vec![RestLine {
                variant_id: 987,
                quantity: 2,
                price: 64900,
                title: "Marine Peeling".into(),
            }],
            item_count: 2,
            currency: "NOK".into(),
        });
        let state = cart.normalize("https://shop.example/cart", "NOK");
        assert_eq!(state.cart_id, "tok-1");
        assert_eq!(state.total_quantity, 2);
        assert_eq!(state.lines.len(), 1);
        assert_eq!(state.lines[0].variant_id, 987);
        assert_eq!(state.checkout_url, "https://shop.example/cart");
    }

    #[test]
    fn test_normalize_graphql_shape() {
        let json = r#"{
            "id": "gid://shopify/Cart/c1",
            "checkoutUrl": "https://shop.example/checkout/c1",
            "totalQuantity": 3,
            "lines": {"edges": [{"node": {
                "quantity": 3,
                "merchandise": {
                    "id": "gid://shopify/ProductVariant/987",
                    "title": "Marine Peeling",
                    "price": {"amount": "649.00", "currencyCode": "NOK"}
                }
            }}]}
        }"#;
        let cart: GraphqlCart = serde_json::from_str(json).unwrap();
        let state = UpstreamCart::Graphql(cart).normalize("https://shop.example/cart", "EUR");
        assert_eq!(state.cart_id, "gid://shopify/Cart/c1");
        assert_eq!(state.checkout_url, "https://shop.example/checkout/c1");
        assert_eq!(state.currency, "NOK");
        assert_eq!(state.lines[0].variant_id, 987);
        assert_eq!(state.lines[0].unit_price_minor_units, 64900);
    }

    #[test]
    fn test_both_shapes_normalize_to_same_state() {
        let rest = UpstreamCart::Rest(RestCart {
            token: Some("c1".into()),
            items: vec![RestLine {
                variant_id: 42,
                quantity: 1,
                price: 1000,
                title: "Lotion".into(),
            }],
            item_count: 1,
            currency: "NOK".into(),
        })
        .normalize("https://shop.example/cart", "NOK");

        let graphql = UpstreamCart::Graphql(GraphqlCart {
            id: "c1".into(),
            checkout_url: String::new(),
            total_quantity: 1,
            lines: GraphqlLines {
                edges: vec![GraphqlLineEdge {
                    node: GraphqlLine {
                        quantity: 1,
                        merchandise: GraphqlMerchandise {
                            id: "gid://shopify/ProductVariant/42".into(),
                            title: "Lotion".into(),
                            price: Some(GraphqlMoney {
                                amount: "10.00".into(),
                                currency_code: "NOK".into(),
                            }),
                        },
                    },
                }],
            },
        })
        .normalize("https://shop.example/cart", "NOK");

        assert_eq!(rest.lines, graphql.lines);
        assert_eq!(rest.total_quantity, graphql.total_quantity);
        assert_eq!(rest.checkout_url, graphql.checkout_url);
    }

    #[test]
    fn test_normalize_drops_malformed_merchandise() {
        let cart = UpstreamCart::Graphql(GraphqlCart {
            id: "c1".into(),
            checkout_url: String::new(),
            total_quantity: 1,
            lines: GraphqlLines {
                edges: vec![GraphqlLineEdge {
                    node: GraphqlLine {
                        quantity: 1,
                        merchandise: GraphqlMerchandise {
                            id: "gid://shopify/ProductVariant/oops".into(),
                            title: String::new(),
                            price: None,
                        },
                    },
                }],
            },
        });
        let state = cart.normalize("https://shop.example/cart", "NOK");
        assert!(state.lines.is_empty());
    }
}
