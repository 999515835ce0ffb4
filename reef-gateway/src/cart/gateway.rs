//! Cart Gateway
//!
//! The single consolidated path for cart mutations and reads. Callers hand
//! it a [`VariantRef`] in whatever shape they received it; the gateway
//! normalizes to the numeric id the REST endpoint expects, executes
//! against the configured upstream path, and returns canonical
//! [`CartState`] together with any upstream cookies to forward.
//!
//! `add_line` is not idempotent at the upstream boundary (two calls add
//! two lines) and is therefore never auto-retried here; ambiguous
//! failures surface to the caller, which re-reads before deciding what to
//! report. `get_cart` is a pure read and gets one bounded retry.

use super::upstream::{CartUpstream, UpstreamError, UpstreamReply};
use shared::{AppError, AppResult, CartState, SessionCookies, VariantRef};
use std::collections::HashMap;
use std::sync::Arc;

/// Which upstream integration serves cart operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpstreamPath {
    /// Cookie-addressed REST endpoints (primary)
    #[default]
    Rest,
    /// Id-addressed GraphQL mutations
    Graphql,
}

/// Result of a gateway cart operation
#[derive(Debug, Clone)]
pub struct CartOutcome {
    pub state: CartState,
    /// Upstream `Set-Cookie` values, forwarded verbatim so the caller's
    /// next request carries the right cart session
    pub set_cookies: Vec<String>,
    /// Theme section fragments, when section fetching is enabled
    pub sections: HashMap<String, String>,
}

/// Gateway configuration knobs
#[derive(Debug, Clone)]
pub struct CartGatewayConfig {
    pub path: UpstreamPath,
    /// Fetch theme section fragments alongside cart reads
    pub fetch_sections: bool,
    pub section_ids: Vec<String>,
    pub checkout_url: String,
    pub default_currency: String,
    /// Cookie carrying the GraphQL cart id, when that path is selected
    pub cart_id_cookie: String,
}

impl Default for CartGatewayConfig {
    fn default() -> Self {
        Self {
            path: UpstreamPath::Rest,
            fetch_sections: false,
            section_ids: vec![
                "cart-items".into(),
                "cart-icon-bubble".into(),
                "cart-live-region-text".into(),
                "cart-drawer".into(),
            ],
            checkout_url: String::new(),
            default_currency: "NOK".into(),
            cart_id_cookie: "cartId".into(),
        }
    }
}

/// Normalizes and executes cart operations against the upstream backend
#[derive(Clone)]
pub struct CartGateway {
    upstream: Arc<dyn CartUpstream>,
    config: CartGatewayConfig,
}

impl std::fmt::Debug for CartGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartGateway")
            .field("config", &self.config)
            .finish()
    }
}

/// Overlay upstream `Set-Cookie` values onto a caller cookie header, so a
/// follow-up read within the same gateway call sees the session the
/// mutation just established.
fn merge_set_cookies(cookies: &SessionCookies, set_cookies: &[String]) -> SessionCookies {
    let mut pairs: Vec<(String, String)> = cookies
        .as_header()
        .split(';')
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=')?;
            Some((k.trim().to_string(), v.trim().to_string()))
        })
        .collect();

    for set_cookie in set_cookies {
        // only the leading name=value matters; attributes are for the browser
        let Some(first) = set_cookie.split(';').next() else {
            continue;
        };
        let Some((name, value)) = first.split_once('=') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim();
        match pairs.iter_mut().find(|(k, _)| k == name) {
            Some(pair) => pair.1 = value.to_string(),
            None => pairs.push((name.to_string(), value.to_string())),
        }
    }

    let header = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("; ");
    SessionCookies::new(header)
}

fn map_upstream_err(err: UpstreamError) -> AppError {
    match err {
        UpstreamError::Unavailable(msg) => AppError::upstream_unavailable(msg),
        UpstreamError::Rejected(reason) => AppError::upstream_rejected(reason),
    }
}

impl CartGateway {
    pub fn new(upstream: Arc<dyn CartUpstream>, config: CartGatewayConfig) -> Self {
        Self { upstream, config }
    }

    fn normalize_reply(&self, reply: UpstreamReply) -> (CartState, Vec<String>) {
        let state = reply
            .cart
            .normalize(&self.config.checkout_url, &self.config.default_currency);
        (state, reply.set_cookies)
    }

    /// Add a line to the shopper's cart.
    ///
    /// The variant reference is normalized before any network call; a
    /// reference with no numeric suffix fails fast with
    /// `InvalidVariantRef`. On the REST path the mutation reply only
    /// echoes the added items, so the gateway re-reads the full cart
    /// rather than deriving state locally; the upstream may have merged
    /// the line into an existing one.
    pub async fn add_line(
        &self,
        variant_ref: &VariantRef,
        quantity: u32,
        cookies: &SessionCookies,
    ) -> AppResult<CartOutcome> {
        let variant_id = variant_ref
            .numeric_id()
            .ok_or_else(|| AppError::invalid_variant(variant_ref.as_str()))?;
        if quantity == 0 {
            return Err(AppError::validation("quantity must be at least 1"));
        }

        match self.config.path {
            UpstreamPath::Rest => {
                let add_reply = self
                    .upstream
                    .rest_add_line(variant_id, quantity, cookies)
                    .await
                    .map_err(map_upstream_err)?;
                let mut set_cookies = add_reply.set_cookies;

                let read_cookies = merge_set_cookies(cookies, &set_cookies);
                let read_reply = self
                    .upstream
                    .rest_get_cart(&read_cookies)
                    .await
                    .map_err(map_upstream_err)?;
                let (state, read_cookies_out) = self.normalize_reply(read_reply);
                set_cookies.extend(read_cookies_out);

                let sections = self.maybe_sections(&merge_set_cookies(cookies, &set_cookies)).await;
                tracing::debug!(
                    variant_id,
                    quantity,
                    total_quantity = state.total_quantity,
                    "Added cart line via REST path"
                );
                Ok(CartOutcome {
                    state,
                    set_cookies,
                    sections,
                })
            }
            UpstreamPath::Graphql => {
                let gid = format!("gid://shopify/ProductVariant/{}", variant_id);
                let (cart_id, mut set_cookies) =
                    match cookies.get(&self.config.cart_id_cookie) {
                        Some(id) => (id.to_string(), Vec::new()),
                        None => {
                            // no cart yet; create one first
                            let created = self
                                .upstream
                                .graphql_cart_create()
                                .await
                                .map_err(map_upstream_err)?;
                            let (state, set_cookies) = self.normalize_reply(created);
                            (state.cart_id, set_cookies)
                        }
                    };

                let reply = self
                    .upstream
                    .graphql_add_line(&cart_id, &gid, quantity)
                    .await
                    .map_err(map_upstream_err)?;
                // the mutation reply carries the upstream-computed cart,
                // not a local increment
                let (state, cookies_out) = self.normalize_reply(reply);
                set_cookies.extend(cookies_out);
                tracing::debug!(
                    variant_id,
                    quantity,
                    cart_id = %state.cart_id,
                    "Added cart line via GraphQL path"
                );
                Ok(CartOutcome {
                    state,
                    set_cookies,
                    sections: HashMap::new(),
                })
            }
        }
    }

    /// Read the current cart. Pure read; one bounded retry on transient
    /// upstream failure.
    pub async fn get_cart(&self, cookies: &SessionCookies) -> AppResult<CartOutcome> {
        let reply = match self.read_once(cookies).await {
            Ok(reply) => reply,
            Err(UpstreamError::Unavailable(first)) => {
                tracing::warn!(error = %first, "Cart read failed, retrying once");
                self.read_once(cookies).await.map_err(map_upstream_err)?
            }
            Err(err) => return Err(map_upstream_err(err)),
        };
        let (state, set_cookies) = self.normalize_reply(reply);
        let sections = self.maybe_sections(cookies).await;
        Ok(CartOutcome {
            state,
            set_cookies,
            sections,
        })
    }

    async fn read_once(&self, cookies: &SessionCookies) -> Result<UpstreamReply, UpstreamError> {
        match self.config.path {
            UpstreamPath::Rest => self.upstream.rest_get_cart(cookies).await,
            UpstreamPath::Graphql => {
                let cart_id = cookies
                    .get(&self.config.cart_id_cookie)
                    .map(|s| s.to_string());
                match cart_id {
                    Some(id) => self.upstream.graphql_get_cart(&id).await,
                    // no cart id yet: an empty cart is the truthful answer
                    None => Ok(UpstreamReply {
                        cart: super::upstream::UpstreamCart::Rest(
                            super::upstream::RestCart {
                                token: None,
                                items: Vec::new(),
                                item_count: 0,
                                currency: String::new(),
                            },
                        ),
                        set_cookies: Vec::new(),
                    }),
                }
            }
        }
    }

    /// Section fragments are a presentation nicety; failures degrade to an
    /// empty map rather than failing the cart operation.
    async fn maybe_sections(&self, cookies: &SessionCookies) -> HashMap<String, String> {
        if !self.config.fetch_sections {
            return HashMap::new();
        }
        match self
            .upstream
            .rest_sections(&self.config.section_ids, cookies)
            .await
        {
            Ok(sections) => sections,
            Err(err) => {
                tracing::warn!(error = %err, "Section fetch failed");
                HashMap::new()
            }
        }
    }
}
