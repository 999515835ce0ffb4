//! Session bridge
//!
//! The host-page state machine. Inbound messages pass through an origin
//! check, then a single dispatch table over the closed protocol enum.
//! Geometry transitions touch presentation state only; cart work goes
//! through the injected [`CartApi`].

use crate::client::CartApi;
use crate::config::{BridgeConfig, Geometry};
use crate::cookies::CookieJar;
use crate::port::MessagePort;
use chrono::Utc;
use shared::{
    BridgeMessage, BridgeSession, PROTOCOL_VERSION, SessionCookies, SessionPatch, WidgetVisibility,
};
use std::sync::Arc;

/// Host-page bridge between the storefront and the widget iframe
pub struct SessionBridge {
    config: BridgeConfig,
    session: BridgeSession,
    cart: Arc<dyn CartApi>,
    jar: Arc<dyn CookieJar>,
    /// Channel to the widget iframe
    iframe: Arc<dyn MessagePort>,
    /// When the bridge itself runs one embedding level deep, geometry
    /// messages are forwarded outward through this port
    outer: Option<Arc<dyn MessagePort>>,
}

impl std::fmt::Debug for SessionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBridge")
            .field("visibility", &self.session.visibility)
            .field("nested", &self.outer.is_some())
            .finish()
    }
}

impl SessionBridge {
    pub fn new(
        config: BridgeConfig,
        cart: Arc<dyn CartApi>,
        jar: Arc<dyn CookieJar>,
        iframe: Arc<dyn MessagePort>,
        outer: Option<Arc<dyn MessagePort>>,
    ) -> Self {
        let mut session = BridgeSession::new(config.shop_domain.clone());
        session.cart_token = jar.get(&config.cart_cookie);
        Self {
            config,
            session,
            cart,
            jar,
            iframe,
            outer,
        }
    }

    /// Post `INIT_SESSION` so the iframe can bootstrap its session copy
    pub fn boot(&mut self) {
        self.session.visibility = WidgetVisibility::Minimized;
        let message = BridgeMessage::InitSession {
            version: PROTOCOL_VERSION,
            session: self.session.clone(),
        };
        if let Err(err) = self.iframe.post(&message) {
            tracing::warn!(error = %err, "INIT_SESSION not delivered");
        }
    }

    pub fn session(&self) -> &BridgeSession {
        &self.session
    }

    pub fn visibility(&self) -> WidgetVisibility {
        self.session.visibility
    }

    /// Iframe size for the current visibility state
    pub fn geometry(&self, mobile: bool) -> Geometry {
        match self.session.visibility {
            WidgetVisibility::Hidden | WidgetVisibility::Minimized => {
                Geometry::new(self.config.button_size.clone(), self.config.button_size.clone())
            }
            WidgetVisibility::Expanded => {
                if mobile {
                    self.config.expanded_mobile.clone()
                } else {
                    self.config.expanded_desktop.clone()
                }
            }
        }
    }

    fn cookies(&self) -> SessionCookies {
        SessionCookies::new(self.jar.header())
    }

    fn post_to_iframe(&self, message: BridgeMessage) {
        if let Err(err) = self.iframe.post(&message) {
            tracing::warn!(kind = message.kind(), error = %err, "Message not delivered to iframe");
        }
    }

    /// Geometry transitions forward outward when nested one level deeper
    fn forward_outward(&self, message: &BridgeMessage) {
        if let Some(outer) = &self.outer
            && let Err(err) = outer.post(message)
        {
            tracing::warn!(kind = message.kind(), error = %err, "Message not forwarded outward");
        }
    }

    /// Handle one inbound message.
    ///
    /// Messages from origins outside the allow-list are dropped silently;
    /// so are payloads that don't decode to a known protocol message.
    /// Nothing in here lets an error escape to the embedding page.
    pub async fn handle_message(&mut self, origin: &str, raw: &str) {
        if !self.config.allows_origin(origin) {
            tracing::debug!(origin, "Dropped message from unrecognized origin");
            return;
        }
        let Some(message) = BridgeMessage::decode(raw) else {
            tracing::debug!(origin, "Ignored unrecognized message");
            return;
        };
        let kind = message.kind();

        match message {
            BridgeMessage::Expand => {
                self.session.visibility = WidgetVisibility::Expanded;
                self.forward_outward(&BridgeMessage::Expand);
            }
            BridgeMessage::Minimize => {
                self.session.visibility = WidgetVisibility::Minimized;
                self.forward_outward(&BridgeMessage::Minimize);
            }
            BridgeMessage::RequestSession => {
                self.post_to_iframe(BridgeMessage::SessionUpdate {
                    patch: self.session.as_patch(),
                });
            }
            BridgeMessage::AddToCart {
                variant_ref,
                quantity,
            } => {
                self.handle_add_to_cart(variant_ref, quantity).await;
            }
            BridgeMessage::SessionUpdate { patch } => {
                self.session.apply(&patch);
            }
            // host-bound messages arriving here mean a confused peer;
            // ignore them like any other unexpected type
            BridgeMessage::InitSession { .. }
            | BridgeMessage::CartUpdate { .. }
            | BridgeMessage::AddToCartSuccess { .. }
            | BridgeMessage::AddToCartError { .. } => {
                tracing::debug!(kind, "Ignored host-bound message");
            }
        }
    }

    async fn handle_add_to_cart(&mut self, variant_ref: shared::VariantRef, quantity: u32) {
        let cookies = self.cookies();
        match self.cart.add_line(&variant_ref, quantity, &cookies).await {
            Ok(summary) => {
                self.session.cart_token = self.jar.get(&self.config.cart_cookie);
                self.session.last_synced_at = Some(Utc::now());
                self.post_to_iframe(BridgeMessage::AddToCartSuccess {
                    summary: summary.clone(),
                });
                self.post_to_iframe(BridgeMessage::SessionUpdate {
                    patch: SessionPatch {
                        cart_token: self.session.cart_token.clone(),
                        last_synced_at: self.session.last_synced_at,
                        ..Default::default()
                    },
                });
            }
            Err(err) => {
                tracing::error!(variant_ref = %variant_ref, error = %err, "Add to cart failed");
                let message = match &err {
                    crate::error::BridgeError::Gateway { message, .. } => message.clone(),
                    _ => "Could not add the item to your cart.".to_string(),
                };
                self.post_to_iframe(BridgeMessage::AddToCartError { message });
                // keep the iframe's session copy current even on failure
                self.post_to_iframe(BridgeMessage::SessionUpdate {
                    patch: SessionPatch {
                        cart_token: self.session.cart_token.clone(),
                        ..Default::default()
                    },
                });
            }
        }
    }

    /// React to a cart-identity cookie change observed by the watcher:
    /// re-read the cart and broadcast the fresh summary.
    pub async fn on_cart_cookie_change(&mut self, value: Option<String>) {
        self.session.cart_token = value;
        self.session.last_synced_at = Some(Utc::now());
        match self.cart.get_cart(&self.cookies()).await {
            Ok(summary) => {
                self.post_to_iframe(BridgeMessage::CartUpdate { summary });
            }
            Err(err) => {
                tracing::warn!(error = %err, "Cart refresh after cookie change failed");
            }
        }
        self.post_to_iframe(BridgeMessage::SessionUpdate {
            patch: SessionPatch {
                cart_token: self.session.cart_token.clone(),
                last_synced_at: self.session.last_synced_at,
                ..Default::default()
            },
        });
    }
}
