//! Reef Bridge - host-page protocol layer for the chat widget
//!
//! The bridge runs in the embedding storefront page. It owns the widget
//! iframe's geometry, relays the closed message protocol between page and
//! iframe, watches the host cookie jar for cart-identity changes, and
//! calls the gateway's cart API on the widget's behalf.
//!
//! Nothing here blocks on network I/O inside a geometry transition, and
//! every inbound message is origin-checked before it is even decoded.
//!
//! # Wiring
//!
//! ```rust,ignore
//! let client = Arc::new(GatewayClient::new(&config));
//! let mut bridge = SessionBridge::new(config.clone(), client, jar.clone(), iframe, None);
//! bridge.boot();
//!
//! let shutdown = CancellationToken::new();
//! let watcher = CookieWatcher::new(jar, &config.cart_cookie, config.cookie_poll_interval);
//! let mut changes = watcher.spawn(shutdown.clone());
//!
//! loop {
//!     tokio::select! {
//!         Some((origin, raw)) = inbound.recv() => bridge.handle_message(&origin, &raw).await,
//!         Some(token) = changes.recv() => bridge.on_cart_cookie_change(token).await,
//!         else => break,
//!     }
//! }
//! shutdown.cancel();
//! ```

pub mod bridge;
pub mod client;
pub mod config;
pub mod cookies;
pub mod error;
pub mod port;

pub use bridge::SessionBridge;
pub use client::{CartApi, GatewayClient};
pub use config::{BridgeConfig, Geometry, Position};
pub use cookies::{CookieJar, CookieWatcher};
pub use error::{BridgeError, BridgeResult};
pub use port::{ChannelPort, MessagePort};
