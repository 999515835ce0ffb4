//! Bridge bootstrap configuration
//!
//! Pure presentation and wiring parameters handed to the bridge by the
//! embed snippet; none of this affects protocol behavior beyond the
//! origin allow-list and the cookie poll settings.

use std::time::Duration;

/// Iframe size for one visibility state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometry {
    pub width: String,
    pub height: String,
}

impl Geometry {
    pub fn new(width: impl Into<String>, height: impl Into<String>) -> Self {
        Self {
            width: width.into(),
            height: height.into(),
        }
    }
}

/// Fixed-corner offsets for the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub bottom: String,
    pub right: String,
}

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Where the widget iframe content is served from
    pub iframe_url: String,
    /// Gateway API base URL
    pub gateway_base_url: String,
    /// Origins whose messages the bridge will act on; everything else is
    /// dropped silently
    pub allowed_origins: Vec<String>,
    pub button_size: String,
    pub expanded_desktop: Geometry,
    pub expanded_mobile: Geometry,
    pub position: Position,
    /// Name of the cart-identity cookie owned by the commerce backend
    pub cart_cookie: String,
    pub cookie_poll_interval: Duration,
    pub shop_domain: Option<String>,
    /// HTTP timeout for gateway calls, seconds
    pub timeout: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            iframe_url: String::new(),
            gateway_base_url: String::new(),
            allowed_origins: Vec::new(),
            button_size: "70px".into(),
            expanded_desktop: Geometry::new("420px", "650px"),
            expanded_mobile: Geometry::new("100vw", "80vh"),
            position: Position {
                bottom: "20px".into(),
                right: "20px".into(),
            },
            cart_cookie: "cart".into(),
            cookie_poll_interval: Duration::from_secs(2),
            shop_domain: None,
            timeout: 10,
        }
    }
}

impl BridgeConfig {
    /// Exact-match origin check
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|o| o == origin)
    }
}
