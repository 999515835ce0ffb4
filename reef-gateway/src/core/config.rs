//! Gateway configuration

use crate::cart::UpstreamPath;
use std::time::Duration;

/// Gateway configuration, sourced from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream shop domain, e.g. `example.myshopify.com`
    pub shop_domain: String,
    /// Storefront API access token (GraphQL path and catalog fetches)
    pub storefront_token: String,
    pub http_port: u16,
    /// Catalog snapshot freshness window
    pub catalog_ttl: Duration,
    /// Conversation idle window before shown-items state is evicted
    pub session_idle: Duration,
    /// How often the eviction sweep runs
    pub eviction_interval: Duration,
    /// Which upstream integration serves cart operations
    pub upstream_path: UpstreamPath,
    /// Fetch theme section fragments alongside cart operations
    pub fetch_sections: bool,
    /// Chat requests allowed per window per session
    pub chat_rate_limit: usize,
    pub chat_rate_window: Duration,
    /// Origins allowed to call the API (CORS)
    pub allowed_origins: Vec<String>,
    pub booking_url: String,
    pub default_currency: String,
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let shop_domain = std::env::var("SHOP_DOMAIN").unwrap_or_default();
        Self {
            storefront_token: std::env::var("STOREFRONT_ACCESS_TOKEN").unwrap_or_default(),
            http_port: env_u64("HTTP_PORT", 3000) as u16,
            catalog_ttl: Duration::from_secs(env_u64("CATALOG_TTL_SECS", 300)),
            session_idle: Duration::from_secs(env_u64("SESSION_IDLE_SECS", 1800)),
            eviction_interval: Duration::from_secs(env_u64("EVICTION_INTERVAL_SECS", 300)),
            upstream_path: match std::env::var("UPSTREAM_PATH").as_deref() {
                Ok("graphql") => UpstreamPath::Graphql,
                _ => UpstreamPath::Rest,
            },
            fetch_sections: std::env::var("FETCH_SECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            chat_rate_limit: env_u64("CHAT_RATE_LIMIT", 10) as usize,
            chat_rate_window: Duration::from_secs(env_u64("CHAT_RATE_WINDOW_SECS", 60)),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            booking_url: std::env::var("BOOKING_URL").unwrap_or_default(),
            default_currency: std::env::var("DEFAULT_CURRENCY").unwrap_or_else(|_| "NOK".into()),
            shop_domain,
        }
    }

    /// The shop's cart page, used as the REST-path checkout URL
    pub fn checkout_url(&self) -> String {
        format!("https://{}/cart", self.shop_domain)
    }
}
