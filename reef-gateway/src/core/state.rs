//! Server state
//!
//! Holds singleton references to every service. `Arc` everywhere, so a
//! clone per request handler is cheap.

use crate::cart::gateway::CartGatewayConfig;
use crate::cart::{CartGateway, HttpCartUpstream};
use crate::catalog::{CatalogCache, StorefrontCatalogSource};
use crate::chat::{ConversationOrchestrator, KeywordClassifier};
use crate::core::Config;
use crate::session::{RateLimiter, ShownItemsTracker};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared handle to every service singleton
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub catalog: Arc<CatalogCache>,
    pub cart: CartGateway,
    pub tracker: Arc<ShownItemsTracker>,
    pub limiter: Arc<RateLimiter>,
    pub orchestrator: Arc<ConversationOrchestrator>,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("tracked_sessions", &self.tracker.session_count())
            .finish()
    }
}

impl ServerState {
    /// Wire up the production service graph
    pub fn initialize(config: &Config) -> Self {
        let upstream = Arc::new(HttpCartUpstream::new(
            config.shop_domain.clone(),
            config.storefront_token.clone(),
        ));
        let cart = CartGateway::new(
            upstream,
            CartGatewayConfig {
                path: config.upstream_path,
                fetch_sections: config.fetch_sections,
                checkout_url: config.checkout_url(),
                default_currency: config.default_currency.clone(),
                ..Default::default()
            },
        );

        let source = Arc::new(StorefrontCatalogSource::new(
            config.shop_domain.clone(),
            config.storefront_token.clone(),
        ));
        let catalog = Arc::new(CatalogCache::new(source, config.catalog_ttl));

        let tracker = Arc::new(ShownItemsTracker::new());
        let limiter = Arc::new(RateLimiter::new(
            config.chat_rate_window,
            config.chat_rate_limit,
        ));
        let orchestrator = Arc::new(ConversationOrchestrator::new(
            catalog.clone(),
            cart.clone(),
            tracker.clone(),
            Arc::new(KeywordClassifier::default()),
            config.booking_url.clone(),
        ));

        Self {
            config: config.clone(),
            catalog,
            cart,
            tracker,
            limiter,
            orchestrator,
            shutdown: CancellationToken::new(),
        }
    }

    /// Assemble state from pre-built services (tests, embeddings)
    pub fn with_services(
        config: Config,
        catalog: Arc<CatalogCache>,
        cart: CartGateway,
        tracker: Arc<ShownItemsTracker>,
        limiter: Arc<RateLimiter>,
        orchestrator: Arc<ConversationOrchestrator>,
    ) -> Self {
        Self {
            config,
            catalog,
            cart,
            tracker,
            limiter,
            orchestrator,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Start the periodic shown-items eviction sweep
    pub fn start_background_tasks(&self) {
        let tracker = self.tracker.clone();
        let idle = chrono::Duration::from_std(self.config.session_idle)
            .unwrap_or_else(|_| chrono::Duration::minutes(30));
        let interval = self.config.eviction_interval;
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let evicted = tracker.evict_idle(idle);
                        if evicted > 0 {
                            tracing::debug!(evicted, "Evicted idle conversations");
                        }
                    }
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Eviction task stopped");
                        break;
                    }
                }
            }
        });
    }
}
