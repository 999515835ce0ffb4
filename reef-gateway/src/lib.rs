//! Reef Gateway - backend for the storefront chat concierge
//!
//! # Architecture
//!
//! The gateway reconciles the widget's view of the shopper's cart with
//! the upstream commerce backend and answers free-text product queries
//! from a cached catalog snapshot:
//!
//! - **Cart** (`cart`): idempotency-aware add/read against the upstream,
//!   variant-ref normalization, cookie forwarding
//! - **Catalog** (`catalog`): TTL snapshot cache with single-flight
//!   refresh, relevance-scored search
//! - **Sessions** (`session`): per-conversation shown-items tracking and
//!   chat rate limiting
//! - **Chat** (`chat`): intent classification seam and the conversation
//!   orchestrator
//! - **API** (`api`): thin axum handlers over the services
//!
//! # Module structure
//!
//! ```text
//! reef-gateway/src/
//! ├── core/          # config, state, HTTP server
//! ├── cart/          # upstream seam + gateway
//! ├── catalog/       # source, cache, search
//! ├── session/       # shown-items tracker, rate limiter
//! ├── chat/          # intent, orchestrator
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logging
//! ```

pub mod api;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod core;
pub mod session;
pub mod utils;

pub use cart::{CartGateway, CartOutcome, UpstreamPath};
pub use catalog::{CatalogCache, search};
pub use chat::{ConversationOrchestrator, Intent, Reply};
pub use core::{Config, Server, ServerState};
pub use session::{RateLimiter, ShownItemsTracker};
pub use utils::{init_logger, init_logger_with_file};
