//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness probe
//! - [`cart`] - cart add/read, cookie forwarding
//! - [`chat`] - rate-limited conversation endpoint
//!
//! Handlers stay thin; everything interesting happens in the services.

pub mod cart;
pub mod chat;
pub mod health;

use crate::core::ServerState;
use axum::Router;

/// Assemble the full API router
pub fn router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(cart::router())
        .merge(chat::router())
}
