//! Cart API module

mod handler;

use crate::core::ServerState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/cart", get(handler::get_cart))
        .route("/api/cart/add", post(handler::add_line))
}
