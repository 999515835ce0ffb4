//! Cart API Handlers
//!
//! The `Cookie` header rides through to the upstream backend, and any
//! upstream `Set-Cookie` values ride back, so the shopper's next request
//! carries the right cart session.

use crate::core::ServerState;
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::{ApiResponse, AppResult, CartState, SessionCookies, VariantRef};
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    pub variant_ref: VariantRef,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Serialize)]
pub struct CartPayload {
    pub cart: CartState,
    pub total_quantity: u32,
    pub checkout_url: String,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub sections: HashMap<String, String>,
}

fn session_cookies(headers: &HeaderMap) -> SessionCookies {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(SessionCookies::new)
        .unwrap_or_default()
}

fn with_set_cookies(payload: ApiResponse<CartPayload>, set_cookies: Vec<String>) -> Response {
    let mut response = payload.into_response();
    for cookie in set_cookies {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// POST /api/cart/add
pub async fn add_line(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(request): Json<AddLineRequest>,
) -> AppResult<Response> {
    let cookies = session_cookies(&headers);
    let outcome = state
        .cart
        .add_line(&request.variant_ref, request.quantity, &cookies)
        .await?;

    let payload = CartPayload {
        total_quantity: outcome.state.total_quantity,
        checkout_url: outcome.state.checkout_url.clone(),
        cart: outcome.state,
        sections: outcome.sections,
    };
    Ok(with_set_cookies(
        ApiResponse::success(payload),
        outcome.set_cookies,
    ))
}

/// GET /api/cart
pub async fn get_cart(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let cookies = session_cookies(&headers);
    let outcome = state.cart.get_cart(&cookies).await?;

    let payload = CartPayload {
        total_quantity: outcome.state.total_quantity,
        checkout_url: outcome.state.checkout_url.clone(),
        cart: outcome.state,
        sections: outcome.sections,
    };
    Ok(with_set_cookies(
        ApiResponse::success(payload),
        outcome.set_cookies,
    ))
}
