//! HTTP client for the gateway's cart API

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use shared::{ApiResponse, CartState, CartSummary, SessionCookies, VariantRef};

/// The gateway's client-facing cart contract
#[async_trait]
pub trait CartApi: Send + Sync {
    async fn add_line(
        &self,
        variant_ref: &VariantRef,
        quantity: u32,
        cookies: &SessionCookies,
    ) -> BridgeResult<CartSummary>;

    async fn get_cart(&self, cookies: &SessionCookies) -> BridgeResult<CartSummary>;
}

/// Gateway cart payload as served by `/api/cart`
#[derive(Debug, serde::Deserialize)]
struct CartPayload {
    cart: CartState,
}

/// HTTP client for making requests to the gateway
#[derive(Debug, Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
}

impl GatewayClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &BridgeConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: config.gateway_base_url.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Unwrap the gateway's response envelope
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> BridgeResult<T> {
        let status = response.status();
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| BridgeError::InvalidResponse(e.to_string()))?;

        match envelope.code {
            Some(0) | None if status != StatusCode::OK => Err(BridgeError::InvalidResponse(
                format!("status {} with success envelope", status),
            )),
            Some(0) | None => envelope
                .data
                .ok_or_else(|| BridgeError::InvalidResponse("missing data".into())),
            Some(code) => Err(BridgeError::Gateway {
                code,
                message: envelope.message,
            }),
        }
    }
}

#[async_trait]
impl CartApi for GatewayClient {
    async fn add_line(
        &self,
        variant_ref: &VariantRef,
        quantity: u32,
        cookies: &SessionCookies,
    ) -> BridgeResult<CartSummary> {
        let mut request = self.client.post(self.url("/api/cart/add")).json(
            &serde_json::json!({ "variant_ref": variant_ref, "quantity": quantity }),
        );
        if !cookies.is_empty() {
            request = request.header(reqwest::header::COOKIE, cookies.as_header());
        }
        let response = request.send().await?;
        let payload: CartPayload = Self::handle_response(response).await?;
        Ok(CartSummary::from(&payload.cart))
    }

    async fn get_cart(&self, cookies: &SessionCookies) -> BridgeResult<CartSummary> {
        let mut request = self.client.get(self.url("/api/cart"));
        if !cookies.is_empty() {
            request = request.header(reqwest::header::COOKIE, cookies.as_header());
        }
        let response = request.send().await?;
        let payload: CartPayload = Self::handle_response(response).await?;
        Ok(CartSummary::from(&payload.cart))
    }
}
