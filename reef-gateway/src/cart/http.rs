//! HTTP implementation of the upstream cart seam
//!
//! Talks to the commerce backend over both historical paths:
//!
//! - REST: `POST https://{shop}/cart/add.js`, `GET https://{shop}/cart.js`,
//!   `GET https://{shop}/?section_id=<id>`; cart identity rides on the
//!   forwarded `Cookie` header
//! - GraphQL: `POST https://{shop}/api/2023-10/graphql.json` with the
//!   storefront access token, carts addressed by opaque id

use super::upstream::{
    CartUpstream, GraphqlCart, RestCart, UpstreamCart, UpstreamError, UpstreamReply,
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use shared::SessionCookies;
use std::collections::HashMap;
use std::time::Duration;

const STOREFRONT_API_VERSION: &str = "2023-10";

/// reqwest-backed [`CartUpstream`]
#[derive(Debug, Clone)]
pub struct HttpCartUpstream {
    client: Client,
    shop_domain: String,
    storefront_token: String,
}

impl HttpCartUpstream {
    pub fn new(shop_domain: impl Into<String>, storefront_token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            shop_domain: shop_domain.into(),
            storefront_token: storefront_token.into(),
        }
    }

    fn shop_url(&self, path: &str) -> String {
        format!("https://{}/{}", self.shop_domain, path.trim_start_matches('/'))
    }

    fn graphql_url(&self) -> String {
        self.shop_url(&format!("api/{}/graphql.json", STOREFRONT_API_VERSION))
    }

    /// Collect `Set-Cookie` header values for forwarding to the caller
    fn set_cookies(response: &reqwest::Response) -> Vec<String> {
        response
            .headers()
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(|v| v.to_string())
            .collect()
    }

    async fn rest_request(
        &self,
        request: reqwest::RequestBuilder,
        cookies: &SessionCookies,
    ) -> Result<(reqwest::StatusCode, Vec<String>, String), UpstreamError> {
        let mut request = request
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Requested-With", "XMLHttpRequest");
        if !cookies.is_empty() {
            request = request.header(reqwest::header::COOKIE, cookies.as_header());
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
        let status = response.status();
        let set_cookies = Self::set_cookies(&response);
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        if status.is_server_error() {
            return Err(UpstreamError::Unavailable(format!(
                "upstream returned {}",
                status
            )));
        }
        Ok((status, set_cookies, body))
    }

    /// Execute a GraphQL document, surfacing user errors as rejections
    async fn graphql(&self, query: &str, variables: Value) -> Result<(Value, Vec<String>), UpstreamError> {
        let response = self
            .client
            .post(self.graphql_url())
            .header("X-Shopify-Storefront-Access-Token", &self.storefront_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        let status = response.status();
        let set_cookies = Self::set_cookies(&response);
        if status.is_server_error() {
            return Err(UpstreamError::Unavailable(format!(
                "upstream returned {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;

        if let Some(errors) = body.get("errors").and_then(Value::as_array)
            && let Some(first) = errors.first()
        {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("GraphQL error");
            return Err(UpstreamError::Rejected(message.to_string()));
        }
        Ok((body, set_cookies))
    }

    fn parse_graphql_cart(payload: &Value, path: &[&str]) -> Result<GraphqlCart, UpstreamError> {
        let mut node = payload;
        for key in path {
            node = node
                .get(key)
                .ok_or_else(|| UpstreamError::Unavailable(format!("missing '{}' in reply", key)))?;
        }

        // userErrors sit next to the cart on mutation replies
        if let Some(errors) = node.get("userErrors").and_then(Value::as_array)
            && let Some(first) = errors.first()
        {
            let message = first
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("cart operation failed");
            return Err(UpstreamError::Rejected(message.to_string()));
        }

        let cart = node.get("cart").unwrap_or(node);
        serde_json::from_value(cart.clone())
            .map_err(|e| UpstreamError::Unavailable(format!("malformed cart payload: {}", e)))
    }
}

#[async_trait]
impl CartUpstream for HttpCartUpstream {
    async fn rest_add_line(
        &self,
        variant_id: u64,
        quantity: u32,
        cookies: &SessionCookies,
    ) -> Result<UpstreamReply, UpstreamError> {
        let body = json!({ "items": [{ "id": variant_id, "quantity": quantity }] });
        let request = self.client.post(self.shop_url("cart/add.js")).json(&body);
        let (status, set_cookies, text) = self.rest_request(request, cookies).await?;

        let payload: Value = serde_json::from_str(&text)
            .map_err(|_| UpstreamError::Unavailable("non-JSON reply from cart/add.js".into()))?;

        if !status.is_success() {
            // add.js answers 422 with a human-readable description
            let reason = payload
                .get("description")
                .or_else(|| payload.get("message"))
                .and_then(Value::as_str)
                .unwrap_or("add to cart failed");
            return Err(UpstreamError::Rejected(reason.to_string()));
        }

        // add.js echoes only the added items; the caller re-reads the cart
        let cart = RestCart {
            token: None,
            items: serde_json::from_value(
                payload.get("items").cloned().unwrap_or_else(|| json!([])),
            )
            .unwrap_or_default(),
            item_count: 0,
            currency: String::new(),
        };
        Ok(UpstreamReply {
            cart: UpstreamCart::Rest(cart),
            set_cookies,
        })
    }

    async fn rest_get_cart(
        &self,
        cookies: &SessionCookies,
    ) -> Result<UpstreamReply, UpstreamError> {
        let request = self.client.get(self.shop_url("cart.js"));
        let (status, set_cookies, text) = self.rest_request(request, cookies).await?;
        if !status.is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "cart.js returned {}",
                status
            )));
        }
        let cart: RestCart = serde_json::from_str(&text)
            .map_err(|_| UpstreamError::Unavailable("non-JSON reply from cart.js".into()))?;
        Ok(UpstreamReply {
            cart: UpstreamCart::Rest(cart),
            set_cookies,
        })
    }

    async fn rest_sections(
        &self,
        section_ids: &[String],
        cookies: &SessionCookies,
    ) -> Result<HashMap<String, String>, UpstreamError> {
        let mut sections = HashMap::new();
        for id in section_ids {
            let request = self
                .client
                .get(self.shop_url(""))
                .query(&[("section_id", id)])
                .header(reqwest::header::ACCEPT, "text/html");
            let request = if cookies.is_empty() {
                request
            } else {
                request.header(reqwest::header::COOKIE, cookies.as_header())
            };
            let response = request
                .send()
                .await
                .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
            let html = response
                .text()
                .await
                .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
            sections.insert(id.clone(), html);
        }
        Ok(sections)
    }

    async fn graphql_cart_create(&self) -> Result<UpstreamReply, UpstreamError> {
        const MUTATION: &str = r#"
            mutation cartCreate($input: CartInput!) {
              cartCreate(input: $input) {
                cart {
                  id
                  checkoutUrl
                  totalQuantity
                  lines(first: 100) {
                    edges { node { quantity merchandise { ... on ProductVariant {
                      id title price { amount currencyCode }
                    } } } }
                  }
                }
                userErrors { field message }
              }
            }"#;
        let (body, set_cookies) = self
            .graphql(MUTATION, json!({ "input": {} }))
            .await?;
        let cart = Self::parse_graphql_cart(&body, &["data", "cartCreate"])?;
        Ok(UpstreamReply {
            cart: UpstreamCart::Graphql(cart),
            set_cookies,
        })
    }

    async fn graphql_add_line(
        &self,
        cart_id: &str,
        merchandise_gid: &str,
        quantity: u32,
    ) -> Result<UpstreamReply, UpstreamError> {
        const MUTATION: &str = r#"
            mutation cartLinesAdd($cartId: ID!, $lines: [CartLineInput!]!) {
              cartLinesAdd(cartId: $cartId, lines: $lines) {
                cart {
                  id
                  checkoutUrl
                  totalQuantity
                  lines(first: 100) {
                    edges { node { quantity merchandise { ... on ProductVariant {
                      id title price { amount currencyCode }
                    } } } }
                  }
                }
                userErrors { field message }
              }
            }"#;
        let variables = json!({
            "cartId": cart_id,
            "lines": [{ "merchandiseId": merchandise_gid, "quantity": quantity }],
        });
        let (body, set_cookies) = self.graphql(MUTATION, variables).await?;
        let cart = Self::parse_graphql_cart(&body, &["data", "cartLinesAdd"])?;
        Ok(UpstreamReply {
            cart: UpstreamCart::Graphql(cart),
            set_cookies,
        })
    }

    async fn graphql_get_cart(&self, cart_id: &str) -> Result<UpstreamReply, UpstreamError> {
        const QUERY: &str = r#"
            query getCart($cartId: ID!) {
              cart(id: $cartId) {
                id
                checkoutUrl
                totalQuantity
                lines(first: 100) {
                  edges { node { quantity merchandise { ... on ProductVariant {
                    id title price { amount currencyCode }
                  } } } }
                }
              }
            }"#;
        let (body, set_cookies) = self
            .graphql(QUERY, json!({ "cartId": cart_id }))
            .await?;
        let cart = Self::parse_graphql_cart(&body, &["data"])?;
        Ok(UpstreamReply {
            cart: UpstreamCart::Graphql(cart),
            set_cookies,
        })
    }
}
