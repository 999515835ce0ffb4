//! End-to-end API tests against the assembled router with a stubbed
//! upstream backend and a fixed catalog source.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use reef_gateway::cart::gateway::CartGatewayConfig;
use reef_gateway::cart::upstream::{
    CartUpstream, RestCart, RestLine, UpstreamCart, UpstreamError, UpstreamReply,
};
use reef_gateway::cart::CartGateway;
use reef_gateway::catalog::{CatalogCache, CatalogSource};
use reef_gateway::chat::{ConversationOrchestrator, KeywordClassifier};
use reef_gateway::core::{Config, ServerState};
use reef_gateway::session::{RateLimiter, ShownItemsTracker};
use serde_json::Value;
use shared::{AppResult, CatalogEntry, SessionCookies};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tower::ServiceExt;

struct FixedSource(Vec<CatalogEntry>);

#[async_trait]
impl CatalogSource for FixedSource {
    async fn fetch(&self) -> AppResult<Vec<CatalogEntry>> {
        Ok(self.0.clone())
    }
}

#[derive(Default)]
struct StubUpstream {
    reject_add: AtomicBool,
}

fn rest_reply(quantity: u32) -> UpstreamReply {
    UpstreamReply {
        cart: UpstreamCart::Rest(RestCart {
            token: Some("tok".into()),
            items: vec![RestLine {
                variant_id: 987,
                quantity,
                price: 64900,
                title: "Marine Peeling".into(),
            }],
            item_count: quantity,
            currency: "NOK".into(),
        }),
        set_cookies: vec!["cart=tok; path=/".into()],
    }
}

#[async_trait]
impl CartUpstream for StubUpstream {
    async fn rest_add_line(
        &self,
        _variant_id: u64,
        quantity: u32,
        _cookies: &SessionCookies,
    ) -> Result<UpstreamReply, UpstreamError> {
        if self.reject_add.load(Ordering::SeqCst) {
            return Err(UpstreamError::Rejected("Sold out".into()));
        }
        Ok(rest_reply(quantity))
    }

    async fn rest_get_cart(
        &self,
        _cookies: &SessionCookies,
    ) -> Result<UpstreamReply, UpstreamError> {
        Ok(rest_reply(2))
    }

    async fn rest_sections(
        &self,
        _section_ids: &[String],
        _cookies: &SessionCookies,
    ) -> Result<HashMap<String, String>, UpstreamError> {
        Ok(HashMap::new())
    }

    async fn graphql_cart_create(&self) -> Result<UpstreamReply, UpstreamError> {
        unimplemented!("REST path only")
    }

    async fn graphql_add_line(
        &self,
        _cart_id: &str,
        _merchandise_gid: &str,
        _quantity: u32,
    ) -> Result<UpstreamReply, UpstreamError> {
        unimplemented!("REST path only")
    }

    async fn graphql_get_cart(&self, _cart_id: &str) -> Result<UpstreamReply, UpstreamError> {
        unimplemented!("REST path only")
    }
}

fn entry(id: &str, title: &str, vendor: &str) -> CatalogEntry {
    CatalogEntry {
        id: id.into(),
        title: title.into(),
        description: String::new(),
        vendor: vendor.into(),
        product_type: String::new(),
        tags: vec![],
        collections: vec![],
        price_minor_units: 64900,
        currency: "NOK".into(),
        available: true,
        primary_variant_id: format!("gid://shopify/ProductVariant/{}", id),
        image_url: None,
    }
}

fn test_state(upstream: Arc<StubUpstream>, chat_limit: usize) -> ServerState {
    let mut config = Config::from_env();
    config.shop_domain = "shop.example".into();
    config.chat_rate_limit = chat_limit;

    let catalog = Arc::new(CatalogCache::new(
        Arc::new(FixedSource(vec![
            entry("1", "Marine Peeling", "Thalgo"),
            entry("2", "Body Lotion", "Acme"),
        ])),
        Duration::from_secs(300),
    ));
    let cart = CartGateway::new(
        upstream,
        CartGatewayConfig {
            checkout_url: "https://shop.example/cart".into(),
            ..Default::default()
        },
    );
    let tracker = Arc::new(ShownItemsTracker::new());
    let limiter = Arc::new(RateLimiter::new(Duration::from_secs(60), chat_limit));
    let orchestrator = Arc::new(ConversationOrchestrator::new(
        catalog.clone(),
        cart.clone(),
        tracker.clone(),
        Arc::new(KeywordClassifier::default()),
        "https://booking.example",
    ));
    ServerState::with_services(config, catalog, cart, tracker, limiter, orchestrator)
}

fn app(state: ServerState) -> axum::Router {
    reef_gateway::api::router().with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_add_to_cart_forwards_set_cookie() {
    let app = app(test_state(Arc::new(StubUpstream::default()), 10));

    let response = app
        .oneshot(
            Request::post("/api/cart/add")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"variant_ref":"gid://shopify/ProductVariant/987","quantity":2}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(set_cookie.starts_with("cart=tok"));

    let json = body_json(response).await;
    assert_eq!(json["code"], 0);
    assert_eq!(json["data"]["total_quantity"], 2);
    assert_eq!(json["data"]["cart"]["lines"][0]["variant_id"], 987);
}

#[tokio::test]
async fn test_invalid_variant_ref_is_422() {
    let app = app(test_state(Arc::new(StubUpstream::default()), 10));

    let response = app
        .oneshot(
            Request::post("/api/cart/add")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"variant_ref":"gid://shopify/Product/none"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], 1001);
}

#[tokio::test]
async fn test_rejected_add_surfaces_reason() {
    let upstream = Arc::new(StubUpstream::default());
    upstream.reject_add.store(true, Ordering::SeqCst);
    let app = app(test_state(upstream, 10));

    let response = app
        .oneshot(
            Request::post("/api/cart/add")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"variant_ref":"987","quantity":1}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], 1003);
    assert_eq!(json["message"], "Sold out");
}

#[tokio::test]
async fn test_get_cart_returns_canonical_state() {
    let app = app(test_state(Arc::new(StubUpstream::default()), 10));

    let response = app
        .oneshot(
            Request::get("/api/cart")
                .header(header::COOKIE, "cart=tok")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["cart"]["cart_id"], "tok");
    assert_eq!(json["data"]["cart"]["total_quantity"], 2);
}

#[tokio::test]
async fn test_chat_product_query_returns_products() {
    let app = app(test_state(Arc::new(StubUpstream::default()), 10));

    let response = app
        .oneshot(
            Request::post("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    r#"{"session_id":"s1","message":"do you have thalgo products?"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["kind"], "products");
    assert_eq!(json["data"]["session_id"], "s1");
    let products = json["data"]["products"].as_array().unwrap();
    assert_eq!(products[0]["entry"]["vendor"], "Thalgo");
    assert_eq!(products[0]["score"], 15);
}

#[tokio::test]
async fn test_chat_rate_limit_yields_429() {
    let app = app(test_state(Arc::new(StubUpstream::default()), 1));

    let request = || {
        Request::post("/api/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"session_id":"s1","message":"hello"}"#))
            .unwrap()
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.oneshot(request()).await.unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(second).await;
    assert_eq!(json["code"], 4001);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = app(test_state(Arc::new(StubUpstream::default()), 10));
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
}
