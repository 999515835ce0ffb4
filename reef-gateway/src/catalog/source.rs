//! Catalog source seam and the storefront GraphQL implementation

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use shared::{AppError, AppResult, CatalogEntry, CollectionRef};
use std::time::Duration;

const STOREFRONT_API_VERSION: &str = "2023-10";

/// Where catalog snapshots come from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the full catalog. Entries arrive in upstream order, which
    /// downstream scoring relies on for stable tie-breaks.
    async fn fetch(&self) -> AppResult<Vec<CatalogEntry>>;
}

/// Storefront GraphQL catalog source
///
/// One query pulls products (with vendor/type/tags/variants/price) and
/// collections; collection membership is joined onto entries here so the
/// search path never needs a second lookup.
#[derive(Debug, Clone)]
pub struct StorefrontCatalogSource {
    client: Client,
    shop_domain: String,
    storefront_token: String,
    page_size: u32,
}

impl StorefrontCatalogSource {
    pub fn new(shop_domain: impl Into<String>, storefront_token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            shop_domain: shop_domain.into(),
            storefront_token: storefront_token.into(),
            page_size: 250,
        }
    }

    fn query(&self) -> String {
        format!(
            r#"{{
  collections(first: 25) {{
    edges {{ node {{
      id title handle
      products(first: 250) {{ edges {{ node {{ id }} }} }}
    }} }}
  }}
  products(first: {page_size}) {{
    edges {{ node {{
      id title description vendor productType tags
      availableForSale
      featuredImage {{ url }}
      priceRange {{ minVariantPrice {{ amount currencyCode }} }}
      variants(first: 1) {{ edges {{ node {{ id }} }} }}
    }} }}
  }}
}}"#,
            page_size = self.page_size
        )
    }

    fn parse(payload: &Value) -> AppResult<Vec<CatalogEntry>> {
        let data = payload
            .get("data")
            .ok_or_else(|| AppError::catalog_unavailable("catalog reply missing data"))?;

        // collection id -> (ref, member product ids)
        let mut memberships: Vec<(CollectionRef, Vec<String>)> = Vec::new();
        for edge in data
            .pointer("/collections/edges")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
        {
            let node = &edge["node"];
            let collection = CollectionRef {
                id: node["id"].as_str().unwrap_or_default().to_string(),
                title: node["title"].as_str().unwrap_or_default().to_string(),
                handle: node["handle"].as_str().unwrap_or_default().to_string(),
            };
            let members = node
                .pointer("/products/edges")
                .and_then(Value::as_array)
                .map(|edges| {
                    edges
                        .iter()
                        .filter_map(|e| e.pointer("/node/id").and_then(Value::as_str))
                        .map(|s| s.to_string())
                        .collect()
                })
                .unwrap_or_default();
            memberships.push((collection, members));
        }

        let mut entries = Vec::new();
        for edge in data
            .pointer("/products/edges")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
        {
            let node = &edge["node"];
            let id = node["id"].as_str().unwrap_or_default().to_string();
            if id.is_empty() {
                continue;
            }

            let price = node
                .pointer("/priceRange/minVariantPrice/amount")
                .and_then(Value::as_str)
                .and_then(crate::cart::upstream::decimal_to_minor_units)
                .unwrap_or(0);
            let currency = node
                .pointer("/priceRange/minVariantPrice/currencyCode")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let primary_variant_id = node
                .pointer("/variants/edges/0/node/id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let collections = memberships
                .iter()
                .filter(|(_, members)| members.contains(&id))
                .map(|(c, _)| c.clone())
                .collect();

            entries.push(CatalogEntry {
                title: node["title"].as_str().unwrap_or_default().to_string(),
                description: node["description"].as_str().unwrap_or_default().to_string(),
                vendor: node["vendor"].as_str().unwrap_or_default().to_string(),
                product_type: node["productType"].as_str().unwrap_or_default().to_string(),
                tags: node["tags"]
                    .as_array()
                    .map(|tags| {
                        tags.iter()
                            .filter_map(Value::as_str)
                            .map(|s| s.to_string())
                            .collect()
                    })
                    .unwrap_or_default(),
                collections,
                price_minor_units: price,
                currency,
                available: node["availableForSale"].as_bool().unwrap_or(false),
                primary_variant_id,
                image_url: node
                    .pointer("/featuredImage/url")
                    .and_then(Value::as_str)
                    .map(|s| s.to_string()),
                id,
            });
        }
        Ok(entries)
    }
}

#[async_trait]
impl CatalogSource for StorefrontCatalogSource {
    async fn fetch(&self) -> AppResult<Vec<CatalogEntry>> {
        let url = format!(
            "https://{}/api/{}/graphql.json",
            self.shop_domain, STOREFRONT_API_VERSION
        );
        let response = self
            .client
            .post(url)
            .header("X-Shopify-Storefront-Access-Token", &self.storefront_token)
            .json(&json!({ "query": self.query() }))
            .send()
            .await
            .map_err(|e| AppError::catalog_unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::catalog_unavailable(format!(
                "catalog endpoint returned {}",
                response.status()
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AppError::catalog_unavailable(e.to_string()))?;
        let entries = Self::parse(&payload)?;
        tracing::debug!(count = entries.len(), "Fetched catalog snapshot");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_collections_onto_entries() {
        let payload = json!({
            "data": {
                "collections": {"edges": [{"node": {
                    "id": "gid://shopify/Collection/c1",
                    "title": "Skincare",
                    "handle": "skincare",
                    "products": {"edges": [{"node": {"id": "gid://shopify/Product/p1"}}]}
                }}]},
                "products": {"edges": [
                    {"node": {
                        "id": "gid://shopify/Product/p1",
                        "title": "Marine Peeling",
                        "description": "Exfoliating treatment",
                        "vendor": "Thalgo",
                        "productType": "Peeling",
                        "tags": ["face", "peeling"],
                        "availableForSale": true,
                        "featuredImage": {"url": "https://cdn.example/p1.jpg"},
                        "priceRange": {"minVariantPrice": {"amount": "649.00", "currencyCode": "NOK"}},
                        "variants": {"edges": [{"node": {"id": "gid://shopify/ProductVariant/11"}}]}
                    }},
                    {"node": {
                        "id": "gid://shopify/Product/p2",
                        "title": "Body Lotion",
                        "vendor": "Acme",
                        "availableForSale": false,
                        "priceRange": {"minVariantPrice": {"amount": "199.00", "currencyCode": "NOK"}},
                        "variants": {"edges": []}
                    }}
                ]}
            }
        });

        let entries = StorefrontCatalogSource::parse(&payload).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].collections[0].title, "Skincare");
        assert_eq!(entries[0].price_minor_units, 64900);
        assert_eq!(entries[0].primary_variant_id, "gid://shopify/ProductVariant/11");
        assert!(entries[0].available);
        assert!(entries[1].collections.is_empty());
        assert!(!entries[1].available);
    }

    #[test]
    fn test_parse_rejects_missing_data() {
        let err = StorefrontCatalogSource::parse(&json!({"errors": []})).unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::CatalogUnavailable);
    }
}
