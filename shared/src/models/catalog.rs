//! Catalog Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection membership reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRef {
    pub id: String,
    pub title: String,
    pub handle: String,
}

/// One product entry in the catalog snapshot
///
/// Immutable once fetched; the whole snapshot is replaced on refresh,
/// entries are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Opaque upstream identifier
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub product_type: String,
    /// Tag strings as reported by the upstream
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub collections: Vec<CollectionRef>,
    /// Price in minor units (øre, cents)
    pub price_minor_units: i64,
    pub currency: String,
    pub available: bool,
    /// Variant used for add-to-cart actions
    pub primary_variant_id: String,
    pub image_url: Option<String>,
}

/// A full catalog snapshot
///
/// Either fully present or fully absent; readers hold an `Arc` to a
/// published snapshot and never observe a partial refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub entries: Vec<CatalogEntry>,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            fetched_at: Utc::now(),
        }
    }

    /// Age of this snapshot at `now`
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.fetched_at
    }
}

/// A catalog entry paired with its relevance score
///
/// Transient, produced per search call, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredEntry {
    pub entry: CatalogEntry,
    pub score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            id: "gid://shopify/Product/1".into(),
            title: "Marine Peeling".into(),
            description: "Exfoliating marine treatment".into(),
            vendor: "Thalgo".into(),
            product_type: "Skincare".into(),
            tags: vec!["peeling".into()],
            collections: vec![],
            price_minor_units: 64900,
            currency: "NOK".into(),
            available: true,
            primary_variant_id: "gid://shopify/ProductVariant/11".into(),
            image_url: None,
        }
    }

    #[test]
    fn test_entry_roundtrip() {
        let e = entry();
        let json = serde_json::to_string(&e).unwrap();
        let back: CatalogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, e.id);
        assert_eq!(back.vendor, "Thalgo");
        assert_eq!(back.price_minor_units, 64900);
    }

    #[test]
    fn test_entry_defaults_for_optional_metadata() {
        let json = r#"{
            "id": "p1",
            "title": "Body Lotion",
            "price_minor_units": 19900,
            "currency": "NOK",
            "available": true,
            "primary_variant_id": "v1",
            "image_url": null
        }"#;
        let e: CatalogEntry = serde_json::from_str(json).unwrap();
        assert!(e.tags.is_empty());
        assert!(e.collections.is_empty());
        assert_eq!(e.vendor, "");
    }

    #[test]
    fn test_snapshot_age() {
        let snapshot = CatalogSnapshot::new(vec![entry()]);
        let later = snapshot.fetched_at + chrono::Duration::seconds(90);
        assert_eq!(snapshot.age(later).num_seconds(), 90);
    }
}
