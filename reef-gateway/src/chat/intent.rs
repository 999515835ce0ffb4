//! Intent classification seam
//!
//! The natural-language model lives outside this system; all the
//! orchestrator needs is something that maps an utterance to an
//! [`Intent`]. [`KeywordClassifier`] is the deterministic fallback used
//! when no model-backed classifier is wired in, matching action words
//! plus live vendor/type/tag terms from the current catalog snapshot.

use async_trait::async_trait;
use shared::{CatalogSnapshot, VariantRef};

/// What the shopper is asking for
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Free-text product search
    ProductQuery { keywords: String },
    /// Cart mutation
    AddToCart {
        variant_ref: VariantRef,
        quantity: u32,
    },
    /// Appointment booking
    Booking,
    /// Anything else; `content` is what the collaborator wants shown
    Chat { content: String },
}

/// The NLP collaborator contract
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, utterance: &str, snapshot: &CatalogSnapshot) -> Intent;
}

/// Deterministic keyword classifier
///
/// A message counts as a product request when it carries an action term
/// or mentions any vendor, product type, or tag present in the snapshot.
/// The matched catalog term becomes the search keywords so that "do you
/// have thalgo products?" searches for "thalgo", not the whole sentence.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    action_terms: Vec<String>,
    booking_terms: Vec<String>,
    fallback_reply: String,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            action_terms: ["show", "see", "buy", "looking for", "need", "more"]
                .map(String::from)
                .to_vec(),
            booking_terms: ["book", "appointment", "reservation"]
                .map(String::from)
                .to_vec(),
            fallback_reply: "I can help you find products or book an appointment.".to_string(),
        }
    }
}

impl KeywordClassifier {
    pub fn new(
        action_terms: Vec<String>,
        booking_terms: Vec<String>,
        fallback_reply: impl Into<String>,
    ) -> Self {
        Self {
            action_terms,
            booking_terms,
            fallback_reply: fallback_reply.into(),
        }
    }

    /// First snapshot metadata term the message mentions
    fn catalog_term(&self, message: &str, snapshot: &CatalogSnapshot) -> Option<String> {
        for entry in &snapshot.entries {
            let vendor = entry.vendor.to_lowercase();
            if !vendor.is_empty() && message.contains(&vendor) {
                return Some(vendor);
            }
            let product_type = entry.product_type.to_lowercase();
            if !product_type.is_empty() && message.contains(&product_type) {
                return Some(product_type);
            }
            for tag in &entry.tags {
                let tag = tag.to_lowercase();
                if !tag.is_empty() && message.contains(&tag) {
                    return Some(tag);
                }
            }
        }
        None
    }
}

#[async_trait]
impl IntentClassifier for KeywordClassifier {
    async fn classify(&self, utterance: &str, snapshot: &CatalogSnapshot) -> Intent {
        let message = utterance.to_lowercase();

        if self.booking_terms.iter().any(|t| message.contains(t)) {
            return Intent::Booking;
        }

        let catalog_term = self.catalog_term(&message, snapshot);
        let has_action_term = self.action_terms.iter().any(|t| message.contains(t));

        if let Some(term) = catalog_term {
            return Intent::ProductQuery { keywords: term };
        }
        if has_action_term {
            return Intent::ProductQuery {
                keywords: utterance.trim().to_string(),
            };
        }

        Intent::Chat {
            content: self.fallback_reply.clone(),
        }
    }
}
