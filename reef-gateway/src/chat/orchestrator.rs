//! Conversation orchestrator
//!
//! Pure coordination: classifies the utterance, calls search or the cart
//! gateway, keeps the shown-items tracker current, and returns a
//! structured reply. Holds no network clients of its own; all I/O lives
//! behind the injected services.

use crate::cart::CartGateway;
use crate::catalog::{CatalogCache, search};
use crate::chat::intent::{Intent, IntentClassifier};
use crate::session::ShownItemsTracker;
use shared::{CartSummary, CatalogSnapshot, ErrorCode, ScoredEntry, SessionCookies};
use std::sync::Arc;

/// Shown to the user when a flow fails for reasons they can't act on.
/// Raw upstream error bodies are logged, never surfaced.
const NEUTRAL_FAILURE: &str = "Something went wrong. Please try again.";

const PRODUCTS_INTRO: &str = "Here are some products you might like:";

/// Structured reply for the (out-of-scope) chat surface
#[derive(Debug, Clone)]
pub enum Reply {
    Products {
        intro: String,
        products: Vec<ScoredEntry>,
    },
    Booking {
        url: String,
    },
    PlainText {
        content: String,
    },
    CartMutation {
        summary: CartSummary,
    },
}

/// A reply plus any upstream cookies the transport layer must forward
#[derive(Debug, Clone)]
pub struct OrchestratorResponse {
    pub reply: Reply,
    pub set_cookies: Vec<String>,
}

impl OrchestratorResponse {
    fn plain(content: impl Into<String>) -> Self {
        Self {
            reply: Reply::PlainText {
                content: content.into(),
            },
            set_cookies: Vec::new(),
        }
    }
}

/// Ties search, tracking, and the cart gateway into one entry point
pub struct ConversationOrchestrator {
    catalog: Arc<CatalogCache>,
    cart: CartGateway,
    tracker: Arc<ShownItemsTracker>,
    classifier: Arc<dyn IntentClassifier>,
    booking_url: String,
    result_limit: usize,
}

impl ConversationOrchestrator {
    pub fn new(
        catalog: Arc<CatalogCache>,
        cart: CartGateway,
        tracker: Arc<ShownItemsTracker>,
        classifier: Arc<dyn IntentClassifier>,
        booking_url: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            cart,
            tracker,
            classifier,
            booking_url: booking_url.into(),
            result_limit: crate::catalog::search::DEFAULT_LIMIT,
        }
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = limit;
        self
    }

    /// Handle one user utterance for a session
    pub async fn respond(
        &self,
        session_id: &str,
        utterance: &str,
        cookies: &SessionCookies,
    ) -> OrchestratorResponse {
        // Classification wants catalog terms, but a dead catalog must not
        // take cart mutations down with it.
        let snapshot = match self.catalog.get().await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                tracing::error!(session_id, error = %err, "Catalog unavailable");
                None
            }
        };
        let empty = CatalogSnapshot::new(Vec::new());
        let classify_against = snapshot.as_deref().unwrap_or(&empty);
        let intent = self.classifier.classify(utterance, classify_against).await;

        match intent {
            Intent::ProductQuery { keywords } => {
                let Some(snapshot) = snapshot else {
                    return OrchestratorResponse::plain(NEUTRAL_FAILURE);
                };
                let exclusions = self.tracker.exclusions(session_id);
                let results = search::search(&keywords, &snapshot, &exclusions, self.result_limit);
                self.tracker
                    .record(session_id, results.iter().map(|s| s.entry.id.clone()));
                tracing::debug!(
                    session_id,
                    keywords,
                    count = results.len(),
                    "Answered product query"
                );
                OrchestratorResponse {
                    reply: Reply::Products {
                        intro: PRODUCTS_INTRO.to_string(),
                        products: results,
                    },
                    set_cookies: Vec::new(),
                }
            }
            Intent::AddToCart {
                variant_ref,
                quantity,
            } => match self.cart.add_line(&variant_ref, quantity, cookies).await {
                Ok(outcome) => OrchestratorResponse {
                    reply: Reply::CartMutation {
                        summary: CartSummary::from(&outcome.state),
                    },
                    set_cookies: outcome.set_cookies,
                },
                Err(err) if err.code == ErrorCode::UpstreamRejected => {
                    // the upstream's reason is meant for humans; pass it on
                    OrchestratorResponse::plain(err.message)
                }
                Err(err) if err.code == ErrorCode::UpstreamUnavailable => {
                    // Ambiguous: the add may or may not have applied.
                    // Re-read the authoritative cart before saying anything;
                    // a failed add is never reported as success.
                    tracing::error!(session_id, error = %err, "Add to cart failed ambiguously");
                    match self.cart.get_cart(cookies).await {
                        Ok(outcome) => {
                            tracing::warn!(
                                session_id,
                                total_quantity = outcome.state.total_quantity,
                                "Cart state after ambiguous add failure"
                            );
                            OrchestratorResponse {
                                reply: Reply::PlainText {
                                    content: NEUTRAL_FAILURE.to_string(),
                                },
                                set_cookies: outcome.set_cookies,
                            }
                        }
                        Err(read_err) => {
                            tracing::error!(session_id, error = %read_err, "Post-failure cart read failed");
                            OrchestratorResponse::plain(NEUTRAL_FAILURE)
                        }
                    }
                }
                Err(err) => {
                    tracing::error!(session_id, error = %err, "Add to cart rejected before upstream");
                    OrchestratorResponse::plain(NEUTRAL_FAILURE)
                }
            },
            Intent::Booking => OrchestratorResponse {
                reply: Reply::Booking {
                    url: self.booking_url.clone(),
                },
                set_cookies: Vec::new(),
            },
            Intent::Chat { content } => OrchestratorResponse::plain(content),
        }
    }
}
