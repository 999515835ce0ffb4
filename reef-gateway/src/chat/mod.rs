//! Conversation coordination
//!
//! - [`intent`] - the NLP collaborator contract and the deterministic
//!   keyword fallback
//! - [`orchestrator`] - turns classified intents into structured replies

pub mod intent;
pub mod orchestrator;

pub use intent::{Intent, IntentClassifier, KeywordClassifier};
pub use orchestrator::{ConversationOrchestrator, OrchestratorResponse, Reply};
