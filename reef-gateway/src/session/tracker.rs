//! Shown-items tracking
//!
//! Remembers which product ids each conversation has already been shown,
//! so repeated searches surface something new. State is session-scoped
//! and only grows within a session's lifetime; idle sessions are evicted
//! to bound memory.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct ConversationState {
    shown_entry_ids: HashSet<String>,
    last_seen: DateTime<Utc>,
}

/// Session-keyed store of already-surfaced product ids
///
/// Each session is mutated only by the conversation that owns it; the
/// `DashMap` is the sole cross-session synchronization point.
#[derive(Debug, Default)]
pub struct ShownItemsTracker {
    sessions: DashMap<String, ConversationState>,
}

impl ShownItemsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids to exclude from the next search for this session
    pub fn exclusions(&self, session_id: &str) -> HashSet<String> {
        self.sessions
            .get(session_id)
            .map(|s| s.shown_entry_ids.clone())
            .unwrap_or_default()
    }

    /// Record ids surfaced to this session; creates the session on first use
    pub fn record<I>(&self, session_id: &str, entry_ids: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut state = self
            .sessions
            .entry(session_id.to_string())
            .or_insert_with(|| ConversationState {
                shown_entry_ids: HashSet::new(),
                last_seen: Utc::now(),
            });
        state.shown_entry_ids.extend(entry_ids);
        state.last_seen = Utc::now();
    }

    /// Explicitly forget a session's history
    pub fn reset(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Drop sessions idle longer than `window`; returns the eviction count
    pub fn evict_idle(&self, window: Duration) -> usize {
        let cutoff = Utc::now() - window;
        let before = self.sessions.len();
        self.sessions.retain(|_, state| state.last_seen >= cutoff);
        before - self.sessions.len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
