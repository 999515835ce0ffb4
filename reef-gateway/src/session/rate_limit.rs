//! Sliding-window rate limiting
//!
//! In-memory, per-identifier request windows for the chat endpoint.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

/// Sliding-window request limiter
#[derive(Debug)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    requests: DashMap<String, Vec<DateTime<Utc>>>,
}

impl RateLimiter {
    pub fn new(window: std::time::Duration, max_requests: usize) -> Self {
        Self {
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::seconds(60)),
            max_requests,
            requests: DashMap::new(),
        }
    }

    /// Record an attempt; `true` means allowed
    pub fn check(&self, identifier: &str) -> bool {
        self.check_at(identifier, Utc::now())
    }

    fn check_at(&self, identifier: &str, now: DateTime<Utc>) -> bool {
        let cutoff = now - self.window;
        let mut recent = self.requests.entry(identifier.to_string()).or_default();
        recent.retain(|ts| *ts >= cutoff);
        if recent.len() >= self.max_requests {
            return false;
        }
        recent.push(now);
        true
    }
}

impl Default for RateLimiter {
    /// 10 requests per minute, matching the chat endpoint's historical limit
    fn default() -> Self {
        Self::new(std::time::Duration::from_secs(60), 10)
    }
}
