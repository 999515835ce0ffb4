//! Per-conversation session state
//!
//! - [`tracker`] - which product ids a conversation has already seen
//! - [`rate_limit`] - sliding-window request limiter for the chat endpoint

pub mod rate_limit;
pub mod tracker;

pub use rate_limit::RateLimiter;
pub use tracker::ShownItemsTracker;
