//! Host-page cookie watching
//!
//! Browsers expose no change event for cookies, so the bridge polls on a
//! fixed interval and reports only actual changes of the cart-identity
//! cookie. Interval and comparison are injectable so the cadence can be
//! tuned (and tested) without touching the loop.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Read access to the host page's cookie jar.
///
/// The bridge only ever reads cookies; it never mints them.
pub trait CookieJar: Send + Sync {
    /// One cookie value by name
    fn get(&self, name: &str) -> Option<String>;
    /// The full `Cookie` header for forwarding to the gateway
    fn header(&self) -> String;
}

type CompareFn = dyn Fn(&Option<String>, &Option<String>) -> bool + Send + Sync;

/// Polls one cookie and reports changes
pub struct CookieWatcher {
    jar: Arc<dyn CookieJar>,
    cookie_name: String,
    interval: std::time::Duration,
    /// Returns `true` when the two observations are equal
    compare: Box<CompareFn>,
    last: Option<String>,
}

impl std::fmt::Debug for CookieWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieWatcher")
            .field("cookie_name", &self.cookie_name)
            .field("interval", &self.interval)
            .finish()
    }
}

impl CookieWatcher {
    pub fn new(
        jar: Arc<dyn CookieJar>,
        cookie_name: impl Into<String>,
        interval: std::time::Duration,
    ) -> Self {
        Self {
            jar,
            cookie_name: cookie_name.into(),
            interval,
            compare: Box::new(|a, b| a == b),
            last: None,
        }
    }

    /// Swap in a custom equality check
    pub fn with_compare<F>(mut self, compare: F) -> Self
    where
        F: Fn(&Option<String>, &Option<String>) -> bool + Send + Sync + 'static,
    {
        self.compare = Box::new(compare);
        self
    }

    /// One poll step. Returns the new value when the cookie changed since
    /// the previous observation, `None` otherwise.
    pub fn poll_once(&mut self) -> Option<Option<String>> {
        let current = self.jar.get(&self.cookie_name);
        if (self.compare)(&self.last, &current) {
            return None;
        }
        self.last = current.clone();
        Some(current)
    }

    /// Run the poll loop until cancelled; change events arrive on the
    /// returned channel. The loop owns the watcher.
    pub fn spawn(mut self, shutdown: CancellationToken) -> mpsc::UnboundedReceiver<Option<String>> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Some(change) = self.poll_once()
                            && tx.send(change).is_err()
                        {
                            break;
                        }
                    }
                    _ = shutdown.cancelled() => {
                        tracing::debug!("Cookie watcher stopped");
                        break;
                    }
                }
            }
        });
        rx
    }
}
