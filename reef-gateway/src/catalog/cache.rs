//! Catalog snapshot cache
//!
//! Holds the one published `Arc<CatalogSnapshot>` shared by all request
//! tasks. Snapshots are immutable once published, so readers take no
//! lock beyond the pointer read; only the refresh path is serialized.

use super::source::CatalogSource;
use chrono::Utc;
use parking_lot::RwLock;
use shared::{AppError, AppResult, CatalogSnapshot};
use std::sync::Arc;
use std::time::Duration;

/// TTL-bounded catalog snapshot holder
///
/// Refresh policy:
/// - single-flight: concurrent callers observing staleness collapse into
///   one upstream fetch; the rest await it
/// - stale-while-revalidate: a failed refresh serves the last good
///   snapshot; only a cold start with no snapshot propagates the error
pub struct CatalogCache {
    source: Arc<dyn CatalogSource>,
    ttl: chrono::Duration,
    current: RwLock<Option<Arc<CatalogSnapshot>>>,
    refresh_guard: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for CatalogCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entries = self
            .current
            .read()
            .as_ref()
            .map(|s| s.entries.len())
            .unwrap_or(0);
        f.debug_struct("CatalogCache")
            .field("entries", &entries)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl CatalogCache {
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl: chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(300)),
            current: RwLock::new(None),
            refresh_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Get the current snapshot, refreshing once if missing or expired.
    pub async fn get(&self) -> AppResult<Arc<CatalogSnapshot>> {
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        // First staleness observer refreshes; everyone else queues here
        // and re-checks, so N concurrent stale readers cost one fetch.
        let _guard = self.refresh_guard.lock().await;
        if let Some(snapshot) = self.fresh() {
            return Ok(snapshot);
        }

        match self.source.fetch().await {
            Ok(entries) => {
                let snapshot = Arc::new(CatalogSnapshot::new(entries));
                *self.current.write() = Some(snapshot.clone());
                tracing::info!(entries = snapshot.entries.len(), "Published catalog snapshot");
                Ok(snapshot)
            }
            Err(err) => {
                let stale = self.current.read().clone();
                match stale {
                    Some(snapshot) => {
                        tracing::warn!(
                            error = %err,
                            age_secs = snapshot.age(Utc::now()).num_seconds(),
                            "Catalog refresh failed, serving stale snapshot"
                        );
                        Ok(snapshot)
                    }
                    None => Err(AppError::catalog_unavailable(err.message)),
                }
            }
        }
    }

    fn fresh(&self) -> Option<Arc<CatalogSnapshot>> {
        let guard = self.current.read();
        let snapshot = guard.as_ref()?;
        (snapshot.age(Utc::now()) <= self.ttl).then(|| snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::CatalogEntry;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct CountingSource {
        fetches: AtomicUsize,
        fail: AtomicBool,
        delay: Duration,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                delay: Duration::ZERO,
            }
        }

        fn slow() -> Self {
            Self {
                delay: Duration::from_millis(50),
                ..Self::new()
            }
        }
    }

    fn entry(id: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.into(),
            title: "Marine Peeling".into(),
            description: String::new(),
            vendor: "Thalgo".into(),
            product_type: String::new(),
            tags: vec![],
            collections: vec![],
            price_minor_units: 64900,
            currency: "NOK".into(),
            available: true,
            primary_variant_id: "v1".into(),
            image_url: None,
        }
    }

    #[async_trait]
    impl CatalogSource for CountingSource {
        async fn fetch(&self) -> AppResult<Vec<CatalogEntry>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::catalog_unavailable("catalog endpoint returned 503"));
            }
            Ok(vec![entry("p1")])
        }
    }

    #[tokio::test]
    async fn test_cold_start_fetches_once_then_serves_cached() {
        let source = Arc::new(CountingSource::new());
        let cache = CatalogCache::new(source.clone(), Duration::from_secs(300));

        let first = cache.get().await.unwrap();
        let second = cache.get().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_concurrent_stale_callers_single_flight() {
        let source = Arc::new(CountingSource::slow());
        let cache = Arc::new(CatalogCache::new(source.clone(), Duration::from_secs(300)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get().await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stale_snapshot_served_on_refresh_failure() {
        let source = Arc::new(CountingSource::new());
        // zero TTL: every get() observes staleness and attempts a refresh
        let cache = CatalogCache::new(source.clone(), Duration::ZERO);

        let first = cache.get().await.unwrap();
        source.fail.store(true, Ordering::SeqCst);

        let second = cache.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(source.fetches.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_cold_start_failure_propagates() {
        let source = Arc::new(CountingSource::new());
        source.fail.store(true, Ordering::SeqCst);
        let cache = CatalogCache::new(source, Duration::from_secs(300));

        let err = cache.get().await.unwrap_err();
        assert_eq!(err.code, shared::ErrorCode::CatalogUnavailable);
    }

    #[tokio::test]
    async fn test_expired_snapshot_triggers_refetch() {
        let source = Arc::new(CountingSource::new());
        let cache = CatalogCache::new(source.clone(), Duration::ZERO);

        cache.get().await.unwrap();
        cache.get().await.unwrap();
        assert_eq!(source.fetches.load(Ordering::SeqCst), 2);
    }
}
