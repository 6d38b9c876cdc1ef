//! TTL cache guarding the index fetch.
//!
//! The whole catalog comes from one upstream document, so the cache is a
//! single slot: the parsed [`Catalog`] plus the instant it was fetched.

use crate::catalog::{Catalog, parse_index};
use crate::docs_client::FetchError;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// How long a fetched catalog stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Provider of the raw index document.
#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_index(&self) -> Result<String, FetchError>;
}

#[derive(Clone)]
struct CacheEntry {
    catalog: Arc<Catalog>,
    fetched_at: Instant,
}

pub struct CatalogCache {
    source: Arc<dyn IndexSource>,
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
}

impl CatalogCache {
    pub fn new(source: Arc<dyn IndexSource>, ttl: Duration) -> Self {
        Self {
            source,
            ttl,
            slot: RwLock::new(None),
        }
    }

    /// Fetch, parse and store unconditionally. On failure the slot keeps
    /// whatever it held, so an already cached catalog stays available.
    pub async fn refresh(&self) -> Result<Arc<Catalog>, FetchError> {
        let text = self.source.fetch_index().await?;
        let catalog = Arc::new(parse_index(&text));
        tracing::info!(
            "Catalog refreshed: {} components in {} categories",
            catalog.component_count(),
            catalog.category_count()
        );

        let mut slot = self.slot.write().await;
        *slot = Some(CacheEntry {
            catalog: catalog.clone(),
            fetched_at: Instant::now(),
        });
        Ok(catalog)
    }

    /// Return the cached catalog, refreshing when forced, missing or expired.
    /// A failed refresh falls back to the stale entry when one exists; the
    /// error surfaces only with nothing cached at all.
    ///
    /// The slot lock is not held across the fetch, so concurrent readers of
    /// an expired entry may each trigger a refetch. The last write wins.
    pub async fn get(&self, force_refresh: bool) -> Result<Arc<Catalog>, FetchError> {
        let cached = self.slot.read().await.clone();

        if !force_refresh {
            if let Some(entry) = &cached {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Ok(entry.catalog.clone());
                }
            }
        }

        match self.refresh().await {
            Ok(catalog) => Ok(catalog),
            Err(err) => match cached {
                Some(entry) => {
                    tracing::warn!("Index refresh failed, serving stale catalog: {}", err);
                    Ok(entry.catalog)
                }
                None => Err(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const INDEX: &str = "\
## Componentes de formulario
- [Botón](https://x/componente-button-codigo.html.md)
";

    struct StubSource {
        body: String,
        offline: AtomicBool,
        fetches: AtomicUsize,
    }

    impl StubSource {
        fn new(body: &str) -> Arc<Self> {
            Arc::new(Self {
                body: body.to_string(),
                offline: AtomicBool::new(false),
                fetches: AtomicUsize::new(0),
            })
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl IndexSource for StubSource {
        async fn fetch_index(&self) -> Result<String, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                Err(FetchError::NotFound("stub offline".to_string()))
            } else {
                Ok(self.body.clone())
            }
        }
    }

    #[tokio::test]
    async fn fresh_entries_are_served_without_refetching() {
        let source = StubSource::new(INDEX);
        let cache = CatalogCache::new(source.clone(), DEFAULT_TTL);

        let first = cache.get(false).await.unwrap();
        let second = cache.get(false).await.unwrap();

        assert_eq!(source.fetches(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.contains_key("botón"));
    }

    #[tokio::test]
    async fn expired_entries_trigger_one_refetch_per_lookup() {
        let source = StubSource::new(INDEX);
        let cache = CatalogCache::new(source.clone(), Duration::ZERO);

        cache.get(false).await.unwrap();
        assert_eq!(source.fetches(), 1);

        cache.get(false).await.unwrap();
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn forced_refresh_bypasses_a_fresh_entry() {
        let source = StubSource::new(INDEX);
        let cache = CatalogCache::new(source.clone(), DEFAULT_TTL);

        cache.get(false).await.unwrap();
        cache.get(true).await.unwrap();

        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn failed_refresh_serves_the_stale_catalog() {
        let source = StubSource::new(INDEX);
        let cache = CatalogCache::new(source.clone(), DEFAULT_TTL);

        let original = cache.get(false).await.unwrap();
        source.set_offline(true);

        let fallback = cache.get(true).await.unwrap();
        assert!(Arc::ptr_eq(&original, &fallback));
        assert!(fallback.contains_key("botón"));
    }

    #[tokio::test]
    async fn refresh_reports_the_failure_but_keeps_the_slot() {
        let source = StubSource::new(INDEX);
        let cache = CatalogCache::new(source.clone(), Duration::ZERO);

        cache.get(false).await.unwrap();
        source.set_offline(true);

        assert!(cache.refresh().await.is_err());

        // expired slot, failing source: still falls back to the old entry
        let catalog = cache.get(false).await.unwrap();
        assert!(catalog.contains_key("botón"));
    }

    #[tokio::test]
    async fn an_empty_cache_with_a_failing_source_errors() {
        let source = StubSource::new(INDEX);
        source.set_offline(true);
        let cache = CatalogCache::new(source, DEFAULT_TTL);

        assert!(cache.get(false).await.is_err());
    }
}
