//! Cached module document client.
//!
//! Fetches module documents on demand and caches them with a staleness
//! window. At most one fetch is current per client: issuing a new fetch
//! (different module, or a forced refresh) supersedes any still-pending one.
//! A superseded fetch never updates the cache and never surfaces an error —
//! its result is discarded silently.
//!
//! Supersession is modeled with a generation counter rather than an abort
//! handle: every issued fetch takes a fresh generation, and its result is
//! applied only if that generation is still the latest when it completes.
//! This holds up under real parallel callers, not just a single cooperative
//! task.
//!
//! The fetch transport and the clock are both injectable so cache behavior is
//! deterministic under test.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::models::ModuleDocument;

/// Default staleness window for cached module documents.
pub const DEFAULT_CACHE_STALE: Duration = Duration::from_secs(5 * 60);

/// A module fetch that actually failed. Supersession is not a failure and is
/// reported through [`ModuleFetch::Superseded`] instead.
#[derive(Debug)]
pub enum FetchError {
    /// Transport-level failure (connection, timeout).
    Http(String),
    /// Non-success HTTP status.
    Status(u16),
    /// Response body was not a valid module document.
    Decode(String),
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::Http(e) => write!(f, "module fetch failed: {}", e),
            FetchError::Status(code) => write!(f, "module fetch failed: HTTP {}", code),
            FetchError::Decode(e) => write!(f, "module document is invalid: {}", e),
        }
    }
}

impl std::error::Error for FetchError {}

/// Outcome of a [`ModuleClient::get`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleFetch {
    /// The requested document, from cache or freshly fetched.
    Document(ModuleDocument),
    /// A newer request was issued while this one was in flight; the result
    /// was discarded and the cache untouched.
    Superseded,
}

/// Transport for module documents.
#[async_trait]
pub trait ModuleFetcher: Send + Sync {
    async fn fetch(&self, module_id: &str) -> Result<ModuleDocument, FetchError>;
}

/// HTTP transport: GETs `<base>/modules/<id>.json`.
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Self {
        HttpFetcher {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn module_url(&self, module_id: &str) -> String {
        format!("{}/modules/{}.json", self.base_url, module_id)
    }
}

#[async_trait]
impl ModuleFetcher for HttpFetcher {
    async fn fetch(&self, module_id: &str) -> Result<ModuleDocument, FetchError> {
        let response = self
            .client
            .get(self.module_url(module_id))
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<ModuleDocument>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Injectable time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry {
    document: ModuleDocument,
    stored_at: Instant,
}

/// Client with a per-module-id document cache.
///
/// Entries are replaced wholesale on refresh, never mutated in place, and
/// live until [`clear`](ModuleClient::clear) or replacement.
pub struct ModuleClient {
    fetcher: Arc<dyn ModuleFetcher>,
    clock: Arc<dyn Clock>,
    stale_after: Duration,
    cache: Mutex<HashMap<String, CacheEntry>>,
    generation: AtomicU64,
}

impl ModuleClient {
    pub fn new(fetcher: Arc<dyn ModuleFetcher>, stale_after: Duration) -> Self {
        Self::with_clock(fetcher, stale_after, Arc::new(SystemClock))
    }

    pub fn with_clock(
        fetcher: Arc<dyn ModuleFetcher>,
        stale_after: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ModuleClient {
            fetcher,
            clock,
            stale_after,
            cache: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Get a module document, from cache when fresh.
    ///
    /// A cache entry younger than the staleness window is returned without
    /// any I/O (unless `force_refresh`). Otherwise a fetch is issued; if a
    /// newer fetch is issued before it completes, the result is discarded and
    /// [`ModuleFetch::Superseded`] is returned. Failed fetches leave the
    /// cache untouched.
    pub async fn get(
        &self,
        module_id: &str,
        force_refresh: bool,
    ) -> Result<ModuleFetch, FetchError> {
        if !force_refresh {
            let cache = self.cache.lock().expect("cache lock poisoned");
            if let Some(entry) = cache.get(module_id) {
                if self.clock.now().duration_since(entry.stored_at) < self.stale_after {
                    return Ok(ModuleFetch::Document(entry.document.clone()));
                }
            }
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.fetcher.fetch(module_id).await;

        // A newer request took over while we were in flight: drop this
        // result, success or failure, without touching the cache.
        if self.generation.load(Ordering::SeqCst) != generation {
            return Ok(ModuleFetch::Superseded);
        }

        match result {
            Ok(document) => {
                let mut cache = self.cache.lock().expect("cache lock poisoned");
                cache.insert(
                    module_id.to_string(),
                    CacheEntry {
                        document: document.clone(),
                        stored_at: self.clock.now(),
                    },
                );
                Ok(ModuleFetch::Document(document))
            }
            Err(err) => Err(err),
        }
    }

    /// Empty the entire cache.
    pub fn clear(&self) {
        self.cache.lock().expect("cache lock poisoned").clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn document(module_id: &str) -> ModuleDocument {
        ModuleDocument {
            module: module_id.to_string(),
            label: module_id.to_string(),
            version: "1.0.0".to_string(),
            generated_at: "2026-01-01T00:00:00.000Z".to_string(),
            endpoints: Vec::new(),
            token_count: 42,
        }
    }

    /// Fetcher with a configurable per-module delay and a fetch counter.
    struct FakeFetcher {
        delays: HashMap<String, Duration>,
        fail: Vec<String>,
        fetches: AtomicUsize,
    }

    impl FakeFetcher {
        fn new() -> Self {
            FakeFetcher {
                delays: HashMap::new(),
                fail: Vec::new(),
                fetches: AtomicUsize::new(0),
            }
        }

        fn count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ModuleFetcher for FakeFetcher {
        async fn fetch(&self, module_id: &str) -> Result<ModuleDocument, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(module_id) {
                tokio::time::sleep(*delay).await;
            }
            if self.fail.iter().any(|id| id == module_id) {
                return Err(FetchError::Status(500));
            }
            Ok(document(module_id))
        }
    }

    struct ManualClock {
        start: Instant,
        offset: Mutex<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            ManualClock {
                start: Instant::now(),
                offset: Mutex::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn fresh_cache_entry_is_served_without_io() {
        let fetcher = Arc::new(FakeFetcher::new());
        let clock = Arc::new(ManualClock::new());
        let client = ModuleClient::with_clock(
            fetcher.clone(),
            Duration::from_millis(1000),
            clock.clone(),
        );

        let first = client.get("auditing", false).await.unwrap();
        assert!(matches!(first, ModuleFetch::Document(_)));
        assert_eq!(fetcher.count(), 1);

        clock.advance(Duration::from_millis(999));
        let second = client.get("auditing", false).await.unwrap();
        assert!(matches!(second, ModuleFetch::Document(_)));
        assert_eq!(fetcher.count(), 1, "fresh entry must not trigger a fetch");
    }

    #[tokio::test]
    async fn stale_cache_entry_triggers_exactly_one_fetch() {
        let fetcher = Arc::new(FakeFetcher::new());
        let clock = Arc::new(ManualClock::new());
        let client = ModuleClient::with_clock(
            fetcher.clone(),
            Duration::from_millis(1000),
            clock.clone(),
        );

        client.get("auditing", false).await.unwrap();
        clock.advance(Duration::from_millis(1000));
        client.get("auditing", false).await.unwrap();
        assert_eq!(fetcher.count(), 2);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_a_fresh_entry() {
        let fetcher = Arc::new(FakeFetcher::new());
        let client = ModuleClient::new(fetcher.clone(), DEFAULT_CACHE_STALE);

        client.get("queues", false).await.unwrap();
        client.get("queues", false).await.unwrap();
        assert_eq!(fetcher.count(), 1);

        client.get("queues", true).await.unwrap();
        assert_eq!(fetcher.count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_fetch_is_discarded_silently() {
        let mut fetcher = FakeFetcher::new();
        fetcher
            .delays
            .insert("ai-assistants".to_string(), Duration::from_millis(50));
        fetcher
            .delays
            .insert("auditing".to_string(), Duration::from_millis(1));
        let fetcher = Arc::new(fetcher);
        let client = Arc::new(ModuleClient::new(fetcher.clone(), DEFAULT_CACHE_STALE));

        // Slow fetch for A, then a fetch for B before A resolves.
        let slow = tokio::spawn({
            let client = client.clone();
            async move { client.get("ai-assistants", false).await }
        });
        tokio::task::yield_now().await;

        let fast = client.get("auditing", false).await.unwrap();
        assert!(matches!(fast, ModuleFetch::Document(_)));

        let outcome = slow.await.unwrap().unwrap();
        assert_eq!(outcome, ModuleFetch::Superseded);

        // A's payload must never have landed in the cache.
        let cache = client.cache.lock().unwrap();
        assert!(!cache.contains_key("ai-assistants"));
        assert!(cache.contains_key("auditing"));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_failure_is_also_silent() {
        let mut fetcher = FakeFetcher::new();
        fetcher
            .delays
            .insert("queues".to_string(), Duration::from_millis(50));
        fetcher.fail.push("queues".to_string());
        let fetcher = Arc::new(fetcher);
        let client = Arc::new(ModuleClient::new(fetcher, DEFAULT_CACHE_STALE));

        let slow = tokio::spawn({
            let client = client.clone();
            async move { client.get("queues", false).await }
        });
        tokio::task::yield_now().await;

        client.get("system", false).await.unwrap();

        // The failing fetch was superseded, so no error surfaces.
        let outcome = slow.await.unwrap().unwrap();
        assert_eq!(outcome, ModuleFetch::Superseded);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_other_entries_intact() {
        let mut fetcher = FakeFetcher::new();
        fetcher.fail.push("auditing".to_string());
        let fetcher = Arc::new(fetcher);
        let client = ModuleClient::new(fetcher.clone(), DEFAULT_CACHE_STALE);

        client.get("queues", false).await.unwrap();

        let err = client.get("auditing", false).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));

        // The failure must not evict the other module's entry.
        let count_before = fetcher.count();
        let cached = client.get("queues", false).await.unwrap();
        assert!(matches!(cached, ModuleFetch::Document(_)));
        assert_eq!(fetcher.count(), count_before);
    }

    #[tokio::test]
    async fn clear_empties_the_whole_cache() {
        let fetcher = Arc::new(FakeFetcher::new());
        let client = ModuleClient::new(fetcher.clone(), DEFAULT_CACHE_STALE);

        client.get("queues", false).await.unwrap();
        client.get("system", false).await.unwrap();
        assert_eq!(fetcher.count(), 2);

        client.clear();
        client.get("queues", false).await.unwrap();
        client.get("system", false).await.unwrap();
        assert_eq!(fetcher.count(), 4);
    }
}
