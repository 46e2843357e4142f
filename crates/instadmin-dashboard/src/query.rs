//! Keyed response cache with time-based staleness and request de-duplication
//!
//! Values are stored as JSON so one cache can hold every payload type.
//! A fetch that is already running for a key is joined rather than
//! repeated, and it runs on its own task: dropping every caller drops
//! interest in the result, not the request, which still lands in the cache.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use instadmin_core::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Cache key made of path-like segments, e.g. `["dashboard", "stats"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    /// Build a key from segments
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Key segments
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Extend the key with another segment
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Whether `prefix` matches the leading segments of this key
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for QueryKey {
    fn from(path: &str) -> Self {
        Self::new(path.split('/').filter(|segment| !segment.is_empty()))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    /// `None` once invalidated
    fetched_at: Option<Instant>,
}

impl CacheEntry {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        self.fetched_at
            .is_some_and(|fetched| fetched.elapsed() < stale_time)
    }
}

type SharedFetch = Shared<BoxFuture<'static, Result<serde_json::Value>>>;

#[derive(Default)]
struct CacheInner {
    entries: DashMap<QueryKey, CacheEntry>,
    in_flight: DashMap<QueryKey, (u64, SharedFetch)>,
    next_fetch_id: AtomicU64,
    /// Bumped on every invalidation so results of older fetches are dropped
    epoch: AtomicU64,
}

/// Shared response cache
///
/// Cloning is cheap; clones share entries and in-flight requests.
#[derive(Clone, Default)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.len())
            .field("in_flight", &self.inner.in_flight.len())
            .finish()
    }
}

impl QueryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value if younger than `stale_time`, otherwise run
    /// `fetcher`, joining a fetch already in flight for the same key
    ///
    /// # Errors
    ///
    /// Returns the fetcher's error, or a serialization error if the cached
    /// value does not decode as `T`.
    pub async fn fetch<T, F, Fut>(&self, key: &QueryKey, stale_time: Duration, fetcher: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(value) = self.fresh_value(key, stale_time) {
            trace!(%key, "Query cache hit");
            return Ok(serde_json::from_value(value)?);
        }

        let shared = match self.inner.in_flight.entry(key.clone()) {
            Entry::Occupied(entry) => {
                debug!(%key, "Joining in-flight query");
                entry.get().1.clone()
            }
            Entry::Vacant(entry) => {
                let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                let shared = self.spawn_fetch(key.clone(), id, fetcher());
                entry.insert((id, shared.clone()));
                shared
            }
        };

        let value = shared.await?;
        Ok(serde_json::from_value(value)?)
    }

    fn spawn_fetch<T, Fut>(&self, key: QueryKey, id: u64, request: Fut) -> SharedFetch
    where
        T: Serialize + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let epoch = inner.epoch.load(Ordering::Acquire);
        debug!(%key, "Fetching query");

        let task: JoinHandle<Result<serde_json::Value>> = tokio::spawn(async move {
            let result = match request.await {
                Ok(value) => serde_json::to_value(value).map_err(Error::from),
                Err(e) => Err(e),
            };

            if let Ok(value) = &result {
                if inner.epoch.load(Ordering::Acquire) == epoch {
                    inner.entries.insert(
                        key.clone(),
                        CacheEntry {
                            value: value.clone(),
                            fetched_at: Some(Instant::now()),
                        },
                    );
                } else {
                    debug!(%key, "Discarding result of invalidated query");
                }
            }
            inner.in_flight.remove_if(&key, |_, (current, _)| *current == id);
            result
        });

        async move {
            task.await
                .unwrap_or_else(|e| Err(Error::Other(format!("Query task failed: {e}"))))
        }
        .boxed()
        .shared()
    }

    fn fresh_value(&self, key: &QueryKey, stale_time: Duration) -> Option<serde_json::Value> {
        self.inner
            .entries
            .get(key)
            .filter(|entry| entry.is_fresh(stale_time))
            .map(|entry| entry.value.clone())
    }

    /// Cached value regardless of staleness
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let value = self.inner.entries.get(key)?.value.clone();
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                // Same key read as a different type
                warn!(%key, "Cached value has unexpected shape: {e}");
                None
            }
        }
    }

    /// Store a value directly, as if just fetched
    ///
    /// # Errors
    ///
    /// Returns a serialization error if `value` cannot be encoded.
    pub fn set<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<()> {
        self.inner.entries.insert(
            key.clone(),
            CacheEntry {
                value: serde_json::to_value(value)?,
                fetched_at: Some(Instant::now()),
            },
        );
        Ok(())
    }

    /// Whether a cached value is younger than `stale_time`
    #[must_use]
    pub fn is_fresh(&self, key: &QueryKey, stale_time: Duration) -> bool {
        self.inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_fresh(stale_time))
    }

    /// Mark a key stale; its last value stays readable through [`Self::get`]
    pub fn invalidate(&self, key: &QueryKey) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.in_flight.remove(key);
        if let Some(mut entry) = self.inner.entries.get_mut(key) {
            entry.fetched_at = None;
        }
        debug!(%key, "Invalidated query");
    }

    /// Mark every key under `prefix` stale
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.in_flight.retain(|key, _| !key.starts_with(prefix));
        for mut entry in self.inner.entries.iter_mut() {
            if entry.key().starts_with(prefix) {
                entry.value_mut().fetched_at = None;
            }
        }
        debug!(%prefix, "Invalidated queries");
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.inner.epoch.fetch_add(1, Ordering::AcqRel);
        self.inner.in_flight.clear();
        self.inner.entries.clear();
    }

    /// Number of cached entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Whether nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }
}

/// Background task running a refetch on a fixed interval
///
/// The first run happens immediately. Stopping the poller ends the loop;
/// a refetch already started completes on its own task.
#[derive(Debug)]
pub struct Poller {
    name: String,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    /// Spawn a poller calling `tick` every `interval`
    pub fn spawn<F, Fut>(name: impl Into<String>, interval: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let token = CancellationToken::new();
        let child = token.child_token();
        let task_name = name.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    _ = ticker.tick() => {
                        trace!(poller = %task_name, "Poll tick");
                        tick().await;
                    }
                }
            }
            debug!(poller = %task_name, "Poller stopped");
        });

        debug!(poller = %name, ?interval, "Poller started");
        Self {
            name,
            token,
            handle,
        }
    }

    /// Poller name, for logging
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stop polling
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Whether [`Self::stop`] was called
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop polling and wait for the loop to exit
    pub async fn shutdown(mut self) {
        self.token.cancel();
        let handle = &mut self.handle;
        if let Err(e) = handle.await {
            warn!("Poller task ended abnormally: {e}");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::atomic::AtomicUsize;

    fn counting_fetch(
        calls: &Arc<AtomicUsize>,
        value: u64,
    ) -> impl FnOnce() -> BoxFuture<'static, Result<u64>> + use<> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(value)
            }
            .boxed()
        }
    }

    #[rstest]
    #[case("dashboard/stats", &["dashboard", "stats"])]
    #[case("/instagram/accounts/", &["instagram", "accounts"])]
    #[case("", &[])]
    fn test_query_key_from_path(#[case] path: &str, #[case] segments: &[&str]) {
        let key = QueryKey::from(path);
        assert_eq!(key.segments(), segments);
    }

    #[test]
    fn test_query_key_prefix() {
        let accounts = QueryKey::from("instagram/accounts");
        let one = accounts.child("7");
        assert_eq!(one.to_string(), "instagram/accounts/7");
        assert!(one.starts_with(&accounts));
        assert!(!accounts.starts_with(&one));
        assert!(!QueryKey::from("posts").starts_with(&accounts));
    }

    #[tokio::test]
    async fn test_fresh_value_is_served_from_cache() {
        let cache = QueryCache::new();
        let key = QueryKey::from("dashboard/stats");
        let calls = Arc::new(AtomicUsize::new(0));

        let first: u64 = cache
            .fetch(&key, Duration::from_secs(60), counting_fetch(&calls, 1))
            .await
            .unwrap();
        let second: u64 = cache
            .fetch(&key, Duration::from_secs(60), counting_fetch(&calls, 2))
            .await
            .unwrap();

        assert_eq!((first, second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_stale_time_always_refetches() {
        let cache = QueryCache::new();
        let key = QueryKey::from("dashboard/stats");
        let calls = Arc::new(AtomicUsize::new(0));

        let _: u64 = cache.fetch(&key, Duration::ZERO, counting_fetch(&calls, 1)).await.unwrap();
        let latest: u64 = cache.fetch(&key, Duration::ZERO, counting_fetch(&calls, 2)).await.unwrap();

        assert_eq!(latest, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.get::<u64>(&key), Some(2));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let cache = QueryCache::new();
        let key = QueryKey::from("instagram/accounts");
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b, c) = tokio::join!(
            cache.fetch::<u64, _, _>(&key, Duration::from_secs(10), counting_fetch(&calls, 5)),
            cache.fetch::<u64, _, _>(&key, Duration::from_secs(10), counting_fetch(&calls, 6)),
            cache.fetch::<u64, _, _>(&key, Duration::from_secs(10), counting_fetch(&calls, 7)),
        );

        assert_eq!((a.unwrap(), b.unwrap(), c.unwrap()), (5, 5, 5));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_errors_are_shared_and_not_cached() {
        let cache = QueryCache::new();
        let key = QueryKey::from("dashboard/stats");

        let failing = || async { Err::<u64, _>(Error::Api { status: 500, message: "boom".to_string() }) };
        let (a, b) = tokio::join!(
            cache.fetch::<u64, _, _>(&key, Duration::from_secs(10), failing),
            cache.fetch::<u64, _, _>(&key, Duration::from_secs(10), failing),
        );
        assert!(matches!(a, Err(Error::Api { status: 500, .. })));
        assert!(matches!(b, Err(Error::Api { status: 500, .. })));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_caller_still_populates_cache() {
        let cache = QueryCache::new();
        let key = QueryKey::from("dashboard/stats");
        let calls = Arc::new(AtomicUsize::new(0));

        let pending = cache.fetch::<u64, _, _>(&key, Duration::from_secs(10), counting_fetch(&calls, 9));
        // Poll once so the request starts, then lose interest
        let _ = tokio::time::timeout(Duration::from_millis(1), pending).await;

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get::<u64>(&key), Some(9));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_keeps_value_but_forces_refetch() {
        let cache = QueryCache::new();
        let key = QueryKey::from("instagram/accounts");
        let calls = Arc::new(AtomicUsize::new(0));

        let _: u64 = cache.fetch(&key, Duration::from_secs(60), counting_fetch(&calls, 1)).await.unwrap();
        cache.invalidate(&key);

        assert!(!cache.is_fresh(&key, Duration::from_secs(60)));
        assert_eq!(cache.get::<u64>(&key), Some(1));

        let refreshed: u64 = cache
            .fetch(&key, Duration::from_secs(60), counting_fetch(&calls, 2))
            .await
            .unwrap();
        assert_eq!(refreshed, 2);
    }

    #[test]
    fn test_invalidate_prefix_and_clear() {
        let cache = QueryCache::new();
        let stale = Duration::from_secs(60);
        let accounts = QueryKey::from("instagram/accounts");
        let account = accounts.child("3");
        let stats = QueryKey::from("dashboard/stats");

        cache.set(&accounts, &vec![1, 2, 3]).unwrap();
        cache.set(&account, &3).unwrap();
        cache.set(&stats, &"ok").unwrap();

        cache.invalidate_prefix(&accounts);
        assert!(!cache.is_fresh(&accounts, stale));
        assert!(!cache.is_fresh(&account, stale));
        assert!(cache.is_fresh(&stats, stale));
        assert_eq!(cache.len(), 3);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get::<String>(&stats), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_ticks_until_stopped() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let poller = Poller::spawn("test", Duration::from_secs(30), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        // First tick fires immediately, then every 30s
        tokio::time::sleep(Duration::from_secs(65)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);

        poller.stop();
        assert!(poller.is_stopped());
        poller.shutdown().await;

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_poller_stops_it() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let poller = Poller::spawn("dropped", Duration::from_secs(10), move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_secs(1)).await;
        drop(poller);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}
