//! The query cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use showcase_core::CatalogResult;
use showcase_data::RetryPolicy;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::event::{QueryEvent, EVENT_CAPACITY};
use crate::key::QueryKey;
use crate::policy::QueryPolicy;
use crate::state::{QueryState, QueryStatus};

/// Produces one fetch attempt. Called again for every retry.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, CatalogResult<T>> + Send + Sync>;

type SharedFetch<T> = Shared<BoxFuture<'static, CatalogResult<T>>>;

type Entries<T> = Arc<Mutex<HashMap<QueryKey, Entry<T>>>>;

struct Entry<T> {
    state: watch::Sender<QueryState<T>>,
    fetched_at: Option<Instant>,
    invalidated: bool,
    /// Sequence number of the latest fetch issued for this key.
    issued: u64,
    inflight: Option<SharedFetch<T>>,
    fetch: Option<Fetcher<T>>,
    policy: Option<QueryPolicy>,
}

impl<T: Clone> Entry<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(QueryState::idle());
        Self {
            state,
            fetched_at: None,
            invalidated: false,
            issued: 0,
            inflight: None,
            fetch: None,
            policy: None,
        }
    }

    fn is_fresh(&self, now: Instant) -> bool {
        let Some(policy) = &self.policy else {
            return false;
        };
        !self.invalidated
            && self.state.borrow().status == QueryStatus::Success
            && self
                .fetched_at
                .is_some_and(|at| now.saturating_duration_since(at) < policy.stale_time)
    }

    fn has_data(&self) -> bool {
        self.state.borrow().data.is_some()
    }

    fn snapshot(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }
}

/// Diagnostic view of one entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryInfo {
    pub status: QueryStatus,
    pub updated_at: Option<DateTime<Utc>>,
    pub is_stale: bool,
    pub is_fetching: bool,
}

/// Key to entry map for one query family.
///
/// - A fresh successful entry is returned without calling the fetcher.
/// - Concurrent calls for a key share one in-flight fetch.
/// - A stale entry is returned immediately while a background fetch runs.
/// - Failed attempts are retried per the query's [`RetryPolicy`].
/// - A response older than the latest fetch issued for its key is dropped.
///
/// In-flight fetches are never cancelled: each runs on its own task and
/// settles into the cache even if every caller has gone away.
pub struct QueryCache<T> {
    entries: Entries<T>,
    next_seq: Arc<AtomicU64>,
    events: broadcast::Sender<QueryEvent>,
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            next_seq: Arc::clone(&self.next_seq),
            events: self.events.clone(),
        }
    }
}

impl<T> Default for QueryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> QueryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a cache with its own event channel.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self::with_events(events)
    }

    /// Create a cache publishing to a shared event channel.
    pub fn with_events(events: broadcast::Sender<QueryEvent>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            events,
        }
    }

    /// Resolve `key`, fetching only when there is no fresh result.
    ///
    /// Returns once the key has data or has settled. When stale data exists
    /// it is returned at once with `is_fetching` set while the re-fetch runs.
    pub async fn query(&self, key: &QueryKey, policy: &QueryPolicy, fetch: Fetcher<T>) -> QueryState<T> {
        let pending = {
            let mut entries = self.entries.lock();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.policy = Some(policy.clone());
            entry.fetch = Some(Arc::clone(&fetch));

            if !policy.enabled {
                return entry.snapshot();
            }
            if entry.is_fresh(Instant::now()) {
                debug!(key = %key, "query cache hit");
                return entry.snapshot();
            }

            let pending = if let Some(inflight) = entry.inflight.clone() {
                debug!(key = %key, "joining in-flight fetch");
                inflight
            } else {
                self.start_fetch(key, entry, fetch)
            };
            if entry.has_data() {
                debug!(key = %key, "serving stale data while revalidating");
                return entry.snapshot();
            }
            pending
        };

        self.settled(key, pending).await
    }

    /// Force a fetch for `key` regardless of freshness or in-flight work.
    ///
    /// Uses the fetcher and policy of the last `query` for the key; a key
    /// that was never queried is returned unchanged.
    pub async fn refetch(&self, key: &QueryKey) -> QueryState<T> {
        let pending = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return QueryState::idle();
            };
            let Some(fetch) = entry.fetch.clone() else {
                return entry.snapshot();
            };
            debug!(key = %key, "forced refetch");
            self.start_fetch(key, entry, fetch)
        };

        self.settled(key, pending).await
    }

    /// Start background re-fetches of stale entries whose policy asks for
    /// focus re-fetching. Returns the number of fetches started.
    pub fn focus(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let mut started = 0;
        for (key, entry) in entries.iter_mut() {
            let wants_refetch = entry
                .policy
                .as_ref()
                .is_some_and(|p| p.enabled && p.refetch_on_focus);
            if !wants_refetch || entry.inflight.is_some() || entry.is_fresh(now) {
                continue;
            }
            if let Some(fetch) = entry.fetch.clone() {
                debug!(key = %key, "revalidating on focus");
                let _ = self.start_fetch(key, entry, fetch);
                started += 1;
            }
        }
        started
    }

    /// Current state of `key` without fetching.
    pub fn snapshot(&self, key: &QueryKey) -> QueryState<T> {
        self.entries
            .lock()
            .get(key)
            .map(Entry::snapshot)
            .unwrap_or_default()
    }

    /// Watch `key` for state changes.
    pub fn subscribe(&self, key: &QueryKey) -> watch::Receiver<QueryState<T>> {
        self.entries
            .lock()
            .entry(key.clone())
            .or_insert_with(Entry::new)
            .state
            .subscribe()
    }

    /// Subscribe to fetch events.
    pub fn events(&self) -> broadcast::Receiver<QueryEvent> {
        self.events.subscribe()
    }

    /// Mark `key` stale so the next query re-fetches it.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.entries.lock().get_mut(key) {
            entry.invalidated = true;
        }
    }

    /// Drop every entry. In-flight fetches finish but are discarded.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Diagnostics for `key`.
    pub fn entry_info(&self, key: &QueryKey) -> Option<EntryInfo> {
        let now = Instant::now();
        self.entries.lock().get(key).map(|entry| {
            let state = entry.state.borrow();
            EntryInfo {
                status: state.status,
                updated_at: state.updated_at,
                is_stale: !entry.is_fresh(now),
                is_fetching: state.is_fetching,
            }
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Await `pending`, then follow any fetch that superseded it until the
    /// key has data or has settled.
    async fn settled(&self, key: &QueryKey, mut pending: SharedFetch<T>) -> QueryState<T> {
        loop {
            let _ = pending.await;
            pending = {
                let entries = self.entries.lock();
                let Some(entry) = entries.get(key) else {
                    return QueryState::idle();
                };
                match entry.inflight.clone() {
                    Some(newer) if !entry.has_data() => newer,
                    _ => return entry.snapshot(),
                }
            };
            debug!(key = %key, "awaiting superseding fetch");
        }
    }

    /// Issue a new fetch for `entry`, superseding any in flight.
    fn start_fetch(&self, key: &QueryKey, entry: &mut Entry<T>, fetch: Fetcher<T>) -> SharedFetch<T> {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        entry.issued = seq;

        let retry = entry
            .policy
            .as_ref()
            .map(|p| p.retry.clone())
            .unwrap_or_default();

        let fut = run_fetch(
            Arc::clone(&self.entries),
            self.events.clone(),
            key.clone(),
            seq,
            retry,
            fetch,
        )
        .boxed()
        .shared();

        entry.inflight = Some(fut.clone());
        entry.state.send_modify(QueryState::begin_fetch);
        tokio::spawn(fut.clone());
        fut
    }
}

async fn run_fetch<T>(
    entries: Entries<T>,
    events: broadcast::Sender<QueryEvent>,
    key: QueryKey,
    seq: u64,
    retry: RetryPolicy,
    fetch: Fetcher<T>,
) -> CatalogResult<T>
where
    T: Clone + Send + Sync + 'static,
{
    let mut retries = 0;
    let result = loop {
        match fetch().await {
            Ok(data) => break Ok(data),
            Err(error) => {
                let will_retry = retry.should_retry(&error, retries);
                warn!(key = %key, attempt = retries + 1, will_retry, error = %error, "query fetch failed");
                let _ = events.send(QueryEvent::AttemptFailed {
                    key: key.clone(),
                    attempt: retries + 1,
                    error: error.clone(),
                    will_retry,
                });
                if !will_retry {
                    break Err(error);
                }

                retries += 1;
                if let Some(entry) = entries.lock().get_mut(&key) {
                    if entry.issued == seq {
                        entry.state.send_modify(|s| s.failure_count = retries);
                    }
                }
                tokio::time::sleep(backoff_delay(&retry, retries - 1)).await;
            }
        }
    };

    settle(&entries, &events, &key, seq, &result);
    result
}

fn backoff_delay(retry: &RetryPolicy, attempt: u32) -> Duration {
    retry.backoff.delay_for_attempt(attempt)
}

fn settle<T: Clone>(
    entries: &Entries<T>,
    events: &broadcast::Sender<QueryEvent>,
    key: &QueryKey,
    seq: u64,
    result: &CatalogResult<T>,
) {
    let mut entries = entries.lock();
    let Some(entry) = entries.get_mut(key) else {
        debug!(key = %key, "entry cleared before fetch settled");
        return;
    };
    if entry.issued != seq {
        debug!(key = %key, seq, latest = entry.issued, "discarding superseded response");
        return;
    }

    entry.inflight = None;
    let status = match result {
        Ok(data) => {
            entry.fetched_at = Some(Instant::now());
            entry.invalidated = false;
            entry.state.send_modify(|s| s.succeed(data.clone()));
            QueryStatus::Success
        }
        Err(error) => {
            entry.state.send_modify(|s| s.fail(error.clone()));
            QueryStatus::Error
        }
    };
    debug!(key = %key, %status, "query settled");
    let _ = events.send(QueryEvent::Settled {
        key: key.clone(),
        status,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_core::{CatalogError, ProductId};
    use std::sync::atomic::AtomicUsize;

    fn counting<F>(calls: &Arc<AtomicUsize>, delay: Duration, f: F) -> Fetcher<String>
    where
        F: Fn(usize) -> CatalogResult<String> + Send + Sync + 'static,
    {
        let calls = Arc::clone(calls);
        Arc::new(move || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            let result = f(n);
            async move {
                tokio::time::sleep(delay).await;
                result
            }
            .boxed()
        })
    }

    fn five_minutes() -> QueryPolicy {
        QueryPolicy::new(Duration::from_secs(5 * 60))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_result_is_served_without_fetching() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::from_millis(50), |n| Ok(format!("page-{n}")));
        let key = QueryKey::products(30, 0);

        let first = cache.query(&key, &five_minutes(), fetch.clone()).await;
        assert!(first.is_success());
        assert_eq!(first.data.as_deref(), Some("page-0"));

        tokio::time::advance(Duration::from_secs(4 * 60 + 59)).await;
        let second = cache.query(&key, &five_minutes(), fetch).await;
        assert_eq!(second.data.as_deref(), Some("page-0"));
        assert!(!second.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_triggers_one_background_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::from_millis(50), |n| Ok(format!("page-{n}")));
        let key = QueryKey::products(30, 0);

        cache.query(&key, &five_minutes(), fetch.clone()).await;
        tokio::time::advance(Duration::from_secs(5 * 60)).await;

        let stale = cache.query(&key, &five_minutes(), fetch.clone()).await;
        assert!(stale.is_success());
        assert!(stale.is_fetching);
        assert_eq!(stale.data.as_deref(), Some("page-0"));

        let mut rx = cache.subscribe(&key);
        let settled = rx.wait_for(|s| !s.is_fetching).await.unwrap().clone();
        assert_eq!(settled.data.as_deref(), Some("page-1"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let again = cache.query(&key, &five_minutes(), fetch).await;
        assert!(!again.is_fetching);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_queries_are_coalesced() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::from_secs(1), |n| Ok(format!("page-{n}")));
        let key = QueryKey::products(30, 30);
        let policy = five_minutes();

        let (a, b) = tokio::join!(
            cache.query(&key, &policy, fetch.clone()),
            cache.query(&key, &policy, fetch.clone()),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.data, b.data);
        assert_eq!(a.data.as_deref(), Some("page-0"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_fetch_independently() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |n| Ok(format!("page-{n}")));

        cache.query(&QueryKey::products(30, 0), &five_minutes(), fetch.clone()).await;
        cache.query(&QueryKey::products(30, 30), &five_minutes(), fetch).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |n| {
            if n < 2 {
                Err(CatalogError::transport("Network Error", None))
            } else {
                Ok("recovered".to_string())
            }
        });

        let state = cache.query(&QueryKey::categories(), &five_minutes(), fetch).await;
        assert!(state.is_success());
        assert_eq!(state.data.as_deref(), Some("recovered"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_after_three_attempts() {
        let cache = QueryCache::new();
        let mut events = cache.events();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |_| {
            Err(CatalogError::transport("Request failed with status code 500", Some(500)))
        });
        let key = QueryKey::products(30, 0);

        let state = cache.query(&key, &five_minutes(), fetch).await;
        assert!(state.is_error());
        assert!(state.data.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let mut retries = Vec::new();
        while let Ok(event) = events.try_recv() {
            if let QueryEvent::AttemptFailed { attempt, will_retry, .. } = event {
                retries.push((attempt, will_retry));
            }
        }
        assert_eq!(retries, vec![(1, true), (2, true), (3, false)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_not_retried() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |_| Err(CatalogError::NotFound(ProductId::new(0))));

        let state = cache.query(&QueryKey::product(ProductId::new(0)), &five_minutes(), fetch).await;
        assert_eq!(state.error, Some(CatalogError::NotFound(ProductId::new(0))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_entry_is_refetched_on_next_query() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |n| {
            if n == 0 {
                Err(CatalogError::Decode("bad".into()))
            } else {
                Ok("ok".to_string())
            }
        });
        let key = QueryKey::categories();

        assert!(cache.query(&key, &five_minutes(), fetch.clone()).await.is_error());
        let state = cache.query(&key, &five_minutes(), fetch).await;
        assert!(state.is_success());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_bypasses_freshness() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |n| Ok(format!("v{n}")));
        let key = QueryKey::categories();

        cache.query(&key, &five_minutes(), fetch).await;
        let state = cache.refetch(&key).await;
        assert_eq!(state.data.as_deref(), Some("v1"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_of_unknown_key_is_idle() {
        let cache: QueryCache<String> = QueryCache::new();
        let state = cache.refetch(&QueryKey::categories()).await;
        assert_eq!(state.status, QueryStatus::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_response_is_discarded() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let slow_then_fast: Fetcher<String> = {
            let calls = Arc::clone(&calls);
            Arc::new(move || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    let (delay, value) = if n == 0 { (10, "old") } else { (1, "new") };
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    Ok(value.to_string())
                }
                .boxed()
            })
        };
        let key = QueryKey::products(30, 0);

        let first = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            let fetch = slow_then_fast.clone();
            async move { cache.query(&key, &five_minutes(), fetch).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let refetched = cache.refetch(&key).await;
        assert_eq!(refetched.data.as_deref(), Some("new"));

        let first = first.await.unwrap();
        assert_eq!(first.data.as_deref(), Some("new"));

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(cache.snapshot(&key).data.as_deref(), Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_joined_caller_waits_for_slower_superseding_fetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fast_then_slow: Fetcher<String> = {
            let calls = Arc::clone(&calls);
            Arc::new(move || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    let (delay, value) = if n == 0 { (1, "old") } else { (10, "new") };
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                    Ok(value.to_string())
                }
                .boxed()
            })
        };
        let key = QueryKey::products(30, 0);

        let first = tokio::spawn({
            let cache = cache.clone();
            let key = key.clone();
            let fetch = fast_then_slow.clone();
            async move { cache.query(&key, &five_minutes(), fetch).await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;

        let refetched = cache.refetch(&key).await;
        assert_eq!(refetched.data.as_deref(), Some("new"));

        let first = first.await.unwrap();
        assert!(first.is_success());
        assert!(!first.is_fetching);
        assert_eq!(first.data.as_deref(), Some("new"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_query_never_fetches() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |_| Ok("x".to_string()));
        let policy = five_minutes().with_enabled(false);

        let state = cache.query(&QueryKey::product(ProductId::new(0)), &policy, fetch).await;
        assert_eq!(state.status, QueryStatus::Idle);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_next_query_to_revalidate() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |n| Ok(format!("v{n}")));
        let key = QueryKey::categories();

        cache.query(&key, &five_minutes(), fetch.clone()).await;
        cache.invalidate(&key);
        assert!(cache.entry_info(&key).unwrap().is_stale);

        let state = cache.query(&key, &five_minutes(), fetch).await;
        assert_eq!(state.data.as_deref(), Some("v0"));
        assert!(state.is_fetching);

        let mut rx = cache.subscribe(&key);
        rx.wait_for(|s| !s.is_fetching).await.unwrap();
        assert_eq!(cache.snapshot(&key).data.as_deref(), Some("v1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_refetch_respects_policy() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |n| Ok(format!("v{n}")));

        let off = QueryKey::products(30, 0);
        let on = QueryKey::products(30, 30);
        cache.query(&off, &five_minutes(), fetch.clone()).await;
        cache
            .query(&on, &five_minutes().with_refetch_on_focus(true), fetch)
            .await;

        // Fresh entries are left alone even when focus re-fetching is on.
        assert_eq!(cache.focus(), 0);

        tokio::time::advance(Duration::from_secs(6 * 60)).await;
        assert_eq!(cache.focus(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_entries() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let fetch = counting(&calls, Duration::ZERO, |_| Ok("x".to_string()));

        cache.query(&QueryKey::categories(), &five_minutes(), fetch).await;
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.snapshot(&QueryKey::categories()).status, QueryStatus::Idle);
    }
}
