// ── Query client ──
//
// Keyed request cache with de-duplication, background refresh and
// invalidation. Entries live in a `DashMap`; the in-flight registry is a
// second `DashMap` whose entry API guarantees at most one request per key.
//
// Every request runs on its own spawned task that applies the result to
// the entry itself, so dropping the observer (or every caller awaiting
// the shared future) never aborts a request or loses its result.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::entry::{CacheEntry, EntryState, Payload};
use super::key::{KeyFilter, QueryKey};
use super::observer::{QueryObserver, QueryOptions};
use super::transaction::Transaction;
use crate::config::CacheConfig;
use crate::error::CoreError;

/// Type-erased fetch function stored on an entry so invalidation can
/// refetch it without knowing `T`.
pub(crate) type ErasedFetch =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Payload, CoreError>> + Send + Sync>;

/// A registered request that any number of callers can await.
pub(crate) type SharedFetch = Shared<BoxFuture<'static, Result<Payload, CoreError>>>;

/// Registrations are tied to the entry that started them: an entry
/// evicted by `remove_queries` may still be refetched by an observer
/// holding it, and that request must not be joined by (or unregister)
/// the fresh entry now cached under the same key.
struct InFlight {
    entry: Arc<CacheEntry>,
    seq: u64,
    fut: SharedFetch,
}

impl InFlight {
    fn owned_by(&self, entry: &Arc<CacheEntry>) -> bool {
        Arc::ptr_eq(&self.entry, entry)
    }
}

/// Wrap a typed fetch function for storage on an entry.
pub(crate) fn erase<T, F, Fut, E>(fetch: F) -> ErasedFetch
where
    T: Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    E: Into<CoreError>,
{
    Arc::new(move || {
        let fut = fetch();
        async move {
            fut.await
                .map(|v| Arc::new(v) as Payload)
                .map_err(Into::into)
        }
        .boxed()
    })
}

// ── QueryClient ──────────────────────────────────────────────────────

/// The injectable query cache.
///
/// Cheaply cloneable; clones share the same entries. Presentation code
/// reads through [`QueryObserver`]s and writes through mutations or
/// [`Transaction`]s.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<QueryClientInner>,
}

struct QueryClientInner {
    config: CacheConfig,
    entries: DashMap<QueryKey, Arc<CacheEntry>>,
    in_flight: DashMap<QueryKey, InFlight>,
}

impl QueryClient {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(QueryClientInner {
                config,
                entries: DashMap::new(),
                in_flight: DashMap::new(),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    // ── Entries ──────────────────────────────────────────────────────

    pub(crate) fn entry(&self, key: &QueryKey) -> Arc<CacheEntry> {
        if let Some(entry) = self.inner.entries.get(key) {
            return Arc::clone(entry.value());
        }
        let gc_time = self.inner.config.gc_time;
        Arc::clone(
            self.inner
                .entries
                .entry(key.clone())
                .or_insert_with(|| {
                    trace!(%key, "cache entry created");
                    Arc::new(CacheEntry::new(gc_time))
                })
                .value(),
        )
    }

    fn matching(&self, filter: &KeyFilter) -> Vec<(QueryKey, Arc<CacheEntry>)> {
        self.inner
            .entries
            .iter()
            .filter(|r| filter.matches(r.key()))
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect()
    }

    /// Keys currently cached, sorted.
    pub fn keys(&self) -> Vec<QueryKey> {
        let mut keys: Vec<QueryKey> = self.inner.entries.iter().map(|r| r.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Current state of one entry.
    pub fn query_state(&self, key: &QueryKey) -> Option<EntryState> {
        self.inner.entries.get(key).map(|e| e.value().state())
    }

    /// Number of requests currently in flight for keys matching `filter`.
    pub fn fetching_count(&self, filter: &KeyFilter) -> usize {
        self.inner
            .in_flight
            .iter()
            .filter(|r| filter.matches(r.key()))
            .count()
    }

    // ── Fetching ─────────────────────────────────────────────────────

    /// Start a request for `key` or join the one already registered.
    ///
    /// With `force`, an existing registration is cancelled first so the
    /// caller is guaranteed a response issued after this call.
    pub(crate) fn start_fetch(
        &self,
        key: &QueryKey,
        entry: &Arc<CacheEntry>,
        fetch: ErasedFetch,
        force: bool,
    ) -> SharedFetch {
        let slot = self.inner.in_flight.entry(key.clone());
        if let Entry::Occupied(existing) = &slot {
            let existing = existing.get();
            if !existing.owned_by(entry) {
                debug!(%key, "replacing request registered by an evicted entry");
            } else if force {
                debug!(%key, "superseding in-flight request");
                entry.cancel();
            } else {
                trace!(%key, seq = existing.seq, "joining in-flight request");
                return existing.fut.clone();
            }
        }

        let seq = entry.next_seq();
        entry.mark_fetching();
        debug!(%key, seq, "fetch started");

        let task = tokio::spawn(run_fetch(
            Arc::clone(&self.inner),
            key.clone(),
            Arc::clone(entry),
            fetch,
            seq,
        ));
        let fut = async move {
            task.await
                .unwrap_or_else(|e| Err(CoreError::Internal(format!("fetch task failed: {e}"))))
        }
        .boxed()
        .shared();

        slot.insert(InFlight {
            entry: Arc::clone(entry),
            seq,
            fut: fut.clone(),
        });
        fut
    }

    /// Fetch `key` through the cache and return its data.
    ///
    /// Returns cached data when it is fresh for `stale_time` (the client
    /// default when `None`); otherwise joins or starts a request.
    pub async fn fetch_query<T, F, Fut, E>(
        &self,
        key: QueryKey,
        fetch: F,
        stale_time: Option<Duration>,
    ) -> Result<Arc<T>, CoreError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<CoreError>,
    {
        let entry = self.entry(&key);
        let stale_time = stale_time.unwrap_or(self.inner.config.stale_time);
        let state = entry.state();
        if !state.is_stale(stale_time) {
            if let Some(data) = state.data_as::<T>() {
                return Ok(data);
            }
        }

        let fetch = erase(fetch);
        entry.set_fetcher(Arc::clone(&fetch));
        let payload = self.start_fetch(&key, &entry, fetch, false).await?;
        downcast(&key, payload)
    }

    /// Build an observer for `key`. See [`QueryObserver`].
    pub fn observe<T, F, Fut, E>(
        &self,
        key: QueryKey,
        fetch: F,
        options: QueryOptions,
    ) -> QueryObserver<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<CoreError>,
    {
        QueryObserver::new(self.clone(), key, erase(fetch), options)
    }

    // ── Direct access ────────────────────────────────────────────────

    pub fn get_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.inner.entries.get(key)?.value().state().data_as::<T>()
    }

    /// Write data for `key` directly, creating the entry if needed.
    ///
    /// A request in flight for the key is cancelled; its response is
    /// discarded when it lands.
    pub fn set_query_data<T: Send + Sync + 'static>(&self, key: &QueryKey, data: T) {
        debug!(%key, "set_query_data");
        let entry = self.entry(key);
        self.unregister(key, &entry);
        entry.write(Arc::new(data));
    }

    // ── Filters ──────────────────────────────────────────────────────

    /// Drop the in-flight registrations for matching keys. Their results
    /// are discarded when they land.
    pub fn cancel_queries(&self, filter: &KeyFilter) {
        for (key, entry) in self.matching(filter) {
            if self.unregister(&key, &entry) {
                debug!(%key, "fetch cancelled");
            }
        }
    }

    /// Mark matching entries stale and refetch the ones with an enabled
    /// observer. Resolves once those refetches have landed.
    pub async fn invalidate_queries(&self, filter: &KeyFilter) {
        let mut refetches = Vec::new();
        for (key, entry) in self.matching(filter) {
            entry.invalidate();
            if !entry.is_active() {
                // A response issued before the write must not land as fresh.
                if self.unregister(&key, &entry) {
                    debug!(%key, "invalidated (inactive), in-flight fetch dropped");
                } else {
                    trace!(%key, "invalidated (inactive)");
                }
                continue;
            }
            if let Some(fetch) = entry.fetcher() {
                debug!(%key, "invalidated, refetching");
                refetches.push((key.clone(), self.start_fetch(&key, &entry, fetch, true)));
            }
        }

        for (key, result) in join_all(
            refetches
                .into_iter()
                .map(|(key, fut)| async move { (key, fut.await) }),
        )
        .await
        {
            if let Err(e) = result {
                warn!(%key, error = %e, "refetch after invalidation failed");
            }
        }
    }

    /// Evict matching entries. Observers still holding them keep their
    /// last state but are detached from the cache.
    pub fn remove_queries(&self, filter: &KeyFilter) {
        for (key, entry) in self.matching(filter) {
            self.unregister(&key, &entry);
            self.inner.entries.remove(&key);
            debug!(%key, "cache entry removed");
        }
    }

    /// Evict everything.
    pub fn clear(&self) {
        self.remove_queries(&KeyFilter::All);
    }

    /// Drop `entry`'s in-flight registration, if it owns the one under
    /// `key`, and fence off its pending response. Returns whether one was
    /// dropped.
    fn unregister(&self, key: &QueryKey, entry: &Arc<CacheEntry>) -> bool {
        let removed = self
            .inner
            .in_flight
            .remove_if(key, |_, f| f.owned_by(entry))
            .is_some();
        if removed {
            entry.cancel();
        }
        removed
    }

    /// Begin an optimistic update over the matching entries.
    pub fn begin(&self, filter: &KeyFilter) -> Transaction {
        self.cancel_queries(filter);
        Transaction::new(self.clone(), self.matching(filter))
    }

    // ── Garbage collection ───────────────────────────────────────────

    /// Evict entries that have had no observers for their GC window and
    /// have no request in flight. Returns the number evicted.
    pub fn collect_garbage(&self) -> usize {
        let collectable: Vec<QueryKey> = self
            .inner
            .entries
            .iter()
            .filter(|r| r.value().is_collectable() && !self.inner.in_flight.contains_key(r.key()))
            .map(|r| r.key().clone())
            .collect();

        let mut evicted = 0;
        for key in collectable {
            if self
                .inner
                .entries
                .remove_if(&key, |_, e| e.is_collectable())
                .is_some()
            {
                trace!(%key, "garbage collected");
                evicted += 1;
            }
        }
        if evicted > 0 {
            debug!(evicted, "cache garbage collection");
        }
        evicted
    }

    /// Run [`collect_garbage`](Self::collect_garbage) every
    /// `config.gc_interval` until `cancel` fires.
    pub fn spawn_gc(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let client = self.clone();
        let period = self.inner.config.gc_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        client.collect_garbage();
                    }
                }
            }
        })
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.inner.entries.len())
            .field("in_flight", &self.inner.in_flight.len())
            .finish_non_exhaustive()
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

async fn run_fetch(
    inner: Arc<QueryClientInner>,
    key: QueryKey,
    entry: Arc<CacheEntry>,
    fetch: ErasedFetch,
    seq: u64,
) -> Result<Payload, CoreError> {
    let result = fetch().await;

    if entry.apply_fetch(seq, &result) {
        match &result {
            Ok(_) => debug!(%key, seq, "fetch applied"),
            Err(e) => debug!(%key, seq, error = %e, "fetch failed"),
        }
    } else {
        warn!(%key, seq, "discarding stale response");
    }

    inner
        .in_flight
        .remove_if(&key, |_, f| f.owned_by(&entry) && f.seq == seq);
    result
}

pub(crate) fn downcast<T: Send + Sync + 'static>(
    key: &QueryKey,
    payload: Payload,
) -> Result<Arc<T>, CoreError> {
    payload.downcast::<T>().map_err(|_| {
        CoreError::Internal(format!(
            "cache entry {key} holds a different type than requested"
        ))
    })
}
