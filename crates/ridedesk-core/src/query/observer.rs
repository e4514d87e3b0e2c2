// ── Query observers ──
//
// A `QueryObserver<T>` is one screen's subscription to one key. It
// registers interest on the entry (which drives invalidation refetches
// and GC), triggers a fetch when the entry is stale, and optionally keeps
// polling on an interval. Dropping it releases interest only.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_core::Stream;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::client::{ErasedFetch, QueryClient, downcast, erase};
use super::entry::{CacheEntry, EntryState, QueryStatus};
use super::key::QueryKey;
use crate::error::CoreError;

// ── Options ──────────────────────────────────────────────────────────

/// Per-observer behaviour. Built with the chained setters.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Freshness window; the client default when `None`.
    pub stale_time: Option<Duration>,
    /// When false the observer never fetches on its own.
    pub enabled: bool,
    /// Serve the previous key's data while the new key has none.
    pub keep_previous_data: bool,
    /// Refetch on this period while enabled.
    pub refetch_interval: Option<Duration>,
    /// How long the entry outlives its last observer; the client default
    /// when `None`.
    pub gc_time: Option<Duration>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: None,
            enabled: true,
            keep_previous_data: false,
            refetch_interval: None,
            gc_time: None,
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub fn stale_time(mut self, d: Duration) -> Self {
        self.stale_time = Some(d);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn keep_previous_data(mut self) -> Self {
        self.keep_previous_data = true;
        self
    }

    #[must_use]
    pub fn refetch_interval(mut self, d: Duration) -> Self {
        self.refetch_interval = Some(d);
        self
    }

    #[must_use]
    pub fn gc_time(mut self, d: Duration) -> Self {
        self.gc_time = Some(d);
        self
    }
}

// ── Result ───────────────────────────────────────────────────────────

/// What a screen renders from.
#[derive(Debug)]
pub struct QueryResult<T> {
    pub data: Option<Arc<T>>,
    pub status: QueryStatus,
    pub error: Option<CoreError>,
    pub is_fetching: bool,
    /// `data` belongs to the previous key (`keep_previous_data`).
    pub is_placeholder_data: bool,
    pub is_stale: bool,
    pub updated_at: Option<Instant>,
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
            is_fetching: self.is_fetching,
            is_placeholder_data: self.is_placeholder_data,
            is_stale: self.is_stale,
            updated_at: self.updated_at,
        }
    }
}

impl<T> QueryResult<T> {
    /// No data yet and a request is running.
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending && self.is_fetching
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

fn project<T: Send + Sync + 'static>(
    state: &EntryState,
    placeholder: Option<&Arc<T>>,
    stale_time: Duration,
) -> QueryResult<T> {
    let mut data = state.data_as::<T>();
    let mut is_placeholder_data = false;
    if data.is_none() {
        if let Some(prev) = placeholder {
            data = Some(Arc::clone(prev));
            is_placeholder_data = true;
        }
    }
    QueryResult {
        data,
        status: state.status,
        error: state.error.clone(),
        is_fetching: state.is_fetching,
        is_placeholder_data,
        is_stale: state.is_stale(stale_time),
        updated_at: state.updated_at,
    }
}

// ── Observer ─────────────────────────────────────────────────────────

pub struct QueryObserver<T> {
    client: QueryClient,
    key: QueryKey,
    entry: Arc<CacheEntry>,
    rx: watch::Receiver<EntryState>,
    fetch: ErasedFetch,
    options: QueryOptions,
    placeholder: Option<Arc<T>>,
    poller: Option<CancellationToken>,
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub(crate) fn new(
        client: QueryClient,
        key: QueryKey,
        fetch: ErasedFetch,
        options: QueryOptions,
    ) -> Self {
        let entry = client.entry(&key);
        let rx = entry.subscribe();
        let mut observer = Self {
            client,
            key,
            entry,
            rx,
            fetch,
            options,
            placeholder: None,
            poller: None,
        };
        observer.attach();
        observer
    }

    fn stale_time(&self) -> Duration {
        self.options
            .stale_time
            .unwrap_or(self.client.config().stale_time)
    }

    fn attach(&mut self) {
        let gc_time = self.options.gc_time.unwrap_or(self.client.config().gc_time);
        self.entry.attach(self.options.enabled, gc_time);
        self.entry.set_fetcher(Arc::clone(&self.fetch));
        trace!(key = %self.key, enabled = self.options.enabled, "observer attached");
        self.fetch_if_stale();
        self.restart_poller();
    }

    fn detach(&mut self) {
        self.stop_poller();
        self.entry.detach(self.options.enabled);
        trace!(key = %self.key, "observer detached");
    }

    fn fetch_if_stale(&self) {
        if !self.options.enabled {
            return;
        }
        let state = self.entry.state();
        if state.is_stale(self.stale_time()) {
            // The request runs on its own task; nothing to await here.
            drop(self.client.start_fetch(
                &self.key,
                &self.entry,
                Arc::clone(&self.fetch),
                false,
            ));
        }
    }

    fn stop_poller(&mut self) {
        if let Some(token) = self.poller.take() {
            token.cancel();
        }
    }

    fn restart_poller(&mut self) {
        self.stop_poller();
        let Some(period) = self.options.refetch_interval else {
            return;
        };
        if !self.options.enabled {
            return;
        }

        let token = CancellationToken::new();
        let cancel = token.clone();
        let client = self.client.clone();
        let key = self.key.clone();
        let entry = Arc::clone(&self.entry);
        let fetch = Arc::clone(&self.fetch);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        trace!(%key, "interval refetch");
                        drop(client.start_fetch(&key, &entry, Arc::clone(&fetch), false));
                    }
                }
            }
        });
        self.poller = Some(token);
    }

    // ── Public surface ───────────────────────────────────────────────

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Current view of the entry.
    pub fn result(&self) -> QueryResult<T> {
        project(
            &self.rx.borrow(),
            self.placeholder.as_ref(),
            self.stale_time(),
        )
    }

    /// Fetch now regardless of freshness, joining a request already in
    /// flight for the key.
    pub async fn refetch(&self) -> Result<Arc<T>, CoreError> {
        let payload = self
            .client
            .start_fetch(&self.key, &self.entry, Arc::clone(&self.fetch), false)
            .await?;
        downcast(&self.key, payload)
    }

    /// Wait for the next change to the entry.
    ///
    /// Returns false if the entry can no longer change.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }

    /// Wait until the entry is neither pending nor fetching and return
    /// the result at that point.
    pub async fn settled(&mut self) -> QueryResult<T> {
        loop {
            let result = self.result();
            if !result.is_fetching && (result.status != QueryStatus::Pending || !self.options.enabled)
            {
                return result;
            }
            if !self.changed().await {
                return self.result();
            }
        }
    }

    /// Switch to another key (pagination). The fetch function travels with
    /// the key since it captures the key's parameters.
    pub fn set_key<F, Fut, E>(&mut self, key: QueryKey, fetch: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<CoreError>,
    {
        if key == self.key {
            return;
        }
        debug!(from = %self.key, to = %key, "observer key changed");

        self.placeholder = if self.options.keep_previous_data {
            self.result().data
        } else {
            None
        };

        self.detach();
        self.entry = self.client.entry(&key);
        self.rx = self.entry.subscribe();
        self.key = key;
        self.fetch = erase(fetch);
        self.attach();
    }

    /// Toggle the enabled gate. Enabling fetches if the entry is stale.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.options.enabled {
            return;
        }
        self.options.enabled = enabled;
        self.entry.set_enabled(enabled);
        self.fetch_if_stale();
        self.restart_poller();
    }

    /// Stream of results, starting with the current one.
    pub fn stream(&self) -> impl Stream<Item = QueryResult<T>> + Send + 'static {
        let placeholder = self.placeholder.clone();
        let stale_time = self.stale_time();
        WatchStream::new(self.rx.clone())
            .map(move |state| project(&state, placeholder.as_ref(), stale_time))
    }
}

impl<T> Drop for QueryObserver<T> {
    fn drop(&mut self) {
        if let Some(token) = self.poller.take() {
            token.cancel();
        }
        self.entry.detach(self.options.enabled);
    }
}

impl<T> std::fmt::Debug for QueryObserver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryObserver")
            .field("key", &self.key)
            .field("options", &self.options)
            .field("has_placeholder", &self.placeholder.is_some())
            .finish_non_exhaustive()
    }
}
