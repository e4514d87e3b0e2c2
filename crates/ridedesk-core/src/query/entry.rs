// ── Cache entries ──
//
// One entry per distinct key. State lives in a `watch` channel so every
// observer of the key is woken on change; every write goes through the
// sender's lock, which is what makes the sequence check atomic with the
// update it guards.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::error::CoreError;

/// Type-erased cached payload. Observers downcast to their `T`.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Lifecycle of an entry's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum QueryStatus {
    /// No data yet (never fetched, or the first fetch is in flight).
    #[default]
    Pending,
    Success,
    /// The last fetch failed. Previously fetched data is still served.
    Error,
}

/// Snapshot of one entry, as broadcast to observers.
#[derive(Clone, Default)]
pub struct EntryState {
    pub data: Option<Payload>,
    pub status: QueryStatus,
    pub error: Option<CoreError>,
    pub is_fetching: bool,
    /// Explicitly marked stale by `invalidate_queries`.
    pub is_invalidated: bool,
    pub updated_at: Option<Instant>,
    pub error_updated_at: Option<Instant>,
    /// Sequence number of the last write applied to this entry.
    pub(crate) seq: u64,
}

impl EntryState {
    /// True when the entry should be refetched for an observer with the
    /// given freshness window.
    pub fn is_stale(&self, stale_time: Duration) -> bool {
        self.is_invalidated || self.updated_at.is_none_or(|at| at.elapsed() >= stale_time)
    }

    pub fn data_as<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.data.clone().and_then(|d| d.downcast::<T>().ok())
    }
}

impl std::fmt::Debug for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryState")
            .field("has_data", &self.data.is_some())
            .field("status", &self.status)
            .field("error", &self.error)
            .field("is_fetching", &self.is_fetching)
            .field("is_invalidated", &self.is_invalidated)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

/// Observer bookkeeping, used for refetch decisions and GC.
#[derive(Debug)]
struct Interest {
    observers: usize,
    enabled: usize,
    inactive_since: Option<Instant>,
    gc_time: Duration,
}

pub(crate) struct CacheEntry {
    state: watch::Sender<EntryState>,
    next_seq: AtomicU64,
    interest: Mutex<Interest>,
    fetcher: Mutex<Option<super::client::ErasedFetch>>,
}

impl CacheEntry {
    pub(crate) fn new(gc_time: Duration) -> Self {
        let (state, _) = watch::channel(EntryState::default());
        Self {
            state,
            next_seq: AtomicU64::new(0),
            interest: Mutex::new(Interest {
                observers: 0,
                enabled: 0,
                inactive_since: Some(Instant::now()),
                gc_time,
            }),
            fetcher: Mutex::new(None),
        }
    }

    // ── State access ─────────────────────────────────────────────────

    pub(crate) fn state(&self) -> EntryState {
        self.state.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<EntryState> {
        self.state.subscribe()
    }

    /// Reserve the next sequence number for a fetch or a direct write.
    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub(crate) fn mark_fetching(&self) {
        self.state.send_if_modified(|s| {
            let changed = !s.is_fetching;
            s.is_fetching = true;
            changed
        });
    }

    /// Apply a fetch result unless a newer write already landed.
    /// Returns whether the result was applied.
    pub(crate) fn apply_fetch(&self, seq: u64, result: &Result<Payload, CoreError>) -> bool {
        self.state.send_if_modified(|s| {
            if seq <= s.seq {
                return false;
            }
            s.seq = seq;
            s.is_fetching = false;
            match result {
                Ok(data) => {
                    s.data = Some(Arc::clone(data));
                    s.status = QueryStatus::Success;
                    s.error = None;
                    s.is_invalidated = false;
                    s.updated_at = Some(Instant::now());
                }
                Err(e) => {
                    // Previous data is kept.
                    s.status = QueryStatus::Error;
                    s.error = Some(e.clone());
                    s.error_updated_at = Some(Instant::now());
                }
            }
            true
        })
    }

    /// Direct write (`set_query_data`, optimistic patch).
    pub(crate) fn write(&self, data: Payload) {
        let seq = self.next_seq();
        self.state.send_modify(|s| {
            s.seq = s.seq.max(seq);
            s.data = Some(data);
            s.status = QueryStatus::Success;
            s.error = None;
            s.is_invalidated = false;
            s.updated_at = Some(Instant::now());
        });
    }

    /// Replace the whole state with `snapshot` under a fresh sequence
    /// number so no response issued before the restore can overwrite it.
    pub(crate) fn restore(&self, mut snapshot: EntryState) {
        let seq = self.next_seq();
        snapshot.seq = seq;
        snapshot.is_fetching = false;
        self.state.send_replace(snapshot);
    }

    /// Forget the in-flight request: its result will be discarded.
    pub(crate) fn cancel(&self) {
        let seq = self.next_seq();
        self.state.send_modify(|s| {
            s.seq = s.seq.max(seq);
            s.is_fetching = false;
        });
    }

    pub(crate) fn invalidate(&self) {
        self.state.send_if_modified(|s| {
            let changed = !s.is_invalidated;
            s.is_invalidated = true;
            changed
        });
    }

    // ── Observers ────────────────────────────────────────────────────

    fn interest(&self) -> std::sync::MutexGuard<'_, Interest> {
        self.interest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn attach(&self, enabled: bool, gc_time: Duration) {
        let mut i = self.interest();
        i.observers += 1;
        if enabled {
            i.enabled += 1;
        }
        i.inactive_since = None;
        i.gc_time = i.gc_time.max(gc_time);
    }

    pub(crate) fn detach(&self, enabled: bool) {
        let mut i = self.interest();
        i.observers = i.observers.saturating_sub(1);
        if enabled {
            i.enabled = i.enabled.saturating_sub(1);
        }
        if i.observers == 0 {
            i.inactive_since = Some(Instant::now());
        }
    }

    pub(crate) fn set_enabled(&self, enabled: bool) {
        let mut i = self.interest();
        if enabled {
            i.enabled += 1;
        } else {
            i.enabled = i.enabled.saturating_sub(1);
        }
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.interest().observers
    }

    /// At least one enabled observer is watching.
    pub(crate) fn is_active(&self) -> bool {
        self.interest().enabled > 0
    }

    /// No observers for at least the entry's GC window.
    pub(crate) fn is_collectable(&self) -> bool {
        let i = self.interest();
        i.observers == 0 && i.inactive_since.is_some_and(|t| t.elapsed() >= i.gc_time)
    }

    // ── Fetcher ──────────────────────────────────────────────────────

    pub(crate) fn set_fetcher(&self, fetch: super::client::ErasedFetch) {
        *self.fetcher.lock().unwrap_or_else(PoisonError::into_inner) = Some(fetch);
    }

    pub(crate) fn fetcher(&self) -> Option<super::client::ErasedFetch> {
        self.fetcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(v: u32) -> Payload {
        Arc::new(v)
    }

    #[tokio::test]
    async fn older_fetch_is_discarded_after_direct_write() {
        let entry = CacheEntry::new(Duration::from_secs(60));
        let fetch_seq = entry.next_seq();
        entry.write(payload(2));

        assert!(!entry.apply_fetch(fetch_seq, &Ok(payload(1))));
        assert_eq!(entry.state().data_as::<u32>().as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_data() {
        let entry = CacheEntry::new(Duration::from_secs(60));
        let s1 = entry.next_seq();
        assert!(entry.apply_fetch(s1, &Ok(payload(7))));

        let s2 = entry.next_seq();
        assert!(entry.apply_fetch(s2, &Err(CoreError::Internal("boom".into()))));

        let state = entry.state();
        assert_eq!(state.status, QueryStatus::Error);
        assert_eq!(state.data_as::<u32>().as_deref(), Some(&7));
        assert!(state.error.is_some());
    }

    #[tokio::test]
    async fn cancel_discards_in_flight_result() {
        let entry = CacheEntry::new(Duration::from_secs(60));
        let seq = entry.next_seq();
        entry.mark_fetching();
        entry.cancel();

        assert!(!entry.state().is_fetching);
        assert!(!entry.apply_fetch(seq, &Ok(payload(1))));
        assert_eq!(entry.state().status, QueryStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn staleness_follows_stale_time() {
        let entry = CacheEntry::new(Duration::from_secs(60));
        entry.write(payload(1));
        let window = Duration::from_secs(30);
        assert!(!entry.state().is_stale(window));

        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(entry.state().is_stale(window));

        entry.write(payload(2));
        entry.invalidate();
        assert!(entry.state().is_stale(window));
    }

    #[tokio::test(start_paused = true)]
    async fn collectable_only_after_gc_window_without_observers() {
        let entry = CacheEntry::new(Duration::from_secs(10));
        entry.attach(true, Duration::ZERO);
        tokio::time::advance(Duration::from_secs(20)).await;
        assert!(!entry.is_collectable());

        entry.detach(true);
        assert!(!entry.is_collectable());
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(entry.is_collectable());
    }
}
