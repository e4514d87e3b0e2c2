#![allow(clippy::unwrap_used)]
// Integration tests for the query cache and mutation coordinator, driven
// by in-process fetchers on paused time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use pretty_assertions::assert_eq;
use tokio_test::{assert_err, assert_ok};

use ridedesk_core::{
    CacheConfig, CoreError, KeyFilter, Mutation, MutationStatus, QueryClient, QueryKey,
    QueryOptions, QueryStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

/// A fake backend holding one number.
#[derive(Clone, Default)]
struct Backend {
    value: Arc<AtomicU32>,
    calls: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
    latency_ms: u64,
}

impl Backend {
    fn with_value(value: u32) -> Self {
        let b = Self {
            latency_ms: 10,
            ..Self::default()
        };
        b.value.store(value, Ordering::SeqCst);
        b
    }

    fn slow(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fetcher(
        &self,
    ) -> impl Fn() -> BoxFuture<'static, Result<u32, CoreError>> + Clone + Send + Sync + 'static
    {
        let b = self.clone();
        move || {
            let b = b.clone();
            async move {
                b.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(b.latency_ms)).await;
                if b.fail.load(Ordering::SeqCst) {
                    Err(CoreError::Api {
                        message: "boom".into(),
                        status: Some(500),
                    })
                } else {
                    Ok(b.value.load(Ordering::SeqCst))
                }
            }
            .boxed()
        }
    }
}

fn drivers(page: u32) -> QueryKey {
    QueryKey::new("drivers").with("page", page)
}

// ── De-duplication ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn concurrent_readers_share_one_request() {
    let client = QueryClient::default();
    let backend = Backend::with_value(7);

    let mut a = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
    let mut b = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
    let direct = client.fetch_query(drivers(1), backend.fetcher(), None);

    let (ra, rb, rc) = tokio::join!(a.settled(), b.settled(), direct);
    assert_eq!(backend.calls(), 1);
    assert_eq!(ra.data.as_deref(), Some(&7));
    assert_eq!(rb.data.as_deref(), Some(&7));
    assert_eq!(*rc.unwrap(), 7);
    assert_eq!(client.fetching_count(&KeyFilter::All), 0);
}

#[tokio::test(start_paused = true)]
async fn fresh_data_is_served_without_fetching() {
    let client = QueryClient::default();
    let backend = Backend::with_value(3);
    let fresh = Some(Duration::from_secs(60));

    assert_ok!(client.fetch_query(drivers(1), backend.fetcher(), fresh).await);
    assert_ok!(client.fetch_query(drivers(1), backend.fetcher(), fresh).await);
    assert_eq!(backend.calls(), 1);

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_ok!(client.fetch_query(drivers(1), backend.fetcher(), fresh).await);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_observer_does_not_abort_the_request() {
    let client = QueryClient::default();
    let backend = Backend::with_value(5).slow(100);

    drop(client.observe(drivers(1), backend.fetcher(), QueryOptions::default()));
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(backend.calls(), 1);
    assert_eq!(client.get_query_data::<u32>(&drivers(1)).as_deref(), Some(&5));
}

// ── Read after write ────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn invalidation_is_visible_when_mutate_returns() {
    let client = QueryClient::default();
    let backend = Backend::with_value(1);
    let mut list = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
    assert_eq!(list.settled().await.data.as_deref(), Some(&1));

    let server = backend.clone();
    let approve = Mutation::builder(&client, move |(): ()| {
        let server = server.clone();
        async move {
            server.value.store(2, Ordering::SeqCst);
            Ok::<_, CoreError>(())
        }
    })
    .invalidates(KeyFilter::resource("drivers"))
    .build();

    assert_ok!(approve.mutate(()).await);
    let result = list.result();
    assert_eq!(result.data.as_deref(), Some(&2));
    assert!(!result.is_fetching);
    assert_eq!(approve.status(), MutationStatus::Success);
}

#[tokio::test(start_paused = true)]
async fn invalidation_skips_entries_without_observers() {
    let client = QueryClient::default();
    let backend = Backend::with_value(1);
    assert_ok!(client.fetch_query(drivers(2), backend.fetcher(), None).await);

    client.invalidate_queries(&KeyFilter::resource("drivers")).await;
    assert_eq!(backend.calls(), 1);
    assert!(client.query_state(&drivers(2)).unwrap().is_invalidated);

    // The next reader refetches.
    assert_ok!(client.fetch_query(drivers(2), backend.fetcher(), None).await);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn invalidation_drops_a_pending_response_for_unobserved_entries() {
    let client = QueryClient::default();
    let backend = Backend::with_value(1).slow(100);

    let reader = {
        let client = client.clone();
        let fetch = backend.fetcher();
        tokio::spawn(async move { client.fetch_query(drivers(1), fetch, None).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    backend.value.store(2, Ordering::SeqCst);
    client.invalidate_queries(&KeyFilter::resource("drivers")).await;
    assert_eq!(client.fetching_count(&KeyFilter::All), 0);

    // The caller still gets its answer, but the cache does not take it.
    assert_eq!(*reader.await.unwrap().unwrap(), 1);
    let state = client.query_state(&drivers(1)).unwrap();
    assert!(state.is_invalidated);
    assert!(state.data.is_none());

    let fresh = client.fetch_query(drivers(1), backend.fetcher(), None).await;
    assert_eq!(*fresh.unwrap(), 2);
}

// ── Rollback ────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_mutation_restores_the_snapshot() {
    let client = QueryClient::default();
    let inbox = QueryKey::new("notifications");
    client.set_query_data(&inbox, vec![false, false]);
    let before = client.query_state(&inbox).unwrap();

    let mark_read = Mutation::builder(&client, |_: usize| async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Err::<(), _>(CoreError::Api {
            message: "nope".into(),
            status: Some(500),
        })
    })
    .on_mutate(|client, idx| {
        let key = QueryKey::new("notifications");
        let mut tx = client.begin(&KeyFilter::from(&key));
        tx.patch::<Vec<bool>, _>(&key, |v| v[*idx] = true);
        tx
    })
    .build();

    let call = tokio::spawn({
        let m = mark_read.clone();
        async move { m.mutate(0).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(
        client.get_query_data::<Vec<bool>>(&inbox).as_deref(),
        Some(&vec![true, false])
    );
    assert!(mark_read.is_pending_for(&0));

    assert_err!(call.await.unwrap());
    let after = client.query_state(&inbox).unwrap();
    assert_eq!(
        after.data_as::<Vec<bool>>().as_deref(),
        Some(&vec![false, false])
    );
    assert_eq!(after.status, before.status);
    assert_eq!(after.updated_at, before.updated_at);
    assert_eq!(mark_read.status(), MutationStatus::Error);
    assert!(!mark_read.is_pending_for(&0));
}

// ── Pagination ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn previous_page_stays_on_screen_while_next_loads() {
    let client = QueryClient::default();
    let page1 = Backend::with_value(100);
    let page2 = Backend::with_value(200).slow(100);

    let mut list = client.observe(
        drivers(1),
        page1.fetcher(),
        QueryOptions::default().keep_previous_data(),
    );
    list.settled().await;

    list.set_key(drivers(2), page2.fetcher());
    let loading = list.result();
    assert_eq!(loading.data.as_deref(), Some(&100));
    assert!(loading.is_placeholder_data);
    assert_eq!(loading.status, QueryStatus::Pending);
    assert!(loading.is_fetching);

    let done = list.settled().await;
    assert_eq!(done.data.as_deref(), Some(&200));
    assert!(!done.is_placeholder_data);
    assert_eq!(list.key(), &drivers(2));
}

#[tokio::test(start_paused = true)]
async fn without_keep_previous_data_the_next_page_starts_empty() {
    let client = QueryClient::default();
    let backend = Backend::with_value(1);
    let mut list = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
    list.settled().await;

    list.set_key(drivers(2), backend.fetcher());
    let loading = list.result();
    assert!(loading.data.is_none());
    assert!(loading.is_loading());
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn failed_refetch_keeps_previous_data() {
    let client = QueryClient::default();
    let backend = Backend::with_value(9);
    let mut obs = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
    obs.settled().await;

    backend.fail.store(true, Ordering::SeqCst);
    assert_err!(obs.refetch().await);

    let result = obs.result();
    assert_eq!(result.status, QueryStatus::Error);
    assert_eq!(result.data.as_deref(), Some(&9));
    assert_eq!(result.error.and_then(|e| e.status()), Some(500));
}

// ── Sequencing ──────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn response_older_than_a_direct_write_is_discarded() {
    let client = QueryClient::default();
    let backend = Backend::with_value(1).slow(100);
    let _obs = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());

    tokio::time::sleep(Duration::from_millis(10)).await;
    client.set_query_data(&drivers(1), 2_u32);
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(backend.calls(), 1);
    assert_eq!(client.get_query_data::<u32>(&drivers(1)).as_deref(), Some(&2));
    assert!(!client.query_state(&drivers(1)).unwrap().is_fetching);
}

#[tokio::test(start_paused = true)]
async fn cancelled_request_result_is_dropped() {
    let client = QueryClient::default();
    let backend = Backend::with_value(1).slow(100);
    let _obs = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());

    tokio::time::sleep(Duration::from_millis(10)).await;
    client.cancel_queries(&KeyFilter::resource("drivers"));
    assert_eq!(client.fetching_count(&KeyFilter::All), 0);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let state = client.query_state(&drivers(1)).unwrap();
    assert!(state.data.is_none());
    assert_eq!(state.status, QueryStatus::Pending);
}

// ── Enabled gate ────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn disabled_observer_waits_for_enable() {
    let client = QueryClient::default();
    let backend = Backend::with_value(4);
    let mut obs = client.observe(
        QueryKey::new("services-list"),
        backend.fetcher(),
        QueryOptions::default().enabled(false),
    );
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(backend.calls(), 0);
    assert_eq!(obs.result().status, QueryStatus::Pending);
    assert!(!obs.result().is_fetching);

    obs.set_enabled(true);
    assert_eq!(obs.settled().await.data.as_deref(), Some(&4));
    assert_eq!(backend.calls(), 1);
}

// ── Timers ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn refetch_interval_polls_until_dropped() {
    let client = QueryClient::default();
    let backend = Backend::with_value(1);
    let obs = client.observe(
        QueryKey::new("notifications"),
        backend.fetcher(),
        QueryOptions::default()
            .stale_time(Duration::from_secs(300))
            .refetch_interval(Duration::from_secs(60)),
    );

    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(backend.calls(), 3);

    drop(obs);
    tokio::time::sleep(Duration::from_secs(200)).await;
    assert_eq!(backend.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn unobserved_entries_are_collected_after_gc_time() {
    let client = QueryClient::new(CacheConfig {
        gc_time: Duration::from_secs(30),
        ..CacheConfig::default()
    });
    let backend = Backend::with_value(1);
    let mut obs = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
    obs.settled().await;

    assert_eq!(client.collect_garbage(), 0);
    drop(obs);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(client.collect_garbage(), 0);

    tokio::time::sleep(Duration::from_secs(25)).await;
    assert_eq!(client.collect_garbage(), 1);
    assert!(client.is_empty());
}

#[tokio::test(start_paused = true)]
async fn remove_queries_evicts_matching_keys() {
    let client = QueryClient::default();
    client.set_query_data(&drivers(1), 1_u32);
    client.set_query_data(&drivers(2), 2_u32);
    client.set_query_data(&QueryKey::new("users").with("page", 1), 3_u32);

    client.remove_queries(&KeyFilter::resource("drivers"));
    assert_eq!(client.keys(), vec![QueryKey::new("users").with("page", 1)]);

    client.clear();
    assert!(client.is_empty());
}

#[tokio::test(start_paused = true)]
async fn refetch_from_an_evicted_entry_does_not_block_new_readers() {
    let client = QueryClient::default();
    let backend = Backend::with_value(7).slow(100);
    let mut stale = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
    assert_eq!(stale.settled().await.data.as_deref(), Some(&7));

    client.clear();

    let (orphan, fresh) = tokio::join!(stale.refetch(), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        let mut obs = client.observe(drivers(1), backend.fetcher(), QueryOptions::default());
        tokio::time::timeout(Duration::from_secs(5), obs.settled()).await
    });

    assert_eq!(*orphan.unwrap(), 7);
    let fresh = fresh.expect("new observer settles");
    assert_eq!(fresh.data.as_deref(), Some(&7));
    assert_eq!(backend.calls(), 3);
    assert_eq!(client.get_query_data::<u32>(&drivers(1)).as_deref(), Some(&7));
    assert_eq!(client.fetching_count(&KeyFilter::All), 0);
}
