// ── Mutation coordinator ──
//
// Wraps one write operation. A call runs: validate, optimistic patch,
// network call, then invalidation and commit on success or rollback on
// failure. Status is a `watch` channel reflecting the most recently
// submitted call; concurrent calls proceed independently and each one's
// variables stay queryable through `is_pending_for` until it settles.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::query::{KeyFilter, QueryClient, Transaction};

type MutateFn<I, O> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<O, CoreError>> + Send + Sync>;
type ValidateFn<I> = Box<dyn Fn(&I) -> Result<(), CoreError> + Send + Sync>;
type OnMutateFn<I> = Box<dyn Fn(&QueryClient, &I) -> Transaction + Send + Sync>;
type OnSuccessFn<I, O> = Box<dyn Fn(&QueryClient, &O, &I) + Send + Sync>;
type OnErrorFn<I> = Box<dyn Fn(&QueryClient, &CoreError, &I) + Send + Sync>;
type OnSettledFn<I, O> = Box<dyn Fn(&QueryClient, Result<&O, &CoreError>, &I) + Send + Sync>;

/// Lifecycle of the most recent call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum MutationStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Observable mutation state.
#[derive(Debug)]
pub struct MutationState<I, O> {
    pub status: MutationStatus,
    pub data: Option<Arc<O>>,
    pub error: Option<CoreError>,
    /// Input of the most recent call.
    pub variables: Option<Arc<I>>,
    pub submitted_at: Option<Instant>,
    /// Call this state belongs to. Zero after `reset`.
    call: u64,
}

impl<I, O> Default for MutationState<I, O> {
    fn default() -> Self {
        Self {
            status: MutationStatus::Idle,
            data: None,
            error: None,
            variables: None,
            submitted_at: None,
            call: 0,
        }
    }
}

impl<I, O> Clone for MutationState<I, O> {
    fn clone(&self) -> Self {
        Self {
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            variables: self.variables.clone(),
            submitted_at: self.submitted_at,
            call: self.call,
        }
    }
}

impl<I, O> MutationState<I, O> {
    pub fn is_pending(&self) -> bool {
        self.status == MutationStatus::Pending
    }
}

// ── Builder ──────────────────────────────────────────────────────────

pub struct MutationBuilder<I, O> {
    client: QueryClient,
    label: &'static str,
    mutate: MutateFn<I, O>,
    invalidates: Vec<KeyFilter>,
    validate: Option<ValidateFn<I>>,
    on_mutate: Option<OnMutateFn<I>>,
    on_success: Option<OnSuccessFn<I, O>>,
    on_error: Option<OnErrorFn<I>>,
    on_settled: Option<OnSettledFn<I, O>>,
}

impl<I, O> MutationBuilder<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    /// Name used in log lines.
    #[must_use]
    pub fn label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    /// Invalidate `filter` after every successful call.
    #[must_use]
    pub fn invalidates(mut self, filter: impl Into<KeyFilter>) -> Self {
        self.invalidates.push(filter.into());
        self
    }

    /// Reject bad input before anything else happens.
    #[must_use]
    pub fn validate<E, F>(mut self, f: F) -> Self
    where
        E: Into<CoreError>,
        F: Fn(&I) -> Result<(), E> + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(move |input| f(input).map_err(Into::into)));
        self
    }

    /// Optimistic update, run before the network call. The returned
    /// transaction is committed on success and rolled back on failure.
    #[must_use]
    pub fn on_mutate<F>(mut self, f: F) -> Self
    where
        F: Fn(&QueryClient, &I) -> Transaction + Send + Sync + 'static,
    {
        self.on_mutate = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&QueryClient, &O, &I) + Send + Sync + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(&QueryClient, &CoreError, &I) + Send + Sync + 'static,
    {
        self.on_error = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_settled<F>(mut self, f: F) -> Self
    where
        F: Fn(&QueryClient, Result<&O, &CoreError>, &I) + Send + Sync + 'static,
    {
        self.on_settled = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Mutation<I, O> {
        let (state, _) = watch::channel(MutationState::default());
        Mutation {
            inner: Arc::new(MutationInner {
                client: self.client,
                label: self.label,
                mutate: self.mutate,
                invalidates: self.invalidates,
                validate: self.validate,
                on_mutate: self.on_mutate,
                on_success: self.on_success,
                on_error: self.on_error,
                on_settled: self.on_settled,
                state,
                next_call: AtomicU64::new(0),
                pending: Mutex::new(Vec::new()),
            }),
        }
    }
}

// ── Mutation ─────────────────────────────────────────────────────────

/// A reusable write operation bound to a [`QueryClient`].
///
/// Cheaply cloneable; clones share state.
pub struct Mutation<I, O> {
    inner: Arc<MutationInner<I, O>>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct MutationInner<I, O> {
    client: QueryClient,
    label: &'static str,
    mutate: MutateFn<I, O>,
    invalidates: Vec<KeyFilter>,
    validate: Option<ValidateFn<I>>,
    on_mutate: Option<OnMutateFn<I>>,
    on_success: Option<OnSuccessFn<I, O>>,
    on_error: Option<OnErrorFn<I>>,
    on_settled: Option<OnSettledFn<I, O>>,
    state: watch::Sender<MutationState<I, O>>,
    next_call: AtomicU64,
    /// Calls that have not settled yet.
    pending: Mutex<Vec<(u64, Arc<I>)>>,
}

/// Removes a call from the pending list however the call ends,
/// including when its future is dropped.
struct PendingGuard<'a, I> {
    pending: &'a Mutex<Vec<(u64, Arc<I>)>>,
    call: u64,
}

impl<I> Drop for PendingGuard<'_, I> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(c, _)| *c != self.call);
    }
}

impl<I, O> Mutation<I, O>
where
    I: Clone + Send + Sync + 'static,
    O: Send + Sync + 'static,
{
    pub fn builder<F, Fut, E>(client: &QueryClient, f: F) -> MutationBuilder<I, O>
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, E>> + Send + 'static,
        E: Into<CoreError>,
    {
        let mutate: MutateFn<I, O> = Arc::new(move |input| {
            let fut = f(input);
            async move { fut.await.map_err(Into::into) }.boxed()
        });
        MutationBuilder {
            client: client.clone(),
            label: "mutation",
            mutate,
            invalidates: Vec::new(),
            validate: None,
            on_mutate: None,
            on_success: None,
            on_error: None,
            on_settled: None,
        }
    }

    /// Run one call.
    pub async fn mutate(&self, input: I) -> Result<Arc<O>, CoreError> {
        let inner = &*self.inner;

        if let Some(validate) = &inner.validate {
            if let Err(e) = validate(&input) {
                debug!(mutation = inner.label, error = %e, "validation rejected input");
                return Err(e);
            }
        }

        let call = inner.next_call.fetch_add(1, Ordering::SeqCst) + 1;
        let input = Arc::new(input);
        inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((call, Arc::clone(&input)));
        let _guard = PendingGuard {
            pending: &inner.pending,
            call,
        };
        inner.state.send_replace(MutationState {
            status: MutationStatus::Pending,
            data: None,
            error: None,
            variables: Some(Arc::clone(&input)),
            submitted_at: Some(Instant::now()),
            call,
        });
        debug!(mutation = inner.label, call, "mutation started");

        let tx = inner
            .on_mutate
            .as_ref()
            .map(|f| f(&inner.client, &input));

        match (inner.mutate)(I::clone(&input)).await {
            Ok(output) => {
                let output = Arc::new(output);
                for filter in &inner.invalidates {
                    inner.client.invalidate_queries(filter).await;
                }
                if let Some(f) = &inner.on_success {
                    f(&inner.client, &output, &input);
                }
                if let Some(tx) = tx {
                    tx.commit();
                }
                self.settle(call, Ok(&output));
                if let Some(f) = &inner.on_settled {
                    f(&inner.client, Ok(&output), &input);
                }
                debug!(mutation = inner.label, call, "mutation succeeded");
                Ok(output)
            }
            Err(e) => {
                if let Some(tx) = tx {
                    tx.rollback();
                }
                if let Some(f) = &inner.on_error {
                    f(&inner.client, &e, &input);
                }
                self.settle(call, Err(&e));
                if let Some(f) = &inner.on_settled {
                    f(&inner.client, Err(&e), &input);
                }
                warn!(mutation = inner.label, call, error = %e, "mutation failed");
                Err(e)
            }
        }
    }

    /// Record the outcome if `call` is still the latest one.
    fn settle(&self, call: u64, outcome: Result<&Arc<O>, &CoreError>) {
        self.inner.state.send_if_modified(|s| {
            if s.call != call {
                return false;
            }
            match outcome {
                Ok(data) => {
                    s.status = MutationStatus::Success;
                    s.data = Some(Arc::clone(data));
                }
                Err(e) => {
                    s.status = MutationStatus::Error;
                    s.error = Some(e.clone());
                }
            }
            true
        });
    }

    pub fn state(&self) -> MutationState<I, O> {
        self.inner.state.borrow().clone()
    }

    pub fn status(&self) -> MutationStatus {
        self.inner.state.borrow().status
    }

    /// Input of the most recent call.
    pub fn variables(&self) -> Option<Arc<I>> {
        self.inner.state.borrow().variables.clone()
    }

    /// Number of calls still running.
    pub fn in_flight(&self) -> usize {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Back to `Idle`. Calls still running no longer update the state.
    pub fn reset(&self) {
        self.inner.state.send_replace(MutationState::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<I, O>> {
        self.inner.state.subscribe()
    }
}

impl<I, O> Mutation<I, O>
where
    I: PartialEq,
{
    /// Whether a call with this input is still running (per-row busy
    /// state).
    pub fn is_pending_for(&self, input: &I) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(_, i)| **i == *input)
    }
}

impl<I, O> std::fmt::Debug for Mutation<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation")
            .field("label", &self.inner.label)
            .field("status", &self.inner.state.borrow().status)
            .field("invalidates", &self.inner.invalidates)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::oneshot;

    use super::*;
    use crate::config::CacheConfig;
    use crate::query::QueryKey;

    fn client() -> QueryClient {
        QueryClient::new(CacheConfig::default())
    }

    #[tokio::test]
    async fn validation_failure_touches_nothing() {
        let client = client();
        let key = QueryKey::new("promoCodes").with("page", 1);
        client.set_query_data(&key, 3_u32);
        let before = client.query_state(&key).expect("entry");

        let m = Mutation::builder(&client, |n: u32| async move { Ok::<_, CoreError>(n) })
            .validate(|n: &u32| {
                if *n == 0 {
                    Err(CoreError::ValidationFailed {
                        message: "zero".into(),
                    })
                } else {
                    Ok(())
                }
            })
            .invalidates(KeyFilter::resource("promoCodes"))
            .build();

        let err = m.mutate(0).await.expect_err("rejected");
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(m.status(), MutationStatus::Idle);
        assert!(m.variables().is_none());

        let after = client.query_state(&key).expect("entry");
        assert_eq!(after.seq, before.seq);
        assert!(!after.is_invalidated);
    }

    #[tokio::test]
    async fn status_follows_latest_call() {
        let client = client();
        let (tx1, rx1) = oneshot::channel::<u32>();
        let (tx2, rx2) = oneshot::channel::<u32>();
        let gates = Arc::new(Mutex::new(vec![rx2, rx1]));

        let m = Mutation::builder(&client, move |_: &'static str| {
            let gate = gates.lock().expect("lock").pop().expect("gate");
            async move {
                gate.await
                    .map_err(|_| CoreError::Cancelled)
            }
        })
        .build();

        let first = tokio::spawn({
            let m = m.clone();
            async move { m.mutate("d1").await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        let second = tokio::spawn({
            let m = m.clone();
            async move { m.mutate("d2").await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(m.is_pending_for(&"d1"));
        assert!(m.is_pending_for(&"d2"));
        assert_eq!(m.variables().as_deref(), Some(&"d2"));

        tx2.send(2).expect("send");
        assert_eq!(*second.await.expect("join").expect("ok"), 2);
        assert_eq!(m.status(), MutationStatus::Success);

        // The older call settling late does not change the status.
        drop(tx1);
        assert!(first.await.expect("join").is_err());
        assert_eq!(m.status(), MutationStatus::Success);
        assert_eq!(m.in_flight(), 0);
    }

    #[tokio::test]
    async fn reset_ignores_late_result() {
        let client = client();
        let (tx, rx) = oneshot::channel::<u32>();
        let gate = Arc::new(Mutex::new(Some(rx)));
        let m = Mutation::builder(&client, move |(): ()| {
            let rx = gate.lock().expect("lock").take().expect("gate");
            async move { rx.await.map_err(|_| CoreError::Cancelled) }
        })
        .build();

        let call = tokio::spawn({
            let m = m.clone();
            async move { m.mutate(()).await }
        });
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(m.status(), MutationStatus::Pending);

        m.reset();
        tx.send(1).expect("send");
        call.await.expect("join").expect("ok");
        assert_eq!(m.status(), MutationStatus::Idle);
        assert!(m.state().data.is_none());
    }
}
