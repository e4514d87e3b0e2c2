// ── Optimistic transactions ──
//
// `QueryClient::begin` cancels in-flight requests for the matched keys and
// snapshots their state. Patches write through the normal sequence path,
// so responses issued before the patch are discarded. `rollback` restores
// every snapshot exactly under a fresh sequence number.
//
// A transaction dropped without `commit` rolls back.

use std::sync::Arc;

use tracing::debug;

use super::client::QueryClient;
use super::entry::{CacheEntry, EntryState};
use super::key::{KeyFilter, QueryKey};

struct Snapshot {
    key: QueryKey,
    entry: Arc<CacheEntry>,
    state: EntryState,
}

#[must_use = "a transaction rolls back when dropped without commit"]
pub struct Transaction {
    client: QueryClient,
    snapshots: Vec<Snapshot>,
    finished: bool,
}

impl Transaction {
    pub(crate) fn new(client: QueryClient, entries: Vec<(QueryKey, Arc<CacheEntry>)>) -> Self {
        let snapshots = entries
            .into_iter()
            .map(|(key, entry)| Snapshot {
                state: entry.state(),
                key,
                entry,
            })
            .collect();
        Self {
            client,
            snapshots,
            finished: false,
        }
    }

    /// An empty transaction; committing or rolling it back is a no-op.
    pub fn empty(client: &QueryClient) -> Self {
        Self::new(client.clone(), Vec::new())
    }

    /// Keys covered by this transaction.
    pub fn keys(&self) -> impl Iterator<Item = &QueryKey> {
        self.snapshots.iter().map(|s| &s.key)
    }

    /// Data the key held when it was snapshotted.
    pub fn previous<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.snapshots
            .iter()
            .find(|s| s.key == *key)
            .and_then(|s| s.state.data_as::<T>())
    }

    fn snapshot_of(&mut self, key: &QueryKey) -> Arc<CacheEntry> {
        if let Some(s) = self.snapshots.iter().find(|s| s.key == *key) {
            return Arc::clone(&s.entry);
        }
        // Patching a key outside the original filter pulls it in.
        self.client.cancel_queries(&KeyFilter::from(key));
        let entry = self.client.entry(key);
        self.snapshots.push(Snapshot {
            key: key.clone(),
            state: entry.state(),
            entry: Arc::clone(&entry),
        });
        entry
    }

    /// Update `key`'s data in place. Returns false (and writes nothing) if
    /// the key holds no data of type `T`.
    pub fn patch<T, F>(&mut self, key: &QueryKey, f: F) -> bool
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce(&mut T),
    {
        let entry = self.snapshot_of(key);
        let Some(current) = entry.state().data_as::<T>() else {
            return false;
        };
        let mut next = T::clone(&current);
        f(&mut next);
        entry.write(Arc::new(next));
        debug!(%key, "optimistic patch");
        true
    }

    /// Apply `f` to every covered entry holding a `T`. Returns how many
    /// were patched.
    pub fn patch_each<T, F>(&mut self, mut f: F) -> usize
    where
        T: Clone + Send + Sync + 'static,
        F: FnMut(&mut T),
    {
        let keys: Vec<QueryKey> = self.keys().cloned().collect();
        keys.iter()
            .filter(|key| self.patch::<T, _>(key, &mut f))
            .count()
    }

    /// Keep the patched values.
    pub fn commit(mut self) {
        self.finished = true;
        debug!(entries = self.snapshots.len(), "transaction committed");
    }

    /// Restore every snapshot exactly.
    pub fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) {
        self.finished = true;
        for snap in self.snapshots.drain(..) {
            self.client.cancel_queries(&KeyFilter::from(&snap.key));
            snap.entry.restore(snap.state);
            debug!(key = %snap.key, "optimistic patch rolled back");
        }
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.finished {
            self.restore();
        }
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("keys", &self.keys().collect::<Vec<_>>())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::query::QueryStatus;

    fn key() -> QueryKey {
        QueryKey::new("notifications")
    }

    #[tokio::test]
    async fn rollback_restores_exact_snapshot() {
        let client = QueryClient::new(CacheConfig::default());
        client.set_query_data(&key(), vec![false, false]);
        let before = client.query_state(&key()).expect("entry");

        let mut tx = client.begin(&KeyFilter::resource("notifications"));
        assert!(tx.patch::<Vec<bool>, _>(&key(), |v| v[0] = true));
        assert_eq!(
            client.get_query_data::<Vec<bool>>(&key()).as_deref(),
            Some(&vec![true, false])
        );

        tx.rollback();
        let after = client.query_state(&key()).expect("entry");
        assert_eq!(
            after.data_as::<Vec<bool>>().as_deref(),
            Some(&vec![false, false])
        );
        assert_eq!(after.status, before.status);
        assert_eq!(after.updated_at, before.updated_at);
        assert!(after.seq > before.seq);
    }

    #[tokio::test]
    async fn commit_keeps_patch() {
        let client = QueryClient::new(CacheConfig::default());
        client.set_query_data(&key(), 1_u32);

        let mut tx = client.begin(&KeyFilter::from(key()));
        assert_eq!(tx.patch_each::<u32, _>(|n| *n += 1), 1);
        tx.commit();

        assert_eq!(client.get_query_data::<u32>(&key()).as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn drop_without_commit_rolls_back() {
        let client = QueryClient::new(CacheConfig::default());
        client.set_query_data(&key(), 1_u32);
        {
            let mut tx = client.begin(&KeyFilter::All);
            tx.patch::<u32, _>(&key(), |n| *n = 9);
        }
        assert_eq!(client.get_query_data::<u32>(&key()).as_deref(), Some(&1));
    }

    #[tokio::test]
    async fn patch_without_data_is_a_no_op() {
        let client = QueryClient::new(CacheConfig::default());
        let mut tx = client.begin(&KeyFilter::All);
        assert!(!tx.patch::<u32, _>(&key(), |n| *n = 9));
        tx.rollback();
        let state = client.query_state(&key()).expect("entry created by patch");
        assert_eq!(state.status, QueryStatus::Pending);
        assert!(state.data.is_none());
    }
}
