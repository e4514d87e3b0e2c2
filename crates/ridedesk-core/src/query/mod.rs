//! Keyed query cache.
//!
//! [`QueryClient`] owns one entry per [`QueryKey`]. Screens read through
//! [`QueryObserver`]s; writes go through mutations or [`Transaction`]s.

mod client;
mod entry;
mod key;
mod observer;
mod transaction;

pub use client::QueryClient;
pub use entry::{EntryState, Payload, QueryStatus};
pub use key::{KeyFilter, QueryKey};
pub use observer::{QueryObserver, QueryOptions, QueryResult};
pub use transaction::Transaction;
