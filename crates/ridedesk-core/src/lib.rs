//! Query cache and mutation coordination between `ridedesk-api` and the
//! console front ends.
//!
//! - **[`QueryClient`]**: keyed request cache. One entry per
//!   [`QueryKey`], state broadcast on a `tokio::sync::watch` channel,
//!   at most one request in flight per key, per-key sequence numbers so
//!   an older response never overwrites a newer write.
//!
//! - **[`QueryObserver<T>`]**: one screen's subscription to a key, with
//!   staleness, an enabled gate, keep-previous-data for pagination and
//!   interval polling.
//!
//! - **[`Mutation<I, O>`]**: validate, optimistic [`Transaction`],
//!   network call, then invalidate and commit or roll back.
//!
//! - **[`Console`]**: facade owning the API client, the session and the
//!   cache, with one observer per screen and one mutation per write.

pub mod config;
pub mod console;
pub mod error;
pub mod keys;
pub mod mutation;
pub mod query;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CacheConfig, ConsoleConfig};
pub use console::{
    Console, NewVehicle, Notice, NoticeLevel, PagedQuery, Paginated, Update, VehicleAssignment,
};
pub use error::CoreError;
pub use mutation::{Mutation, MutationBuilder, MutationState, MutationStatus};
pub use query::{
    EntryState, KeyFilter, Payload, QueryClient, QueryKey, QueryObserver, QueryOptions,
    QueryResult, QueryStatus, Transaction,
};

// Wire models and session types, for consumers that only depend on core.
pub use ridedesk_api::models;
pub use ridedesk_api::{SessionState, SessionStore, TlsMode, TransportConfig};
