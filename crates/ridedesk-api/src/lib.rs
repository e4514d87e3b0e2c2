//! Async client for the ride-hailing admin REST API.
//!
//! [`ApiClient`] is the single HTTP adapter: it attaches the bearer token
//! from a [`SessionProvider`], routes 401s back to the session, and
//! normalizes every list endpoint into [`Page<T>`](models::Page). Endpoint
//! groups (drivers, vehicles, promo codes, ...) are inherent methods on
//! the client.

pub mod auth;
pub mod client;
pub mod error;
pub mod models;
mod resources;
pub mod transport;

pub use auth::{SessionProvider, SessionState, SessionStore};
pub use client::ApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
