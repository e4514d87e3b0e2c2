// ── Runtime console configuration ──
//
// These types describe how to reach the admin API and how long cached
// data stays fresh. The CLI builds a `ConsoleConfig` from its profile and
// hands it in; core never reads config files.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use ridedesk_api::TransportConfig;

/// Cache tuning shared by every query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Default freshness window. Zero means "stale as soon as fetched",
    /// so every new observer triggers a background refetch.
    pub stale_time: Duration,
    /// How long an entry survives after its last observer detaches.
    pub gc_time: Duration,
    /// Period of the background GC sweep.
    pub gc_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: Duration::from_secs(5 * 60),
            gc_interval: Duration::from_secs(60),
        }
    }
}

/// Everything a [`Console`](crate::Console) needs.
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// API base URL (e.g., `https://api.example.com/`).
    pub api_url: Url,
    /// Stored bearer token, if any. Installed into the session on start.
    pub token: Option<SecretString>,
    pub transport: TransportConfig,
    pub cache: CacheConfig,
    /// Freshness window for the notifications query.
    pub notification_stale_time: Duration,
    /// Polling period for the notifications query.
    pub notification_poll: Duration,
}

impl ConsoleConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            token: None,
            transport: TransportConfig::default(),
            cache: CacheConfig::default(),
            notification_stale_time: Duration::from_secs(5 * 60),
            notification_poll: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }
}
