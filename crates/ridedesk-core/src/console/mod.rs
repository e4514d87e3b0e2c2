// ── Console facade ──
//
// Owns the API client, the session and the query cache for one admin
// console. Screens get observers from `screens.rs`, writes go through the
// mutations in `actions.rs`. Every write reports its outcome as a
// `Notice` on a broadcast channel.

mod actions;
mod screens;

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ridedesk_api::models::{ApiMessage, LoginSession, OtpPurpose};
use ridedesk_api::{ApiClient, SessionProvider, SessionState, SessionStore};

use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::query::QueryClient;

pub use actions::{NewVehicle, Update, VehicleAssignment};
pub use screens::{PagedQuery, Paginated};

const NOTICE_CHANNEL_SIZE: usize = 64;

// ── Notices ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message for the user (a toast in a UI, a line on stderr
/// in the CLI).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

// ── Console ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ConsoleInner>`.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    api: ApiClient,
    session: Arc<SessionStore>,
    queries: QueryClient,
    notices: broadcast::Sender<Notice>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Console {
    /// Build a console from config. Installs the configured token, if any.
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let session = Arc::new(SessionStore::new());
        if let Some(token) = &config.token {
            session.set_token(token.clone());
        }
        let provider: Arc<dyn SessionProvider> = session.clone();
        let api = ApiClient::new(config.api_url.as_str(), provider, &config.transport)?;
        Ok(Self::from_parts(config, api, session))
    }

    /// Assemble a console around an existing client and session.
    pub fn from_parts(config: ConsoleConfig, api: ApiClient, session: Arc<SessionStore>) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        let queries = QueryClient::new(config.cache.clone());
        Self {
            inner: Arc::new(ConsoleInner {
                config,
                api,
                session,
                queries,
                notices,
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the background tasks: cache GC and the session watcher that
    /// drops every cached query when the API rejects the token.
    pub async fn start(&self) {
        let mut tasks = self.inner.tasks.lock().await;
        if !tasks.is_empty() {
            return;
        }
        tasks.push(self.inner.queries.spawn_gc(self.inner.cancel.child_token()));
        tasks.push(tokio::spawn(session_watch_task(
            self.clone(),
            self.inner.session.subscribe(),
            self.inner.cancel.child_token(),
        )));
        debug!(tasks = tasks.len(), "console started");
    }

    /// Stop background tasks and wait for them to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handles: Vec<_> = self.inner.tasks.lock().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task panicked");
            }
        }
        debug!("console shut down");
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn queries(&self) -> &QueryClient {
        &self.inner.queries
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.inner.session
    }

    pub fn session_state(&self) -> watch::Receiver<SessionState> {
        self.inner.session.subscribe()
    }

    /// Subscribe to user-facing notices.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notices.subscribe()
    }

    pub(crate) fn notify(&self, notice: Notice) {
        debug!(level = %notice.level, message = %notice.message, "notice");
        // No receivers is fine: nobody is showing notices.
        let _ = self.inner.notices.send(notice);
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Sign in and install the token. Only admin accounts are accepted.
    pub async fn login(
        &self,
        email_or_phone: &str,
        password: &SecretString,
    ) -> Result<LoginSession, CoreError> {
        let session = self.inner.api.login(email_or_phone, password).await?;
        if !session.user.is_admin() {
            warn!(role = %session.user.role, "non-admin login rejected");
            return Err(CoreError::PermissionDenied {
                message: "Access denied. Admin only.".into(),
            });
        }
        self.inner.session.set_token(session.token.clone());
        info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    /// Drop the token and everything cached under it.
    pub fn logout(&self) {
        self.inner.session.clear();
        self.inner.queries.clear();
        info!("signed out");
    }

    pub fn is_signed_in(&self) -> bool {
        self.inner.session.is_signed_in()
    }

    // ── Password recovery ────────────────────────────────────────────

    pub async fn request_password_reset(
        &self,
        email_or_phone: &str,
    ) -> Result<ApiMessage, CoreError> {
        Ok(self.inner.api.request_password_reset(email_or_phone).await?)
    }

    pub async fn verify_otp(
        &self,
        email: &str,
        otp: &str,
        purpose: OtpPurpose,
    ) -> Result<ApiMessage, CoreError> {
        ridedesk_api::models::account::validate_otp(otp)?;
        Ok(self.inner.api.verify_otp(email, otp, purpose).await?)
    }

    pub async fn reset_password(
        &self,
        email_or_phone: &str,
        new_password: &SecretString,
    ) -> Result<ApiMessage, CoreError> {
        ridedesk_api::models::account::validate_new_password(new_password)?;
        Ok(self
            .inner
            .api
            .reset_password(email_or_phone, new_password)
            .await?)
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("api", &self.inner.api)
            .field("queries", &self.inner.queries)
            .field("session", &self.inner.session.state())
            .finish_non_exhaustive()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

async fn session_watch_task(
    console: Console,
    mut state: watch::Receiver<SessionState>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                if *state.borrow_and_update() == SessionState::SignInRequired {
                    warn!("session rejected by the API, clearing cache");
                    console.inner.queries.clear();
                    console.notify(Notice::error("Session expired. Please sign in again."));
                }
            }
        }
    }
}
