use std::sync::Arc;

use arc_swap::ArcSwapOption;
use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Source of the bearer credential attached to every outbound request.
///
/// The session itself (sign-in UI, token refresh) lives outside this
/// crate. `ApiClient` only reads the current token and reports a 401 back
/// through [`on_unauthorized`](Self::on_unauthorized), which is process-wide:
/// it fires no matter which caller issued the failing request.
pub trait SessionProvider: Send + Sync {
    /// The current access token, if signed in.
    fn bearer_token(&self) -> Option<SecretString>;

    /// Called by the HTTP adapter on every 401 response.
    fn on_unauthorized(&self);
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token has been provided yet.
    Anonymous,
    /// A token is present and has not been rejected.
    SignedIn,
    /// The API rejected the token. Consumers should route the user back
    /// to sign-in.
    SignInRequired,
}

/// Default in-memory [`SessionProvider`].
///
/// The token is swapped atomically so readers on the request path never
/// block. State transitions are broadcast on a `watch` channel.
pub struct SessionStore {
    token: ArcSwapOption<SecretString>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            token: ArcSwapOption::empty(),
            state,
        }
    }

    /// Create a store that is already signed in with `token`.
    pub fn with_token(token: SecretString) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }

    /// Install a fresh access token (after login or from config).
    pub fn set_token(&self, token: SecretString) {
        self.token.store(Some(Arc::new(token)));
        self.state.send_replace(SessionState::SignedIn);
        debug!("session token installed");
    }

    /// Drop the token and return to the anonymous state.
    pub fn clear(&self) {
        self.token.store(None);
        self.state.send_replace(SessionState::Anonymous);
        debug!("session cleared");
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.load().is_some()
    }

    /// Subscribe to session state changes (e.g. to react to a forced sign-out).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionProvider for SessionStore {
    fn bearer_token(&self) -> Option<SecretString> {
        self.token.load_full().map(|t| (*t).clone())
    }

    fn on_unauthorized(&self) {
        warn!("API rejected the session token; sign-in required");
        self.token.store(None);
        self.state.send_replace(SessionState::SignInRequired);
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn starts_anonymous_without_token() {
        let store = SessionStore::new();
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(store.bearer_token().is_none());
    }

    #[test]
    fn unauthorized_clears_token_and_requires_sign_in() {
        let store = SessionStore::with_token(SecretString::from("abc".to_string()));
        let rx = store.subscribe();
        assert_eq!(
            store.bearer_token().map(|t| t.expose_secret().to_owned()),
            Some("abc".to_owned())
        );

        store.on_unauthorized();

        assert!(store.bearer_token().is_none());
        assert_eq!(*rx.borrow(), SessionState::SignInRequired);
    }
}
