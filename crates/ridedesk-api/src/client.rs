// Async HTTP client for the ride-hailing admin REST API.
//
// Every endpoint module (drivers, vehicles, promo codes, ...) is an
// inherent `impl ApiClient` block in `resources/`, so this file only deals
// with transport mechanics: URL building, bearer injection, the 401 hook,
// and response decoding.

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::SessionProvider;
use crate::error::Error;
use crate::models::Page;
use crate::models::page::normalize_page;
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the admin API.
///
/// Holds the shared `reqwest::Client`, the normalized base URL and the
/// [`SessionProvider`] that supplies the bearer token. Cloning is cheap;
/// clones share the connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for `base_url` using the given transport settings.
    pub fn new(
        base_url: &str,
        session: Arc<dyn SessionProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(http, base_url, session)
    }

    /// Wrap an existing `reqwest::Client` (used by tests).
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: Arc<dyn SessionProvider>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Ensure the base URL ends with `/` so relative joins keep any
    /// path prefix (`https://host/backend/` + `api/admin/drivers`).
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<dyn SessionProvider> {
        &self.session
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"api/admin/drivers"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Send ─────────────────────────────────────────────────────────

    /// Send a prepared request through the adapter.
    ///
    /// Attaches `Authorization: Bearer <token>` when the session has one.
    /// A 401 notifies the session provider and yields
    /// [`Error::Unauthenticated`]; every other response is returned as-is
    /// for the caller to interpret.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let request = match self.session.bearer_token() {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let resp = request.send().await?;
        trace!(status = %resp.status(), url = %resp.url(), "response");

        if resp.status() == StatusCode::UNAUTHORIZED {
            debug!(url = %resp.url(), "401 from API, signalling sign-in");
            self.session.on_unauthorized();
            return Err(Error::Unauthenticated);
        }

        Ok(resp)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.send(self.http.get(url)).await?;
        Self::handle_response(resp).await
    }

    /// `GET path?page=N`, normalized into a [`Page`].
    ///
    /// `items_field` names the list inside `data` for endpoints that wrap
    /// it (`{data: {drivers: [..], pagination: {..}}}`).
    pub(crate) async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
        items_field: &str,
    ) -> Result<Page<T>, Error> {
        let body: serde_json::Value = self
            .get_with_params(path, &[("page", page.to_string())])
            .await?;
        normalize_page(body, items_field, page)
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let resp = self.send(self.http.get(url).query(params)).await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.send(self.http.post(url).json(body)).await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.send(self.http.put(url).json(body)).await?;
        Self::handle_response(resp).await
    }

    /// `PUT` without a request body (approve / reject style actions).
    pub(crate) async fn put_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.send(self.http.put(url)).await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.send(self.http.delete(url)).await?;
        Self::handle_response(resp).await
    }

    /// Unauthenticated `POST` for the account endpoints.
    ///
    /// Sign-in and password recovery happen before a session exists, so a
    /// 401 here means "wrong credentials", not "session expired", and must
    /// not trigger the sign-out hook.
    pub(crate) async fn post_anonymous<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} (anonymous)");

        let resp = self.http.post(url).json(body).send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = Self::error_message(status, resp).await;
            return Err(Error::Authentication { message });
        }
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            // Some delete / action endpoints answer 204 with no body.
            let body = if body.trim().is_empty() {
                "{}".to_owned()
            } else {
                body
            };
            serde_json::from_str(&body).map_err(|e| {
                let preview = preview(&body, 200);
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.clone(),
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: StatusCode, resp: Response) -> Error {
        Error::Api {
            status: status.as_u16(),
            message: Self::error_message(status, resp).await,
        }
    }

    /// The server's `message` (or `error`) field, falling back to the raw
    /// body and then the status line.
    async fn error_message(status: StatusCode, resp: Response) -> String {
        let raw = resp.text().await.unwrap_or_default();

        serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.message.or(err.error))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            })
    }
}

/// At most `max_chars` characters of `body`, cut on a char boundary.
fn preview(body: &str, max_chars: usize) -> &str {
    let end = body
        .char_indices()
        .nth(max_chars)
        .map_or(body.len(), |(i, _)| i);
    &body[..end]
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), base, Arc::new(SessionStore::new()))
            .expect("valid base url")
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let c = client("https://api.example.com");
        assert_eq!(c.base_url().as_str(), "https://api.example.com/");
    }

    #[test]
    fn join_keeps_path_prefix() {
        let c = client("https://example.com/backend");
        let url = c.url("/api/admin/drivers").expect("join");
        assert_eq!(url.as_str(), "https://example.com/backend/api/admin/drivers");
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        let body = format!("{}éééé", "a".repeat(199));
        let cut = preview(&body, 200);
        assert_eq!(cut.chars().count(), 200);
        assert!(cut.ends_with('é'));
        assert_eq!(preview("short", 200), "short");
    }
}
