//! Request core of the Eventaic client.
//!
//! Every outbound call flows through [`EventaicClient::send_json`]: the
//! persisted access token is attached as a bearer credential, and a 401
//! response triggers at most one refresh-token exchange followed by a single
//! replay of the original request. Unrecoverable auth failures clear the
//! session and notify subscribers; everything else is normalized into
//! [`ApiError`] and propagated.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::auth::TokenGrant;
use crate::config::ClientConfig;
use crate::error::{self, ApiError};
use crate::session::SessionManager;

/// Dedicated, non-intercepted token-refresh endpoint.
const REFRESH_PATH: &str = "/api/v1/auth/refresh";

/// Refresh attempts allowed per original request. One: a refresh that itself
/// comes back unauthorized must not start a retry loop.
const MAX_REFRESH_ATTEMPTS: u32 = 1;

/// Per-call options.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    /// Override the client-wide request timeout for this call.
    pub timeout: Option<Duration>,
}

/// Generic acknowledgement body (`{"message": "..."}`) returned by several
/// mutation endpoints.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiMessage {
    /// Human-readable confirmation.
    pub message: String,
}

/// Authenticated Eventaic API client.
///
/// Cheap to clone; clones share the HTTP connection pool, the session, and
/// the retry bookkeeping. Independent calls run concurrently and are never
/// serialized against each other.
#[derive(Clone)]
pub struct EventaicClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: reqwest::Client,
    config: ClientConfig,
    session: SessionManager,
    /// Refresh attempts per in-flight request, keyed by request ID. Entries
    /// are removed as soon as the call's outcome is known.
    retries: Mutex<HashMap<Uuid, u32>>,
}

impl std::fmt::Debug for EventaicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventaicClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl EventaicClient {
    /// Create a client over the given configuration and session.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: ClientConfig, session: SessionManager) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            inner: Arc::new(ClientInner {
                http,
                config,
                session,
                retries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The session manager this client reads credentials from.
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.inner.session
    }

    /// Persist an access token (and user summary) for subsequent calls.
    pub fn set_auth(&self, access_token: &str, user: Option<&eventaic_core::UserSummary>) {
        self.inner.session.set_auth(access_token, user);
    }

    /// Delete all session state and any in-flight retry bookkeeping.
    ///
    /// Safe to call any number of times.
    pub fn clear_auth(&self) {
        self.inner.session.clear();
        self.inner
            .retries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The persisted access token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.session.token()
    }

    /// The persisted user summary, or `None` when absent or malformed.
    #[must_use]
    pub fn user(&self) -> Option<eventaic_core::UserSummary> {
        self.inner.session.user()
    }

    // =========================================================================
    // Request verbs
    // =========================================================================

    /// `GET` a backend-relative path.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.builder(Method::GET, path), RequestOptions::default())
            .await
    }

    /// `GET` with query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send_json(
            self.builder(Method::GET, path).query(query),
            RequestOptions::default(),
        )
        .await
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post_with(path, body, RequestOptions::default()).await
    }

    /// `POST` a JSON body with per-call options (e.g., a longer timeout for
    /// generation endpoints).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn post_with<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.builder(Method::POST, path).json(body), options)
            .await
    }

    /// `POST` without a body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.builder(Method::POST, path), RequestOptions::default())
            .await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.builder(Method::PUT, path).json(body), RequestOptions::default())
            .await
    }

    /// `PUT` with query parameters and no body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn put_query<Q, T>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(
            self.builder(Method::PUT, path).query(query),
            RequestOptions::default(),
        )
        .await
    }

    /// `DELETE`, expecting no response body (204).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure or non-success status.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_no_content(self.builder(Method::DELETE, path), RequestOptions::default())
            .await
    }

    /// `DELETE`, expecting a JSON response body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport failure, non-success status, or an
    /// unparseable body.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(self.builder(Method::DELETE, path), RequestOptions::default())
            .await
    }

    // =========================================================================
    // Request core
    // =========================================================================

    fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        self.inner.http.request(method, self.inner.config.endpoint(path))
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.send_with_recovery(builder, options).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_no_content(
        &self,
        builder: RequestBuilder,
        options: RequestOptions,
    ) -> Result<(), ApiError> {
        self.send_with_recovery(builder, options).await.map(|_| ())
    }

    /// Issue a request with bearer attachment and single-shot 401 recovery.
    ///
    /// The per-request bookkeeping entry is removed on every exit path, so
    /// the retry map never grows with the application's lifetime.
    async fn send_with_recovery(
        &self,
        builder: RequestBuilder,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let request_id = Uuid::new_v4();
        let outcome = self.drive(request_id, builder, options).await;
        self.finish_request(request_id);
        outcome
    }

    /// The recovery loop. Runs the original request, and on a 401 performs
    /// the refresh-and-replay flow; [`Self::begin_refresh_attempt`] caps the
    /// loop at one replay per request ID.
    async fn drive(
        &self,
        request_id: Uuid,
        mut builder: RequestBuilder,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        loop {
            let replay = builder.try_clone();
            let response = self.dispatch(builder, options).await?;

            if response.status() != StatusCode::UNAUTHORIZED {
                return Self::ok_or_error(response).await;
            }

            // Already refreshed for this request: the new credential is bad
            // too. Propagate the 401 instead of looping.
            if !self.begin_refresh_attempt(request_id) {
                warn!(%request_id, "Still unauthorized after refresh, giving up");
                return Self::ok_or_error(response).await;
            }

            let Some(refresh_token) = self.inner.session.refresh_token() else {
                debug!(%request_id, "Unauthorized with no refresh token, ending session");
                self.inner.session.expire("signed out");
                return Err(ApiError::AuthExpired(
                    "no refresh token available".to_string(),
                ));
            };

            match self.refresh(&refresh_token).await {
                Ok(grant) => self.inner.session.apply(&grant),
                Err(refresh_error) => {
                    warn!(%request_id, error = %refresh_error, "Token refresh failed, ending session");
                    self.inner.session.expire("session expired");
                    // The refresh failure, not the original 401, reaches the
                    // caller.
                    return Err(ApiError::AuthExpired(refresh_error.to_string()));
                }
            }

            let Some(next) = replay else {
                // Body cannot be cloned for replay; surface the original 401.
                return Self::ok_or_error(response).await;
            };
            debug!(%request_id, "Replaying request with refreshed token");
            builder = next;
        }
    }

    /// Attach the current bearer token (when present) and transmit.
    async fn dispatch(
        &self,
        mut builder: RequestBuilder,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        if let Some(token) = self.inner.session.token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))
    }

    /// Pass through success responses; normalize everything else.
    async fn ok_or_error(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(error::normalize(status, &body))
    }

    /// Exchange the refresh token for a new grant.
    ///
    /// Deliberately bypasses the interception path and uses its own, shorter
    /// timeout.
    #[instrument(skip(self, refresh_token))]
    async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, ApiError> {
        let response = self
            .inner
            .http
            .post(self.inner.config.endpoint(REFRESH_PATH))
            .timeout(self.inner.config.refresh_timeout)
            .json(&crate::auth::RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;

        let response = Self::ok_or_error(response).await?;
        response
            .json::<TokenGrant>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // =========================================================================
    // Retry bookkeeping
    // =========================================================================

    /// Record a refresh attempt for `request_id`. Returns `false` when the
    /// cap has already been reached.
    fn begin_refresh_attempt(&self, request_id: Uuid) -> bool {
        let mut retries = self
            .inner
            .retries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let count = retries.entry(request_id).or_insert(0);
        if *count >= MAX_REFRESH_ATTEMPTS {
            return false;
        }
        *count += 1;
        true
    }

    /// Drop the bookkeeping entry for a settled request.
    fn finish_request(&self, request_id: Uuid) {
        self.inner
            .retries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&request_id);
    }

    #[cfg(test)]
    fn tracked_requests(&self) -> usize {
        self.inner
            .retries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> EventaicClient {
        let config = ClientConfig::new("http://localhost:8000").expect("valid url");
        EventaicClient::new(config, SessionManager::in_memory())
    }

    #[test]
    fn test_refresh_attempts_are_capped_per_request() {
        let client = test_client();
        let request_id = Uuid::new_v4();

        assert!(client.begin_refresh_attempt(request_id));
        // Second attempt for the same request is refused.
        assert!(!client.begin_refresh_attempt(request_id));

        // A different request is unaffected.
        assert!(client.begin_refresh_attempt(Uuid::new_v4()));
    }

    #[test]
    fn test_bookkeeping_is_removed_when_request_settles() {
        let client = test_client();
        let request_id = Uuid::new_v4();

        assert!(client.begin_refresh_attempt(request_id));
        assert_eq!(client.tracked_requests(), 1);

        client.finish_request(request_id);
        assert_eq!(client.tracked_requests(), 0);

        // Settling an untracked request is a no-op.
        client.finish_request(request_id);
        assert_eq!(client.tracked_requests(), 0);
    }

    #[test]
    fn test_clear_auth_drops_bookkeeping() {
        let client = test_client();
        client.set_auth("T1", None);
        assert!(client.begin_refresh_attempt(Uuid::new_v4()));

        client.clear_auth();
        assert_eq!(client.tracked_requests(), 0);
        assert!(client.token().is_none());

        // Idempotent.
        client.clear_auth();
        assert!(client.token().is_none());
    }

    #[test]
    fn test_api_message_deserializes() {
        let message: ApiMessage =
            serde_json::from_str(r#"{"message": "Company activated successfully"}"#)
                .expect("deserialize");
        assert_eq!(message.message, "Company activated successfully");
    }
}
