//! Integration tests for the Eventaic client SDK.
//!
//! Tests in `tests/` drive the real [`eventaic_client::EventaicClient`] over
//! HTTP against the in-process mock backend defined here. The mock speaks
//! the same wire contract as the platform backend - token grants, bearer
//! validation, FastAPI-style error bodies - and exposes switches for the
//! failure modes the client must recover from (expired access tokens,
//! rejected refresh tokens, refresh grants that are themselves unusable).
//!
//! # Test Categories
//!
//! - `auth_flow` - bearer attachment, 401 refresh-and-replay, session expiry
//! - `api_surface` - typed endpoints, error normalization, logout semantics

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Password the mock accepts at login and registration.
pub const VALID_PASSWORD: &str = "Str0ngPass!";

/// Fixed user identity served by the mock.
pub const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
/// Fixed user email served by the mock.
pub const USER_EMAIL: &str = "a@b.com";

/// Shared, inspectable state of the mock backend.
#[derive(Debug, Default)]
pub struct MockState {
    /// Access tokens currently accepted for bearer auth.
    valid_tokens: Mutex<HashSet<String>>,
    /// The refresh token the server currently accepts.
    valid_refresh: Mutex<Option<String>>,
    /// When set, the refresh endpoint rejects every exchange.
    reject_refresh: AtomicBool,
    /// When set, refresh succeeds but issues tokens the server will not
    /// accept - the "refresh that itself yields 401" case.
    refresh_issues_unusable_tokens: AtomicBool,
    /// When set, the logout endpoint fails with a 500.
    fail_logout: AtomicBool,
    /// Number of refresh exchanges attempted against the mock.
    pub refresh_calls: AtomicUsize,
    /// `Authorization` header of every profile call, in arrival order.
    pub profile_auth_headers: Mutex<Vec<Option<String>>>,
    /// Monotonic token counter.
    token_seq: AtomicUsize,
}

impl MockState {
    /// Expire every outstanding access token; the refresh token stays valid.
    pub fn invalidate_access_tokens(&self) {
        self.lock_tokens().clear();
    }

    /// Make the refresh endpoint reject every exchange.
    pub fn reject_refresh(&self) {
        self.reject_refresh.store(true, Ordering::SeqCst);
    }

    /// Make refresh succeed while issuing tokens bearer auth will refuse.
    pub fn issue_unusable_tokens_on_refresh(&self) {
        self.refresh_issues_unusable_tokens
            .store(true, Ordering::SeqCst);
    }

    /// Make the logout endpoint fail.
    pub fn fail_logout(&self) {
        self.fail_logout.store(true, Ordering::SeqCst);
    }

    /// Whether the given access token is currently accepted.
    pub fn is_token_valid(&self, token: &str) -> bool {
        self.lock_tokens().contains(token)
    }

    /// Number of refresh exchanges seen so far.
    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Recorded `Authorization` headers of the profile endpoint.
    pub fn recorded_auth_headers(&self) -> Vec<Option<String>> {
        self.profile_auth_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn lock_tokens(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.valid_tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a full login/registration grant: fresh access and refresh
    /// tokens plus the user object.
    fn issue_grant(&self) -> Value {
        let access = self.issue_access_token();
        let refresh = format!("refresh-for-{access}");
        *self
            .valid_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(refresh.clone());

        json!({
            "access_token": access,
            "refresh_token": refresh,
            "token_type": "bearer",
            "expires_in": 1800,
            "user": sample_user(),
        })
    }

    /// Issue a new access token without rotating the refresh token, as the
    /// refresh endpoint does.
    fn issue_access_token(&self) -> String {
        let seq = self.token_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{seq}");
        if !self.refresh_issues_unusable_tokens.load(Ordering::SeqCst) {
            self.lock_tokens().insert(access.clone());
        }
        access
    }
}

/// The in-process mock backend.
pub struct MockBackend {
    /// Address the backend is listening on.
    pub addr: SocketAddr,
    /// Shared state, for assertions and failure injection.
    pub state: Arc<MockState>,
}

impl MockBackend {
    /// Bind to an ephemeral local port and start serving.
    ///
    /// # Panics
    ///
    /// Panics when the listener cannot be bound; tests cannot proceed
    /// without it.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/auth/refresh", post(refresh))
            .route("/api/v1/auth/logout", post(logout))
            .route("/api/v1/auth/me", get(profile))
            .route("/api/v1/users/profile", get(profile))
            .route("/api/v1/ads/", get(list_ads))
            .route("/api/v1/ads/{id}", delete(delete_ad))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    /// Base URL of the mock backend.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

/// Build a real client wired to the mock backend over an in-memory session.
///
/// # Panics
///
/// Panics when the mock URL is rejected, which would be a bug in
/// [`MockBackend::start`].
#[must_use]
pub fn client_for(backend: &MockBackend) -> eventaic_client::EventaicClient {
    let config = eventaic_client::ClientConfig::new(&backend.url()).expect("valid mock url");
    eventaic_client::EventaicClient::new(config, eventaic_client::SessionManager::in_memory())
}

fn sample_user() -> Value {
    json!({
        "id": USER_ID,
        "email": USER_EMAIL,
        "username": "ada",
        "full_name": "Ada Lovelace",
        "name": "Ada Lovelace",
        "role": "company",
        "company_id": null,
        "company_name": "Initech"
    })
}

fn unauthorized(detail: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": detail }))).into_response()
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from)
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<LoginBody>) -> Response {
    if body.username.is_empty() || body.password != VALID_PASSWORD {
        return unauthorized("Incorrect username/email or password");
    }
    Json(state.issue_grant()).into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    email: String,
    password: String,
}

async fn register(State(state): State<Arc<MockState>>, Json(body): Json<RegisterBody>) -> Response {
    // FastAPI-style field validation errors.
    if !body.password.chars().any(|c| c.is_ascii_digit()) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [{
                    "loc": ["body", "password"],
                    "msg": "Password must contain at least one digit",
                    "type": "value_error"
                }]
            })),
        )
            .into_response();
    }
    if body.email == "taken@b.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Email already registered" })),
        )
            .into_response();
    }
    Json(state.issue_grant()).into_response()
}

#[derive(Deserialize)]
struct RefreshBody {
    refresh_token: String,
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<RefreshBody>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let accepted = state
        .valid_refresh
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_deref()
        == Some(body.refresh_token.as_str());

    if state.reject_refresh.load(Ordering::SeqCst) || !accepted {
        return unauthorized("Invalid refresh token");
    }

    // The refresh response carries no user object and no rotated refresh
    // token; the client must cope with a minimal grant.
    Json(json!({
        "access_token": state.issue_access_token(),
        "token_type": "bearer",
        "expires_in": 1800,
    }))
    .into_response()
}

async fn logout(State(state): State<Arc<MockState>>) -> Response {
    if state.fail_logout.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "logout backend unavailable" })),
        )
            .into_response();
    }
    Json(json!({ "message": "Successfully logged out" })).into_response()
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    let raw_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    state
        .profile_auth_headers
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(raw_header);

    match bearer_token(&headers) {
        Some(token) if state.is_token_valid(&token) => {
            let mut user = sample_user();
            user["is_email_verified"] = json!(true);
            Json(user).into_response()
        }
        _ => unauthorized("Could not validate credentials"),
    }
}

async fn list_ads(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    match bearer_token(&headers) {
        Some(token) if state.is_token_valid(&token) => Json(json!({
            "total": 1,
            "page": 1,
            "per_page": 20,
            "ads": [sample_ad()]
        }))
        .into_response(),
        _ => unauthorized("Could not validate credentials"),
    }
}

async fn delete_ad(
    State(state): State<Arc<MockState>>,
    Path(_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    match bearer_token(&headers) {
        Some(token) if state.is_token_valid(&token) => StatusCode::NO_CONTENT.into_response(),
        _ => unauthorized("Could not validate credentials"),
    }
}

fn sample_ad() -> Value {
    json!({
        "id": "770e8400-e29b-41d4-a716-446655440000",
        "event_name": "Black Friday",
        "product_name": null,
        "product_categories": ["electronics"],
        "location": null,
        "company_id": "660e8400-e29b-41d4-a716-446655440000",
        "company_name": "Initech",
        "content": {
            "headline": "Half Price Everything",
            "description": "One day only.",
            "slogan": "Go big",
            "cta_text": "Shop now",
            "keywords": ["sale"],
            "hashtags": ["#blackfriday"],
            "image_prompt": "storefront at night",
            "image_base64": null,
            "image_url": null
        },
        "platforms": ["google_ads", "meta_ads"],
        "platform_details": {},
        "status": "generated",
        "ad_type": "product_gen",
        "evaluation_score": null,
        "evaluation_details": null,
        "regeneration_count": 0,
        "parent_ad_id": null,
        "created_at": "2025-11-28T00:00:00Z",
        "updated_at": "2025-11-28T00:00:00Z",
        "evaluated_at": null
    })
}
