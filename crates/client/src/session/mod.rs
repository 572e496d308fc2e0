//! Session credentials: persistence, accessors, and change events.
//!
//! The [`SessionManager`] exclusively owns the persisted session (access
//! token, refresh token, user summary). The rest of the application reads
//! through [`SessionManager::token`] / [`SessionManager::user`] and never
//! touches the storage keys directly. Components interested in auth state
//! changes subscribe to a broadcast of [`SessionEvent`]s instead of relying
//! on ambient global state.

mod store;

use std::sync::Arc;

use eventaic_core::UserSummary;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub use store::{FileStore, MemoryStore, SessionStore};

use crate::auth::TokenGrant;

/// Storage keys for persisted session state.
///
/// Implementation detail of this module: other code goes through the
/// accessors.
mod keys {
    /// Key for the short-lived bearer access token.
    pub const ACCESS_TOKEN: &str = "eventaic_access_token";

    /// Key for the longer-lived refresh token.
    pub const REFRESH_TOKEN: &str = "eventaic_refresh_token";

    /// Key for the serialized [`eventaic_core::UserSummary`] JSON.
    pub const USER: &str = "eventaic_user";
}

/// Capacity of the session event channel. Slow subscribers lag and drop
/// old events rather than block the client.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Auth state change notification.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A user summary was stored or replaced (login, refresh, profile
    /// update).
    Updated(UserSummary),
    /// The session was cleared deliberately (logout, `clear_auth`).
    Cleared,
    /// The session could not be recovered and was cleared; consumers should
    /// route the user back to login.
    Expired {
        /// Human-readable reason, suitable for a "session expired" notice.
        reason: String,
    },
}

/// Owner of the persisted session credentials.
///
/// Cheap to clone; clones share the same storage and event channel.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionManagerInner>,
}

struct SessionManagerInner {
    store: Box<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.token().is_some())
            .finish_non_exhaustive()
    }
}

impl SessionManager {
    /// Create a manager over the given storage backend.
    #[must_use]
    pub fn new(store: impl SessionStore + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(SessionManagerInner {
                store: Box::new(store),
                events,
            }),
        }
    }

    /// Create a manager backed by an ephemeral in-memory store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The persisted access token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.inner.store.get(keys::ACCESS_TOKEN)
    }

    /// The persisted refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.inner.store.get(keys::REFRESH_TOKEN)
    }

    /// The persisted user summary.
    ///
    /// Returns `None` for absent OR malformed stored data; this accessor
    /// never fails.
    #[must_use]
    pub fn user(&self) -> Option<UserSummary> {
        let raw = self.inner.store.get(keys::USER)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed stored user summary");
                None
            }
        }
    }

    /// Whether an access token is currently stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    // =========================================================================
    // Mutators
    // =========================================================================

    /// Persist an access token and, if provided, the user summary.
    ///
    /// Subsequent requests attach the new token. Emits
    /// [`SessionEvent::Updated`] when a user is stored.
    pub fn set_auth(&self, access_token: &str, user: Option<&UserSummary>) {
        self.inner.store.set(keys::ACCESS_TOKEN, access_token);
        if let Some(user) = user {
            self.set_user(user);
        }
    }

    /// Persist a refresh token.
    pub fn set_refresh_token(&self, refresh_token: &str) {
        self.inner.store.set(keys::REFRESH_TOKEN, refresh_token);
    }

    /// Persist a user summary and notify subscribers.
    pub fn set_user(&self, user: &UserSummary) {
        match serde_json::to_string(user) {
            Ok(serialized) => {
                self.inner.store.set(keys::USER, &serialized);
                let _ = self.inner.events.send(SessionEvent::Updated(user.clone()));
            }
            Err(e) => warn!(error = %e, "Failed to serialize user summary"),
        }
    }

    /// Persist everything a token grant carries: the access token always,
    /// the refresh token and user summary when present.
    pub(crate) fn apply(&self, grant: &TokenGrant) {
        if let Some(refresh_token) = &grant.refresh_token {
            self.set_refresh_token(refresh_token);
        }
        self.set_auth(&grant.access_token, grant.user.as_ref());
        debug!("Session credentials updated");
    }

    /// Delete all session state.
    ///
    /// Safe to call any number of times; emits [`SessionEvent::Cleared`]
    /// only when there was a session to clear.
    pub fn clear(&self) {
        if self.remove_all() {
            let _ = self.inner.events.send(SessionEvent::Cleared);
        }
    }

    /// Delete all session state because it could not be recovered.
    ///
    /// The unrecoverable-auth path: emits [`SessionEvent::Expired`] so
    /// consumers navigate back to login. A no-op when no session is stored,
    /// making repeated expiry (e.g., several concurrent requests all failing
    /// refresh) idempotent.
    pub fn expire(&self, reason: &str) {
        if self.remove_all() {
            let _ = self.inner.events.send(SessionEvent::Expired {
                reason: reason.to_string(),
            });
        }
    }

    /// Subscribe to auth state changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Remove every stored key. Returns whether anything was present.
    fn remove_all(&self) -> bool {
        let had_session = self.token().is_some()
            || self.refresh_token().is_some()
            || self.inner.store.get(keys::USER).is_some();

        self.inner.store.remove(keys::ACCESS_TOKEN);
        self.inner.store.remove(keys::REFRESH_TOKEN);
        self.inner.store.remove(keys::USER);

        had_session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventaic_core::{UserId, UserRole};

    fn sample_user() -> UserSummary {
        UserSummary {
            id: UserId::random(),
            email: "a@b.com".to_string(),
            username: "ada".to_string(),
            full_name: Some("Ada Lovelace".to_string()),
            role: UserRole::Company,
            company_id: None,
            company_name: None,
        }
    }

    #[test]
    fn test_set_auth_and_accessors() {
        let session = SessionManager::in_memory();
        assert!(!session.is_authenticated());

        let user = sample_user();
        session.set_auth("T1", Some(&user));
        session.set_refresh_token("R1");

        assert_eq!(session.token().as_deref(), Some("T1"));
        assert_eq!(session.refresh_token().as_deref(), Some("R1"));
        assert_eq!(session.user().expect("user stored"), user);
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_user_returns_none_on_malformed_json() {
        let store = MemoryStore::new();
        store.set("eventaic_user", "{not valid json");
        let session = SessionManager::new(store);

        assert!(session.user().is_none());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let session = SessionManager::in_memory();
        session.set_auth("T1", Some(&sample_user()));
        session.set_refresh_token("R1");

        session.clear();
        assert!(session.token().is_none());
        assert!(session.refresh_token().is_none());
        assert!(session.user().is_none());

        // Second clear leaves the same empty state and does not panic.
        session.clear();
        assert!(session.token().is_none());
    }

    #[test]
    fn test_clear_emits_event_only_once() {
        let session = SessionManager::in_memory();
        let mut events = session.subscribe();

        session.set_auth("T1", None);
        session.clear();
        session.clear();

        assert!(matches!(events.try_recv(), Ok(SessionEvent::Cleared)));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_expire_emits_reason_and_is_idempotent() {
        let session = SessionManager::in_memory();
        let mut events = session.subscribe();

        session.set_auth("T1", None);
        session.expire("session expired");
        session.expire("session expired");

        match events.try_recv() {
            Ok(SessionEvent::Expired { reason }) => assert_eq!(reason, "session expired"),
            other => panic!("expected Expired event, got {other:?}"),
        }
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_expire_without_session_is_silent() {
        let session = SessionManager::in_memory();
        let mut events = session.subscribe();

        session.expire("session expired");
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_set_user_notifies_subscribers() {
        let session = SessionManager::in_memory();
        let mut events = session.subscribe();

        let user = sample_user();
        session.set_user(&user);

        match events.try_recv() {
            Ok(SessionEvent::Updated(updated)) => assert_eq!(updated, user),
            other => panic!("expected Updated event, got {other:?}"),
        }
    }
}
