//! Session store: the current identity and credential token.
//!
//! The store is an explicit context object handed to the router, the REST
//! client and views. It is created once at startup by rehydrating durable
//! storage and mutated only through [`SessionStore::login`] and
//! [`SessionStore::logout`]; everything else reads.
//!
//! Token and identity live in one [`Session`] value behind a
//! `tokio::sync::watch` channel, so a reader sees either both or neither and
//! subscribers are told about every login and logout.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::auth::CredentialToken;
use super::identity::Identity;
use super::ports::{SessionStorage, SessionStorageError};

/// Errors returned by session mutations.
///
/// The in-memory session has already changed when one of these is returned;
/// only durable storage is behind.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    /// The identity could not be serialised for storage.
    #[error("failed to encode identity for storage: {0}")]
    Encode(#[from] serde_json::Error),
    /// Durable storage rejected the write or removal.
    #[error(transparent)]
    Storage(#[from] SessionStorageError),
}

/// Authenticated session: a token and the identity it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: CredentialToken,
    identity: Identity,
}

impl Session {
    /// Pair a token with its identity.
    #[must_use]
    pub const fn new(token: CredentialToken, identity: Identity) -> Self {
        Self { token, identity }
    }

    /// Bearer credential.
    #[must_use]
    pub const fn token(&self) -> &CredentialToken {
        &self.token
    }

    /// Authenticated identity.
    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }
}

struct SessionStoreInner {
    state: watch::Sender<Option<Session>>,
    storage: Arc<dyn SessionStorage>,
}

/// Shared handle to the process-wide session.
///
/// Cloning the handle shares the same session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &*self.inner.state.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Build the store from whatever durable storage holds.
    ///
    /// Both entries present and well formed gives an authenticated store.
    /// Anything else, including unreadable storage, starts logged out.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use frontend::domain::SessionStore;
    /// use frontend::domain::ports::InMemorySessionStorage;
    ///
    /// let storage = InMemorySessionStorage::with_entries(
    ///     Some("tok-1"),
    ///     Some(r#"{"id":"U001","username":"admin","role":"admin"}"#),
    /// );
    /// let store = SessionStore::rehydrate(Arc::new(storage));
    /// assert!(store.is_authenticated());
    /// ```
    pub fn rehydrate(storage: Arc<dyn SessionStorage>) -> Self {
        let restored = match storage.load() {
            Ok(stored) => restore(stored.token, stored.identity),
            Err(error) => {
                warn!(%error, "session storage unreadable; starting logged out");
                None
            }
        };
        if let Some(session) = &restored {
            info!(
                username = %session.identity.username(),
                role = %session.identity.role(),
                token = %session.token.fingerprint(),
                "session restored from storage"
            );
        }
        let (state, _) = watch::channel(restored);
        Self {
            inner: Arc::new(SessionStoreInner { state, storage }),
        }
    }

    /// Current identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.inner
            .state
            .borrow()
            .as_ref()
            .map(|session| session.identity.clone())
    }

    /// Current credential token, if any.
    #[must_use]
    pub fn token(&self) -> Option<CredentialToken> {
        self.inner
            .state
            .borrow()
            .as_ref()
            .map(|session| session.token.clone())
    }

    /// Current session snapshot.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.inner.state.borrow().clone()
    }

    /// Whether an identity is present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Store a freshly issued token and identity together.
    ///
    /// Writes both storage entries, swaps the in-memory session and notifies
    /// subscribers. The in-memory swap happens even when storage fails.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError`] when the entries could not be persisted.
    pub fn login(
        &self,
        token: CredentialToken,
        identity: Identity,
    ) -> Result<(), SessionStoreError> {
        let persisted = serde_json::to_string(&identity)
            .map_err(SessionStoreError::from)
            .and_then(|encoded| {
                self.inner
                    .storage
                    .save(token.expose(), &encoded)
                    .map_err(SessionStoreError::from)
            });
        info!(
            username = %identity.username(),
            role = %identity.role(),
            token = %token.fingerprint(),
            "session started"
        );
        self.inner
            .state
            .send_replace(Some(Session::new(token, identity)));
        if let Err(error) = &persisted {
            warn!(%error, "session not persisted; memory and storage diverge");
        }
        persisted
    }

    /// Drop the session and purge durable storage.
    ///
    /// The in-memory session is cleared even when storage fails.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Storage`] when the entries could not be
    /// removed.
    pub fn logout(&self) -> Result<(), SessionStoreError> {
        let purged = self.inner.storage.clear().map_err(SessionStoreError::from);
        let previous = self.inner.state.send_replace(None);
        match &previous {
            Some(session) => info!(username = %session.identity.username(), "session ended"),
            None => debug!("logout without an active session"),
        }
        if let Err(error) = &purged {
            warn!(%error, "session storage not purged; memory and storage diverge");
        }
        purged
    }

    /// Subscribe to future login and logout events.
    #[must_use]
    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            receiver: self.inner.state.subscribe(),
        }
    }
}

fn restore(token: Option<String>, identity: Option<String>) -> Option<Session> {
    let (raw_token, raw_identity) = match (token, identity) {
        (Some(raw_token), Some(raw_identity)) => (raw_token, raw_identity),
        (None, None) => return None,
        (token, identity) => {
            warn!(
                has_token = token.is_some(),
                has_identity = identity.is_some(),
                "partial session in storage; starting logged out"
            );
            return None;
        }
    };
    let token = match CredentialToken::new(raw_token) {
        Ok(token) => token,
        Err(error) => {
            warn!(%error, "stored token invalid; starting logged out");
            return None;
        }
    };
    match serde_json::from_str::<Identity>(&raw_identity) {
        Ok(identity) => Some(Session::new(token, identity)),
        Err(error) => {
            warn!(%error, "stored identity malformed; starting logged out");
            None
        }
    }
}

/// Error returned once the session store has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session store closed")]
pub struct SessionStoreClosed;

/// Receiver of session change notifications for dependent views.
#[derive(Debug)]
pub struct SessionSubscription {
    receiver: watch::Receiver<Option<Session>>,
}

impl SessionSubscription {
    /// Wait for the next login or logout and return the identity after it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreClosed`] once every store handle is gone.
    pub async fn changed(&mut self) -> Result<Option<Identity>, SessionStoreClosed> {
        self.receiver
            .changed()
            .await
            .map_err(|_| SessionStoreClosed)?;
        Ok(self.current())
    }

    /// Identity as of the last observed change.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.receiver
            .borrow()
            .as_ref()
            .map(|session| session.identity.clone())
    }

    /// Whether a change arrived that has not been observed yet.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreClosed`] once every store handle is gone.
    pub fn has_changed(&self) -> Result<bool, SessionStoreClosed> {
        self.receiver.has_changed().map_err(|_| SessionStoreClosed)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for session lifecycle and rehydration.
    use super::*;
    use crate::domain::Role;
    use crate::domain::ports::{InMemorySessionStorage, MockSessionStorage, StoredSession};
    use rstest::{fixture, rstest};

    const ADMIN_JSON: &str = r#"{"id":"U001","username":"admin","role":"admin"}"#;

    #[fixture]
    fn identity() -> Identity {
        Identity::try_from_parts("P9", "amy", Role::Patient).expect("identity")
    }

    #[fixture]
    fn token() -> CredentialToken {
        CredentialToken::new("tok-123").expect("token")
    }

    fn empty_store() -> (SessionStore, Arc<InMemorySessionStorage>) {
        let storage = Arc::new(InMemorySessionStorage::default());
        (SessionStore::rehydrate(storage.clone()), storage)
    }

    #[rstest]
    fn starts_logged_out_with_empty_storage() {
        let (store, _) = empty_store();
        assert!(!store.is_authenticated());
        assert!(store.identity().is_none());
        assert!(store.token().is_none());
    }

    #[rstest]
    fn login_sets_identity_and_persists_both_entries(identity: Identity, token: CredentialToken) {
        let (store, storage) = empty_store();
        store
            .login(token.clone(), identity.clone())
            .expect("login persists");

        assert!(store.is_authenticated());
        assert_eq!(store.identity(), Some(identity.clone()));
        assert_eq!(store.token(), Some(token));
        let stored = storage.load().expect("load");
        assert_eq!(stored.token.as_deref(), Some("tok-123"));
        let stored_identity: Identity =
            serde_json::from_str(stored.identity.as_deref().expect("identity entry"))
                .expect("identity decodes");
        assert_eq!(stored_identity, identity);
    }

    #[rstest]
    fn logout_clears_memory_and_storage(identity: Identity, token: CredentialToken) {
        let (store, storage) = empty_store();
        store.login(token, identity).expect("login");
        store.logout().expect("logout");

        assert!(!store.is_authenticated());
        assert_eq!(storage.load().expect("load"), StoredSession::default());
    }

    #[rstest]
    fn rehydrates_valid_pair() {
        let storage = InMemorySessionStorage::with_entries(Some("tok-1"), Some(ADMIN_JSON));
        let store = SessionStore::rehydrate(Arc::new(storage));
        let identity = store.identity().expect("identity restored");
        assert_eq!(identity.role(), Role::Admin);
        assert_eq!(store.token().map(|t| t.expose().to_owned()), Some("tok-1".to_owned()));
    }

    #[rstest]
    #[case::token_only(Some("tok-1"), None)]
    #[case::identity_only(None, Some(ADMIN_JSON))]
    #[case::malformed_identity(Some("tok-1"), Some("{not json"))]
    #[case::unknown_role(Some("tok-1"), Some(r#"{"id":"1","username":"x","role":"nurse"}"#))]
    #[case::blank_token(Some("  "), Some(ADMIN_JSON))]
    fn rehydration_fails_open_to_logged_out(
        #[case] token: Option<&str>,
        #[case] identity: Option<&str>,
    ) {
        let storage = InMemorySessionStorage::with_entries(token, identity);
        let store = SessionStore::rehydrate(Arc::new(storage));
        assert!(!store.is_authenticated());
        assert!(store.token().is_none());
    }

    #[rstest]
    fn unreadable_storage_starts_logged_out() {
        let mut storage = MockSessionStorage::new();
        storage
            .expect_load()
            .returning(|| Err(SessionStorageError::read("token", "permission denied")));
        let store = SessionStore::rehydrate(Arc::new(storage));
        assert!(!store.is_authenticated());
    }

    #[rstest]
    fn failed_persist_still_updates_memory(identity: Identity, token: CredentialToken) {
        let mut storage = MockSessionStorage::new();
        storage
            .expect_load()
            .returning(|| Ok(StoredSession::default()));
        storage
            .expect_save()
            .times(1)
            .returning(|_, _| Err(SessionStorageError::write("token", "read-only filesystem")));
        let store = SessionStore::rehydrate(Arc::new(storage));

        let result = store.login(token, identity.clone());

        assert!(matches!(result, Err(SessionStoreError::Storage(_))));
        assert_eq!(store.identity(), Some(identity));
    }

    #[rstest]
    fn failed_purge_still_clears_memory(identity: Identity, token: CredentialToken) {
        let mut storage = MockSessionStorage::new();
        storage
            .expect_load()
            .returning(|| Ok(StoredSession::default()));
        storage.expect_save().returning(|_, _| Ok(()));
        storage
            .expect_clear()
            .returning(|| Err(SessionStorageError::remove("user", "busy")));
        let store = SessionStore::rehydrate(Arc::new(storage));
        store.login(token, identity).expect("login");

        assert!(store.logout().is_err());
        assert!(!store.is_authenticated());
    }

    #[rstest]
    fn clones_share_one_session(identity: Identity, token: CredentialToken) {
        let (store, _) = empty_store();
        let reader = store.clone();
        store.login(token, identity.clone()).expect("login");
        assert_eq!(reader.identity(), Some(identity));
    }

    #[rstest]
    #[tokio::test]
    async fn subscribers_see_login_then_logout(identity: Identity, token: CredentialToken) {
        let (store, _) = empty_store();
        let mut subscription = store.subscribe();
        assert!(!subscription.has_changed().expect("store alive"));

        store.login(token, identity.clone()).expect("login");
        assert_eq!(subscription.changed().await.expect("change"), Some(identity));

        store.logout().expect("logout");
        assert_eq!(subscription.changed().await.expect("change"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn subscription_reports_closed_store() {
        let (store, _) = empty_store();
        let mut subscription = store.subscribe();
        drop(store);
        assert_eq!(subscription.changed().await, Err(SessionStoreClosed));
    }
}
