//! Port for the durable storage behind the session store.
//!
//! Storage holds two raw entries, the credential token and the serialised
//! identity. Interpreting them is the session store's job: adapters only
//! read, write and remove strings.

use std::sync::Mutex;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session storage adapters.
    pub enum SessionStorageError {
        /// An entry exists but could not be read.
        Read { entry: String, message: String } =>
            "failed to read session entry '{entry}': {message}",
        /// An entry could not be written.
        Write { entry: String, message: String } =>
            "failed to write session entry '{entry}': {message}",
        /// An entry could not be removed.
        Remove { entry: String, message: String } =>
            "failed to remove session entry '{entry}': {message}",
    }
}

/// Raw persisted entries, each possibly absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSession {
    /// Credential token entry.
    pub token: Option<String>,
    /// Serialised identity entry.
    pub identity: Option<String>,
}

/// Blocking key-value storage for the session entries.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage: Send + Sync {
    /// Read both entries; missing entries are `None`, not errors.
    fn load(&self) -> Result<StoredSession, SessionStorageError>;

    /// Write both entries together.
    fn save(&self, token: &str, identity: &str) -> Result<(), SessionStorageError>;

    /// Remove both entries; removing absent entries succeeds.
    fn clear(&self) -> Result<(), SessionStorageError>;
}

/// Process-local storage for tests and runs without a state directory.
#[derive(Debug, Default)]
pub struct InMemorySessionStorage {
    entries: Mutex<StoredSession>,
}

impl InMemorySessionStorage {
    /// Start with the given raw entries, as if written by an earlier run.
    #[must_use]
    pub fn with_entries(token: Option<&str>, identity: Option<&str>) -> Self {
        Self {
            entries: Mutex::new(StoredSession {
                token: token.map(str::to_owned),
                identity: identity.map(str::to_owned),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoredSession> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStorage for InMemorySessionStorage {
    fn load(&self) -> Result<StoredSession, SessionStorageError> {
        Ok(self.lock().clone())
    }

    fn save(&self, token: &str, identity: &str) -> Result<(), SessionStorageError> {
        *self.lock() = StoredSession {
            token: Some(token.to_owned()),
            identity: Some(identity.to_owned()),
        };
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStorageError> {
        *self.lock() = StoredSession::default();
        Ok(())
    }
}
