//! Persistent session store.
//!
//! The session is persisted as two independent keys: the raw bearer token and
//! the JSON-encoded user record. Storage is best-effort. Every backend fault is
//! logged and collapsed into "nothing stored" or "nothing written", so callers
//! never see a storage error.
//!
//! Writers and readers share one mutex, which also guards the session
//! generation. `clear` advances the generation, and a login that started
//! before the clear can detect that its write-through is stale.

pub mod storage;

use crate::auth::types::User;
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

pub use self::storage::{FileStorage, MemoryStorage, Storage, StorageError};

pub const TOKEN_KEY: &str = "auth.token";
pub const USER_KEY: &str = "auth.user";

/// Snapshot of what is persisted. Either field may be absent independently.
#[derive(Clone, Debug, Default)]
pub struct StoredSession {
    pub token: Option<SecretString>,
    pub user: Option<User>,
}

/// Monotonic counter identifying the session epoch a write belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Box<dyn Storage>,
    generation: Mutex<u64>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                storage: Box::new(storage),
                generation: Mutex::new(0),
            }),
        }
    }

    /// Store backed by process memory only.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    // A poisoned lock only means another writer panicked mid-write; the
    // counter itself is still valid.
    fn lock(&self) -> MutexGuard<'_, u64> {
        self.inner
            .generation
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Current session generation.
    #[must_use]
    pub fn generation(&self) -> Generation {
        Generation(*self.lock())
    }

    #[must_use]
    pub fn is_current(&self, generation: Generation) -> bool {
        *self.lock() == generation.0
    }

    /// Persist the token and user. Storage faults are swallowed.
    pub fn save(&self, token: &SecretString, user: &User) {
        let _guard = self.lock();
        self.write(token, user);
    }

    /// Persist the token and user only if no `clear` happened since
    /// `generation` was observed. Returns whether the write happened.
    pub fn save_if_current(&self, generation: Generation, token: &SecretString, user: &User) -> bool {
        let guard = self.lock();
        if *guard != generation.0 {
            debug!(
                observed = generation.0,
                current = *guard,
                "discarding stale session write"
            );
            return false;
        }
        self.write(token, user);
        true
    }

    /// Remove both keys and advance the generation. Storage faults are swallowed.
    pub fn clear(&self) {
        let mut guard = self.lock();
        *guard += 1;
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.inner.storage.remove(key) {
                warn!(key, error = %err, "failed to remove session key");
            }
        }
    }

    /// Read the persisted session.
    ///
    /// A user entry that does not decode is deleted and reported as absent.
    /// The token is read independently and survives a corrupt user entry.
    #[must_use]
    pub fn load(&self) -> StoredSession {
        let _guard = self.lock();
        StoredSession {
            token: self.read_token(),
            user: self.read_user(),
        }
    }

    /// Read only the token. This is what the API transport consults on every
    /// request.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        let _guard = self.lock();
        self.read_token()
    }

    fn write(&self, token: &SecretString, user: &User) {
        let user_json = match serde_json::to_string(user) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to encode user record, session not saved");
                return;
            }
        };

        if let Err(err) = self.inner.storage.set(TOKEN_KEY, token.expose_secret()) {
            warn!(key = TOKEN_KEY, error = %err, "failed to persist session key");
            return;
        }
        if let Err(err) = self.inner.storage.set(USER_KEY, &user_json) {
            warn!(key = USER_KEY, error = %err, "failed to persist session key");
            // The previous user must not stay paired with the new token.
            if let Err(err) = self.inner.storage.remove(USER_KEY) {
                warn!(key = USER_KEY, error = %err, "failed to remove session key");
            }
        }
    }

    fn read_token(&self) -> Option<SecretString> {
        match self.inner.storage.get(TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => Some(SecretString::from(token)),
            Ok(_) => None,
            Err(err) => {
                warn!(key = TOKEN_KEY, error = %err, "session storage unavailable");
                None
            }
        }
    }

    fn read_user(&self) -> Option<User> {
        let raw = match self.inner.storage.get(USER_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                warn!(key = USER_KEY, error = %err, "session storage unavailable");
                return None;
            }
        };

        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                warn!(error = %err, "discarding malformed stored user record");
                if let Err(err) = self.inner.storage.remove(USER_KEY) {
                    warn!(key = USER_KEY, error = %err, "failed to remove session key");
                }
                None
            }
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
