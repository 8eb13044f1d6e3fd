//! Process-wide credential store.
//!
//! Owns the current session's credentials. Reads and writes swap the whole
//! [`Credentials`] value under a lock, so a reader can observe the pair from
//! before or after a refresh but never an access token from one cycle paired
//! with a refresh token from another.
//!
//! Writers are the session lifecycle (sign-in, sign-out) and the refresh
//! coordinator's driver; nothing else mutates the store.

use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::auth::credentials::Credentials;
use crate::traits::{StorageBackend, StorageError};

/// Shared credential state over a pluggable persistence backend.
///
/// Construction rehydrates from the backend, so a process restart without an
/// explicit sign-out restores the prior session.
pub struct CredentialStore {
    current: RwLock<Option<Credentials>>,
    backend: Arc<dyn StorageBackend>,
}

impl CredentialStore {
    /// Create a store over the given backend, rehydrating any persisted
    /// session. An unreadable or incomplete persisted document yields a
    /// signed-out store, never an error.
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        let current = backend.load();
        if current.is_some() {
            debug!("restored persisted session");
        }
        Self {
            current: RwLock::new(current),
            backend,
        }
    }

    /// Current credentials, if signed in.
    pub fn read(&self) -> Option<Credentials> {
        self.current.read().unwrap().clone()
    }

    /// Whether a session is currently present.
    pub fn is_authenticated(&self) -> bool {
        self.current.read().unwrap().is_some()
    }

    /// Replace the session with new credentials.
    ///
    /// The in-memory session updates even when persistence fails; a
    /// [`StorageError`] then means durability across restarts was lost,
    /// nothing more.
    pub fn write(&self, creds: Credentials) -> Result<(), StorageError> {
        {
            let mut current = self.current.write().unwrap();
            *current = Some(creds.clone());
        }
        let result = self.backend.save(&creds);
        if let Err(ref err) = result {
            warn!(error = %err, "session will not survive a restart");
        }
        result
    }

    /// Drop the session. Idempotent.
    pub fn clear(&self) -> Result<(), StorageError> {
        {
            let mut current = self.current.write().unwrap();
            *current = None;
        }
        let result = self.backend.clear();
        if let Err(ref err) = result {
            warn!(error = %err, "persisted credentials could not be removed");
        }
        result
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
