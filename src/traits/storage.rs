//! Credential persistence trait abstraction.
//!
//! The credential store delegates durability to a [`StorageBackend`] so
//! production code can write to disk while tests substitute an in-memory
//! backend. The trait is synchronous: persistence is a local, small-file
//! concern and the store's read/write/clear contract is synchronous too.

use thiserror::Error;

use crate::auth::credentials::Credentials;

/// Failure of the persistence medium. Never fatal: the in-memory session
/// keeps working, only durability across restarts is lost.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The credential document could not be written.
    #[error("failed to persist credentials: {0}")]
    Save(String),
    /// The credential document could not be removed.
    #[error("failed to clear persisted credentials: {0}")]
    Clear(String),
}

/// Trait for durable credential storage.
///
/// `load` is infallible by design: a missing, unreadable, or partially
/// populated document means the session degrades to signed-out rather than
/// erroring at startup.
pub trait StorageBackend: Send + Sync {
    /// Load persisted credentials, or `None` when absent or unusable.
    fn load(&self) -> Option<Credentials>;

    /// Persist the given credentials, replacing any prior document.
    fn save(&self, creds: &Credentials) -> Result<(), StorageError>;

    /// Remove any persisted credentials.
    fn clear(&self) -> Result<(), StorageError>;
}
