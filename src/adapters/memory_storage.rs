//! In-memory credential storage for tests and embedders.
//!
//! Stores credentials in process memory only, allowing tests to verify
//! store behavior without touching the file system, and embedders to opt
//! out of persistence entirely.

use std::sync::{Arc, Mutex};

use crate::auth::credentials::Credentials;
use crate::traits::{StorageBackend, StorageError};

/// In-memory [`StorageBackend`].
///
/// Clones share the same underlying slot, so a test can keep a handle and
/// observe what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    credentials: Arc<Mutex<Option<Credentials>>>,
    save_should_fail: Arc<Mutex<bool>>,
    clear_should_fail: Arc<Mutex<bool>>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with credentials.
    pub fn with_credentials(creds: Credentials) -> Self {
        let storage = Self::new();
        *storage.credentials.lock().unwrap() = Some(creds);
        storage
    }

    /// Configure whether `save` should fail.
    pub fn set_save_should_fail(&self, should_fail: bool) {
        *self.save_should_fail.lock().unwrap() = should_fail;
    }

    /// Configure whether `clear` should fail.
    pub fn set_clear_should_fail(&self, should_fail: bool) {
        *self.clear_should_fail.lock().unwrap() = should_fail;
    }

    /// Inspect the persisted credentials directly (for assertions).
    pub fn persisted(&self) -> Option<Credentials> {
        self.credentials.lock().unwrap().clone()
    }
}

impl StorageBackend for MemoryStorage {
    fn load(&self) -> Option<Credentials> {
        self.credentials.lock().unwrap().clone()
    }

    fn save(&self, creds: &Credentials) -> Result<(), StorageError> {
        if *self.save_should_fail.lock().unwrap() {
            return Err(StorageError::Save("simulated save failure".to_string()));
        }
        *self.credentials.lock().unwrap() = Some(creds.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        if *self.clear_should_fail.lock().unwrap() {
            return Err(StorageError::Clear("simulated clear failure".to_string()));
        }
        *self.credentials.lock().unwrap() = None;
        Ok(())
    }
}
