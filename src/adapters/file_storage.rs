//! File-based credential storage.
//!
//! Persists the session to `~/.satchel/.credentials.json` so a process
//! restart without an explicit sign-out restores the prior session. The
//! document holds three named slots (access token, refresh token, user
//! identity) plus the expiry hint; if any slot is missing the document is
//! treated as signed-out, never as a partial session.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::credentials::{Credentials, UserIdentity};
use crate::traits::{StorageBackend, StorageError};

/// The credentials directory name.
const CREDENTIALS_DIR: &str = ".satchel";

/// The credentials file name.
const CREDENTIALS_FILE: &str = ".credentials.json";

/// On-disk layout. Slots are individually optional so that documents written
/// by other versions (or damaged ones) still parse; completeness is checked
/// when converting to [`Credentials`].
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSlots {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<UserIdentity>,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl StoredSlots {
    fn from_credentials(creds: &Credentials) -> Self {
        Self {
            access_token: Some(creds.access_token.clone()),
            refresh_token: Some(creds.refresh_token.clone()),
            user: Some(creds.user.clone()),
            expires_at: creds.expires_at,
        }
    }

    fn into_credentials(self) -> Option<Credentials> {
        match (self.access_token, self.refresh_token, self.user) {
            (Some(access_token), Some(refresh_token), Some(user)) => Some(Credentials {
                access_token,
                refresh_token,
                expires_at: self.expires_at,
                user,
            }),
            _ => None,
        }
    }
}

/// File-backed [`StorageBackend`].
#[derive(Debug)]
pub struct FileStorage {
    credentials_path: PathBuf,
}

impl FileStorage {
    /// Create storage rooted at the user's home directory.
    ///
    /// Returns `None` if the home directory cannot be determined.
    pub fn new() -> Option<Self> {
        let home = dirs::home_dir()?;
        let credentials_path = home.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE);
        Some(Self { credentials_path })
    }

    /// Create storage over an explicit file path.
    pub fn with_path(credentials_path: PathBuf) -> Self {
        Self { credentials_path }
    }

    /// Path of the credentials file.
    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }
}

impl StorageBackend for FileStorage {
    fn load(&self) -> Option<Credentials> {
        if !self.credentials_path.exists() {
            return None;
        }

        let file = match File::open(&self.credentials_path) {
            Ok(f) => f,
            Err(err) => {
                warn!(error = %err, "could not open credentials file, treating as signed out");
                return None;
            }
        };

        let slots: StoredSlots = match serde_json::from_reader(BufReader::new(file)) {
            Ok(slots) => slots,
            Err(err) => {
                warn!(error = %err, "could not parse credentials file, treating as signed out");
                return None;
            }
        };

        let creds = slots.into_credentials();
        if creds.is_none() {
            warn!("credentials file has incomplete slots, treating as signed out");
        }
        creds
    }

    fn save(&self, creds: &Credentials) -> Result<(), StorageError> {
        if let Some(parent) = self.credentials_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Save(e.to_string()))?;
            }
        }

        let file = File::create(&self.credentials_path)
            .map_err(|e| StorageError::Save(e.to_string()))?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &StoredSlots::from_credentials(creds))
            .map_err(|e| StorageError::Save(e.to_string()))?;

        writer.flush().map_err(|e| StorageError::Save(e.to_string()))
    }

    fn clear(&self) -> Result<(), StorageError> {
        if !self.credentials_path.exists() {
            return Ok(());
        }

        fs::remove_file(&self.credentials_path).map_err(|e| StorageError::Clear(e.to_string()))
    }
}
