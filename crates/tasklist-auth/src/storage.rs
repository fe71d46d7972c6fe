use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to get config directory")]
    NoConfigDir,

    #[error("Token file IO failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token file is malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<StorageError> for tasklist_core::AppError {
    fn from(e: StorageError) -> Self {
        tasklist_core::AuthError::StorageError(e.to_string()).into()
    }
}

/// Session token as written to disk
#[derive(Clone, Serialize, Deserialize)]
struct PersistedSession {
    token: String,
    /// Unix timestamp of the login that produced the token
    saved_at: i64,
}

/// File-based storage for the session token so a login survives restarts.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/tasklist/tokens/session.json`
    pub fn default_location() -> Result<Self, StorageError> {
        let dir = dirs::config_dir()
            .ok_or(StorageError::NoConfigDir)?
            .join("tasklist")
            .join("tokens");
        Ok(Self::new(dir.join("session.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store the token, replacing any previous one
    pub fn store(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let session = PersistedSession {
            token: token.to_string(),
            saved_at: chrono::Utc::now().timestamp(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&session)?)?;

        tracing::info!("Stored session token at {:?}", self.path);
        Ok(())
    }

    /// Read the stored token; `None` when nothing has been stored
    pub fn load(&self) -> Result<Option<String>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&self.path)?;
        let session: PersistedSession = serde_json::from_str(&json)?;

        tracing::debug!("Loaded session token saved at {}", session.saved_at);
        Ok(Some(session.token))
    }

    /// Delete the stored token. A missing file is not an error.
    pub fn clear(&self) -> Result<(), StorageError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            tracing::info!("Deleted stored session token");
        }
        Ok(())
    }
}
