use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Refresh this many seconds before the provider-reported expiry
const EXPIRY_MARGIN_SECS: i64 = 300;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiry time as seconds since Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl Credential {
    /// A credential without a known expiry never expires
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let now = chrono::Utc::now().timestamp();
                expires_at < (now + EXPIRY_MARGIN_SECS)
            }
            None => false,
        }
    }
}

/// JSON file holding the most recently issued credential
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cached credential. Unreadable contents count as no credential.
    pub fn load(&self) -> Result<Option<Credential>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::Auth(format!(
                    "Failed to read token cache {:?}: {}",
                    self.path, e
                )));
            }
        };

        match serde_json::from_str(&contents) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                warn!(path = ?self.path, error = %e, "Ignoring unparseable token cache");
                Ok(None)
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::Auth(format!("Failed to create token cache directory: {}", e))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(credential)?;

        // Write a sibling then rename, so a failed write never clobbers the old cache
        let staging_path = self.staging_path();
        {
            // Owner-only permissions from creation, not after the write
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .mode(0o600)
                .open(&staging_path)
                .map_err(|e| AppError::Auth(format!("Failed to create tokens file: {}", e)))?;

            file.write_all(contents.as_bytes())
                .map_err(|e| AppError::Auth(format!("Failed to write tokens file: {}", e)))?;
        }

        fs::rename(&staging_path, &self.path)
            .map_err(|e| AppError::Auth(format!("Failed to replace tokens file: {}", e)))?;

        debug!(path = ?self.path, "Token cached");

        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }

    pub fn clear(&self) -> Result<()> {
        if !self.path.exists() {
            debug!("No cached tokens to clear");
            return Ok(());
        }

        fs::remove_file(&self.path)
            .map_err(|e| AppError::Auth(format!("Failed to delete tokens file: {}", e)))?;
        info!(path = ?self.path, "Cleared cached tokens");

        Ok(())
    }
}
