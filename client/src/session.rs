//! Storage for the bearer token attached to outgoing requests.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::{debug, warn};

/// Key the token is persisted under.
pub const TOKEN_KEY: &str = "auth_token";

/// Source of the session token. Read on every request.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;

    fn set_token(&self, token: &str) -> Result<()>;

    fn clear(&self) -> Result<()>;
}

/// Session held only for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn replace(&self, token: Option<String>) -> Result<()> {
        match self.token.write() {
            Ok(mut slot) => {
                *slot = token;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to acquire write lock in session: {}", e);
                Err(Error::SessionPoisoned)
            }
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn token(&self) -> Option<String> {
        match self.token.read() {
            Ok(token) => token.clone(),
            Err(e) => {
                warn!("Failed to acquire read lock in token: {}", e);
                None
            }
        }
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.replace(Some(token.to_string()))
    }

    fn clear(&self) -> Result<()> {
        self.replace(None)
    }
}

#[derive(Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(rename = "auth_token", default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
}

/// Session persisted as a small JSON document (`{"auth_token": "..."}`).
///
/// A missing or unreadable file is treated as "no token".
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> SessionFile {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return SessionFile::default();
        };
        match serde_json::from_str(&contents) {
            Ok(session) => session,
            Err(err) => {
                warn!(path = %self.path.display(), ?err, "Ignoring malformed session file");
                SessionFile::default()
            }
        }
    }

    fn write(&self, session: &SessionFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(session)?)?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn token(&self) -> Option<String> {
        self.read().auth_token.filter(|token| !token.is_empty())
    }

    fn set_token(&self, token: &str) -> Result<()> {
        self.write(&SessionFile {
            auth_token: Some(token.to_string()),
        })
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
