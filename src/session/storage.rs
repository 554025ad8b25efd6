//! Session token storage port
//!
//! Two scopes, mirroring what a browser client keeps: a persistent store on
//! disk (`~/.querydeck/session`) and a session-scoped store that only lives
//! as long as the process.

use crate::config::config_dir;
use crate::error::{ConfigResult, StorageResult};
use std::path::{Path, PathBuf};

/// Somewhere an opaque session token can be kept
pub trait TokenStore: Send {
    /// Read the stored token, if any
    fn load(&self) -> StorageResult<Option<String>>;

    /// Store `token`, replacing any previous one
    fn save(&mut self, token: &str) -> StorageResult<()>;

    /// Delete the stored token. Removing a missing token is not an error.
    fn remove(&mut self) -> StorageResult<()>;
}

/// Token kept in a file that survives restarts
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location, ~/.querydeck/session
    pub fn default_location() -> ConfigResult<Self> {
        Ok(Self::new(config_dir()?.join("session")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> StorageResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(None),
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, token: &str) -> StorageResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn remove(&mut self) -> StorageResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token kept in memory for the life of the process
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    token: Option<String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> StorageResult<Option<String>> {
        Ok(self.token.clone())
    }

    fn save(&mut self, token: &str) -> StorageResult<()> {
        self.token = Some(token.to_string());
        Ok(())
    }

    fn remove(&mut self) -> StorageResult<()> {
        self.token = None;
        Ok(())
    }
}
