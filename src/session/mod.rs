//! Session controller
//!
//! Owns the authenticated session and the persisted token. The total reset
//! performed on logout lives in `App::logout`, which brackets it with
//! `begin_logout`/`finish_logout` so concurrent logouts collapse into one.

pub mod storage;

use crate::api::Session;
use crate::error::StorageError;
use storage::TokenStore;
use tracing::{info, warn};

pub use storage::{FileTokenStore, MemoryTokenStore};

pub struct SessionController {
    session: Option<Session>,
    logout_in_progress: bool,
    /// Survives restarts
    persistent: Box<dyn TokenStore>,
    /// Lives for this process only
    scoped: Box<dyn TokenStore>,
    /// Write the token to the persistent store instead of the scoped one
    remember: bool,
}

impl SessionController {
    pub fn new(
        persistent: Box<dyn TokenStore>,
        scoped: Box<dyn TokenStore>,
        remember: bool,
    ) -> Self {
        Self {
            session: None,
            logout_in_progress: false,
            persistent,
            scoped,
            remember,
        }
    }

    /// Controller with in-memory stores only
    pub fn in_memory() -> Self {
        Self::new(
            Box::new(MemoryTokenStore::new()),
            Box::new(MemoryTokenStore::new()),
            false,
        )
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_logging_out(&self) -> bool {
        self.logout_in_progress
    }

    /// Install a freshly authenticated session and persist its token.
    /// A storage failure is logged; the session is still usable.
    pub fn start(&mut self, session: Session) {
        info!(user = %session.user.email, "session started");
        match serde_json::to_string(&session) {
            Ok(token) => {
                let store = if self.remember {
                    &mut self.persistent
                } else {
                    &mut self.scoped
                };
                if let Err(e) = store.save(&token) {
                    warn!(error = %e, "failed to store session token");
                }
            }
            Err(e) => warn!(error = %e, "failed to encode session token"),
        }
        self.session = Some(session);
    }

    /// Re-establish a session from the persistent store. Returns true when a
    /// stored session was found and installed.
    pub fn restore(&mut self) -> bool {
        match self.load_persisted() {
            Ok(Some(session)) => {
                info!(user = %session.user.email, "restored persisted session");
                self.session = Some(session);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "discarding unreadable persisted session");
                if let Err(e) = self.persistent.remove() {
                    warn!(error = %e, "failed to remove persisted session");
                }
                false
            }
        }
    }

    fn load_persisted(&self) -> Result<Option<Session>, StorageError> {
        let Some(token) = self.persistent.load()? else {
            return Ok(None);
        };
        serde_json::from_str(&token)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    /// Enter the logout critical section. Returns false when a logout is
    /// already running or there is nothing to log out of.
    pub fn begin_logout(&mut self) -> bool {
        if self.logout_in_progress || self.session.is_none() {
            return false;
        }
        self.logout_in_progress = true;
        true
    }

    /// Drop the session, invalidate both token stores and leave the
    /// critical section.
    pub fn finish_logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!(user = %session.user.email, "session ended");
        }
        for store in [&mut self.persistent, &mut self.scoped] {
            if let Err(e) = store.remove() {
                warn!(error = %e, "failed to remove session token");
            }
        }
        self.logout_in_progress = false;
    }
}
