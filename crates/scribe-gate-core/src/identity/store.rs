//! Persistence for the session the identity client holds.
//!
//! The adapter never stores a session itself; the client keeps the last one
//! it was issued so that later processes can query it.

use crate::{AuthError, AuthResult, Session};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    sync::Mutex,
};

use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};

/// Where the identity client keeps its current session.
pub trait SessionStore: Send + Sync {
    /// Read the stored session, if any.
    fn load(&self) -> AuthResult<Option<Session>>;
    /// Replace the stored session.
    fn save(&self, session: &Session) -> AuthResult<()>;
    /// Forget the stored session. Clearing an empty store succeeds.
    fn clear(&self) -> AuthResult<()>;
}

/// Process-local store, used by tests and one-shot tools.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Create a store that already holds `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> AuthResult<Option<Session>> {
        Ok(self.session.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn save(&self, session: &Session) -> AuthResult<()> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> AuthResult<()> {
        *self.session.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

/// JSON file store with owner-only permissions.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`. The parent directory must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    fn load(&self) -> AuthResult<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path).map_err(|e| AuthError::SessionStore {
            reason: format!("Failed to read session file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        match serde_json::from_str::<Session>(&contents) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // A corrupt file is treated as a signed-out state.
                warn!(error = %e, "Discarding unreadable session file");
                Ok(None)
            }
        }
    }

    #[track_caller]
    #[instrument(skip(self, session), fields(path = ?self.path))]
    fn save(&self, session: &Session) -> AuthResult<()> {
        let contents = serde_json::to_vec(session).map_err(|e| AuthError::SessionStore {
            reason: format!("Failed to serialize session: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // Atomic write: temp file, restrict, then rename over the old one.
        let temp_path = self.path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AuthError::SessionStore {
            reason: format!("Failed to create temp session file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        restrict_permissions(&temp_path)?;

        temp_file
            .write_all(&contents)
            .and_then(|()| temp_file.sync_all())
            .map_err(|e| AuthError::SessionStore {
                reason: format!("Failed to write temp session file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        fs::rename(&temp_path, &self.path).map_err(|e| AuthError::SessionStore {
            reason: format!("Failed to replace session file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!("Session persisted");

        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    fn clear(&self) -> AuthResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!("Session file removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::SessionStore {
                reason: format!("Failed to remove session file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

#[cfg(unix)]
#[track_caller]
fn restrict_permissions(path: &Path) -> AuthResult<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
        AuthError::SessionStore {
            reason: format!("Failed to restrict session file permissions: {}", e),
            location: ErrorLocation::from(Location::caller()),
        }
    })
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> AuthResult<()> {
    Ok(())
}
