//! Client-side session storage
//!
//! Workflows read the current session through [`SessionAccessor`]. The auth
//! workflow writes it through [`SessionStore`], and the session guard stores
//! the renewed session after a token refresh.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::AuthSession;

/// Read access to the session issued by the identity service
pub trait SessionAccessor: Send + Sync {
    fn current(&self) -> Option<AuthSession>;
}

/// Session storage the auth workflow can update
pub trait SessionStore: SessionAccessor {
    fn save(&self, session: &AuthSession) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// JSON file holding the session between CLI invocations
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionAccessor for FileSessionStore {
    fn current(&self) -> Option<AuthSession> {
        let json = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&json) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring unreadable session file");
                None
            }
        }
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, session: &AuthSession) -> Result<()> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(session)?;
        write_private(&self.path, json.as_bytes())
            .with_context(|| format!("writing session to {}", self.path.display()))?;
        debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

/// The file holds bearer tokens, so only the owner may read it
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // `mode` only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    fs::write(path, contents)
}

/// Process-local session, for tests and embedding
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Option<AuthSession>>,
}

impl MemorySessionStore {
    pub fn with_session(session: AuthSession) -> Self {
        Self {
            inner: RwLock::new(Some(session)),
        }
    }
}

impl SessionAccessor for MemorySessionStore {
    fn current(&self) -> Option<AuthSession> {
        self.inner.read().ok().and_then(|s| s.clone())
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, session: &AuthSession) -> Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Identity;

    fn session() -> AuthSession {
        AuthSession {
            access_token: "tok".into(),
            refresh_token: Some("ref".into()),
            user: Identity {
                id: "u1".into(),
                email: "me@example.com".into(),
            },
        }
    }

    #[test]
    fn test_file_store_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));
        assert!(store.current().is_none());

        store.save(&session()).unwrap();
        assert_eq!(store.current(), Some(session()));

        store.clear().unwrap();
        assert!(store.current().is_none());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileSessionStore::new(&path).save(&session()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        let fresh = dir.path().join("fresh.json");
        FileSessionStore::new(&fresh).save(&session()).unwrap();
        let mode = fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_corrupt_file_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert!(FileSessionStore::new(path).current().is_none());
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::default();
        assert!(store.current().is_none());
        store.save(&session()).unwrap();
        assert_eq!(store.current().unwrap().user.id, "u1");
    }
}
