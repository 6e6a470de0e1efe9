use std::fs::OpenOptions;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Session;

/// Storage key holding the serialized session.
pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Single owner of the session record.
///
/// The API client reads the session before every request and rotates the
/// tokens through `update_tokens`. Implementations serialize access
/// internally, so `update_tokens` is atomic with respect to the other calls.
pub trait SessionStore: Send + Sync {
    /// Current session. Never loading once the store exists.
    fn get_session(&self) -> Session;

    /// Replace the whole session and persist it.
    fn set_session(&self, session: Session) -> Result<()>;

    /// Null every field and remove the persisted record.
    fn clear_session(&self) -> Result<()>;

    /// Swap in a new token pair, keeping the user and the authenticated flag.
    fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()>;
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    // A panic while holding the lock cannot leave a half-written Session
    session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Session kept only in memory.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Session>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Mutex::new(session.normalized()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get_session(&self) -> Session {
        lock(&self.session).clone()
    }

    fn set_session(&self, session: Session) -> Result<()> {
        *lock(&self.session) = session.normalized();
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        *lock(&self.session) = Session::empty();
        Ok(())
    }

    fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        let mut session = lock(&self.session);
        *session = session.clone().with_tokens(access_token, refresh_token);
        Ok(())
    }
}

/// Session persisted as JSON in `<dir>/auth-storage.json`.
///
/// The in-memory copy is authoritative; every mutation writes through to disk
/// while the lock is held.
pub struct FileSessionStore {
    path: PathBuf,
    session: Mutex<Session>,
}

impl FileSessionStore {
    /// Open the store in `dir`, hydrating from disk if a record exists.
    /// An unreadable record is discarded and the session starts empty.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(format!("{}.json", SESSION_STORAGE_KEY));
        let session = match Self::read(&path) {
            Ok(Some(session)) => session,
            Ok(None) => Session::empty(),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Discarding unreadable session file");
                Session::empty()
            }
        };
        debug!(
            authenticated = session.is_authenticated(),
            path = %path.display(),
            "Session store opened"
        );
        Ok(Self {
            path,
            session: Mutex::new(session),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<Option<Session>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        let session: Session =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(session.normalized()))
    }

    fn write(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create session directory")?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        // Write then rename so a crash never leaves a truncated record
        let tmp = self.path.with_extension("json.tmp");
        if tmp.exists() {
            std::fs::remove_file(&tmp).context("Failed to remove stale session file")?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        // Tokens are credentials: owner read/write only
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options.open(&tmp).context("Failed to create session file")?;
        file.write_all(contents.as_bytes())
            .context("Failed to write session file")?;
        file.sync_all().context("Failed to flush session file")?;
        std::fs::rename(&tmp, &self.path).context("Failed to replace session file")?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get_session(&self) -> Session {
        lock(&self.session).clone()
    }

    fn set_session(&self, session: Session) -> Result<()> {
        let mut current = lock(&self.session);
        let session = session.normalized();
        self.write(&session)?;
        *current = session;
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut current = lock(&self.session);
        *current = Session::empty();
        if self.path.exists() {
            std::fs::remove_file(&self.path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        let mut current = lock(&self.session);
        let session = current.clone().with_tokens(access_token, refresh_token);
        self.write(&session)?;
        *current = session;
        Ok(())
    }
}
