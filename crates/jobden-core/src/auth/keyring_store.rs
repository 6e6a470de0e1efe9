use std::sync::Mutex;

use anyhow::{Context, Result};
use keyring::Entry;
use tracing::{debug, warn};

use super::{Session, SessionStore, SESSION_STORAGE_KEY};

const SERVICE_NAME: &str = "jobden";

/// Session kept in the OS keychain under `jobden` / `auth-storage`.
pub struct KeyringSessionStore {
    entry: Entry,
    session: Mutex<Session>,
}

impl KeyringSessionStore {
    pub fn open() -> Result<Self> {
        let entry = Entry::new(SERVICE_NAME, SESSION_STORAGE_KEY)
            .context("Failed to create keyring entry")?;

        let session = match entry.get_password() {
            Ok(secret) => match serde_json::from_str::<Session>(&secret) {
                Ok(session) => session.normalized(),
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable session in keychain");
                    Session::empty()
                }
            },
            Err(keyring::Error::NoEntry) => Session::empty(),
            Err(e) => return Err(e).context("Failed to read session from keychain"),
        };
        debug!(authenticated = session.is_authenticated(), "Keychain session loaded");

        Ok(Self {
            entry,
            session: Mutex::new(session),
        })
    }

    fn write(&self, session: &Session) -> Result<()> {
        let secret = serde_json::to_string(session)?;
        self.entry
            .set_password(&secret)
            .context("Failed to store session in keychain")
    }
}

impl SessionStore for KeyringSessionStore {
    fn get_session(&self) -> Session {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_session(&self, session: Session) -> Result<()> {
        let mut current = self.session.lock().unwrap_or_else(|p| p.into_inner());
        let session = session.normalized();
        self.write(&session)?;
        *current = session;
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut current = self.session.lock().unwrap_or_else(|p| p.into_inner());
        *current = Session::empty();
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete session from keychain"),
        }
    }

    fn update_tokens(&self, access_token: String, refresh_token: String) -> Result<()> {
        let mut current = self.session.lock().unwrap_or_else(|p| p.into_inner());
        let session = current.clone().with_tokens(access_token, refresh_token);
        self.write(&session)?;
        *current = session;
        Ok(())
    }
}
