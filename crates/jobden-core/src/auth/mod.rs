//! Authentication module for managing the session and route access.
//!
//! This module provides:
//! - `Session`: the persisted credential record (user, token pair, flags)
//! - `SessionStore`: the single owner of the session, with file, keychain
//!   and in-memory backends
//! - `RefreshCoordinator`: single-flight token refresh with a request queue
//! - `authorize`: role-based route gate
//!
//! The session is stored under the `auth-storage` key and survives restarts.

pub mod gate;
pub mod keyring_store;
pub mod refresh;
pub mod session;
pub mod store;

pub use gate::{authorize, landing_path, Access, LOGIN_PATH};
pub use keyring_store::KeyringSessionStore;
pub use refresh::{Joined, RefreshCoordinator, RefreshError, RefreshQueue, RefreshState, Ticket};
pub use session::Session;
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, SESSION_STORAGE_KEY};
