//! # Session Store
//!
//! Durable key/value persistence of the authenticated identity.
//!
//! ## Keys
//! ```text
//! ┌──────────────────┬──────────────────────────────────────────────────┐
//! │ Key              │ Value                                            │
//! ├──────────────────┼──────────────────────────────────────────────────┤
//! │ token            │ opaque bearer token                              │
//! │ role             │ "establishment" | "employee"                     │
//! │ establishmentId  │ id, or absent when the account has none          │
//! │ email            │ login email                                      │
//! │ planActive       │ "true" | "false"                                 │
//! │ planExpiresAt    │ server date string, "" when unknown              │
//! └──────────────────┴──────────────────────────────────────────────────┘
//! ```
//!
//! All six keys are written in one batch and removed in one batch. A record
//! with only one of `token` / `role` is never returned as a session; it is
//! cleared on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use booking_core::{Role, Session};
use tracing::{debug, warn};

use crate::error::StorageError;

pub const KEY_TOKEN: &str = "token";
pub const KEY_ROLE: &str = "role";
pub const KEY_ESTABLISHMENT_ID: &str = "establishmentId";
pub const KEY_EMAIL: &str = "email";
pub const KEY_PLAN_ACTIVE: &str = "planActive";
pub const KEY_PLAN_EXPIRES_AT: &str = "planExpiresAt";

/// Every key the session owns.
pub const SESSION_KEYS: [&str; 6] = [
    KEY_TOKEN,
    KEY_ROLE,
    KEY_ESTABLISHMENT_ID,
    KEY_EMAIL,
    KEY_PLAN_ACTIVE,
    KEY_PLAN_EXPIRES_AT,
];

// =============================================================================
// Key/Value Backend
// =============================================================================

/// Storage backend. `apply` must be all-or-nothing.
pub trait KeyValueStore: Send + Sync {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError>;

    /// Sets `set` and removes `remove` in one write.
    fn apply(&self, set: BTreeMap<String, String>, remove: &[&str]) -> Result<(), StorageError>;
}

/// In-process store for tests and ephemeral runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of `key`, for inspection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("Memory store mutex poisoned")
            .get(key)
            .cloned()
    }

    /// Writes one raw key, bypassing the session batch.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("Memory store mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        Ok(self
            .entries
            .lock()
            .expect("Memory store mutex poisoned")
            .clone())
    }

    fn apply(&self, set: BTreeMap<String, String>, remove: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().expect("Memory store mutex poisoned");
        for key in remove {
            entries.remove(*key);
        }
        entries.extend(set);
        Ok(())
    }
}

/// TOML file store. Writes go to a temp file that is then renamed over
/// the target path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

impl KeyValueStore for FileStore {
    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                toml::from_str(&contents).map_err(|e| StorageError::Parse(e.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn apply(&self, set: BTreeMap<String, String>, remove: &[&str]) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking logout forever.
        let mut entries = self.load().unwrap_or_else(|e| {
            warn!(error = %e, "Discarding unreadable session file");
            BTreeMap::new()
        });
        for key in remove {
            entries.remove(*key);
        }
        entries.extend(set);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let contents =
            toml::to_string(&entries).map_err(|e| StorageError::Encode(e.to_string()))?;
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, contents).map_err(|e| self.io_error(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        Ok(())
    }
}

// =============================================================================
// Session Store
// =============================================================================

/// Reads and writes [`Session`] through a [`KeyValueStore`].
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        SessionStore { backend }
    }

    /// Store backed by process memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Writes all session keys in one batch.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let mut set = BTreeMap::new();
        set.insert(KEY_TOKEN.to_string(), session.token.clone());
        set.insert(KEY_ROLE.to_string(), session.role.as_str().to_string());
        set.insert(KEY_EMAIL.to_string(), session.email.clone());
        set.insert(KEY_PLAN_ACTIVE.to_string(), session.plan_active.to_string());
        set.insert(
            KEY_PLAN_EXPIRES_AT.to_string(),
            session.plan_expires_at.clone().unwrap_or_default(),
        );

        let remove: &[&str] = match &session.establishment_id {
            Some(id) => {
                set.insert(KEY_ESTABLISHMENT_ID.to_string(), id.clone());
                &[]
            }
            None => &[KEY_ESTABLISHMENT_ID],
        };

        self.backend.apply(set, remove)?;
        debug!(role = %session.role, "Session saved");
        Ok(())
    }

    /// Restores the stored session, if a complete one exists.
    pub fn load(&self) -> Option<Session> {
        let entries = match self.backend.load() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Could not read stored session");
                return None;
            }
        };

        let present = |key: &str| entries.get(key).filter(|v| !v.is_empty()).cloned();
        let token = present(KEY_TOKEN);
        let role = present(KEY_ROLE);

        let (token, role) = match (token, role) {
            (Some(token), Some(role)) => (token, role),
            (None, None) => return None,
            _ => {
                warn!("Stored session is incomplete, clearing it");
                self.clear_quietly();
                return None;
            }
        };

        let role: Role = match role.parse() {
            Ok(role) => role,
            Err(_) => {
                warn!(%role, "Stored session has an unknown role, clearing it");
                self.clear_quietly();
                return None;
            }
        };

        Some(Session {
            token,
            role,
            establishment_id: present(KEY_ESTABLISHMENT_ID),
            email: present(KEY_EMAIL).unwrap_or_default(),
            plan_active: entries.get(KEY_PLAN_ACTIVE).map(String::as_str) == Some("true"),
            plan_expires_at: present(KEY_PLAN_EXPIRES_AT),
        })
    }

    /// Removes all session keys in one batch.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.apply(BTreeMap::new(), &SESSION_KEYS)?;
        debug!("Session cleared");
        Ok(())
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
