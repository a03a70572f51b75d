//! Session context shared by the request clients and domain services.
//!
//! Holds the bearer tokens for two independent namespaces (user and admin)
//! under the flat key layout the web client persists:
//!
//! | Namespace | Keys |
//! |-----------|------|
//! | user      | `token`, `refreshToken`, `user` |
//! | admin     | `adminToken`, `adminRefreshToken`, `adminUser`, `adminRole` |
//!
//! A [`SessionStore`] is a cheap cloneable handle; every clone sees the same
//! entries. When opened with [`SessionStore::open`] each mutation is flushed
//! to a JSON file so a later process picks the session back up.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use crate::SessionError;

/// Independent key set within a [`SessionStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    User,
    Admin,
}

impl Namespace {
    #[must_use]
    pub fn token_key(self) -> &'static str {
        match self {
            Namespace::User => "token",
            Namespace::Admin => "adminToken",
        }
    }

    #[must_use]
    pub fn refresh_token_key(self) -> &'static str {
        match self {
            Namespace::User => "refreshToken",
            Namespace::Admin => "adminRefreshToken",
        }
    }

    #[must_use]
    pub fn profile_key(self) -> &'static str {
        match self {
            Namespace::User => "user",
            Namespace::Admin => "adminUser",
        }
    }

    /// Only the admin namespace persists a role.
    #[must_use]
    pub fn role_key(self) -> Option<&'static str> {
        match self {
            Namespace::User => None,
            Namespace::Admin => Some("adminRole"),
        }
    }

    fn keys(self) -> impl Iterator<Item = &'static str> {
        [
            Some(self.token_key()),
            Some(self.refresh_token_key()),
            Some(self.profile_key()),
            self.role_key(),
        ]
        .into_iter()
        .flatten()
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::User => write!(f, "user"),
            Namespace::Admin => write!(f, "admin"),
        }
    }
}

/// Everything a successful login or refresh writes into one namespace.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionRecord {
    pub token: String,
    pub refresh_token: Option<String>,
    pub profile: Option<serde_json::Value>,
    /// Ignored for [`Namespace::User`].
    pub role: Option<String>,
}

#[derive(Default)]
struct Inner {
    entries: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl Inner {
    /// Writes the whole map to the backing file. Callers hold the write lock,
    /// so the file always matches the last mutation; the write is a small
    /// blocking call on the current thread.
    fn flush(&self) -> Result<(), SessionError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, body)?;
        Ok(())
    }
}

/// Cloneable handle to the two-namespace token storage.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<Inner>>,
}

impl SessionStore {
    /// Creates an empty store that lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed store. A missing file yields an empty store; the
    /// file is created on the first mutation.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] if the file exists but cannot be read, or
    /// [`SessionError::Json`] if it is not a flat JSON object of strings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened session store");
        Ok(Self {
            inner: Arc::new(RwLock::new(Inner {
                entries,
                path: Some(path),
            })),
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Raw value for a persisted key, regardless of namespace.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.read(|inner| inner.entries.get(key).cloned())
    }

    #[must_use]
    pub fn token(&self, namespace: Namespace) -> Option<String> {
        self.get(namespace.token_key()).filter(|t| !t.is_empty())
    }

    #[must_use]
    pub fn refresh_token(&self, namespace: Namespace) -> Option<String> {
        self.get(namespace.refresh_token_key())
            .filter(|t| !t.is_empty())
    }

    /// Stored profile JSON. A value that no longer parses is treated as absent.
    #[must_use]
    pub fn profile(&self, namespace: Namespace) -> Option<serde_json::Value> {
        let raw = self.get(namespace.profile_key())?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%namespace, error = %e, "stored profile is not valid JSON");
                None
            }
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<String> {
        Namespace::Admin.role_key().and_then(|key| self.get(key))
    }

    #[must_use]
    pub fn is_authenticated(&self, namespace: Namespace) -> bool {
        self.token(namespace).is_some()
    }

    /// Replaces every key of `namespace` with the contents of `record`.
    ///
    /// Keys the record leaves empty are removed rather than kept from the
    /// previous session, so a namespace never mixes two logins.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the backing file cannot be written. The
    /// in-memory state is updated even when the flush fails.
    pub fn replace(&self, namespace: Namespace, record: SessionRecord) -> Result<(), SessionError> {
        self.write(|inner| {
            for key in namespace.keys() {
                inner.entries.remove(key);
            }
            inner
                .entries
                .insert(namespace.token_key().to_owned(), record.token);
            if let Some(refresh) = record.refresh_token {
                inner
                    .entries
                    .insert(namespace.refresh_token_key().to_owned(), refresh);
            }
            if let Some(profile) = record.profile {
                inner
                    .entries
                    .insert(namespace.profile_key().to_owned(), profile.to_string());
            }
            if let (Some(key), Some(role)) = (namespace.role_key(), record.role) {
                inner.entries.insert(key.to_owned(), role);
            }
            inner.flush()
        })
    }

    /// Removes every key of `namespace`. The other namespace is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the backing file cannot be written.
    pub fn clear(&self, namespace: Namespace) -> Result<(), SessionError> {
        self.write(|inner| {
            for key in namespace.keys() {
                inner.entries.remove(key);
            }
            inner.flush()
        })
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|inner| {
            f.debug_struct("SessionStore")
                .field("path", &inner.path)
                .field("user_authenticated", &inner.entries.contains_key("token"))
                .field(
                    "admin_authenticated",
                    &inner.entries.contains_key("adminToken"),
                )
                .finish()
        })
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
