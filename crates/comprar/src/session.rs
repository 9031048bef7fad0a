//! Persisted authentication state.
//!
//! After a successful login the context's cookies and origin storage are
//! snapshotted into a [`StorageState`] and written to disk. Later test runs
//! load the artifact and apply it before navigating, skipping the login
//! sequence entirely.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::result::{ComprarError, ComprarResult};

/// Cookie and origin storage snapshot for one browser context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    /// Cookies
    pub cookies: Vec<Cookie>,
    /// Local storage, keyed by origin
    pub local_storage: HashMap<String, HashMap<String, String>>,
    /// Session storage, keyed by origin
    pub session_storage: HashMap<String, HashMap<String, String>>,
}

impl StorageState {
    /// Create an empty storage state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie
    #[must_use]
    pub fn with_cookie(mut self, cookie: Cookie) -> Self {
        self.cookies.push(cookie);
        self
    }

    /// Add a local storage item
    #[must_use]
    pub fn with_local_storage(mut self, origin: &str, key: &str, value: &str) -> Self {
        self.local_storage
            .entry(origin.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Check if the state carries nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.local_storage.is_empty() && self.session_storage.is_empty()
    }

    /// Whether a cookie with the given name is present
    #[must_use]
    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.iter().any(|c| c.name == name)
    }

    /// Write the artifact as pretty-printed JSON, creating parent
    /// directories as needed.
    pub fn save(&self, path: &Path) -> ComprarResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        tracing::info!(path = %path.display(), cookies = self.cookies.len(), "session state saved");
        Ok(())
    }

    /// Load a previously saved artifact.
    pub fn load(path: &Path) -> ComprarResult<Self> {
        let json = fs::read_to_string(path).map_err(|err| ComprarError::Session {
            message: format!("cannot read {}: {err}", path.display()),
        })?;
        let state = serde_json::from_str(&json)?;
        Ok(state)
    }

    /// Load the artifact if it exists.
    pub fn load_if_present(path: &Path) -> ComprarResult<Option<Self>> {
        if path.exists() {
            Self::load(path).map(Some)
        } else {
            Ok(None)
        }
    }
}

/// A browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain
    pub domain: String,
    /// Path
    pub path: String,
    /// Expiration timestamp (seconds since epoch)
    pub expires: Option<i64>,
    /// HTTP only flag
    pub http_only: bool,
    /// Secure flag
    pub secure: bool,
    /// Same site setting
    pub same_site: SameSite,
}

impl Cookie {
    /// Create a new cookie
    #[must_use]
    pub fn new(name: &str, value: &str, domain: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            domain: domain.to_string(),
            path: "/".to_string(),
            expires: None,
            http_only: false,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Set path
    #[must_use]
    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.to_string();
        self
    }

    /// Set expiration
    #[must_use]
    pub const fn with_expires(mut self, expires: i64) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Set HTTP only
    #[must_use]
    pub const fn http_only(mut self) -> Self {
        self.http_only = true;
        self
    }

    /// Set secure
    #[must_use]
    pub const fn secure(mut self) -> Self {
        self.secure = true;
        self
    }
}

/// Same site cookie setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SameSite {
    /// Strict same site
    Strict,
    /// Lax same site
    Lax,
    /// No same site restriction
    None,
}
