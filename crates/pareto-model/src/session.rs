//! Session record and the durable key/value store it lives in

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::endpoints::Portal;
use crate::entities::{AdminIdentity, PortalUser};
use crate::error::ModelError;

pub const ADMIN_TOKEN_KEY: &str = "sessionToken";
pub const USER_TOKEN_KEY: &str = "userCrmToken";
pub const THEME_KEY: &str = "theme";

/// Durable client-side key/value storage.
///
/// The browser backs this with `localStorage`; the console with a JSON file.
/// Writes are best-effort: a store that cannot persist logs and carries on.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);

    fn token(&self, portal: Portal) -> Option<String> {
        self.get(portal.token_key()).filter(|t| !t.is_empty())
    }

    fn store_token(&mut self, portal: Portal, token: &str) {
        self.set(portal.token_key(), token);
    }

    fn clear_token(&mut self, portal: Portal) {
        self.remove(portal.token_key());
    }

    fn theme(&self) -> Theme {
        self.get(THEME_KEY)
            .and_then(|t| t.parse().ok())
            .unwrap_or_default()
    }

    fn store_theme(&mut self, theme: Theme) {
        self.set(THEME_KEY, theme.as_str());
    }
}

/// In-memory store, used by tests and as the fallback when no durable
/// storage is available
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl From<BTreeMap<String, String>> for MemoryStore {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Who the session token belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
    Admin(AdminIdentity),
    User(PortalUser),
}

impl Identity {
    pub fn portal(&self) -> Portal {
        match self {
            Identity::Admin(_) => Portal::Admin,
            Identity::User(_) => Portal::User,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Identity::Admin(admin) => admin
                .full_name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| admin.username.clone()),
            Identity::User(user) => user
                .full_name
                .clone()
                .or_else(|| user.email.clone())
                .unwrap_or_else(|| "User".to_string()),
        }
    }

    /// Numeric id of a portal user, used by the "my leads" filter
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::User(user) => user.id,
            Identity::Admin(_) => None,
        }
    }
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub identity: Identity,
}

impl Session {
    pub fn portal(&self) -> Portal {
        self.identity.portal()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ModelError::UnknownTheme(other.to_string())),
        }
    }
}
