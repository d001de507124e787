//! REST endpoint paths consumed by the dashboard

use serde::{Deserialize, Serialize};
use std::fmt;

pub const API_PREFIX: &str = "/api";

/// Which login surface a session belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Portal {
    /// Administrators manage tenants, users, leads and audit logs
    #[default]
    Admin,
    /// Tenant users work with their own tenant's CRM leads
    User,
}

impl Portal {
    /// Storage key that holds this portal's bearer token
    pub fn token_key(self) -> &'static str {
        match self {
            Portal::Admin => crate::session::ADMIN_TOKEN_KEY,
            Portal::User => crate::session::USER_TOKEN_KEY,
        }
    }

    pub fn login_path(self) -> String {
        match self {
            Portal::Admin => format!("{API_PREFIX}/auth/login"),
            Portal::User => format!("{API_PREFIX}/user/login"),
        }
    }

    pub fn validate_path(self) -> String {
        match self {
            Portal::Admin => format!("{API_PREFIX}/auth/validate"),
            Portal::User => format!("{API_PREFIX}/user/validate"),
        }
    }

    pub fn logout_path(self) -> String {
        match self {
            Portal::Admin => format!("{API_PREFIX}/auth/logout"),
            Portal::User => format!("{API_PREFIX}/user/logout"),
        }
    }

    pub fn change_password_path(self) -> String {
        match self {
            Portal::Admin => format!("{API_PREFIX}/auth/change-password"),
            Portal::User => format!("{API_PREFIX}/user/change-password"),
        }
    }

    pub fn leads_path(self) -> String {
        match self {
            Portal::Admin => format!("{API_PREFIX}/admin/crm/leads"),
            Portal::User => format!("{API_PREFIX}/crm/leads"),
        }
    }

    /// Lead breakdown; admins may narrow it to one tenant
    pub fn lead_stats_path(self) -> String {
        match self {
            Portal::Admin => format!("{API_PREFIX}/admin/crm/stats"),
            Portal::User => format!("{API_PREFIX}/crm/stats"),
        }
    }
}

impl fmt::Display for Portal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Portal::Admin => write!(f, "admin"),
            Portal::User => write!(f, "user"),
        }
    }
}

impl std::str::FromStr for Portal {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Portal::Admin),
            "user" => Ok(Portal::User),
            other => Err(format!("unknown portal '{other}' (expected admin or user)")),
        }
    }
}

pub fn setup_password_path() -> String {
    format!("{API_PREFIX}/user/setup-password")
}

pub fn request_reset_path() -> String {
    format!("{API_PREFIX}/user/request-reset")
}

pub fn reset_password_path() -> String {
    format!("{API_PREFIX}/user/reset-password")
}

pub fn dashboard_path() -> String {
    format!("{API_PREFIX}/admin/dashboard")
}

pub fn tenants_path() -> String {
    format!("{API_PREFIX}/admin/tenants")
}

pub fn users_path() -> String {
    format!("{API_PREFIX}/admin/users")
}

pub fn user_token_path(user_id: i64) -> String {
    format!("{API_PREFIX}/admin/users/{user_id}/token")
}

pub fn audit_logs_path() -> String {
    format!("{API_PREFIX}/admin/audit-logs")
}

/// Path of a single record below a collection path
pub fn item_path(collection: &str, id: i64) -> String {
    format!("{collection}/{id}")
}

/// Query-string parameters for list requests, kept in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pairs: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter; empty values are dropped so blank filter inputs
    /// do not constrain the server
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.pairs.push((key.to_string(), value));
        }
        self
    }

    pub fn with_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v.to_string()),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Append the query to a path, percent-encoding keys and values
    pub fn apply(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_string();
        }
        let query: Vec<String> = self
            .pairs
            .iter()
            .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
            .collect();
        format!("{}?{}", path, query.join("&"))
    }
}

fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
