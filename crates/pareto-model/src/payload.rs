//! Request bodies whose shape depends on the portal

use serde_json::{json, Value};

use crate::endpoints::Portal;

/// Admins log in by username, portal users by (lowercased) email
pub fn login(portal: Portal, login: &str, password: &str) -> Value {
    match portal {
        Portal::Admin => json!({"username": login.trim(), "password": password}),
        Portal::User => json!({"email": login.trim().to_lowercase(), "password": password}),
    }
}

pub fn change_password(portal: Portal, current: &str, new: &str) -> Value {
    match portal {
        Portal::Admin => json!({"old_password": current, "new_password": new}),
        Portal::User => json!({"current_password": current, "new_password": new}),
    }
}

pub fn setup_password(email: &str, password: &str) -> Value {
    json!({"email": email.trim().to_lowercase(), "password": password})
}

pub fn request_reset(email: &str) -> Value {
    json!({"email": email.trim().to_lowercase()})
}

/// Reset tokens are pasted by hand, so surrounding whitespace is dropped
pub fn reset_password(token: &str, new: &str) -> Value {
    json!({"token": token.trim(), "new_password": new})
}

/// Google token upload: the file's JSON object, wrapped
pub fn token_upload(token_json: &Value) -> Value {
    json!({"token_json": token_json})
}
