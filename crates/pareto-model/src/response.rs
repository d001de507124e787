//! Classification of raw API responses
//!
//! Every endpoint answers with a JSON object carrying a `success` flag and,
//! on failure, a `message`. Transports hand the status code and body text
//! here and get back either the parsed body or a [`RequestError`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::endpoints::Portal;
use crate::entities::{
    AdminIdentity, AuditLog, DashboardStats, LeadBreakdown, LeadList, PortalUser,
};
use crate::error::RequestError;
use crate::session::Identity;

/// Turn a status/body pair into the JSON body or a classified failure
pub fn classify(status: u16, body: &str) -> Result<Value, RequestError> {
    let parsed: Option<Value> = if body.trim().is_empty() {
        None
    } else {
        serde_json::from_str(body).ok()
    };

    if !(200..300).contains(&status) {
        let message = parsed
            .as_ref()
            .and_then(message_of)
            .unwrap_or_else(|| default_status_message(status));
        tracing::debug!("Request failed with HTTP {}: {}", status, message);
        return Err(RequestError::Http { status, message });
    }

    let value = match parsed {
        Some(value) => value,
        None if body.trim().is_empty() => Value::Object(Default::default()),
        None => {
            return Err(RequestError::Decode(format!(
                "response body is not JSON ({} bytes)",
                body.len()
            )))
        }
    };

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        let message = message_of(&value).unwrap_or_else(|| "Request failed".to_string());
        tracing::debug!("Request reported failure: {}", message);
        return Err(RequestError::Application(message));
    }

    Ok(value)
}

/// Deserialize the value stored under `key`
pub fn field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, RequestError> {
    let raw = body
        .get(key)
        .cloned()
        .ok_or_else(|| RequestError::Decode(format!("missing field '{key}'")))?;
    serde_json::from_value(raw).map_err(|e| RequestError::Decode(format!("field '{key}': {e}")))
}

/// Deserialize the first of `keys` present in the body
pub fn first_field<T: DeserializeOwned>(body: &Value, keys: &[&str]) -> Result<T, RequestError> {
    match keys.iter().find(|k| body.get(**k).is_some()) {
        Some(key) => field(body, key),
        None => Err(RequestError::Decode(format!(
            "missing field (expected one of {})",
            keys.join(", ")
        ))),
    }
}

/// Server-provided message, if any
pub fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// True when a rejected portal login says the account has no password yet
pub fn needs_password_setup(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("needs_password_setup").and_then(Value::as_bool))
        .unwrap_or(false)
}

/// Whose session a login or validate body describes
pub fn identity(portal: Portal, body: &Value) -> Result<Identity, RequestError> {
    match portal {
        Portal::Admin => field::<AdminIdentity>(body, "admin").map(Identity::Admin),
        Portal::User => field::<PortalUser>(body, "user").map(Identity::User),
    }
}

/// Session token and identity from a successful login body
pub fn login_grant(portal: Portal, body: &Value) -> Result<(String, Identity), RequestError> {
    let token: String = field(body, "session_token")?;
    Ok((token, identity(portal, body)?))
}

/// Headline numbers, which older servers return without the
/// `statistics` wrapper
pub fn statistics(body: &Value) -> Result<DashboardStats, RequestError> {
    let data = body.get("data").unwrap_or(body);
    match data.get("statistics") {
        Some(_) => field(data, "statistics"),
        None => serde_json::from_value(data.clone())
            .map_err(|e| RequestError::Decode(format!("statistics: {e}"))),
    }
}

pub fn audit_logs(body: &Value) -> Result<Vec<AuditLog>, RequestError> {
    first_field(body, &["data", "logs", "audit_logs"])
}

pub fn lead_list(body: Value) -> Result<LeadList, RequestError> {
    serde_json::from_value(body).map_err(|e| RequestError::Decode(format!("leads: {e}")))
}

pub fn lead_breakdown(body: &Value) -> Result<LeadBreakdown, RequestError> {
    field(body, "stats")
}

/// Answer to a password reset request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTicket {
    pub message: String,
    /// Only handed back by servers running in debug mode; otherwise the
    /// token goes out by e-mail
    pub token: Option<String>,
}

pub fn reset_ticket(body: &Value) -> ResetTicket {
    let message = message_of(body)
        .unwrap_or_else(|| "If the email exists, a reset link will be sent.".to_string());
    let token = body
        .get("reset_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    ResetTicket { message, token }
}

fn default_status_message(status: u16) -> String {
    match status {
        400 => "Bad request".to_string(),
        401 => "Authentication required".to_string(),
        403 => "Access denied".to_string(),
        404 => "Not found".to_string(),
        500..=599 => "Server error".to_string(),
        other => format!("Request failed with status {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn login_grant_reads_token_and_portal_identity() {
        let body = json!({
            "success": true,
            "session_token": "abc",
            "user": {"user_id": 5, "email": "ada@example.com", "tenant_id": 2}
        });
        let (token, identity) = login_grant(Portal::User, &body).unwrap();
        assert_eq!(token, "abc");
        assert_eq!(identity.user_id(), Some(5));
        assert!(login_grant(Portal::Admin, &body).is_err());
    }

    #[test]
    fn statistics_accept_both_envelopes() {
        let wrapped = json!({"data": {"statistics": {"total_tenants": 3}}});
        let bare = json!({"data": {"total_tenants": 3}});
        assert_eq!(statistics(&wrapped).unwrap().total_tenants, 3);
        assert_eq!(statistics(&bare).unwrap().total_tenants, 3);
    }

    #[test]
    fn lead_breakdown_reads_counts_per_bucket() {
        let body = json!({"success": true, "stats": {
            "total": 5,
            "by_status": {"Open": 3, "Closed": 2},
            "by_priority": {"High": 1}
        }});
        let stats = lead_breakdown(&body).unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.by_status["Open"], 3);
        assert_eq!(stats.by_priority.get("Low"), None);
    }

    #[test]
    fn reset_token_is_only_present_in_debug_answers() {
        let ticket = reset_ticket(&json!({
            "success": true,
            "message": "If the email exists, a reset link will be sent.",
            "reset_token": null
        }));
        assert!(ticket.message.starts_with("If the email exists"));
        assert_eq!(ticket.token, None);

        let ticket = reset_ticket(&json!({"success": true, "reset_token": "t-1"}));
        assert_eq!(ticket.token.as_deref(), Some("t-1"));
    }

    #[test]
    fn password_setup_flag_is_detected() {
        let body = r#"{"success": false, "message": "Password not set.", "needs_password_setup": true}"#;
        assert!(needs_password_setup(body));
        assert!(!needs_password_setup(r#"{"success": false}"#));
        assert!(!needs_password_setup("<html>"));
    }

    #[test]
    fn success_body_is_returned() {
        let value = classify(200, r#"{"success": true, "data": [1, 2]}"#).unwrap();
        assert_eq!(value["data"], json!([1, 2]));
    }

    #[test]
    fn non_2xx_uses_server_message() {
        let err = classify(401, r#"{"success": false, "message": "Invalid credentials"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::Http {
                status: 401,
                message: "Invalid credentials".to_string()
            }
        );
    }

    #[test]
    fn non_2xx_without_json_gets_generic_message() {
        let err = classify(502, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(
            err,
            RequestError::Http {
                status: 502,
                message: "Server error".to_string()
            }
        );
    }

    #[test]
    fn success_false_in_2xx_is_application_failure() {
        let err = classify(200, r#"{"success": false, "message": "Tenant not found"}"#)
            .unwrap_err();
        assert_eq!(err, RequestError::Application("Tenant not found".to_string()));
    }

    #[test]
    fn body_without_success_flag_is_accepted() {
        let value = classify(200, r#"{"status": "healthy"}"#).unwrap();
        assert_eq!(value["status"], "healthy");
    }

    #[test]
    fn empty_2xx_body_is_empty_object() {
        let value = classify(204, "").unwrap();
        assert!(value.as_object().unwrap().is_empty());
    }

    #[test]
    fn garbage_2xx_body_is_decode_error() {
        let err = classify(200, "not json").unwrap_err();
        assert!(matches!(err, RequestError::Decode(_)));
    }

    #[test]
    fn field_extraction() {
        let body = json!({"lead": {"id": 1}, "data": [3]});
        let ids: Vec<i64> = field(&body, "data").unwrap();
        assert_eq!(ids, vec![3]);
        assert!(field::<Vec<i64>>(&body, "missing").is_err());
        let lead: Value = first_field(&body, &["data_missing", "lead"]).unwrap();
        assert_eq!(lead["id"], 1);
    }
}
