//! Client-side form validation, run before any request is sent

use crate::entities::{LeadDraft, TenantDraft, UserDraft};
use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 8;

/// New password plus its confirmation. The mismatch check runs first so the
/// operator sees the message for the mistake they most likely made.
pub fn new_password(password: &str, confirm: &str) -> Result<(), ValidationError> {
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

pub fn email(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required { field: "Email" });
    }
    match value.split_once('@') {
        Some((local, domain))
            if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') =>
        {
            Ok(())
        }
        _ => Err(ValidationError::InvalidEmail),
    }
}

pub fn reset_token(token: &str) -> Result<(), ValidationError> {
    if token.trim().is_empty() {
        return Err(ValidationError::Required { field: "Reset token" });
    }
    Ok(())
}

pub fn credentials(login: &str, password: &str) -> Result<(), ValidationError> {
    if login.trim().is_empty() {
        return Err(ValidationError::Required { field: "Username" });
    }
    if password.is_empty() {
        return Err(ValidationError::Required { field: "Password" });
    }
    Ok(())
}

pub fn tenant(draft: &TenantDraft) -> Result<(), ValidationError> {
    if draft.company_name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Company name",
        });
    }
    if let Some(addr) = draft.email.as_deref().filter(|e| !e.trim().is_empty()) {
        email(addr)?;
    }
    Ok(())
}

pub fn user(draft: &UserDraft) -> Result<(), ValidationError> {
    if draft.tenant_id <= 0 {
        return Err(ValidationError::Required { field: "Tenant" });
    }
    if draft.first_name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "First name",
        });
    }
    if draft.last_name.trim().is_empty() {
        return Err(ValidationError::Required { field: "Last name" });
    }
    if draft.phone_number.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Phone number",
        });
    }
    if let Some(addr) = draft.email.as_deref().filter(|e| !e.trim().is_empty()) {
        email(addr)?;
    }
    Ok(())
}

pub fn lead(draft: &LeadDraft, is_new: bool) -> Result<(), ValidationError> {
    if is_new
        && draft
            .message
            .as_deref()
            .map_or(true, |m| m.trim().is_empty())
    {
        return Err(ValidationError::Required { field: "Message" });
    }
    Ok(())
}

/// The token upload form takes the raw contents of a Google token file
pub fn token_json(raw: &str) -> Result<serde_json::Value, ValidationError> {
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ValidationError::InvalidToken(e.to_string()))?;
    if !value.is_object() {
        return Err(ValidationError::InvalidToken(
            "expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn blank_reset_token_is_required() {
        assert_eq!(
            reset_token("  "),
            Err(ValidationError::Required { field: "Reset token" })
        );
        assert!(reset_token("abc").is_ok());
    }

    #[test]
    fn mismatch_is_reported_before_length() {
        assert_eq!(
            new_password("short", "other"),
            Err(ValidationError::PasswordMismatch)
        );
    }

    #[test]
    fn short_password_is_rejected() {
        assert_eq!(
            new_password("seven77", "seven77"),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
        assert!(new_password("eight888", "eight888").is_ok());
    }

    #[test]
    fn email_shapes() {
        assert!(email("a@b.co").is_ok());
        assert_eq!(email(""), Err(ValidationError::Required { field: "Email" }));
        assert_eq!(email("nobody"), Err(ValidationError::InvalidEmail));
        assert_eq!(email("x@localhost"), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn tenant_needs_company_name() {
        let mut draft = TenantDraft {
            company_name: " ".to_string(),
            email: None,
            phone: None,
            is_active: true,
        };
        assert!(tenant(&draft).is_err());
        draft.company_name = "Acme".to_string();
        assert!(tenant(&draft).is_ok());
        draft.email = Some("bad".to_string());
        assert_eq!(tenant(&draft), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn user_needs_tenant_names_and_phone() {
        let mut draft = UserDraft {
            tenant_id: 0,
            first_name: "Ada".to_string(),
            last_name: "L".to_string(),
            phone_number: "+1555".to_string(),
            email: None,
            is_enabled: true,
            google_calendar_id: None,
        };
        assert_eq!(user(&draft), Err(ValidationError::Required { field: "Tenant" }));
        draft.tenant_id = 2;
        assert!(user(&draft).is_ok());
        draft.phone_number.clear();
        assert_eq!(
            user(&draft),
            Err(ValidationError::Required {
                field: "Phone number"
            })
        );
    }

    #[test]
    fn new_lead_needs_message_but_edit_does_not() {
        assert!(lead(&LeadDraft::default(), true).is_err());
        assert!(lead(&LeadDraft::from_message("call me"), true).is_ok());
        assert!(lead(&LeadDraft::default(), false).is_ok());
    }

    #[test]
    fn token_must_be_json_object() {
        assert!(token_json(r#"{"refresh_token": "x"}"#).is_ok());
        assert!(token_json("[1,2]").is_err());
        assert!(token_json("nope").is_err());
    }

    proptest! {
        #[test]
        fn differing_confirmation_always_mismatches(a in ".{0,20}", b in ".{0,20}") {
            prop_assume!(a != b);
            prop_assert_eq!(new_password(&a, &b), Err(ValidationError::PasswordMismatch));
        }

        #[test]
        fn matching_passwords_pass_iff_long_enough(p in "[a-zA-Z0-9]{0,16}") {
            let result = new_password(&p, &p);
            prop_assert_eq!(result.is_ok(), p.len() >= MIN_PASSWORD_LEN);
        }
    }
}
