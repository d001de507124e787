//! Per-entity wiring for the generic resource table

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::endpoints::{self, Portal};
use crate::entities::{Lead, LeadDraft, Tenant, TenantDraft, User, UserDraft};
use crate::error::ValidationError;
use crate::filter::Searchable;
use crate::validation;

/// A CRUD-able remote entity.
///
/// Each screen differs only in where its records live, which envelope keys
/// carry them, and how its form is validated; this trait captures exactly
/// that.
pub trait Resource: DeserializeOwned + Searchable + Clone + Send + Sync + 'static {
    type Draft: Serialize + Send + Sync;

    /// Singular, capitalized name for alerts ("Tenant deleted")
    const LABEL: &'static str;

    /// Body keys that may hold the record list, in order of preference
    const LIST_KEYS: &'static [&'static str];

    /// Body keys that may hold a single record
    const ITEM_KEYS: &'static [&'static str];

    fn collection_path(portal: Portal) -> String;

    fn item_path(portal: Portal, id: i64) -> String {
        endpoints::item_path(&Self::collection_path(portal), id)
    }

    fn id(&self) -> i64;

    fn validate(draft: &Self::Draft, is_new: bool) -> Result<(), ValidationError>;
}

impl Resource for Tenant {
    type Draft = TenantDraft;
    const LABEL: &'static str = "Tenant";
    const LIST_KEYS: &'static [&'static str] = &["data", "tenants"];
    const ITEM_KEYS: &'static [&'static str] = &["data", "tenant"];

    fn collection_path(_portal: Portal) -> String {
        endpoints::tenants_path()
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(draft: &TenantDraft, _is_new: bool) -> Result<(), ValidationError> {
        validation::tenant(draft)
    }
}

impl Resource for User {
    type Draft = UserDraft;
    const LABEL: &'static str = "User";
    const LIST_KEYS: &'static [&'static str] = &["data", "users"];
    const ITEM_KEYS: &'static [&'static str] = &["data", "user"];

    fn collection_path(_portal: Portal) -> String {
        endpoints::users_path()
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(draft: &UserDraft, _is_new: bool) -> Result<(), ValidationError> {
        validation::user(draft)
    }
}

impl Resource for Lead {
    type Draft = LeadDraft;
    const LABEL: &'static str = "Lead";
    const LIST_KEYS: &'static [&'static str] = &["leads", "data"];
    const ITEM_KEYS: &'static [&'static str] = &["lead", "data"];

    fn collection_path(portal: Portal) -> String {
        portal.leads_path()
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn validate(draft: &LeadDraft, is_new: bool) -> Result<(), ValidationError> {
        validation::lead(draft, is_new)
    }
}

/// Success alert after a create (`id` is `None`) or an update
pub fn saved_message(label: &str, id: Option<i64>, name: &str) -> String {
    let verb = if id.is_some() { "updated" } else { "created" };
    if name.trim().is_empty() {
        format!("{label} {verb}")
    } else {
        format!("{label} {name} {verb}")
    }
}

pub fn deleted_message(label: &str) -> String {
    format!("{label} deleted")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_message_names_the_record() {
        assert_eq!(saved_message("Tenant", None, "Acme"), "Tenant Acme created");
        assert_eq!(saved_message("Lead", Some(3), " "), "Lead updated");
        assert_eq!(deleted_message(User::LABEL), "User deleted");
    }

    #[test]
    fn lead_paths_follow_portal() {
        assert_eq!(Lead::item_path(Portal::Admin, 3), "/api/admin/crm/leads/3");
        assert_eq!(Lead::item_path(Portal::User, 3), "/api/crm/leads/3");
    }

    #[test]
    fn admin_collections_ignore_portal() {
        assert_eq!(Tenant::collection_path(Portal::User), "/api/admin/tenants");
        assert_eq!(User::item_path(Portal::Admin, 1), "/api/admin/users/1");
    }
}
