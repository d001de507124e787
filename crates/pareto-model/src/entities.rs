//! Remote resource records
//!
//! These types mirror the JSON bodies of the Pareto API. Older server
//! builds disagree on a few field names, so the tenant, user and lead
//! records deserialize through a wire struct that accepts either spelling
//! and always serialize under one canonical name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use crate::endpoints::ListQuery;

/// Administrator identity returned by admin login and validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(default, alias = "admin_id")]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Tenant user identity returned by portal login and validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalUser {
    #[serde(default, alias = "user_id")]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub tenant_id: Option<i64>,
    #[serde(default)]
    pub tenant_name: Option<String>,
}

/// A customer organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TenantWire")]
pub struct Tenant {
    pub id: i64,
    pub company_name: String,
    pub company_slug: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub user_count: u32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
struct TenantWire {
    id: i64,
    #[serde(default)]
    company_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    company_slug: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    is_active: Option<bool>,
    #[serde(default)]
    active: Option<bool>,
    #[serde(default)]
    user_count: u32,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl From<TenantWire> for Tenant {
    fn from(wire: TenantWire) -> Self {
        Self {
            id: wire.id,
            company_name: wire.company_name.or(wire.name).unwrap_or_default(),
            company_slug: wire.company_slug,
            email: wire.email,
            phone: wire.phone,
            is_active: wire.is_active.or(wire.active).unwrap_or(true),
            user_count: wire.user_count,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

/// Fields sent when creating or updating a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantDraft {
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Default for TenantDraft {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            email: None,
            phone: None,
            is_active: true,
        }
    }
}

impl From<&Tenant> for TenantDraft {
    fn from(tenant: &Tenant) -> Self {
        Self {
            company_name: tenant.company_name.clone(),
            email: tenant.email.clone(),
            phone: tenant.phone.clone(),
            is_active: tenant.is_active,
        }
    }
}

/// A team member belonging to a tenant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "UserWire")]
pub struct User {
    pub id: i64,
    pub tenant_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub is_enabled: bool,
    pub google_calendar_id: Option<String>,
    pub has_token: bool,
    pub created_at: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Deserialize)]
struct UserWire {
    id: i64,
    #[serde(default)]
    tenant_id: i64,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default = "default_true")]
    is_enabled: bool,
    #[serde(default)]
    google_calendar_id: Option<String>,
    #[serde(default)]
    has_token: Option<bool>,
    #[serde(default)]
    has_google_token: Option<bool>,
    #[serde(default)]
    created_at: Option<String>,
}

impl From<UserWire> for User {
    fn from(wire: UserWire) -> Self {
        Self {
            id: wire.id,
            tenant_id: wire.tenant_id,
            first_name: wire.first_name.unwrap_or_default(),
            last_name: wire.last_name.unwrap_or_default(),
            phone_number: wire.phone_number.unwrap_or_default(),
            email: wire.email,
            is_enabled: wire.is_enabled,
            google_calendar_id: wire.google_calendar_id,
            has_token: wire.has_token.or(wire.has_google_token).unwrap_or(false),
            created_at: wire.created_at,
        }
    }
}

/// Fields sent when creating or updating a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDraft {
    pub tenant_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_calendar_id: Option<String>,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            tenant_id: 0,
            first_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            email: None,
            is_enabled: true,
            google_calendar_id: None,
        }
    }
}

impl From<&User> for UserDraft {
    fn from(user: &User) -> Self {
        Self {
            tenant_id: user.tenant_id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone_number: user.phone_number.clone(),
            email: user.email.clone(),
            is_enabled: user.is_enabled,
            google_calendar_id: user.google_calendar_id.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadPriority {
    Low,
    Mid,
    High,
}

impl LeadPriority {
    pub const ALL: [LeadPriority; 3] = [LeadPriority::Low, LeadPriority::Mid, LeadPriority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadPriority::Low => "Low",
            LeadPriority::Mid => "Mid",
            LeadPriority::High => "High",
        }
    }
}

impl fmt::Display for LeadPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadPriority {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        LeadPriority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown priority '{s}' (expected Low, Mid or High)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Closed,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 3] = [LeadStatus::Open, LeadStatus::InProgress, LeadStatus::Closed];

    pub fn as_str(self) -> &'static str {
        match self {
            LeadStatus::Open => "Open",
            LeadStatus::InProgress => "In Progress",
            LeadStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LeadStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.replace(['-', '_'], " ");
        LeadStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("unknown status '{s}' (expected Open, In Progress or Closed)"))
    }
}

/// A CRM lead. `content` and `action` are opaque server payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LeadWire")]
pub struct Lead {
    pub id: i64,
    pub tenant_id: Option<i64>,
    pub tenant_name: Option<String>,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub subject: String,
    pub owner: Option<String>,
    pub priority: Option<LeadPriority>,
    pub status: Option<LeadStatus>,
    pub content: Value,
    pub action: Value,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Deserialize)]
struct LeadWire {
    id: i64,
    #[serde(default)]
    tenant_id: Option<i64>,
    #[serde(default)]
    tenant_name: Option<String>,
    #[serde(default)]
    user_id: Option<i64>,
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    lead_subject: Option<String>,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default, deserialize_with = "lenient_enum")]
    priority: Option<LeadPriority>,
    #[serde(default, deserialize_with = "lenient_enum")]
    status: Option<LeadStatus>,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    lead_content: Option<Value>,
    #[serde(default)]
    action: Option<Value>,
    #[serde(default)]
    actions: Option<Value>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

/// Unrecognized workflow values decode as absent rather than failing the
/// whole list
fn lenient_enum<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: std::str::FromStr,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

impl From<LeadWire> for Lead {
    fn from(wire: LeadWire) -> Self {
        Self {
            id: wire.id,
            tenant_id: wire.tenant_id,
            tenant_name: wire.tenant_name,
            user_id: wire.user_id,
            user_name: wire.user_name,
            subject: wire.subject.or(wire.lead_subject).unwrap_or_default(),
            owner: wire.owner,
            priority: wire.priority,
            status: wire.status,
            content: wire.content.or(wire.lead_content).unwrap_or(Value::Null),
            action: wire.action.or(wire.actions).unwrap_or(Value::Null),
            created_at: wire.created_at,
            updated_at: wire.updated_at,
        }
    }
}

/// Fields sent when creating or editing a lead.
///
/// New leads are created from a free-text `message` that the server turns
/// into structured content; edits touch only the workflow fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        rename = "lead_subject",
        skip_serializing_if = "Option::is_none"
    )]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<LeadPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<LeadStatus>,
}

impl LeadDraft {
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }
}

/// Lead counters computed by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub open: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub high_priority: Option<u64>,
    #[serde(default)]
    pub my_leads: Option<u64>,
}

/// Lead counts per status and priority from the CRM stats endpoints
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadBreakdown {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_status: BTreeMap<String, u64>,
    #[serde(default)]
    pub by_priority: BTreeMap<String, u64>,
}

/// Leads page as returned by the list endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadList {
    #[serde(default)]
    pub leads: Vec<Lead>,
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub stats: Option<LeadStats>,
}

/// Filters for the lead screens.
///
/// `status`, `priority`, `tenant_id`, `my_leads` and paging go to the
/// server. `search` and `my_leads` are also applied to the rows the server
/// returned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
    pub priority: Option<LeadPriority>,
    pub tenant_id: Option<i64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub search: String,
    pub my_leads: bool,
}

impl LeadFilter {
    pub fn to_query(&self) -> ListQuery {
        let query = ListQuery::new()
            .with_opt("status", self.status)
            .with_opt("priority", self.priority)
            .with_opt("tenant_id", self.tenant_id)
            .with_opt("limit", self.limit)
            .with_opt("offset", self.offset);
        if self.my_leads {
            query.with("my_leads", "true")
        } else {
            query
        }
    }
}

/// Immutable record of an administrative action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "admin_username")]
    pub admin: Option<String>,
    pub action: String,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub entity_id: Option<i64>,
    #[serde(default)]
    pub changes: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// Filters for the audit-log viewer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditFilter {
    pub admin: Option<String>,
    pub action: Option<String>,
    pub entity_type: Option<String>,
    pub limit: Option<u32>,
    pub search: String,
}

impl AuditFilter {
    pub fn to_query(&self) -> ListQuery {
        ListQuery::new()
            .with_opt("admin", self.admin.as_deref())
            .with_opt("action", self.action.as_deref())
            .with_opt("entity_type", self.entity_type.as_deref())
            .with_opt("limit", self.limit)
    }
}

/// Headline numbers for the admin overview page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    #[serde(default)]
    pub total_tenants: u64,
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub total_admins: u64,
}

/// Non-sensitive description of a user's stored Google token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    #[serde(default)]
    pub has_token: bool,
    #[serde(default)]
    pub token_info: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_true() -> bool {
    true
}
