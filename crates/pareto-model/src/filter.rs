//! Client-side filtering of rows the server already returned.
//!
//! Filtering never reorders: the output keeps the server's order.

use crate::entities::{AuditLog, Lead, Tenant, User};

/// Rows that can be matched against a search box
pub trait Searchable {
    /// Text fields the search box looks at
    fn search_fields(&self) -> Vec<String>;

    /// Case-insensitive substring match against any field. A blank query
    /// matches everything.
    fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl Searchable for Tenant {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.company_name.clone()];
        fields.extend(self.email.clone());
        fields.extend(self.phone.clone());
        fields
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.full_name(), self.phone_number.clone()];
        fields.extend(self.email.clone());
        fields
    }
}

impl Searchable for Lead {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.subject.clone()];
        fields.extend(self.owner.clone());
        fields.extend(self.tenant_name.clone());
        fields.extend(self.user_name.clone());
        fields
    }
}

impl Searchable for AuditLog {
    fn search_fields(&self) -> Vec<String> {
        let mut fields = vec![self.action.clone()];
        fields.extend(self.admin.clone());
        fields.extend(self.entity_type.clone());
        fields.extend(self.ip_address.clone());
        fields
    }
}

/// Rows matching the search box, in their original order
pub fn search<'a, T: Searchable>(rows: &'a [T], query: &str) -> Vec<&'a T> {
    rows.iter().filter(|row| row.matches(query)).collect()
}

/// Leads created by the given portal user
pub fn my_leads(leads: &[Lead], user_id: i64) -> Vec<&Lead> {
    leads
        .iter()
        .filter(|lead| lead.user_id == Some(user_id))
        .collect()
}
