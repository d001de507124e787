//! Navigable pages of the dashboard

use std::fmt;

use crate::endpoints::Portal;
use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageId {
    #[default]
    Dashboard,
    Tenants,
    Users,
    Leads,
    AuditLogs,
    Settings,
}

const ADMIN_PAGES: [PageId; 6] = [
    PageId::Dashboard,
    PageId::Tenants,
    PageId::Users,
    PageId::Leads,
    PageId::AuditLogs,
    PageId::Settings,
];

const USER_PAGES: [PageId; 2] = [PageId::Leads, PageId::Settings];

impl PageId {
    /// Pages reachable from a portal's navigation, in menu order
    pub fn for_portal(portal: Portal) -> &'static [PageId] {
        match portal {
            Portal::Admin => &ADMIN_PAGES,
            Portal::User => &USER_PAGES,
        }
    }

    /// Landing page after login
    pub fn home(portal: Portal) -> PageId {
        PageId::for_portal(portal)[0]
    }

    pub fn is_available(self, portal: Portal) -> bool {
        PageId::for_portal(portal).contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageId::Dashboard => "dashboard",
            PageId::Tenants => "tenants",
            PageId::Users => "users",
            PageId::Leads => "leads",
            PageId::AuditLogs => "audit-logs",
            PageId::Settings => "settings",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            PageId::Dashboard => "Dashboard",
            PageId::Tenants => "Tenants",
            PageId::Users => "Users",
            PageId::Leads => "Leads",
            PageId::AuditLogs => "Audit Logs",
            PageId::Settings => "Settings",
        }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageId {
    type Err = ModelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ADMIN_PAGES
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ModelError::UnknownPage(s.to_string()))
    }
}
