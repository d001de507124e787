//! Pareto dashboard model
//!
//! Types and view state shared by the terminal console and the browser
//! dashboard. Nothing in this crate performs I/O; transports feed raw
//! responses in and render whatever state comes out.

pub mod alerts;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod filter;
pub mod modal;
pub mod pages;
pub mod payload;
pub mod resource;
pub mod response;
pub mod screen;
pub mod session;
pub mod validation;

pub use alerts::{Alert, AlertQueue, Severity, ALERT_TTL_MS};
pub use endpoints::{ListQuery, Portal};
pub use entities::{
    AdminIdentity, AuditFilter, AuditLog, DashboardStats, Lead, LeadBreakdown, LeadDraft,
    LeadFilter, LeadList,
    LeadPriority, LeadStats, LeadStatus, PortalUser, Tenant, TenantDraft, TokenInfo, User,
    UserDraft,
};
pub use error::{ModelError, RequestError, Result, ValidationError};
pub use filter::Searchable;
pub use modal::ModalSet;
pub use pages::PageId;
pub use resource::Resource;
pub use screen::{Mode, ScreenEvent, ScreenState};
pub use session::{Identity, MemoryStore, Session, SessionStore, Theme};
