//! UI components

pub mod alerts;
pub mod audit;
pub mod form;
pub mod leads;
pub mod login;
pub mod modal;
pub mod nav;
pub mod settings;
pub mod stats;
pub mod tenants;
pub mod users;

pub(crate) const TABLE: &str = "width: 100%; border-collapse: collapse;";
pub(crate) const HEAD_ROW: &str = "border-bottom: 2px solid #dee2e6;";
pub(crate) const ROW: &str = "border-bottom: 1px solid #dee2e6;";
pub(crate) const CELL: &str = "padding: 0.5rem; text-align: left;";
pub(crate) const TOOLBAR: &str =
    "display: flex; gap: 0.5rem; align-items: center; margin-bottom: 1rem;";
