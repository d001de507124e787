//! Open/closed state of modal dialogs

use std::collections::BTreeSet;

pub const TENANT_FORM: &str = "tenant-modal";
pub const USER_FORM: &str = "user-modal";
pub const LEAD_FORM: &str = "lead-modal";
pub const LEAD_DETAIL: &str = "lead-detail-modal";
pub const TOKEN_UPLOAD: &str = "token-modal";
pub const CONFIRM_DELETE: &str = "delete-modal";
pub const CHANGE_PASSWORD: &str = "password-modal";

/// Set of visible modals, keyed by id. A given id is visible at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalSet {
    open: BTreeSet<String>,
}

impl ModalSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the modal was already open
    pub fn open(&mut self, id: &str) -> bool {
        self.open.insert(id.to_string())
    }

    /// Returns false if the modal was not open
    pub fn close(&mut self, id: &str) -> bool {
        self.open.remove(id)
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    pub fn close_all(&mut self) {
        self.open.clear();
    }

    pub fn open_ids(&self) -> impl Iterator<Item = &str> {
        self.open.iter().map(String::as_str)
    }
}
