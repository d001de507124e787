//! Reactive application state shared by every component.
//!
//! `AppContext` is a bundle of signals provided at the root. It owns the
//! session token, the screen state machine, alerts, modals and the cached
//! tenant list; components read it with `expect_context`.

use std::future::Future;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use pareto_model::{
    validation, AlertQueue, ModalSet, Mode, PageId, Portal, RequestError, ScreenEvent, ScreenState,
    Session, SessionStore, Severity, Tenant, Theme, ValidationError, ALERT_TTL_MS,
};

use pareto_model::response::ResetTicket;

use crate::api::{Api, LoginReply};
use crate::storage::LocalStore;

/// Where the password reset form is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetStep {
    /// Asking for the account's e-mail
    Request,
    /// Waiting for the token from the e-mail, prefilled when the server
    /// handed it back directly
    Confirm(String),
}

impl ResetStep {
    pub fn after_request(ticket: &ResetTicket) -> Self {
        ResetStep::Confirm(ticket.token.clone().unwrap_or_default())
    }
}

/// Portal served at a given page path; the user portal lives under `/portal`
pub fn portal_for_path(path: &str) -> Portal {
    if path.trim_start_matches('/').starts_with("portal") {
        Portal::User
    } else {
        Portal::Admin
    }
}

#[derive(Clone, Copy)]
pub struct AppContext {
    pub portal: Portal,
    api: StoredValue<Api>,
    store: StoredValue<LocalStore, LocalStorage>,
    pub session: RwSignal<Option<Session>>,
    pub screen: RwSignal<ScreenState>,
    pub page: RwSignal<PageId>,
    pub alerts: RwSignal<AlertQueue>,
    pub modals: RwSignal<ModalSet>,
    pub theme: RwSignal<Theme>,
    /// Set while the password setup form is shown, prefilled after a portal
    /// login without a password
    pub setup_email: RwSignal<Option<String>>,
    /// Set while the password reset forms are shown
    pub reset: RwSignal<Option<ResetStep>>,
    /// Cached for labelling users by company
    pub tenants: RwSignal<Vec<Tenant>>,
}

impl AppContext {
    pub fn new(api: Api, portal: Portal) -> Self {
        let store = LocalStore::open();
        let theme = store.theme();
        Self {
            portal,
            api: StoredValue::new(api),
            store: StoredValue::new_local(store),
            session: RwSignal::new(None),
            screen: RwSignal::new(ScreenState::default()),
            page: RwSignal::new(PageId::home(portal)),
            alerts: RwSignal::new(AlertQueue::new(ALERT_TTL_MS)),
            modals: RwSignal::new(ModalSet::new()),
            theme: RwSignal::new(theme),
            setup_email: RwSignal::new(None),
            reset: RwSignal::new(None),
            tenants: RwSignal::new(Vec::new()),
        }
    }

    pub fn api(&self) -> Api {
        self.api.get_value()
    }

    pub fn token(&self) -> Option<String> {
        self.store.with_value(|store| store.token(self.portal))
    }

    pub fn tenant_name(&self, tenant_id: i64) -> Option<String> {
        self.tenants.with(|tenants| {
            tenants
                .iter()
                .find(|t| t.id == tenant_id)
                .map(|t| t.company_name.clone())
        })
    }

    pub fn transition(&self, event: ScreenEvent) {
        self.screen.update(|screen| {
            if let Err(e) = screen.apply(event) {
                tracing::debug!("Ignoring screen event: {}", e);
            }
        });
    }

    // ------------------------------------------------------------------
    // Alerts and modals
    // ------------------------------------------------------------------

    pub fn notify(&self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        let now = now_ms();
        self.alerts.update(|alerts| {
            alerts.expire(now);
            alerts.push(severity, message, now);
        });
        let alerts = self.alerts;
        after_ms(ALERT_TTL_MS, move || {
            alerts.update(|alerts| {
                alerts.expire(now_ms());
            });
        });
    }

    pub fn dismiss(&self, id: u64) {
        self.alerts.update(|alerts| {
            alerts.dismiss(id);
        });
    }

    pub fn open_modal(&self, id: &str) {
        self.modals.update(|modals| {
            modals.open(id);
        });
    }

    pub fn close_modal(&self, id: &str) {
        self.modals.update(|modals| {
            modals.close(id);
        });
    }

    pub fn is_open(&self, id: &str) -> bool {
        self.modals.with(|modals| modals.is_open(id))
    }

    /// Enter a create/edit/delete mode and show its dialog
    pub fn begin(&self, event: ScreenEvent, modal: &str) {
        if self.screen.get_untracked().mode().is_some_and(|m| m != Mode::List) {
            self.transition(ScreenEvent::Cancelled);
        }
        self.transition(event);
        self.open_modal(modal);
    }

    /// Close a dialog without saving
    pub fn cancel(&self, modal: &str) {
        self.close_modal(modal);
        self.transition(ScreenEvent::Cancelled);
    }

    /// Surface a failed request. An auth failure ends the session.
    pub fn fail(&self, error: RequestError) {
        if error.is_auth_failure() {
            tracing::info!("Session rejected by server: {}", error);
            self.forget();
            self.transition(ScreenEvent::AuthFailed);
        } else {
            tracing::warn!("Request failed: {}", error);
            self.transition(ScreenEvent::RequestFailed);
        }
        self.notify(Severity::Error, error.user_message());
    }

    /// Surface a failed request without touching the session
    pub fn fail_request(&self, error: RequestError) {
        tracing::warn!("Request failed: {}", error);
        self.notify(Severity::Error, error.user_message());
    }

    pub fn reject(&self, error: ValidationError) {
        self.notify(Severity::Error, error.to_string());
    }

    /// Run a create/update/delete request. On success the dialog closes and
    /// a success alert is shown; on failure the dialog stays open.
    pub async fn mutate<T, F>(
        self,
        modal: &'static str,
        request: F,
        message: impl FnOnce(&T) -> String,
    ) -> Option<T>
    where
        F: Future<Output = Result<T, RequestError>>,
    {
        match request.await {
            Ok(value) => {
                self.transition(ScreenEvent::Completed);
                self.close_modal(modal);
                self.notify(Severity::Success, message(&value));
                Some(value)
            }
            Err(e) => {
                self.fail(e);
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    fn establish(&self, session: Session) {
        self.store
            .update_value(|store| store.store_token(self.portal, &session.token));
        self.session.set(Some(session));
        self.setup_email.set(None);
        self.transition(ScreenEvent::AuthSucceeded);
        self.page.set(PageId::home(self.portal));
    }

    /// Drop the token and everything loaded with it
    pub fn forget(&self) {
        self.store
            .update_value(|store| store.clear_token(self.portal));
        self.session.set(None);
        self.tenants.set(Vec::new());
        self.modals.update(ModalSet::close_all);
        self.transition(ScreenEvent::LoggedOut);
    }

    /// Check a stored token on page load. Any failure logs out silently.
    pub async fn restore(self) {
        let Some(token) = self.token() else {
            self.transition(ScreenEvent::LoggedOut);
            return;
        };
        match self.api().validate(self.portal, &token).await {
            Ok(identity) => self.establish(Session { token, identity }),
            Err(e) => {
                tracing::info!("Stored session rejected: {}", e);
                self.forget();
            }
        }
    }

    pub async fn login(self, login: String, password: String) {
        if let Err(e) = validation::credentials(&login, &password) {
            self.reject(e);
            return;
        }
        self.transition(ScreenEvent::LoginSubmitted);
        match self.api().login(self.portal, &login, &password).await {
            Ok(LoginReply::Granted(session)) => {
                let welcome = format!("Welcome, {}", session.identity.display_name());
                self.establish(session);
                self.notify(Severity::Success, welcome);
            }
            Ok(LoginReply::NeedsPasswordSetup(message)) => {
                self.transition(ScreenEvent::AuthFailed);
                self.setup_email.set(Some(login.trim().to_string()));
                self.notify(Severity::Info, message);
            }
            Err(e) => {
                self.transition(ScreenEvent::AuthFailed);
                self.notify(Severity::Error, e.user_message());
            }
        }
    }

    pub async fn logout(self) {
        if let Some(token) = self.token() {
            if let Err(e) = self.api().logout(self.portal, &token).await {
                tracing::warn!("Logout request failed: {}", e);
            }
        }
        self.forget();
        self.notify(Severity::Info, "Logged out");
    }

    pub async fn setup_password(self, email: String, password: String, confirm: String) {
        if let Err(e) = validation::email(&email).and_then(|_| validation::new_password(&password, &confirm)) {
            self.reject(e);
            return;
        }
        match self.api().setup_password(&email, &password).await {
            Ok(message) => {
                self.setup_email.set(None);
                self.notify(Severity::Success, message);
            }
            Err(e) => self.fail_request(e),
        }
    }

    pub async fn request_reset(self, email: String) {
        if let Err(e) = validation::email(&email) {
            self.reject(e);
            return;
        }
        match self.api().request_password_reset(&email).await {
            Ok(ticket) => {
                self.reset.set(Some(ResetStep::after_request(&ticket)));
                self.notify(Severity::Success, ticket.message);
            }
            Err(e) => self.fail_request(e),
        }
    }

    pub async fn reset_password(self, reset_token: String, new: String, confirm: String) {
        let checked = validation::reset_token(&reset_token)
            .and_then(|_| validation::new_password(&new, &confirm));
        if let Err(e) = checked {
            self.reject(e);
            return;
        }
        match self.api().reset_password(&reset_token, &new).await {
            Ok(message) => {
                self.reset.set(None);
                self.notify(Severity::Success, message);
            }
            Err(e) => self.fail_request(e),
        }
    }

    pub async fn change_password(self, current: String, new: String, confirm: String) {
        if let Err(e) = validation::new_password(&new, &confirm) {
            self.reject(e);
            return;
        }
        let Some(token) = self.token() else {
            self.forget();
            return;
        };
        let request = self
            .api()
            .change_password(self.portal, &token, &current, &new)
            .await;
        match request {
            Ok(message) => {
                self.close_modal(pareto_model::modal::CHANGE_PASSWORD);
                self.notify(Severity::Success, message);
            }
            // A 401 here is a wrong current password
            Err(e) => self.fail_request(e),
        }
    }

    // ------------------------------------------------------------------
    // Navigation and preferences
    // ------------------------------------------------------------------

    pub fn open_page(&self, page: PageId) {
        if !page.is_available(self.portal) {
            self.notify(
                Severity::Warning,
                format!("{} is not available here", page.title()),
            );
            return;
        }
        self.modals.update(ModalSet::close_all);
        if self.screen.get_untracked().mode().is_some_and(|m| m != Mode::List) {
            self.transition(ScreenEvent::Cancelled);
        }
        self.page.set(page);
    }

    pub fn toggle_theme(&self) {
        let theme = self.theme.get_untracked().toggled();
        self.store.update_value(|store| store.store_theme(theme));
        self.theme.set(theme);
    }

    /// Token for an authenticated request, or a logout when there is none
    pub fn require_token(&self) -> Option<String> {
        let token = self.token();
        if token.is_none() {
            self.forget();
        }
        token
    }
}

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
fn after_ms(ms: u64, f: impl FnOnce() + 'static) {
    leptos::leptos_dom::helpers::set_timeout(f, std::time::Duration::from_millis(ms));
}

// Outside the browser alerts are only swept by the next `notify`
#[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
fn after_ms(_ms: u64, _f: impl FnOnce() + 'static) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_is_chosen_by_path() {
        assert_eq!(portal_for_path("/"), Portal::Admin);
        assert_eq!(portal_for_path("/index.html"), Portal::Admin);
        assert_eq!(portal_for_path("/portal"), Portal::User);
        assert_eq!(portal_for_path("/portal/leads"), Portal::User);
    }

    #[test]
    fn reset_confirmation_is_prefilled_only_with_a_returned_token() {
        let mailed = ResetTicket {
            message: "sent".to_string(),
            token: None,
        };
        assert_eq!(ResetStep::after_request(&mailed), ResetStep::Confirm(String::new()));

        let debug = ResetTicket {
            message: "sent".to_string(),
            token: Some("r-1".to_string()),
        };
        assert_eq!(ResetStep::after_request(&debug), ResetStep::Confirm("r-1".to_string()));
    }
}
