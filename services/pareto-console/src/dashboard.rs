//! Application state for one operator session.
//!
//! Every screen action goes through here: it issues the request, moves the
//! screen state machine, opens or closes the relevant modal and records the
//! alert the operator sees. Failures are turned into error alerts; an
//! authentication failure additionally drops the session.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use pareto_model::modal::{
    CHANGE_PASSWORD, CONFIRM_DELETE, LEAD_FORM, TENANT_FORM, TOKEN_UPLOAD, USER_FORM,
};
use pareto_model::resource::{deleted_message, saved_message};
use pareto_model::response::ResetTicket;
use pareto_model::{
    filter, validation, AlertQueue, AuditFilter, AuditLog, DashboardStats, Lead, LeadBreakdown,
    LeadDraft, LeadFilter, LeadStats, ListQuery, ModalSet, Mode, PageId, Portal, Resource, ScreenEvent,
    ScreenState, Session, SessionStore, Tenant, TenantDraft, Theme, User, UserDraft,
};

use crate::error::{ConsoleError, Result};
use crate::resource::ResourceController;
use crate::session::SessionManager;

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

pub struct Dashboard<S: SessionStore> {
    sessions: SessionManager<S>,
    alerts: AlertQueue,
    modals: ModalSet,
    screen: ScreenState,
    page: Option<PageId>,
    stats: Option<DashboardStats>,
    tenants: ResourceController<Tenant>,
    tenant_names: BTreeMap<i64, String>,
    users: ResourceController<User>,
    leads: ResourceController<Lead>,
    lead_filter: LeadFilter,
    lead_stats: Option<LeadStats>,
    lead_breakdown: Option<LeadBreakdown>,
    audit_logs: Vec<AuditLog>,
    audit_filter: AuditFilter,
    clock: Clock,
}

impl<S: SessionStore> Dashboard<S> {
    pub fn new(sessions: SessionManager<S>, alert_ttl_ms: u64) -> Self {
        let portal = sessions.portal();
        Self {
            sessions,
            alerts: AlertQueue::new(alert_ttl_ms),
            modals: ModalSet::new(),
            screen: ScreenState::default(),
            page: None,
            stats: None,
            tenants: ResourceController::new(portal),
            tenant_names: BTreeMap::new(),
            users: ResourceController::new(portal),
            leads: ResourceController::new(portal),
            lead_filter: LeadFilter::default(),
            lead_stats: None,
            lead_breakdown: None,
            audit_logs: Vec::new(),
            audit_filter: AuditFilter::default(),
            clock: Arc::new(current_epoch_ms),
        }
    }

    /// Replace the wall clock used to stamp and expire alerts
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now_ms(&self) -> u64 {
        (self.clock)()
    }

    pub fn portal(&self) -> Portal {
        self.sessions.portal()
    }

    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.session()
    }

    pub fn screen(&self) -> ScreenState {
        self.screen
    }

    pub fn page(&self) -> Option<PageId> {
        self.page
    }

    pub fn modals(&self) -> &ModalSet {
        &self.modals
    }

    pub fn alerts(&self) -> &AlertQueue {
        &self.alerts
    }

    /// Drop alerts whose display time has passed
    pub fn tick(&mut self) -> usize {
        let now = self.now_ms();
        self.alerts.expire(now)
    }

    pub fn dismiss_alert(&mut self, id: u64) -> bool {
        self.alerts.dismiss(id)
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    pub fn tenants(&self) -> &[Tenant] {
        self.tenants.rows()
    }

    /// Company name for a tenant id, from the cached tenant list
    pub fn tenant_name(&self, tenant_id: i64) -> Option<&str> {
        self.tenant_names.get(&tenant_id).map(String::as_str)
    }

    pub fn users(&self) -> &[User] {
        self.users.rows()
    }

    pub fn users_for_tenant(&self, tenant_id: i64) -> Vec<&User> {
        self.users
            .rows()
            .iter()
            .filter(|user| user.tenant_id == tenant_id)
            .collect()
    }

    /// Leads after the client-side search and "my leads" filters
    pub fn leads(&self) -> Vec<&Lead> {
        let rows: Vec<&Lead> = match self.my_user_id() {
            Some(user_id) if self.lead_filter.my_leads => {
                filter::my_leads(self.leads.rows(), user_id)
            }
            _ => self.leads.rows().iter().collect(),
        };
        rows.into_iter()
            .filter(|lead| pareto_model::Searchable::matches(*lead, &self.lead_filter.search))
            .collect()
    }

    pub fn lead_stats(&self) -> Option<&LeadStats> {
        self.lead_stats.as_ref()
    }

    pub fn audit_logs(&self) -> Vec<&AuditLog> {
        filter::search(&self.audit_logs, &self.audit_filter.search)
    }

    pub fn theme(&self) -> Theme {
        self.sessions.store().theme()
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.theme().toggled();
        self.sessions.store_mut().store_theme(theme);
        theme
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.sessions.store_mut().store_theme(theme);
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Restore a stored session. A token the server no longer accepts is
    /// dropped without an alert and the login view is shown.
    pub async fn start(&mut self) -> Option<Session> {
        match self.sessions.validate().await {
            Some(session) => {
                self.transition(ScreenEvent::AuthSucceeded);
                self.page = Some(PageId::home(self.portal()));
                Some(session)
            }
            None => {
                self.transition(ScreenEvent::LoggedOut);
                self.page = None;
                None
            }
        }
    }

    pub async fn login(&mut self, login: &str, password: &str) -> Result<Session> {
        self.transition(ScreenEvent::LoginSubmitted);
        match self.sessions.login(login, password).await {
            Ok(session) => {
                self.transition(ScreenEvent::AuthSucceeded);
                self.page = Some(PageId::home(self.portal()));
                let now = self.now_ms();
                self.alerts.success(
                    format!("Welcome, {}", session.identity.display_name()),
                    now,
                );
                Ok(session)
            }
            Err(e) => {
                self.transition(ScreenEvent::AuthFailed);
                let now = self.now_ms();
                self.alerts.error(e.user_message(), now);
                Err(e)
            }
        }
    }

    pub async fn logout(&mut self) {
        self.sessions.logout().await;
        self.clear_view();
        let now = self.now_ms();
        self.alerts.info("Logged out", now);
    }

    pub async fn setup_password(&mut self, email: &str, password: &str, confirm: &str) -> Result<String> {
        let outcome = self.sessions.setup_password(email, password, confirm).await;
        self.announce(outcome, |message| message.clone())
    }

    pub async fn request_password_reset(&mut self, email: &str) -> Result<ResetTicket> {
        let outcome = self.sessions.request_password_reset(email).await;
        self.announce(outcome, |ticket| ticket.message.clone())
    }

    pub async fn reset_password(&mut self, reset_token: &str, new: &str, confirm: &str) -> Result<String> {
        let outcome = self.sessions.reset_password(reset_token, new, confirm).await;
        self.announce(outcome, |message| message.clone())
    }

    pub async fn change_password(&mut self, current: &str, new: &str, confirm: &str) -> Result<String> {
        self.modals.open(CHANGE_PASSWORD);
        let outcome = self.sessions.change_password(current, new, confirm).await;
        match outcome {
            Ok(message) => {
                self.modals.close(CHANGE_PASSWORD);
                let now = self.now_ms();
                self.alerts.success(message.clone(), now);
                Ok(message)
            }
            Err(e @ ConsoleError::NotAuthenticated) => Err(self.fail(e)),
            // A 401 here means the current password was wrong, not that
            // the session is gone.
            Err(e) => Err(self.fail_request(e)),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Show a page and load whatever it displays
    pub async fn open_page(&mut self, page: PageId) -> Result<()> {
        if !page.is_available(self.portal()) {
            let now = self.now_ms();
            self.alerts
                .warning(format!("{} is not available here", page.title()), now);
            return Err(ConsoleError::Unsupported("page not available for this portal"));
        }
        self.modals.close_all();
        if let Some(mode) = self.screen.mode().filter(|m| *m != Mode::List) {
            tracing::debug!("Leaving {:?} to open {}", mode, page);
            self.transition(ScreenEvent::Cancelled);
        }
        self.page = Some(page);

        match page {
            PageId::Dashboard => self.load_stats().await.map(|_| ()),
            PageId::Tenants => self.load_tenants("").await.map(|_| ()),
            PageId::Users => self.load_users("").await.map(|_| ()),
            PageId::Leads => {
                let filter = self.lead_filter.clone();
                self.load_leads(filter).await.map(|_| ())
            }
            PageId::AuditLogs => {
                let filter = self.audit_filter.clone();
                self.load_audit_logs(filter).await.map(|_| ())
            }
            PageId::Settings => Ok(()),
        }
    }

    pub async fn load_stats(&mut self) -> Result<&DashboardStats> {
        let token = self.token()?;
        let outcome = self
            .sessions
            .api()
            .dashboard_stats(&token)
            .await
            .map_err(ConsoleError::from);
        let stats = self.check(outcome)?;
        Ok(&*self.stats.insert(stats))
    }

    // ------------------------------------------------------------------
    // Tenants
    // ------------------------------------------------------------------

    pub async fn load_tenants(&mut self, search: &str) -> Result<&[Tenant]> {
        let token = self.token()?;
        let query = ListQuery::new().with("search", search.trim());
        let outcome = self
            .tenants
            .load(self.sessions.api(), &token, query)
            .await
            .map(|_| ());
        self.check(outcome)?;
        self.refresh_tenant_names();
        Ok(self.tenants.rows())
    }

    pub async fn save_tenant(&mut self, id: Option<i64>, draft: &TenantDraft) -> Result<Tenant> {
        let token = self.token()?;
        self.begin(edit_event(id), TENANT_FORM);
        let outcome = self
            .tenants
            .save(self.sessions.api(), &token, id, draft)
            .await;
        let tenant = self.finish(outcome, TENANT_FORM, |t: &Tenant| {
            saved_message(Tenant::LABEL, id, &t.company_name)
        })?;
        self.refresh_tenant_names();
        Ok(tenant)
    }

    pub async fn delete_tenant(&mut self, id: i64) -> Result<()> {
        let token = self.token()?;
        self.begin(ScreenEvent::StartDelete(id), CONFIRM_DELETE);
        let outcome = self.tenants.delete(self.sessions.api(), &token, id).await;
        self.finish(outcome, CONFIRM_DELETE, |_| deleted_message(Tenant::LABEL))?;
        self.refresh_tenant_names();
        self.reload(PageId::Tenants).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// Load users, together with the tenant list used to label them
    pub async fn load_users(&mut self, search: &str) -> Result<Vec<&User>> {
        let token = self.token()?;
        if !self.tenants.is_loaded() {
            let outcome = self
                .tenants
                .load(self.sessions.api(), &token, ListQuery::new())
                .await
                .map(|_| ());
            self.check(outcome)?;
            self.refresh_tenant_names();
        }
        let outcome = self
            .users
            .load(self.sessions.api(), &token, ListQuery::new())
            .await
            .map(|_| ());
        self.check(outcome)?;
        Ok(self.users.search(search))
    }

    pub async fn save_user(&mut self, id: Option<i64>, draft: &UserDraft) -> Result<User> {
        let token = self.token()?;
        self.begin(edit_event(id), USER_FORM);
        let outcome = self.users.save(self.sessions.api(), &token, id, draft).await;
        self.finish(outcome, USER_FORM, |u: &User| {
            saved_message(User::LABEL, id, &u.full_name())
        })
    }

    pub async fn delete_user(&mut self, id: i64) -> Result<()> {
        let token = self.token()?;
        self.begin(ScreenEvent::StartDelete(id), CONFIRM_DELETE);
        let outcome = self.users.delete(self.sessions.api(), &token, id).await;
        self.finish(outcome, CONFIRM_DELETE, |_| deleted_message(User::LABEL))?;
        self.reload(PageId::Users).await;
        Ok(())
    }

    /// Upload the raw contents of a Google token file for a user
    pub async fn upload_token(&mut self, user_id: i64, raw: &str) -> Result<String> {
        let token = self.token()?;
        self.modals.open(TOKEN_UPLOAD);
        let outcome = match validation::token_json(raw) {
            Ok(token_json) => self
                .sessions
                .api()
                .upload_token(&token, user_id, &token_json)
                .await
                .map_err(ConsoleError::from),
            Err(e) => Err(e.into()),
        };
        let message = self.report(outcome, |message| message.clone())?;
        self.modals.close(TOKEN_UPLOAD);
        if self.users.is_loaded() {
            self.reload(PageId::Users).await;
        }
        Ok(message)
    }

    // ------------------------------------------------------------------
    // Leads
    // ------------------------------------------------------------------

    pub async fn load_leads(&mut self, filter: LeadFilter) -> Result<Vec<&Lead>> {
        let token = self.token()?;
        let outcome = self
            .sessions
            .api()
            .leads(self.portal(), &token, &filter)
            .await
            .map_err(ConsoleError::from);
        let page = self.check(outcome)?;
        self.leads.set_rows(page.leads);
        self.lead_stats = page.stats;
        self.lead_filter = filter;
        Ok(self.leads())
    }

    /// Lead counts by status and priority
    pub async fn load_lead_breakdown(&mut self, tenant_id: Option<i64>) -> Result<&LeadBreakdown> {
        let token = self.token()?;
        let outcome = self
            .sessions
            .api()
            .lead_stats(self.portal(), &token, tenant_id)
            .await
            .map_err(ConsoleError::from);
        let breakdown = self.check(outcome)?;
        Ok(self.lead_breakdown.insert(breakdown))
    }

    /// New lead from a free-text message; portal users only
    pub async fn create_lead(&mut self, message: &str) -> Result<Lead> {
        if self.portal() != Portal::User {
            return Err(ConsoleError::Unsupported(
                "Leads are created from the user portal",
            ));
        }
        let token = self.token()?;
        self.begin(ScreenEvent::StartCreate, LEAD_FORM);
        let draft = LeadDraft::from_message(message.trim());
        let outcome = self.leads.save(self.sessions.api(), &token, None, &draft).await;
        self.finish(outcome, LEAD_FORM, |_| "Lead created".to_string())
    }

    pub async fn update_lead(&mut self, id: i64, draft: &LeadDraft) -> Result<Lead> {
        let token = self.token()?;
        self.begin(ScreenEvent::StartEdit(id), LEAD_FORM);
        let outcome = self
            .leads
            .save(self.sessions.api(), &token, Some(id), draft)
            .await;
        self.finish(outcome, LEAD_FORM, |_| "Lead updated".to_string())
    }

    pub async fn delete_lead(&mut self, id: i64) -> Result<()> {
        let token = self.token()?;
        self.begin(ScreenEvent::StartDelete(id), CONFIRM_DELETE);
        let outcome = self.leads.delete(self.sessions.api(), &token, id).await;
        self.finish(outcome, CONFIRM_DELETE, |_| deleted_message(Lead::LABEL))?;
        self.reload(PageId::Leads).await;
        Ok(())
    }

    pub async fn show_lead(&mut self, id: i64) -> Result<Lead> {
        let token = self.token()?;
        let outcome = self.leads.get(self.sessions.api(), &token, id).await;
        let lead = self.check(outcome)?;
        self.modals.open(pareto_model::modal::LEAD_DETAIL);
        Ok(lead)
    }

    // ------------------------------------------------------------------
    // Audit logs
    // ------------------------------------------------------------------

    pub async fn load_audit_logs(&mut self, filter: AuditFilter) -> Result<Vec<&AuditLog>> {
        let token = self.token()?;
        let outcome = self
            .sessions
            .api()
            .audit_logs(&token, &filter)
            .await
            .map_err(ConsoleError::from);
        self.audit_logs = self.check(outcome)?;
        self.audit_filter = filter;
        Ok(self.audit_logs())
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    fn token(&mut self) -> Result<String> {
        match self.sessions.require_token() {
            Ok(token) => Ok(token),
            Err(e) => {
                self.transition(ScreenEvent::LoggedOut);
                Err(e)
            }
        }
    }

    fn my_user_id(&self) -> Option<i64> {
        self.sessions
            .session()
            .map(|s| s.identity.clone())
            .or_else(|| self.sessions.cached_identity())
            .and_then(|identity| identity.user_id())
    }

    fn transition(&mut self, event: ScreenEvent) {
        if let Err(e) = self.screen.apply(event) {
            tracing::debug!("Ignoring screen event: {}", e);
        }
    }

    /// Enter a create/edit/delete mode, abandoning any unfinished one
    fn begin(&mut self, event: ScreenEvent, modal: &str) {
        if self
            .screen
            .mode()
            .is_some_and(|mode| mode != Mode::List)
        {
            self.transition(ScreenEvent::Cancelled);
        }
        self.transition(event);
        self.modals.open(modal);
    }

    /// Close out a mutation: success alert and back to the list, or the
    /// usual failure handling with the modal left open
    fn finish<T>(
        &mut self,
        outcome: Result<T>,
        modal: &str,
        message: impl FnOnce(&T) -> String,
    ) -> Result<T> {
        match outcome {
            Ok(value) => {
                self.transition(ScreenEvent::Completed);
                self.modals.close(modal);
                let now = self.now_ms();
                self.alerts.success(message(&value), now);
                Ok(value)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Outcome of a request outside the create/edit/delete modes
    fn check<T>(&mut self, outcome: Result<T>) -> Result<T> {
        outcome.map_err(|e| self.fail(e))
    }

    fn report<T>(&mut self, outcome: Result<T>, message: impl FnOnce(&T) -> String) -> Result<T> {
        let value = self.check(outcome)?;
        let now = self.now_ms();
        self.alerts.success(message(&value), now);
        Ok(value)
    }

    fn fail(&mut self, error: ConsoleError) -> ConsoleError {
        let now = self.now_ms();
        if error.is_auth_failure() {
            tracing::info!("Session rejected by server: {}", error);
            self.sessions.forget();
            self.clear_view();
            self.transition(ScreenEvent::AuthFailed);
        } else if matches!(error, ConsoleError::Request(_)) {
            tracing::warn!("Request failed: {}", error);
            self.transition(ScreenEvent::RequestFailed);
        }
        self.alerts.error(error.user_message(), now);
        error
    }

    /// Like `report`, for requests made without a session
    fn announce<T>(&mut self, outcome: Result<T>, message: impl FnOnce(&T) -> String) -> Result<T> {
        let value = outcome.map_err(|e| self.fail_request(e))?;
        let now = self.now_ms();
        self.alerts.success(message(&value), now);
        Ok(value)
    }

    /// Report a failure that leaves the session alone
    fn fail_request(&mut self, error: ConsoleError) -> ConsoleError {
        tracing::warn!("Request failed: {}", error);
        let now = self.now_ms();
        self.alerts.error(error.user_message(), now);
        error
    }

    /// Refresh a list after a mutation. A failure here has already been
    /// reported through `check`.
    async fn reload(&mut self, page: PageId) {
        let Ok(token) = self.sessions.require_token() else {
            return;
        };
        let outcome = match page {
            PageId::Tenants => self
                .tenants
                .reload(self.sessions.api(), &token)
                .await
                .map(|_| ()),
            PageId::Users => self
                .users
                .reload(self.sessions.api(), &token)
                .await
                .map(|_| ()),
            PageId::Leads => {
                let filter = self.lead_filter.clone();
                match self.sessions.api().leads(self.portal(), &token, &filter).await {
                    Ok(page) => {
                        self.leads.set_rows(page.leads);
                        self.lead_stats = page.stats;
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                }
            }
            PageId::Dashboard | PageId::AuditLogs | PageId::Settings => Ok(()),
        };
        if self.check(outcome).is_ok() && page == PageId::Tenants {
            self.refresh_tenant_names();
        }
    }

    fn refresh_tenant_names(&mut self) {
        self.tenant_names = self
            .tenants
            .rows()
            .iter()
            .map(|t| (t.id, t.company_name.clone()))
            .collect();
    }

    fn clear_view(&mut self) {
        let portal = self.portal();
        self.modals.close_all();
        self.page = None;
        self.stats = None;
        self.tenants = ResourceController::new(portal);
        self.tenant_names.clear();
        self.users = ResourceController::new(portal);
        self.leads = ResourceController::new(portal);
        self.lead_stats = None;
        self.lead_breakdown = None;
        self.audit_logs.clear();
        self.transition(ScreenEvent::LoggedOut);
    }
}

fn edit_event(id: Option<i64>) -> ScreenEvent {
    match id {
        Some(id) => ScreenEvent::StartEdit(id),
        None => ScreenEvent::StartCreate,
    }
}

fn current_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
