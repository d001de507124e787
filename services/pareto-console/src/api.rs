//! Typed client for the Pareto REST API

use std::sync::Arc;

use pareto_model::endpoints::{self, ListQuery};
use pareto_model::payload;
use pareto_model::response::{self, classify, ResetTicket};
use pareto_model::{
    AuditFilter, AuditLog, DashboardStats, LeadBreakdown, LeadDraft, LeadFilter, LeadList, Portal,
    RequestError, Resource, TokenInfo,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::io::HttpClient;

/// Successful login: the token to persist plus who it belongs to
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub token: String,
    pub identity: pareto_model::Identity,
}

/// Result of a login attempt the server answered
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Granted(LoginGrant),
    /// Portal account exists but has never had a password set
    NeedsPasswordSetup(String),
}

/// Client for every endpoint the dashboard consumes.
///
/// Methods return the raw [`RequestError`] taxonomy; deciding what a failure
/// means for the session is the caller's job.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

type ApiResult<T> = std::result::Result<T, RequestError>;

impl ApiClient {
    pub fn new(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::debug!("Created ApiClient for {}", base_url);
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> ApiResult<Value> {
        let response = self.http.get(&self.url(path), token).await?;
        classify(response.status, &response.body)
    }

    async fn post<B: Serialize>(&self, path: &str, token: Option<&str>, body: &B) -> ApiResult<Value> {
        let body = to_body(body)?;
        let response = self.http.post_json(&self.url(path), token, &body).await?;
        classify(response.status, &response.body)
    }

    async fn put<B: Serialize>(&self, path: &str, token: Option<&str>, body: &B) -> ApiResult<Value> {
        let body = to_body(body)?;
        let response = self.http.put_json(&self.url(path), token, &body).await?;
        classify(response.status, &response.body)
    }

    async fn delete(&self, path: &str, token: Option<&str>) -> ApiResult<Value> {
        let response = self.http.delete(&self.url(path), token).await?;
        classify(response.status, &response.body)
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Log in through the given portal. Admins log in by username, portal
    /// users by email.
    pub async fn login(
        &self,
        portal: Portal,
        login: &str,
        password: &str,
    ) -> ApiResult<LoginOutcome> {
        let body = payload::login(portal, login, password);
        let response = self
            .http
            .post_json(&self.url(&portal.login_path()), None, &body)
            .await?;
        let value = match classify(response.status, &response.body) {
            Ok(value) => value,
            Err(e) if portal == Portal::User && response::needs_password_setup(&response.body) => {
                return Ok(LoginOutcome::NeedsPasswordSetup(e.user_message()));
            }
            Err(e) => return Err(e),
        };
        let (token, identity) = response::login_grant(portal, &value)?;
        Ok(LoginOutcome::Granted(LoginGrant { token, identity }))
    }

    /// Check a stored token and return whose it is
    pub async fn validate(&self, portal: Portal, token: &str) -> ApiResult<pareto_model::Identity> {
        let value = self.get(&portal.validate_path(), Some(token)).await?;
        response::identity(portal, &value)
    }

    pub async fn logout(&self, portal: Portal, token: &str) -> ApiResult<()> {
        self.post(&portal.logout_path(), Some(token), &json!({}))
            .await?;
        Ok(())
    }

    pub async fn change_password(
        &self,
        portal: Portal,
        token: &str,
        old_password: &str,
        new_password: &str,
    ) -> ApiResult<String> {
        let body = payload::change_password(portal, old_password, new_password);
        let value = self
            .post(&portal.change_password_path(), Some(token), &body)
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Password changed".to_string()))
    }

    /// First-time password for a portal user; no session required
    pub async fn setup_password(&self, email: &str, password: &str) -> ApiResult<String> {
        let body = payload::setup_password(email, password);
        let value = self
            .post(&endpoints::setup_password_path(), None, &body)
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Password set".to_string()))
    }

    /// Ask for a reset token to be sent to a portal user's e-mail
    pub async fn request_password_reset(&self, email: &str) -> ApiResult<ResetTicket> {
        let value = self
            .post(&endpoints::request_reset_path(), None, &payload::request_reset(email))
            .await?;
        Ok(response::reset_ticket(&value))
    }

    pub async fn reset_password(&self, reset_token: &str, new: &str) -> ApiResult<String> {
        let body = payload::reset_password(reset_token, new);
        let value = self
            .post(&endpoints::reset_password_path(), None, &body)
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Password reset".to_string()))
    }

    // ------------------------------------------------------------------
    // Admin overview
    // ------------------------------------------------------------------

    pub async fn dashboard_stats(&self, token: &str) -> ApiResult<DashboardStats> {
        let value = self.get(&endpoints::dashboard_path(), Some(token)).await?;
        response::statistics(&value)
    }

    // ------------------------------------------------------------------
    // Generic resource CRUD
    // ------------------------------------------------------------------

    pub async fn list<R: Resource>(
        &self,
        portal: Portal,
        token: &str,
        query: &ListQuery,
    ) -> ApiResult<Vec<R>> {
        let path = query.apply(&R::collection_path(portal));
        let value = self.get(&path, Some(token)).await?;
        response::first_field(&value, R::LIST_KEYS)
    }

    pub async fn fetch<R: Resource>(&self, portal: Portal, token: &str, id: i64) -> ApiResult<R> {
        let value = self.get(&R::item_path(portal, id), Some(token)).await?;
        response::first_field(&value, R::ITEM_KEYS)
    }

    pub async fn create<R: Resource>(
        &self,
        portal: Portal,
        token: &str,
        draft: &R::Draft,
    ) -> ApiResult<R> {
        let value = self
            .post(&R::collection_path(portal), Some(token), draft)
            .await?;
        response::first_field(&value, R::ITEM_KEYS)
    }

    pub async fn update<R: Resource>(
        &self,
        portal: Portal,
        token: &str,
        id: i64,
        draft: &R::Draft,
    ) -> ApiResult<R> {
        let value = self.put(&R::item_path(portal, id), Some(token), draft).await?;
        response::first_field(&value, R::ITEM_KEYS)
    }

    pub async fn remove<R: Resource>(&self, portal: Portal, token: &str, id: i64) -> ApiResult<()> {
        self.delete(&R::item_path(portal, id), Some(token)).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entity-specific calls
    // ------------------------------------------------------------------

    /// Leads page including the server's counters
    pub async fn leads(&self, portal: Portal, token: &str, filter: &LeadFilter) -> ApiResult<LeadList> {
        let path = filter.to_query().apply(&portal.leads_path());
        let value = self.get(&path, Some(token)).await?;
        response::lead_list(value)
    }

    /// Lead counts by status and priority. `tenant_id` only narrows the
    /// admin view; portal users always get their own tenant.
    pub async fn lead_stats(
        &self,
        portal: Portal,
        token: &str,
        tenant_id: Option<i64>,
    ) -> ApiResult<LeadBreakdown> {
        let query = match portal {
            Portal::Admin => ListQuery::new().with_opt("tenant_id", tenant_id),
            Portal::User => ListQuery::new(),
        };
        let value = self
            .get(&query.apply(&portal.lead_stats_path()), Some(token))
            .await?;
        response::lead_breakdown(&value)
    }

    /// Portal users create leads from a free-text message
    pub async fn create_lead_from_message(&self, token: &str, message: &str) -> ApiResult<pareto_model::Lead> {
        self.create::<pareto_model::Lead>(Portal::User, token, &LeadDraft::from_message(message))
            .await
    }

    pub async fn audit_logs(&self, token: &str, filter: &AuditFilter) -> ApiResult<Vec<AuditLog>> {
        let path = filter.to_query().apply(&endpoints::audit_logs_path());
        let value = self.get(&path, Some(token)).await?;
        response::audit_logs(&value)
    }

    /// Upload a Google token file for a user
    pub async fn upload_token(&self, token: &str, user_id: i64, token_json: &Value) -> ApiResult<String> {
        let body = payload::token_upload(token_json);
        let value = self
            .post(&endpoints::user_token_path(user_id), Some(token), &body)
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Token uploaded".to_string()))
    }

    pub async fn token_info(&self, token: &str, user_id: i64) -> ApiResult<TokenInfo> {
        let value = self
            .get(&endpoints::user_token_path(user_id), Some(token))
            .await?;
        serde_json::from_value(value).map_err(|e| RequestError::Decode(format!("token info: {e}")))
    }
}

fn to_body<B: Serialize>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| RequestError::Decode(format!("encoding request: {e}")))
}
