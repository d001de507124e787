//! Browser transport for the Pareto API
//!
//! Requests go out through `gloo-net`. Every response is run through the
//! shared classifier, so the browser and the console agree on what counts
//! as a failure.

use pareto_model::endpoints::{self, ListQuery};
use pareto_model::response::ResetTicket;
use pareto_model::{payload, response};
use pareto_model::{
    AuditFilter, AuditLog, DashboardStats, Identity, Lead, LeadBreakdown, LeadDraft, LeadFilter,
    LeadList, Portal, RequestError, Resource, Session,
};
use serde::Serialize;
use serde_json::{json, Value};

pub type ApiResult<T> = Result<T, RequestError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

/// Result of a login attempt the server answered
#[derive(Debug, Clone, PartialEq)]
pub enum LoginReply {
    Granted(Session),
    /// Portal account without a password yet
    NeedsPasswordSetup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Api {
    base_url: String,
}

impl Api {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// API served by the same origin as the page
    pub fn same_origin() -> Self {
        Self::new(&transport::origin())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> ApiResult<Value> {
        let (status, text) = transport::send(method, &self.url(path), token, body.as_ref()).await?;
        response::classify(status, &text)
    }

    pub async fn login(&self, portal: Portal, login: &str, password: &str) -> ApiResult<LoginReply> {
        let body = payload::login(portal, login, password);
        let (status, text) =
            transport::send(Method::Post, &self.url(&portal.login_path()), None, Some(&body))
                .await?;
        login_reply(portal, status, &text)
    }

    pub async fn validate(&self, portal: Portal, token: &str) -> ApiResult<Identity> {
        let value = self
            .call(Method::Get, &portal.validate_path(), Some(token), None)
            .await?;
        response::identity(portal, &value)
    }

    pub async fn logout(&self, portal: Portal, token: &str) -> ApiResult<()> {
        self.call(Method::Post, &portal.logout_path(), Some(token), Some(json!({})))
            .await
            .map(|_| ())
    }

    pub async fn setup_password(&self, email: &str, password: &str) -> ApiResult<String> {
        let body = payload::setup_password(email, password);
        let value = self
            .call(Method::Post, &endpoints::setup_password_path(), None, Some(body))
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Password set".to_string()))
    }

    pub async fn request_password_reset(&self, email: &str) -> ApiResult<ResetTicket> {
        let body = payload::request_reset(email);
        let value = self
            .call(Method::Post, &endpoints::request_reset_path(), None, Some(body))
            .await?;
        Ok(response::reset_ticket(&value))
    }

    pub async fn reset_password(&self, reset_token: &str, new: &str) -> ApiResult<String> {
        let body = payload::reset_password(reset_token, new);
        let value = self
            .call(Method::Post, &endpoints::reset_password_path(), None, Some(body))
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Password reset".to_string()))
    }

    pub async fn change_password(
        &self,
        portal: Portal,
        token: &str,
        current: &str,
        new: &str,
    ) -> ApiResult<String> {
        let body = payload::change_password(portal, current, new);
        let value = self
            .call(Method::Post, &portal.change_password_path(), Some(token), Some(body))
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Password changed".to_string()))
    }

    pub async fn dashboard_stats(&self, token: &str) -> ApiResult<DashboardStats> {
        let value = self
            .call(Method::Get, &endpoints::dashboard_path(), Some(token), None)
            .await?;
        response::statistics(&value)
    }

    pub async fn list<R: Resource>(
        &self,
        portal: Portal,
        token: &str,
        query: &ListQuery,
    ) -> ApiResult<Vec<R>> {
        let path = query.apply(&R::collection_path(portal));
        let value = self.call(Method::Get, &path, Some(token), None).await?;
        response::first_field(&value, R::LIST_KEYS)
    }

    /// Create when `id` is `None`, otherwise update
    pub async fn save<R: Resource>(
        &self,
        portal: Portal,
        token: &str,
        id: Option<i64>,
        draft: &R::Draft,
    ) -> ApiResult<R> {
        let body = Some(to_body(draft)?);
        let value = match id {
            None => {
                self.call(Method::Post, &R::collection_path(portal), Some(token), body)
                    .await?
            }
            Some(id) => {
                self.call(Method::Put, &R::item_path(portal, id), Some(token), body)
                    .await?
            }
        };
        response::first_field(&value, R::ITEM_KEYS)
    }

    pub async fn remove<R: Resource>(&self, portal: Portal, token: &str, id: i64) -> ApiResult<()> {
        self.call(Method::Delete, &R::item_path(portal, id), Some(token), None)
            .await
            .map(|_| ())
    }

    pub async fn leads(&self, portal: Portal, token: &str, filter: &LeadFilter) -> ApiResult<LeadList> {
        let path = filter.to_query().apply(&portal.leads_path());
        let value = self.call(Method::Get, &path, Some(token), None).await?;
        response::lead_list(value)
    }

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
            .call(Method::Get, &query.apply(&portal.lead_stats_path()), Some(token), None)
            .await?;
        response::lead_breakdown(&value)
    }

    pub async fn create_lead_from_message(&self, token: &str, message: &str) -> ApiResult<Lead> {
        self.save::<Lead>(Portal::User, token, None, &LeadDraft::from_message(message))
            .await
    }

    pub async fn audit_logs(&self, token: &str, filter: &AuditFilter) -> ApiResult<Vec<AuditLog>> {
        let path = filter.to_query().apply(&endpoints::audit_logs_path());
        let value = self.call(Method::Get, &path, Some(token), None).await?;
        response::audit_logs(&value)
    }

    pub async fn upload_token(&self, token: &str, user_id: i64, token_json: &Value) -> ApiResult<String> {
        let body = payload::token_upload(token_json);
        let value = self
            .call(Method::Post, &endpoints::user_token_path(user_id), Some(token), Some(body))
            .await?;
        Ok(response::message_of(&value).unwrap_or_else(|| "Token uploaded".to_string()))
    }
}

fn to_body<B: Serialize>(body: &B) -> ApiResult<Value> {
    serde_json::to_value(body).map_err(|e| RequestError::Decode(format!("encoding request: {e}")))
}

/// Interpret the answer to a login request
fn login_reply(portal: Portal, status: u16, text: &str) -> ApiResult<LoginReply> {
    match response::classify(status, text) {
        Ok(value) => {
            let (token, identity) = response::login_grant(portal, &value)?;
            Ok(LoginReply::Granted(Session { token, identity }))
        }
        Err(e) if portal == Portal::User && response::needs_password_setup(text) => {
            Ok(LoginReply::NeedsPasswordSetup(e.user_message()))
        }
        Err(e) => Err(e),
    }
}

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
mod transport {
    use gloo_net::http::Request;
    use pareto_model::RequestError;
    use serde_json::Value;

    use super::{ApiResult, Method};

    fn network(e: gloo_net::Error) -> RequestError {
        RequestError::Network(e.to_string())
    }

    pub async fn send(
        method: Method,
        url: &str,
        token: Option<&str>,
        body: Option<&Value>,
    ) -> ApiResult<(u16, String)> {
        let builder = match method {
            Method::Get => Request::get(url),
            Method::Post => Request::post(url),
            Method::Put => Request::put(url),
            Method::Delete => Request::delete(url),
        };
        let builder = match token {
            Some(token) => builder.header("Authorization", &format!("Bearer {token}")),
            None => builder,
        };
        let request = match body {
            Some(body) => builder.json(body).map_err(network)?,
            None => builder.build().map_err(network)?,
        };
        tracing::debug!("{:?} {}", method, url);
        let response = request.send().await.map_err(network)?;
        let status = response.status();
        let text = response.text().await.map_err(network)?;
        Ok((status, text))
    }

    pub fn origin() -> String {
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_default()
    }
}

#[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
mod transport {
    use pareto_model::RequestError;
    use serde_json::Value;

    use super::{ApiResult, Method};

    pub async fn send(
        method: Method,
        url: &str,
        _token: Option<&str>,
        _body: Option<&Value>,
    ) -> ApiResult<(u16, String)> {
        Err(RequestError::Network(format!(
            "no browser transport for {method:?} {url}"
        )))
    }

    pub fn origin() -> String {
        String::new()
    }
}
