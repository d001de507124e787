//! In-process stand-in for the Pareto REST API

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::Mutex;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const ADMIN_TOKEN: &str = "admin-token";

#[derive(Debug, Default)]
pub struct StubState {
    pub tenants: Vec<Value>,
    pub next_tenant_id: i64,
    /// Tokens the stub accepts
    pub valid_tokens: Vec<String>,
    /// Every request seen, as `METHOD path`
    pub requests: Vec<String>,
    /// When set, deletes answer 500
    pub fail_deletes: bool,
    /// Bearer tokens seen, in order
    pub bearer_tokens: Vec<Option<String>>,
    pub uploaded_tokens: Vec<(i64, Value)>,
}

pub type StubHandle = Arc<Mutex<StubState>>;

#[derive(Debug)]
pub struct StubApi {
    pub base_url: String,
    pub state: StubHandle,
}

impl StubApi {
    /// Serve the stub on an ephemeral localhost port
    pub async fn start() -> StubApi {
        let state: StubHandle = Arc::new(Mutex::new(StubState {
            next_tenant_id: 1,
            valid_tokens: vec![ADMIN_TOKEN.to_string()],
            ..StubState::default()
        }));

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind stub api");
        let addr = listener.local_addr().expect("stub api address");
        let router = build_router(Arc::clone(&state));
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        StubApi {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    pub async fn add_tenant(&self, name: &str) -> i64 {
        let mut state = self.state.lock().await;
        let id = state.next_tenant_id;
        state.next_tenant_id += 1;
        state.tenants.push(json!({
            "id": id,
            "company_name": name,
            "is_active": true,
            "user_count": 0
        }));
        id
    }

    pub async fn request_count(&self, method_and_path: &str) -> usize {
        self.state
            .lock()
            .await
            .requests
            .iter()
            .filter(|r| r.as_str() == method_and_path)
            .count()
    }

    pub async fn total_requests(&self) -> usize {
        self.state.lock().await.requests.len()
    }
}

fn build_router(state: StubHandle) -> Router {
    Router::new()
        .route("/api/auth/login", post(admin_login))
        .route("/api/auth/validate", get(admin_validate))
        .route("/api/auth/logout", post(admin_logout))
        .route("/api/user/setup-password", post(setup_password))
        .route("/api/admin/dashboard", get(dashboard))
        .route("/api/admin/tenants", get(list_tenants).post(create_tenant))
        .route(
            "/api/admin/tenants/{id}",
            get(get_tenant).put(update_tenant).delete(delete_tenant),
        )
        .route("/api/admin/users/{id}/token", post(upload_token))
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn record(state: &StubHandle, line: String, headers: &HeaderMap) -> bool {
    let mut state = state.lock().await;
    state.requests.push(line);
    let token = bearer(headers);
    let authorized = token
        .as_ref()
        .is_some_and(|t| state.valid_tokens.contains(t));
    state.bearer_tokens.push(token);
    authorized
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"success": false, "message": "Invalid or expired session"})),
    )
        .into_response()
}

async fn admin_login(
    State(state): State<StubHandle>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST /api/auth/login".to_string(), &headers).await;
    if body["username"] == ADMIN_USERNAME && body["password"] == ADMIN_PASSWORD {
        Json(json!({
            "success": true,
            "session_token": ADMIN_TOKEN,
            "admin": {"id": 1, "username": ADMIN_USERNAME, "full_name": "Stub Admin"}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "message": "Invalid username or password"})),
        )
            .into_response()
    }
}

async fn admin_validate(State(state): State<StubHandle>, headers: HeaderMap) -> Response {
    if !record(&state, "GET /api/auth/validate".to_string(), &headers).await {
        return unauthorized();
    }
    Json(json!({
        "success": true,
        "admin": {"admin_id": 1, "username": ADMIN_USERNAME, "full_name": "Stub Admin"}
    }))
    .into_response()
}

async fn admin_logout(State(state): State<StubHandle>, headers: HeaderMap) -> Response {
    record(&state, "POST /api/auth/logout".to_string(), &headers).await;
    Json(json!({"success": true, "message": "Logged out"})).into_response()
}

async fn setup_password(
    State(state): State<StubHandle>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "POST /api/user/setup-password".to_string(), &headers).await;
    let long_enough = body["password"].as_str().is_some_and(|p| p.len() >= 8);
    if !long_enough {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "message": "Password must be at least 8 characters"})),
        )
            .into_response();
    }
    Json(json!({"success": true, "message": "Password set successfully"})).into_response()
}

async fn dashboard(State(state): State<StubHandle>, headers: HeaderMap) -> Response {
    if !record(&state, "GET /api/admin/dashboard".to_string(), &headers).await {
        return unauthorized();
    }
    let tenants = state.lock().await.tenants.len();
    Json(json!({"success": true, "data": {"statistics": {
        "total_tenants": tenants, "total_users": 0, "active_users": 0, "total_admins": 1
    }}}))
    .into_response()
}

async fn list_tenants(State(state): State<StubHandle>, headers: HeaderMap) -> Response {
    if !record(&state, "GET /api/admin/tenants".to_string(), &headers).await {
        return unauthorized();
    }
    let tenants = state.lock().await.tenants.clone();
    Json(json!({"success": true, "data": tenants})).into_response()
}

async fn get_tenant(
    State(state): State<StubHandle>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !record(&state, format!("GET /api/admin/tenants/{id}"), &headers).await {
        return unauthorized();
    }
    let state = state.lock().await;
    match state.tenants.iter().find(|t| t["id"] == id) {
        Some(tenant) => Json(json!({"success": true, "data": tenant})).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Tenant not found"})),
        )
            .into_response(),
    }
}

async fn create_tenant(
    State(state): State<StubHandle>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !record(&state, "POST /api/admin/tenants".to_string(), &headers).await {
        return unauthorized();
    }
    let mut state = state.lock().await;
    let id = state.next_tenant_id;
    state.next_tenant_id += 1;
    let tenant = json!({
        "id": id,
        "company_name": body["company_name"],
        "email": body["email"],
        "is_active": body["is_active"].as_bool().unwrap_or(true),
        "user_count": 0
    });
    state.tenants.push(tenant.clone());
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "message": "Tenant created", "data": tenant})),
    )
        .into_response()
}

async fn update_tenant(
    State(state): State<StubHandle>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !record(&state, format!("PUT /api/admin/tenants/{id}"), &headers).await {
        return unauthorized();
    }
    let mut state = state.lock().await;
    match state.tenants.iter_mut().find(|t| t["id"] == id) {
        Some(tenant) => {
            tenant["company_name"] = body["company_name"].clone();
            tenant["is_active"] = body["is_active"].clone();
            Json(json!({"success": true, "data": tenant.clone()})).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Tenant not found"})),
        )
            .into_response(),
    }
}

async fn delete_tenant(
    State(state): State<StubHandle>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if !record(&state, format!("DELETE /api/admin/tenants/{id}"), &headers).await {
        return unauthorized();
    }
    let mut state = state.lock().await;
    if state.fail_deletes {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "message": "Failed to delete tenant"})),
        )
            .into_response();
    }
    let before = state.tenants.len();
    state.tenants.retain(|t| t["id"] != id);
    if state.tenants.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "message": "Tenant not found"})),
        )
            .into_response();
    }
    Json(json!({"success": true, "message": "Tenant deleted"})).into_response()
}

async fn upload_token(
    State(state): State<StubHandle>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !record(&state, format!("POST /api/admin/users/{id}/token"), &headers).await {
        return unauthorized();
    }
    state
        .lock()
        .await
        .uploaded_tokens
        .push((id, body["token_json"].clone()));
    Json(json!({"success": true, "message": "Token uploaded successfully"})).into_response()
}
