//! Session persistence and the login/validate/logout lifecycle

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use pareto_model::response::ResetTicket;
use pareto_model::validation;
use pareto_model::{Identity, Portal, Session, SessionStore};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, LoginOutcome};
use crate::error::{ConsoleError, Result};

const IDENTITY_KEY: &str = "identity";

/// Key/value store persisted as a JSON object on disk.
///
/// Mirrors browser local storage: every write is flushed immediately and a
/// failed write is logged rather than surfaced.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(flatten)]
    entries: BTreeMap<String, String>,
}

impl FileSessionStore {
    /// Open the store at `path`, starting empty when the file is missing
    pub fn open(path: &Path) -> Result<Self> {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => {
                let file: StoreFile = serde_json::from_str(&content).map_err(|e| {
                    ConsoleError::Store(format!("Corrupt session file {:?}: {}", path, e))
                })?;
                file.entries
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!("Opened session store {:?} ({} keys)", path, entries.len());
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) {
        if let Err(e) = self.try_flush() {
            tracing::warn!("Failed to write session file {:?}: {}", self.path, e);
        }
    }

    fn try_flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = StoreFile {
            entries: self.entries.clone(),
        };
        std::fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush();
        }
    }
}

/// Owns the session token for one portal and drives it through the API.
///
/// The token in the store is the single source of truth: it is written on
/// successful login and removed on logout or whenever the server rejects it.
pub struct SessionManager<S: SessionStore> {
    api: ApiClient,
    store: S,
    portal: Portal,
    session: Option<Session>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(api: ApiClient, store: S, portal: Portal) -> Self {
        Self {
            api,
            store,
            portal,
            session: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn portal(&self) -> Portal {
        self.portal
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Token for the active portal, validated or not
    pub fn token(&self) -> Option<String> {
        self.store.token(self.portal)
    }

    /// Token or [`ConsoleError::NotAuthenticated`]
    pub fn require_token(&self) -> Result<String> {
        self.token().ok_or(ConsoleError::NotAuthenticated)
    }

    /// Identity cached from the last login or validation
    pub fn cached_identity(&self) -> Option<Identity> {
        self.store
            .get(IDENTITY_KEY)
            .and_then(|raw| serde_json::from_str::<Identity>(&raw).ok())
            .filter(|identity| identity.portal() == self.portal)
    }

    /// Authenticate with credentials; on success the token is persisted
    pub async fn login(&mut self, login: &str, password: &str) -> Result<Session> {
        validation::credentials(login, password)?;
        let grant = match self.api.login(self.portal, login, password).await? {
            LoginOutcome::Granted(grant) => grant,
            LoginOutcome::NeedsPasswordSetup(message) => {
                tracing::info!("Account {} has no password yet", login.trim());
                return Err(ConsoleError::PasswordSetupRequired(message));
            }
        };
        tracing::info!("Logged in as {}", grant.identity.display_name());

        self.store.store_token(self.portal, &grant.token);
        self.remember(&grant.identity);
        let session = Session {
            token: grant.token,
            identity: grant.identity,
        };
        self.session = Some(session.clone());
        Ok(session)
    }

    /// Check the stored token with the server.
    ///
    /// Returns `None` when there is no token or validation failed for any
    /// reason; a failed check removes the token so the next start shows the
    /// login form instead of looping on a stale session.
    pub async fn validate(&mut self) -> Option<Session> {
        let Some(token) = self.token() else {
            self.session = None;
            return None;
        };

        match self.api.validate(self.portal, &token).await {
            Ok(identity) => {
                self.remember(&identity);
                let session = Session { token, identity };
                self.session = Some(session.clone());
                Some(session)
            }
            Err(e) => {
                tracing::info!("Stored session rejected: {}", e);
                self.forget();
                None
            }
        }
    }

    /// End the session. The server call is best-effort; local state is
    /// always cleared.
    pub async fn logout(&mut self) {
        if let Some(token) = self.token() {
            if let Err(e) = self.api.logout(self.portal, &token).await {
                tracing::warn!("Server logout failed, clearing local session anyway: {}", e);
            }
        }
        self.forget();
        tracing::info!("Logged out");
    }

    /// Drop local session state without contacting the server
    pub fn forget(&mut self) {
        self.store.clear_token(self.portal);
        self.store.remove(IDENTITY_KEY);
        self.session = None;
    }

    /// Set the first password for a portal account. Mismatched or short
    /// passwords are rejected before any request is made.
    pub async fn setup_password(&self, email: &str, password: &str, confirm: &str) -> Result<String> {
        validation::email(email)?;
        validation::new_password(password, confirm)?;
        Ok(self.api.setup_password(email, password).await?)
    }

    pub async fn request_password_reset(&self, email: &str) -> Result<ResetTicket> {
        validation::email(email)?;
        Ok(self.api.request_password_reset(email).await?)
    }

    /// Finish a reset with the token from the reset e-mail. Works without a
    /// session and leaves any stored token alone.
    pub async fn reset_password(&self, reset_token: &str, new: &str, confirm: &str) -> Result<String> {
        validation::reset_token(reset_token)?;
        validation::new_password(new, confirm)?;
        Ok(self.api.reset_password(reset_token, new).await?)
    }

    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<String> {
        validation::new_password(new, confirm)?;
        let token = self.require_token()?;
        Ok(self
            .api
            .change_password(self.portal, &token, current, new)
            .await?)
    }

    fn remember(&mut self, identity: &Identity) {
        match serde_json::to_string(identity) {
            Ok(raw) => self.store.set(IDENTITY_KEY, &raw),
            Err(e) => tracing::warn!("Could not cache identity: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{HttpResponse, MockHttpClient};
    use pareto_model::{MemoryStore, RequestError, ValidationError};
    use serde_json::json;
    use std::sync::Arc;

    fn respond(status: u16, body: serde_json::Value) -> std::result::Result<HttpResponse, RequestError> {
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }

    fn manager(mock: MockHttpClient, store: MemoryStore) -> SessionManager<MemoryStore> {
        let api = ApiClient::new("http://api.test", Arc::new(mock));
        SessionManager::new(api, store, Portal::Admin)
    }

    fn store_with_token(token: &str) -> MemoryStore {
        let mut store = MemoryStore::new();
        store.store_token(Portal::Admin, token);
        store
    }

    #[tokio::test]
    async fn login_persists_token() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().times(1).returning(|_, _, _| {
            Box::pin(async {
                respond(
                    200,
                    json!({"success": true, "session_token": "abc", "admin": {"id": 1, "username": "root"}}),
                )
            })
        });

        let mut sessions = manager(mock, MemoryStore::new());
        let session = sessions.login("root", "password").await.unwrap();

        assert_eq!(session.token, "abc");
        assert_eq!(sessions.token().as_deref(), Some("abc"));
        assert!(sessions.cached_identity().is_some());
    }

    #[tokio::test]
    async fn failed_login_leaves_store_untouched() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().returning(|_, _, _| {
            Box::pin(async { respond(401, json!({"success": false, "message": "Invalid credentials"})) })
        });

        let mut sessions = manager(mock, MemoryStore::new());
        let err = sessions.login("root", "nope").await.unwrap_err();

        assert_eq!(err.user_message(), "Invalid credentials");
        assert!(sessions.token().is_none());
        assert!(sessions.session().is_none());
    }

    #[tokio::test]
    async fn blank_credentials_skip_the_network() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().never();

        let mut sessions = manager(mock, MemoryStore::new());
        let err = sessions.login("", "pw").await.unwrap_err();
        assert!(matches!(err, ConsoleError::Validation(_)));
    }

    #[tokio::test]
    async fn rejected_token_is_cleared_silently() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().returning(|_, _| {
            Box::pin(async { respond(401, json!({"success": false, "message": "Session expired"})) })
        });

        let mut sessions = manager(mock, store_with_token("stale"));
        let session = sessions.validate().await;

        assert!(session.is_none());
        assert!(sessions.token().is_none());
    }

    #[tokio::test]
    async fn network_failure_during_validate_also_logs_out() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().times(1).returning(|_, _| {
            Box::pin(async { Err(RequestError::Network("refused".to_string())) })
        });

        let mut sessions = manager(mock, store_with_token("tok"));
        assert!(sessions.validate().await.is_none());
        assert!(sessions.token().is_none());
    }

    #[tokio::test]
    async fn valid_token_restores_session() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().returning(|_, _| {
            Box::pin(async {
                respond(200, json!({"success": true, "admin": {"admin_id": 2, "username": "ops"}}))
            })
        });

        let mut sessions = manager(mock, store_with_token("tok"));
        let session = sessions.validate().await.unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.identity.display_name(), "ops");
    }

    #[tokio::test]
    async fn validate_without_token_makes_no_request() {
        let mut mock = MockHttpClient::new();
        mock.expect_get().never();

        let mut sessions = manager(mock, MemoryStore::new());
        assert!(sessions.validate().await.is_none());
    }

    #[tokio::test]
    async fn logout_clears_even_when_server_fails() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().returning(|_, _, _| {
            Box::pin(async { respond(500, json!({"success": false})) })
        });

        let mut sessions = manager(mock, store_with_token("tok"));
        sessions.logout().await;
        assert!(sessions.token().is_none());
    }

    #[tokio::test]
    async fn setup_password_mismatch_makes_no_request() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().never();

        let sessions = manager(mock, MemoryStore::new());
        let err = sessions
            .setup_password("ada@example.test", "abcdefgh", "abcdefgX")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConsoleError::Validation(ValidationError::PasswordMismatch)
        ));
        assert_eq!(err.to_string(), "Passwords do not match.");
    }

    #[tokio::test]
    async fn reset_needs_token_and_matching_passwords_before_any_request() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().never();

        let sessions = manager(mock, MemoryStore::new());
        let err = sessions
            .reset_password(" ", "long-enough", "long-enough")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Reset token is required");

        let err = sessions
            .reset_password("r-1", "long-enough", "long-enougX")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Validation(ValidationError::PasswordMismatch)
        ));
    }

    #[tokio::test]
    async fn change_password_requires_session() {
        let mut mock = MockHttpClient::new();
        mock.expect_post_json().never();

        let sessions = manager(mock, MemoryStore::new());
        let err = sessions
            .change_password("old", "newpassword", "newpassword")
            .await
            .unwrap_err();
        assert!(matches!(err, ConsoleError::NotAuthenticated));
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");

        let mut store = FileSessionStore::open(&path).unwrap();
        assert!(store.token(Portal::Admin).is_none());
        store.store_token(Portal::Admin, "tok-9");
        store.store_theme(pareto_model::Theme::Dark);

        let reopened = FileSessionStore::open(&path).unwrap();
        assert_eq!(reopened.token(Portal::Admin).as_deref(), Some("tok-9"));
        assert_eq!(reopened.theme(), pareto_model::Theme::Dark);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"sessionToken\""));
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let err = FileSessionStore::open(&path).unwrap_err();
        assert!(err.to_string().contains("Corrupt session file"));
    }
}
