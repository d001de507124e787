//! Pareto console - terminal client for the Pareto administration API
//!
//! Drives the same session, CRUD and alert flows as the browser dashboard
//! from the command line.

pub mod api;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod io;
pub mod migration;
pub mod render;
pub mod resource;
pub mod session;

pub use config::{load_config, Config};
pub use error::{ConsoleError, Result};

use std::sync::Arc;

use crate::api::ApiClient;
use crate::commands::{Command, Prompt};
use crate::dashboard::Dashboard;
use crate::io::{HttpClient, ReqwestHttpClient};
use crate::session::{FileSessionStore, SessionManager};

/// Build the dashboard state for `config` on top of the given transport
pub fn open_dashboard(
    config: &Config,
    http: Arc<dyn HttpClient>,
) -> Result<Dashboard<FileSessionStore>> {
    let store = FileSessionStore::open(&config.session_file())?;
    let api = ApiClient::new(&config.api_base_url, http);
    let sessions = SessionManager::new(api, store, config.portal);
    Ok(Dashboard::new(sessions, config.alert_ttl_ms()))
}

/// Run one command against the configured API and return its output.
///
/// Alerts raised along the way are logged; the returned text is what the
/// operator asked to see.
pub async fn run(config: Config, command: Command, prompt: &mut dyn Prompt) -> Result<String> {
    let http: Arc<dyn HttpClient> = match config.request_timeout {
        Some(timeout) => Arc::new(ReqwestHttpClient::with_timeout(timeout)?),
        None => Arc::new(ReqwestHttpClient::new()),
    };
    tracing::debug!(
        "Using API {} as {} (state in {:?})",
        config.api_base_url,
        config.portal,
        config.state_dir
    );

    let mut dashboard = open_dashboard(&config, http)?;
    let result = commands::execute(&mut dashboard, command, prompt).await;

    dashboard.tick();
    for alert in dashboard.alerts().visible() {
        tracing::debug!("{}", render::alert(alert));
    }
    result
}
