//! BDD test world for the pareto console

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cucumber::World;
use pareto_console::dashboard::Dashboard;
use pareto_console::io::{HttpClient, ReqwestHttpClient};
use pareto_console::session::FileSessionStore;
use pareto_console::{open_dashboard, Config};
use pareto_model::{Portal, SessionStore};

use crate::stub_api::StubApi;

/// Clock the dashboard reads alert timestamps from
pub const START_MS: u64 = 1_000_000;

#[derive(Default, World)]
pub struct ConsoleWorld {
    pub api: Option<StubApi>,
    pub state_dir: Option<tempfile::TempDir>,
    pub dashboard: Option<Dashboard<FileSessionStore>>,
    pub clock: Arc<AtomicU64>,
    pub tenant_ids: BTreeMap<String, i64>,
    pub last_error: Option<String>,

    // Migration testing
    pub columns: Vec<String>,
    pub added: Vec<&'static str>,
}

impl fmt::Debug for ConsoleWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleWorld")
            .field("api", &self.api)
            .field("dashboard_open", &self.dashboard.is_some())
            .field("clock", &self.clock.load(Ordering::SeqCst))
            .field("last_error", &self.last_error)
            .field("columns", &self.columns)
            .finish()
    }
}

impl ConsoleWorld {
    pub fn api(&self) -> &StubApi {
        self.api.as_ref().expect("API not started")
    }

    pub fn config(&self) -> Config {
        let dir = self.state_dir.as_ref().expect("state dir not created");
        Config {
            api_base_url: self.api().base_url.clone(),
            state_dir: dir.path().to_path_buf(),
            portal: Portal::Admin,
            ..Config::default()
        }
    }

    /// The dashboard, opened on first use so earlier steps can seed the
    /// session file
    pub fn dashboard(&mut self) -> &mut Dashboard<FileSessionStore> {
        if self.dashboard.is_none() {
            let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
            let clock = Arc::clone(&self.clock);
            let dashboard = open_dashboard(&self.config(), http)
                .expect("open dashboard")
                .with_clock(move || clock.load(Ordering::SeqCst));
            self.dashboard = Some(dashboard);
        }
        self.dashboard.as_mut().expect("dashboard opened")
    }

    /// Token as persisted on disk, independent of the open dashboard
    pub fn stored_token(&self) -> Option<String> {
        FileSessionStore::open(&self.config().session_file())
            .expect("open session file")
            .token(Portal::Admin)
    }
}
