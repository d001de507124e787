//! BDD step definitions for login, validation and password setup

use std::sync::atomic::Ordering;

use cucumber::{given, then, when};
use pareto_console::session::FileSessionStore;
use pareto_model::{Portal, ScreenState, SessionStore};

use crate::stub_api::{StubApi, ADMIN_PASSWORD, ADMIN_USERNAME};
use crate::world::{ConsoleWorld, START_MS};

#[given("the Pareto API is running")]
async fn api_running(world: &mut ConsoleWorld) {
    world.api = Some(StubApi::start().await);
    world.state_dir = Some(tempfile::tempdir().expect("create state dir"));
    world.clock.store(START_MS, Ordering::SeqCst);
}

#[given(expr = "a saved admin session token {string}")]
fn saved_token(world: &mut ConsoleWorld, token: String) {
    let mut store =
        FileSessionStore::open(&world.config().session_file()).expect("open session file");
    store.store_token(Portal::Admin, &token);
}

#[given("I am logged in as the administrator")]
async fn logged_in(world: &mut ConsoleWorld) {
    world
        .dashboard()
        .login(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("administrator login");
}

#[when(expr = "I log in as {string} with password {string}")]
async fn log_in(world: &mut ConsoleWorld, login: String, password: String) {
    let result = world.dashboard().login(&login, &password).await;
    world.last_error = result.err().map(|e| e.user_message());
}

#[when("the dashboard starts")]
async fn dashboard_starts(world: &mut ConsoleWorld) {
    world.dashboard().start().await;
}

#[when(expr = "I set up the password for {string} with {string} confirmed as {string}")]
async fn set_up_password(world: &mut ConsoleWorld, email: String, password: String, confirm: String) {
    let result = world
        .dashboard()
        .setup_password(&email, &password, &confirm)
        .await;
    world.last_error = result.err().map(|e| e.user_message());
}

#[when("I log out")]
async fn log_out(world: &mut ConsoleWorld) {
    world.dashboard().logout().await;
}

#[then("the action should succeed")]
fn action_succeeded(world: &mut ConsoleWorld) {
    assert_eq!(world.last_error, None);
}

#[then(expr = "the action should fail with {string}")]
fn action_failed(world: &mut ConsoleWorld, message: String) {
    assert_eq!(world.last_error.as_deref(), Some(message.as_str()));
}

#[then(expr = "the stored session token should be {string}")]
fn token_stored(world: &mut ConsoleWorld, token: String) {
    assert_eq!(world.stored_token(), Some(token));
}

#[then("no session token should be stored")]
fn no_token(world: &mut ConsoleWorld) {
    assert_eq!(world.stored_token(), None);
}

#[then("the login view should be shown")]
fn login_view(world: &mut ConsoleWorld) {
    let dashboard = world.dashboard();
    assert_eq!(dashboard.screen(), ScreenState::LoggedOut);
    assert_eq!(dashboard.page(), None);
}

#[then("the dashboard view should be shown")]
fn dashboard_view(world: &mut ConsoleWorld) {
    assert!(world.dashboard().screen().is_logged_in());
}

#[then("no request should have reached the API")]
async fn no_requests(world: &mut ConsoleWorld) {
    assert_eq!(world.api().total_requests().await, 0);
}

#[then(expr = "the API should have received {int} {string} request(s)")]
async fn request_count(world: &mut ConsoleWorld, count: usize, request: String) {
    assert_eq!(world.api().request_count(&request).await, count);
}
