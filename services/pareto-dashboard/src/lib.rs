//! Pareto Dashboard - Leptos frontend
//!
//! Browser UI for the Pareto administration API. Session handling, CRUD
//! flows and alerts follow the shared model used by the terminal console.

pub mod api;
pub mod app;
pub mod components;
pub mod state;
pub mod storage;

pub use app::App;

/// Client-side entry point
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    leptos::mount::mount_to_body(App);
}
