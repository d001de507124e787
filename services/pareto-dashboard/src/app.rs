//! Main App component

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::{provide_meta_context, Title};
use pareto_model::{PageId, Portal, Theme};

use crate::api::Api;
use crate::components::alerts::Alerts;
use crate::components::audit::AuditLogsPage;
use crate::components::leads::LeadsPage;
use crate::components::login::LoginPage;
use crate::components::nav::Nav;
use crate::components::settings::SettingsPage;
use crate::components::stats::StatsPanel;
use crate::components::tenants::TenantsPage;
use crate::components::users::UsersPage;
use crate::state::{portal_for_path, AppContext};

fn page_path() -> String {
    #[cfg(all(feature = "csr", target_arch = "wasm32"))]
    {
        web_sys::window()
            .and_then(|w| w.location().pathname().ok())
            .unwrap_or_default()
    }

    #[cfg(not(all(feature = "csr", target_arch = "wasm32")))]
    {
        String::new()
    }
}

fn palette(theme: Theme) -> &'static str {
    match theme {
        Theme::Light => "--panel: #ffffff; background: #f8f9fa; color: #212529;",
        Theme::Dark => "--panel: #2b3035; background: #212529; color: #f8f9fa;",
    }
}

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();
    let ctx = AppContext::new(Api::same_origin(), portal_for_path(&page_path()));
    provide_context(ctx);
    spawn_local(ctx.restore());

    let title = match ctx.portal {
        Portal::Admin => "Pareto Admin",
        Portal::User => "Pareto Portal",
    };
    let style = move || {
        format!(
            "font-family: system-ui, sans-serif; min-height: 100vh; {}",
            palette(ctx.theme.get())
        )
    };

    view! {
        <Title text=title />
        <div data-theme=move || ctx.theme.get().as_str() style=style>
            <Alerts />
            <main style="max-width: 1100px; margin: 0 auto; padding: 1rem;">
                <Show when=move || ctx.screen.get().is_logged_in() fallback=|| view! { <LoginPage /> }>
                    <Nav />
                    {move || match ctx.page.get() {
                        PageId::Dashboard => view! { <StatsPanel /> }.into_any(),
                        PageId::Tenants => view! { <TenantsPage /> }.into_any(),
                        PageId::Users => view! { <UsersPage /> }.into_any(),
                        PageId::Leads => view! { <LeadsPage /> }.into_any(),
                        PageId::AuditLogs => view! { <AuditLogsPage /> }.into_any(),
                        PageId::Settings => view! { <SettingsPage /> }.into_any(),
                    }}
                </Show>
            </main>
        </div>
    }
}
