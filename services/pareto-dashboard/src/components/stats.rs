//! Admin overview numbers

use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::DashboardStats;

use crate::state::AppContext;

#[component]
pub fn StatsPanel() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let stats = RwSignal::new(None::<DashboardStats>);

    if let Some(token) = ctx.require_token() {
        spawn_local(async move {
            match ctx.api().dashboard_stats(&token).await {
                Ok(loaded) => stats.set(Some(loaded)),
                Err(e) => ctx.fail(e),
            }
        });
    }

    view! {
        <section>
            <h2>"Dashboard"</h2>
            {move || match stats.get() {
                None => view! { <p>"Loading statistics..."</p> }.into_any(),
                Some(s) => {
                    view! {
                        <div style="display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem;">
                            <StatCard label="Tenants" value=s.total_tenants />
                            <StatCard label="Users" value=s.total_users />
                            <StatCard label="Active users" value=s.active_users />
                            <StatCard label="Admins" value=s.total_admins />
                        </div>
                    }
                        .into_any()
                }
            }}
        </section>
    }
}

#[component]
fn StatCard(label: &'static str, value: u64) -> impl IntoView {
    view! {
        <div style="padding: 1rem; border: 1px solid #dee2e6; border-radius: 0.5rem;">
            <div style="font-size: 0.85em; opacity: 0.7;">{label}</div>
            <div style="font-size: 1.75em; font-weight: 600;">{value}</div>
        </div>
    }
}
