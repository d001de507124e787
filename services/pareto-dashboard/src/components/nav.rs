//! Top navigation bar

use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::PageId;

use crate::state::AppContext;

fn tab_style(active: bool) -> &'static str {
    if active {
        "padding: 0.4rem 0.8rem; border: none; border-bottom: 2px solid #0d6efd; background: none; cursor: pointer; font-weight: 600;"
    } else {
        "padding: 0.4rem 0.8rem; border: none; border-bottom: 2px solid transparent; background: none; cursor: pointer;"
    }
}

#[component]
pub fn Nav() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let user = move || {
        ctx.session.with(|session| {
            session
                .as_ref()
                .map(|s| s.identity.display_name())
                .unwrap_or_default()
        })
    };

    view! {
        <nav style="display: flex; gap: 0.25rem; align-items: center; border-bottom: 1px solid #dee2e6; margin-bottom: 1.5rem;">
            <strong style="margin-right: 1rem;">"Pareto"</strong>
            {PageId::for_portal(ctx.portal)
                .iter()
                .map(|&page| {
                    view! {
                        <button
                            style=move || tab_style(ctx.page.get() == page)
                            on:click=move |_| ctx.open_page(page)
                        >
                            {page.title()}
                        </button>
                    }
                })
                .collect::<Vec<_>>()}
            <span style="margin-left: auto; margin-right: 0.5rem;">{user}</span>
            <button on:click=move |_| spawn_local(ctx.logout())>"Log out"</button>
        </nav>
    }
}
