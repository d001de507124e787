//! Toast alerts, newest last

use leptos::prelude::*;
use pareto_model::Severity;

use crate::state::AppContext;

#[component]
pub fn Alerts() -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    view! {
        <div style="position: fixed; top: 1rem; right: 1rem; z-index: 1000; width: 320px;">
            {move || {
                ctx.alerts
                    .with(|alerts| alerts.visible().cloned().collect::<Vec<_>>())
                    .into_iter()
                    .map(|alert| {
                        let (color, bg) = palette(alert.severity);
                        let style = format!(
                            "display: flex; justify-content: space-between; gap: 0.5rem; \
                             margin-bottom: 0.5rem; padding: 0.75rem 1rem; border-radius: 0.25rem; \
                             color: {}; background-color: {};",
                            color, bg
                        );
                        let id = alert.id;
                        view! {
                            <div role="alert" class=format!("alert alert-{}", alert.severity.as_str()) style=style>
                                <span>{alert.message}</span>
                                <button
                                    style="border: none; background: none; cursor: pointer;"
                                    on:click=move |_| ctx.dismiss(id)
                                >
                                    "×"
                                </button>
                            </div>
                        }
                    })
                    .collect::<Vec<_>>()
            }}
        </div>
    }
}

fn palette(severity: Severity) -> (&'static str, &'static str) {
    match severity {
        Severity::Success => ("#155724", "#d4edda"),
        Severity::Error => ("#721c24", "#f8d7da"),
        Severity::Warning => ("#856404", "#fff3cd"),
        Severity::Info => ("#0c5460", "#d1ecf1"),
    }
}
