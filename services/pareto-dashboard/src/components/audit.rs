//! Audit log viewer (read-only)

use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::{filter, AuditFilter, AuditLog};

use super::{CELL, HEAD_ROW, ROW, TABLE, TOOLBAR};
use crate::components::form::{optional, TextField};
use crate::state::AppContext;

fn entity_label(log: &AuditLog) -> String {
    match (&log.entity_type, log.entity_id) {
        (Some(kind), Some(id)) => format!("{kind} #{id}"),
        (Some(kind), None) => kind.clone(),
        (None, Some(id)) => format!("#{id}"),
        (None, None) => String::new(),
    }
}

#[component]
pub fn AuditLogsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let logs = RwSignal::new(Vec::<AuditLog>::new());
    let admin = RwSignal::new(String::new());
    let action = RwSignal::new(String::new());
    let entity_type = RwSignal::new(String::new());
    let search = RwSignal::new(String::new());

    let load = move || {
        let Some(token) = ctx.require_token() else {
            return;
        };
        let filter = AuditFilter {
            admin: optional(admin.get_untracked()),
            action: optional(action.get_untracked()),
            entity_type: optional(entity_type.get_untracked()),
            ..AuditFilter::default()
        };
        spawn_local(async move {
            match ctx.api().audit_logs(&token, &filter).await {
                Ok(loaded) => logs.set(loaded),
                Err(e) => ctx.fail(e),
            }
        });
    };
    load();

    let rows = move || {
        logs.with(|logs| {
            filter::search(logs, &search.get())
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    view! {
        <section>
            <h2>"Audit Logs"</h2>
            <div style=TOOLBAR>
                <TextField label="Admin" value=admin />
                <TextField label="Action" value=action />
                <TextField label="Entity type" value=entity_type />
                <button on:click=move |_| load()>"Filter"</button>
            </div>
            <input
                type="search"
                placeholder="Search loaded entries"
                prop:value=move || search.get()
                on:input=move |ev| search.set(event_target_value(&ev))
            />
            {move || {
                let rows = rows();
                if rows.is_empty() {
                    view! { <p>"No audit log entries."</p> }.into_any()
                } else {
                    view! {
                        <table style=TABLE>
                            <thead>
                                <tr style=HEAD_ROW>
                                    <th style=CELL>"When"</th>
                                    <th style=CELL>"Admin"</th>
                                    <th style=CELL>"Action"</th>
                                    <th style=CELL>"Entity"</th>
                                    <th style=CELL>"IP"</th>
                                </tr>
                            </thead>
                            <tbody>
                                {rows
                                    .into_iter()
                                    .map(|log| {
                                        let entity = entity_label(&log);
                                        view! {
                                            <tr style=ROW>
                                                <td style=CELL>{log.created_at.unwrap_or_default()}</td>
                                                <td style=CELL>{log.admin.unwrap_or_default()}</td>
                                                <td style=CELL>{log.action}</td>
                                                <td style=CELL>{entity}</td>
                                                <td style=CELL>{log.ip_address.unwrap_or_default()}</td>
                                            </tr>
                                        }
                                    })
                                    .collect::<Vec<_>>()}
                            </tbody>
                        </table>
                    }
                        .into_any()
                }
            }}
        </section>
    }
}
