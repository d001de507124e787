//! Leads screen for both portals.
//!
//! Admins see every tenant's leads and can narrow by tenant; portal users
//! see their tenant's leads and create new ones from a free-text message.

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::modal::{CONFIRM_DELETE, LEAD_DETAIL, LEAD_FORM};
use pareto_model::resource::{deleted_message, saved_message};
use pareto_model::{
    filter, Lead, LeadBreakdown, LeadDraft, LeadFilter, LeadPriority, LeadStats, LeadStatus,
    Portal, Resource, ScreenEvent,
};
use serde_json::Value;

use super::{CELL, HEAD_ROW, ROW, TABLE, TOOLBAR};
use crate::components::form::{optional, CheckField, SelectField, TextArea, TextField};
use crate::components::modal::Modal;
use crate::components::tenants::load_tenants;
use crate::state::AppContext;

/// Opaque lead payloads as shown in the detail dialog
fn verbatim(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

fn choices(any: &str, values: &[&'static str]) -> Vec<(String, String)> {
    let mut options = vec![(String::new(), any.to_string())];
    options.extend(values.iter().map(|v| (v.to_string(), v.to_string())));
    options
}

/// "Open 3 · Closed 1" style summary of one breakdown bucket
fn bucket_line(counts: &std::collections::BTreeMap<String, u64>) -> String {
    counts
        .iter()
        .map(|(name, count)| format!("{name} {count}"))
        .collect::<Vec<_>>()
        .join(" · ")
}

#[derive(Clone, Copy)]
struct LeadData {
    rows: RwSignal<Vec<Lead>>,
    stats: RwSignal<Option<LeadStats>>,
    breakdown: RwSignal<Option<LeadBreakdown>>,
}

fn load_leads(ctx: AppContext, data: LeadData, filter: LeadFilter) {
    let Some(token) = ctx.require_token() else {
        return;
    };
    spawn_local(async move {
        let api = ctx.api();
        match api.leads(ctx.portal, &token, &filter).await {
            Ok(page) => {
                data.rows.set(page.leads);
                data.stats.set(page.stats);
            }
            Err(e) => {
                ctx.fail(e);
                return;
            }
        }
        match api.lead_stats(ctx.portal, &token, filter.tenant_id).await {
            Ok(breakdown) => data.breakdown.set(Some(breakdown)),
            // The list is already on screen; a missing breakdown only
            // hides the summary line
            Err(e) if !e.is_auth_failure() => {
                tracing::warn!("Lead breakdown unavailable: {}", e);
                data.breakdown.set(None);
            }
            Err(e) => ctx.fail(e),
        }
    });
}

#[component]
pub fn LeadsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let data = LeadData {
        rows: RwSignal::new(Vec::new()),
        stats: RwSignal::new(None),
        breakdown: RwSignal::new(None),
    };

    // Filters
    let search = RwSignal::new(String::new());
    let status = RwSignal::new(String::new());
    let priority = RwSignal::new(String::new());
    let tenant = RwSignal::new(String::new());
    let mine = RwSignal::new(false);

    // Dialog state
    let selected = RwSignal::new(None::<Lead>);
    let editing = RwSignal::new(None::<i64>);
    let subject = RwSignal::new(String::new());
    let owner = RwSignal::new(String::new());
    let edit_status = RwSignal::new(String::new());
    let edit_priority = RwSignal::new(String::new());
    let message = RwSignal::new(String::new());

    let server_filter = move || LeadFilter {
        status: status.get_untracked().parse().ok(),
        priority: priority.get_untracked().parse().ok(),
        tenant_id: tenant.get_untracked().parse().ok(),
        ..LeadFilter::default()
    };
    let reload = move || load_leads(ctx, data, server_filter());

    if ctx.portal == Portal::Admin && ctx.tenants.with_untracked(Vec::is_empty) {
        load_tenants(ctx);
    }
    reload();

    let my_id = move || {
        ctx.session
            .with(|s| s.as_ref().and_then(|s| s.identity.user_id()))
    };
    let rows = move || {
        let query = search.get();
        let only_mine = mine.get().then(my_id).flatten();
        data.rows.with(|leads| {
            let scoped = match only_mine {
                Some(user_id) => filter::my_leads(leads, user_id),
                None => leads.iter().collect(),
            };
            scoped
                .into_iter()
                .filter(|lead| pareto_model::Searchable::matches(*lead, &query))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let status_options = Signal::derive(|| choices("Any status", &LeadStatus::ALL.map(LeadStatus::as_str)));
    let priority_options =
        Signal::derive(|| choices("Any priority", &LeadPriority::ALL.map(LeadPriority::as_str)));
    let tenant_options = Signal::derive(move || {
        let mut options = vec![(String::new(), "All tenants".to_string())];
        ctx.tenants.with(|tenants| {
            options.extend(tenants.iter().map(|t| (t.id.to_string(), t.company_name.clone())));
        });
        options
    });

    let start_create = move |_| {
        message.set(String::new());
        editing.set(None);
        ctx.begin(ScreenEvent::StartCreate, LEAD_FORM);
    };

    let start_edit = move |lead: &Lead| {
        editing.set(Some(lead.id));
        subject.set(lead.subject.clone());
        owner.set(lead.owner.clone().unwrap_or_default());
        edit_status.set(lead.status.map(|s| s.as_str().to_string()).unwrap_or_default());
        edit_priority.set(lead.priority.map(|p| p.as_str().to_string()).unwrap_or_default());
        ctx.begin(ScreenEvent::StartEdit(lead.id), LEAD_FORM);
    };

    let save = move |ev: SubmitEvent| {
        ev.prevent_default();
        let id = editing.get_untracked();
        let draft = match id {
            None => LeadDraft::from_message(message.get_untracked().trim()),
            Some(_) => LeadDraft {
                subject: optional(subject.get_untracked()),
                owner: optional(owner.get_untracked()),
                status: edit_status.get_untracked().parse().ok(),
                priority: edit_priority.get_untracked().parse().ok(),
                ..LeadDraft::default()
            },
        };
        if let Err(e) = Lead::validate(&draft, id.is_none()) {
            ctx.reject(e);
            return;
        }
        let Some(token) = ctx.require_token() else {
            return;
        };
        spawn_local(async move {
            let api = ctx.api();
            let request = api.save::<Lead>(ctx.portal, &token, id, &draft);
            let saved = ctx
                .mutate(LEAD_FORM, request, |lead: &Lead| {
                    saved_message(Lead::LABEL, id, &lead.subject)
                })
                .await;
            if saved.is_some() {
                reload();
            }
        });
    };

    let confirm_delete = move |_| {
        let Some(id) = editing.get_untracked() else {
            return;
        };
        let Some(token) = ctx.require_token() else {
            return;
        };
        spawn_local(async move {
            let api = ctx.api();
            let request = api.remove::<Lead>(ctx.portal, &token, id);
            let removed = ctx
                .mutate(CONFIRM_DELETE, request, |_| deleted_message(Lead::LABEL))
                .await;
            if removed.is_some() {
                reload();
            }
        });
    };

    let stats_line = move || {
        data.stats.get().map(|s| {
            let mut line = format!("Total {} · Open {} · In progress {}", s.total, s.open, s.in_progress);
            if let Some(high) = s.high_priority {
                line.push_str(&format!(" · High priority {high}"));
            }
            if let Some(count) = s.my_leads {
                line.push_str(&format!(" · Mine {count}"));
            }
            line
        })
    };

    let breakdown_line = move || {
        data.breakdown.get().map(|b| {
            let mut parts = Vec::new();
            if !b.by_status.is_empty() {
                parts.push(format!("By status: {}", bucket_line(&b.by_status)));
            }
            if !b.by_priority.is_empty() {
                parts.push(format!("By priority: {}", bucket_line(&b.by_priority)));
            }
            parts.join("  |  ")
        })
    };

    let form_title = move || match editing.get() {
        Some(_) => "Edit lead".to_string(),
        None => "New lead".to_string(),
    };
    let detail_title = move || {
        selected
            .get()
            .map(|lead| format!("Lead #{}", lead.id))
            .unwrap_or_default()
    };

    view! {
        <section>
            <h2>"Leads"</h2>
            <p style="opacity: 0.8;">{stats_line}</p>
            <p style="opacity: 0.8; font-size: 0.9em;">{breakdown_line}</p>
            <div style=TOOLBAR>
                <input
                    type="search"
                    placeholder="Search leads"
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
                <SelectField label="Status" value=status options=status_options />
                <SelectField label="Priority" value=priority options=priority_options />
                {(ctx.portal == Portal::Admin)
                    .then(|| view! { <SelectField label="Tenant" value=tenant options=tenant_options /> })}
                {(ctx.portal == Portal::User).then(|| view! { <CheckField label="My leads" value=mine /> })}
                <button on:click=move |_| reload()>"Apply"</button>
                {(ctx.portal == Portal::User)
                    .then(|| view! { <button on:click=start_create>"New lead"</button> })}
            </div>
            {move || {
                let rows = rows();
                if rows.is_empty() {
                    view! { <p>"No leads found."</p> }.into_any()
                } else {
                    view! {
                        <table style=TABLE>
                            <thead>
                                <tr style=HEAD_ROW>
                                    <th style=CELL>"Subject"</th>
                                    <th style=CELL>"Owner"</th>
                                    <th style=CELL>"Priority"</th>
                                    <th style=CELL>"Status"</th>
                                    <th style=CELL>"Tenant"</th>
                                    <th style=CELL>"Created"</th>
                                    <th style=CELL></th>
                                </tr>
                            </thead>
                            <tbody>
                                {rows
                                    .into_iter()
                                    .map(|lead| {
                                        let id = lead.id;
                                        let shown = lead.clone();
                                        let edited = lead.clone();
                                        view! {
                                            <tr style=ROW>
                                                <td style=CELL>{lead.subject}</td>
                                                <td style=CELL>{lead.owner.unwrap_or_default()}</td>
                                                <td style=CELL>{lead.priority.map(LeadPriority::as_str)}</td>
                                                <td style=CELL>{lead.status.map(LeadStatus::as_str)}</td>
                                                <td style=CELL>{lead.tenant_name.unwrap_or_default()}</td>
                                                <td style=CELL>{lead.created_at.unwrap_or_default()}</td>
                                                <td style=CELL>
                                                    <button on:click=move |_| {
                                                        selected.set(Some(shown.clone()));
                                                        ctx.open_modal(LEAD_DETAIL);
                                                    }>"View"</button>
                                                    <button on:click=move |_| start_edit(&edited)>"Edit"</button>
                                                    <button on:click=move |_| {
                                                        editing.set(Some(id));
                                                        ctx.begin(ScreenEvent::StartDelete(id), CONFIRM_DELETE);
                                                    }>"Delete"</button>
                                                </td>
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
            <Modal id=LEAD_DETAIL title=detail_title>
                {move || {
                    selected
                        .get()
                        .map(|lead| {
                            view! {
                                <h4>{lead.subject.clone()}</h4>
                                <h5>"Content"</h5>
                                <pre style="white-space: pre-wrap;">{verbatim(&lead.content)}</pre>
                                <h5>"Actions"</h5>
                                <pre style="white-space: pre-wrap;">{verbatim(&lead.action)}</pre>
                            }
                        })
                }}
            </Modal>
            <Modal id=LEAD_FORM title=form_title>
                <form on:submit=save>
                    <Show
                        when=move || editing.get().is_some()
                        fallback=move || view! { <TextArea label="Message" value=message /> }
                    >
                        <TextField label="Subject" value=subject />
                        <TextField label="Owner" value=owner />
                        <SelectField label="Status" value=edit_status options=status_options />
                        <SelectField label="Priority" value=edit_priority options=priority_options />
                    </Show>
                    <button type="submit">"Save"</button>
                </form>
            </Modal>
            <Modal id=CONFIRM_DELETE title="Delete lead">
                <p>"Delete this lead?"</p>
                <button on:click=confirm_delete>"Delete"</button>
                <button on:click=move |_| ctx.cancel(CONFIRM_DELETE)>"Cancel"</button>
            </Modal>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_content_is_pretty_printed() {
        let text = verbatim(&json!({"name": "Bob"}));
        assert_eq!(text, "{\n  \"name\": \"Bob\"\n}");
        assert_eq!(verbatim(&json!("call back")), "call back");
        assert_eq!(verbatim(&Value::Null), "-");
    }

    #[test]
    fn buckets_are_listed_by_name() {
        let breakdown: LeadBreakdown = serde_json::from_value(json!({
            "total": 4,
            "by_status": {"Open": 3, "Closed": 1}
        }))
        .unwrap();
        assert_eq!(bucket_line(&breakdown.by_status), "Closed 1 · Open 3");
        assert_eq!(bucket_line(&breakdown.by_priority), "");
    }

    #[test]
    fn filter_choices_start_with_any() {
        let options = choices("Any status", &LeadStatus::ALL.map(LeadStatus::as_str));
        assert_eq!(options[0], (String::new(), "Any status".to_string()));
        assert_eq!(options[2].0, "In Progress");
    }
}
