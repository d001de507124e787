//! Tenants screen

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::modal::{CONFIRM_DELETE, TENANT_FORM};
use pareto_model::resource::{deleted_message, saved_message};
use pareto_model::{filter, ListQuery, Resource, ScreenEvent, Tenant, TenantDraft};

use super::{CELL, HEAD_ROW, ROW, TABLE, TOOLBAR};
use crate::components::form::{optional, CheckField, TextField};
use crate::components::modal::Modal;
use crate::state::AppContext;

/// Refresh the cached tenant list from the server
pub fn load_tenants(ctx: AppContext) {
    let Some(token) = ctx.require_token() else {
        return;
    };
    spawn_local(async move {
        match ctx
            .api()
            .list::<Tenant>(ctx.portal, &token, &ListQuery::new())
            .await
        {
            Ok(tenants) => ctx.tenants.set(tenants),
            Err(e) => ctx.fail(e),
        }
    });
}

#[derive(Clone, Copy)]
struct TenantForm {
    editing: RwSignal<Option<i64>>,
    company_name: RwSignal<String>,
    email: RwSignal<String>,
    phone: RwSignal<String>,
    is_active: RwSignal<bool>,
}

impl TenantForm {
    fn new() -> Self {
        Self {
            editing: RwSignal::new(None),
            company_name: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            phone: RwSignal::new(String::new()),
            is_active: RwSignal::new(true),
        }
    }

    fn fill(&self, id: Option<i64>, draft: TenantDraft) {
        self.editing.set(id);
        self.company_name.set(draft.company_name);
        self.email.set(draft.email.unwrap_or_default());
        self.phone.set(draft.phone.unwrap_or_default());
        self.is_active.set(draft.is_active);
    }

    fn draft(&self) -> TenantDraft {
        TenantDraft {
            company_name: self.company_name.get_untracked().trim().to_string(),
            email: optional(self.email.get_untracked()),
            phone: optional(self.phone.get_untracked()),
            is_active: self.is_active.get_untracked(),
        }
    }
}

#[component]
pub fn TenantsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let search = RwSignal::new(String::new());
    let form = TenantForm::new();
    let deleting = RwSignal::new(None::<i64>);

    load_tenants(ctx);

    let rows = move || {
        ctx.tenants.with(|tenants| {
            filter::search(tenants, &search.get())
                .into_iter()
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let start_create = move |_| {
        form.fill(None, TenantDraft::default());
        ctx.begin(ScreenEvent::StartCreate, TENANT_FORM);
    };

    let save = move |ev: SubmitEvent| {
        ev.prevent_default();
        let id = form.editing.get_untracked();
        let draft = form.draft();
        if let Err(e) = Tenant::validate(&draft, id.is_none()) {
            ctx.reject(e);
            return;
        }
        let Some(token) = ctx.require_token() else {
            return;
        };
        spawn_local(async move {
            let api = ctx.api();
            let request = api.save::<Tenant>(ctx.portal, &token, id, &draft);
            let saved = ctx
                .mutate(TENANT_FORM, request, |t: &Tenant| {
                    saved_message(Tenant::LABEL, id, &t.company_name)
                })
                .await;
            if saved.is_some() {
                load_tenants(ctx);
            }
        });
    };

    let confirm_delete = move |_| {
        let (Some(id), Some(token)) = (deleting.get_untracked(), ctx.require_token()) else {
            return;
        };
        spawn_local(async move {
            let api = ctx.api();
            let request = api.remove::<Tenant>(ctx.portal, &token, id);
            let removed = ctx
                .mutate(CONFIRM_DELETE, request, |_| deleted_message(Tenant::LABEL))
                .await;
            if removed.is_some() {
                load_tenants(ctx);
            }
        });
    };

    let form_title = move || match form.editing.get() {
        Some(_) => "Edit tenant".to_string(),
        None => "New tenant".to_string(),
    };

    view! {
        <section>
            <h2>"Tenants"</h2>
            <div style=TOOLBAR>
                <input
                    type="search"
                    placeholder="Search tenants"
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
                <button on:click=start_create>"New tenant"</button>
            </div>
            {move || {
                let rows = rows();
                if rows.is_empty() {
                    view! { <p>"No tenants found."</p> }.into_any()
                } else {
                    view! {
                        <table style=TABLE>
                            <thead>
                                <tr style=HEAD_ROW>
                                    <th style=CELL>"Company"</th>
                                    <th style=CELL>"Email"</th>
                                    <th style=CELL>"Phone"</th>
                                    <th style=CELL>"Active"</th>
                                    <th style=CELL>"Users"</th>
                                    <th style=CELL></th>
                                </tr>
                            </thead>
                            <tbody>
                                {rows
                                    .into_iter()
                                    .map(|tenant| {
                                        let id = tenant.id;
                                        let draft = TenantDraft::from(&tenant);
                                        view! {
                                            <tr style=ROW>
                                                <td style=CELL>{tenant.company_name}</td>
                                                <td style=CELL>{tenant.email.unwrap_or_default()}</td>
                                                <td style=CELL>{tenant.phone.unwrap_or_default()}</td>
                                                <td style=CELL>{if tenant.is_active { "Yes" } else { "No" }}</td>
                                                <td style=CELL>{tenant.user_count}</td>
                                                <td style=CELL>
                                                    <button on:click=move |_| {
                                                        form.fill(Some(id), draft.clone());
                                                        ctx.begin(ScreenEvent::StartEdit(id), TENANT_FORM);
                                                    }>"Edit"</button>
                                                    <button on:click=move |_| {
                                                        deleting.set(Some(id));
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
            <Modal id=TENANT_FORM title=form_title>
                <form on:submit=save>
                    <TextField label="Company name" value=form.company_name />
                    <TextField label="Email" value=form.email kind="email" />
                    <TextField label="Phone" value=form.phone kind="tel" />
                    <CheckField label="Active" value=form.is_active />
                    <button type="submit">"Save"</button>
                </form>
            </Modal>
            <Modal id=CONFIRM_DELETE title="Delete tenant">
                <p>"Delete this tenant and all of its users?"</p>
                <button on:click=confirm_delete>"Delete"</button>
                <button on:click=move |_| ctx.cancel(CONFIRM_DELETE)>"Cancel"</button>
            </Modal>
        </section>
    }
}
