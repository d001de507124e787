//! Users screen, including Google token upload

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::modal::{CONFIRM_DELETE, TOKEN_UPLOAD, USER_FORM};
use pareto_model::resource::{deleted_message, saved_message};
use pareto_model::{filter, validation, ListQuery, Resource, ScreenEvent, User, UserDraft};

use super::{CELL, HEAD_ROW, ROW, TABLE, TOOLBAR};
use crate::components::form::{optional, CheckField, SelectField, TextArea, TextField};
use crate::components::modal::Modal;
use crate::components::tenants::load_tenants;
use crate::state::AppContext;

fn load_users(ctx: AppContext, users: RwSignal<Vec<User>>) {
    let Some(token) = ctx.require_token() else {
        return;
    };
    spawn_local(async move {
        match ctx
            .api()
            .list::<User>(ctx.portal, &token, &ListQuery::new())
            .await
        {
            Ok(loaded) => users.set(loaded),
            Err(e) => ctx.fail(e),
        }
    });
}

#[derive(Clone, Copy)]
struct UserForm {
    editing: RwSignal<Option<i64>>,
    tenant_id: RwSignal<String>,
    first_name: RwSignal<String>,
    last_name: RwSignal<String>,
    phone_number: RwSignal<String>,
    email: RwSignal<String>,
    google_calendar_id: RwSignal<String>,
    is_enabled: RwSignal<bool>,
}

impl UserForm {
    fn new() -> Self {
        Self {
            editing: RwSignal::new(None),
            tenant_id: RwSignal::new(String::new()),
            first_name: RwSignal::new(String::new()),
            last_name: RwSignal::new(String::new()),
            phone_number: RwSignal::new(String::new()),
            email: RwSignal::new(String::new()),
            google_calendar_id: RwSignal::new(String::new()),
            is_enabled: RwSignal::new(true),
        }
    }

    fn fill(&self, id: Option<i64>, draft: UserDraft) {
        self.editing.set(id);
        self.tenant_id.set(if draft.tenant_id > 0 {
            draft.tenant_id.to_string()
        } else {
            String::new()
        });
        self.first_name.set(draft.first_name);
        self.last_name.set(draft.last_name);
        self.phone_number.set(draft.phone_number);
        self.email.set(draft.email.unwrap_or_default());
        self.google_calendar_id
            .set(draft.google_calendar_id.unwrap_or_default());
        self.is_enabled.set(draft.is_enabled);
    }

    fn draft(&self) -> UserDraft {
        UserDraft {
            tenant_id: self.tenant_id.get_untracked().parse().unwrap_or(0),
            first_name: self.first_name.get_untracked().trim().to_string(),
            last_name: self.last_name.get_untracked().trim().to_string(),
            phone_number: self.phone_number.get_untracked().trim().to_string(),
            email: optional(self.email.get_untracked()),
            is_enabled: self.is_enabled.get_untracked(),
            google_calendar_id: optional(self.google_calendar_id.get_untracked()),
        }
    }
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let users = RwSignal::new(Vec::<User>::new());
    let search = RwSignal::new(String::new());
    let tenant_filter = RwSignal::new(String::new());
    let form = UserForm::new();
    let deleting = RwSignal::new(None::<i64>);
    let token_user = RwSignal::new(None::<i64>);
    let token_file = RwSignal::new(String::new());

    if ctx.tenants.with_untracked(Vec::is_empty) {
        load_tenants(ctx);
    }
    load_users(ctx, users);

    let tenant_options = move || {
        ctx.tenants.with(|tenants| {
            tenants
                .iter()
                .map(|t| (t.id.to_string(), t.company_name.clone()))
                .collect::<Vec<_>>()
        })
    };
    let filter_options = Signal::derive(move || {
        let mut options = vec![(String::new(), "All tenants".to_string())];
        options.extend(tenant_options());
        options
    });
    let form_options = Signal::derive(move || {
        let mut options = vec![(String::new(), "Select a tenant".to_string())];
        options.extend(tenant_options());
        options
    });

    let rows = move || {
        let tenant_id: Option<i64> = tenant_filter.get().parse().ok();
        users.with(|users| {
            filter::search(users, &search.get())
                .into_iter()
                .filter(|u| tenant_id.is_none_or(|id| u.tenant_id == id))
                .cloned()
                .collect::<Vec<_>>()
        })
    };

    let start_create = move |_| {
        let mut draft = UserDraft::default();
        draft.tenant_id = tenant_filter.get_untracked().parse().unwrap_or(0);
        form.fill(None, draft);
        ctx.begin(ScreenEvent::StartCreate, USER_FORM);
    };

    let save = move |ev: SubmitEvent| {
        ev.prevent_default();
        let id = form.editing.get_untracked();
        let draft = form.draft();
        if let Err(e) = User::validate(&draft, id.is_none()) {
            ctx.reject(e);
            return;
        }
        let Some(token) = ctx.require_token() else {
            return;
        };
        spawn_local(async move {
            let api = ctx.api();
            let request = api.save::<User>(ctx.portal, &token, id, &draft);
            let saved = ctx
                .mutate(USER_FORM, request, |u: &User| {
                    saved_message(User::LABEL, id, &u.full_name())
                })
                .await;
            if saved.is_some() {
                load_users(ctx, users);
            }
        });
    };

    let confirm_delete = move |_| {
        let (Some(id), Some(token)) = (deleting.get_untracked(), ctx.require_token()) else {
            return;
        };
        spawn_local(async move {
            let api = ctx.api();
            let request = api.remove::<User>(ctx.portal, &token, id);
            let removed = ctx
                .mutate(CONFIRM_DELETE, request, |_| deleted_message(User::LABEL))
                .await;
            if removed.is_some() {
                load_users(ctx, users);
            }
        });
    };

    let upload = move |ev: SubmitEvent| {
        ev.prevent_default();
        let Some(user_id) = token_user.get_untracked() else {
            return;
        };
        let token_json = match validation::token_json(&token_file.get_untracked()) {
            Ok(value) => value,
            Err(e) => {
                ctx.reject(e);
                return;
            }
        };
        let Some(token) = ctx.require_token() else {
            return;
        };
        spawn_local(async move {
            let api = ctx.api();
            let request = api.upload_token(&token, user_id, &token_json);
            if ctx
                .mutate(TOKEN_UPLOAD, request, |message: &String| message.clone())
                .await
                .is_some()
            {
                token_file.set(String::new());
                load_users(ctx, users);
            }
        });
    };

    let form_title = move || match form.editing.get() {
        Some(_) => "Edit user".to_string(),
        None => "New user".to_string(),
    };

    view! {
        <section>
            <h2>"Users"</h2>
            <div style=TOOLBAR>
                <input
                    type="search"
                    placeholder="Search users"
                    prop:value=move || search.get()
                    on:input=move |ev| search.set(event_target_value(&ev))
                />
                <SelectField label="Tenant" value=tenant_filter options=filter_options />
                <button on:click=start_create>"New user"</button>
            </div>
            {move || {
                let rows = rows();
                if rows.is_empty() {
                    view! { <p>"No users found."</p> }.into_any()
                } else {
                    view! {
                        <table style=TABLE>
                            <thead>
                                <tr style=HEAD_ROW>
                                    <th style=CELL>"Name"</th>
                                    <th style=CELL>"Tenant"</th>
                                    <th style=CELL>"Phone"</th>
                                    <th style=CELL>"Email"</th>
                                    <th style=CELL>"Enabled"</th>
                                    <th style=CELL>"Google token"</th>
                                    <th style=CELL></th>
                                </tr>
                            </thead>
                            <tbody>
                                {rows
                                    .into_iter()
                                    .map(|user| {
                                        let id = user.id;
                                        let draft = UserDraft::from(&user);
                                        let tenant = ctx
                                            .tenant_name(user.tenant_id)
                                            .unwrap_or_else(|| format!("#{}", user.tenant_id));
                                        view! {
                                            <tr style=ROW>
                                                <td style=CELL>{user.full_name()}</td>
                                                <td style=CELL>{tenant}</td>
                                                <td style=CELL>{user.phone_number}</td>
                                                <td style=CELL>{user.email.unwrap_or_default()}</td>
                                                <td style=CELL>{if user.is_enabled { "Yes" } else { "No" }}</td>
                                                <td style=CELL>{if user.has_token { "Uploaded" } else { "Missing" }}</td>
                                                <td style=CELL>
                                                    <button on:click=move |_| {
                                                        form.fill(Some(id), draft.clone());
                                                        ctx.begin(ScreenEvent::StartEdit(id), USER_FORM);
                                                    }>"Edit"</button>
                                                    <button on:click=move |_| {
                                                        token_user.set(Some(id));
                                                        ctx.open_modal(TOKEN_UPLOAD);
                                                    }>"Upload token"</button>
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
            <Modal id=USER_FORM title=form_title>
                <form on:submit=save>
                    <SelectField label="Tenant" value=form.tenant_id options=form_options />
                    <TextField label="First name" value=form.first_name />
                    <TextField label="Last name" value=form.last_name />
                    <TextField label="Phone number" value=form.phone_number kind="tel" />
                    <TextField label="Email" value=form.email kind="email" />
                    <TextField label="Google calendar id" value=form.google_calendar_id />
                    <CheckField label="Enabled" value=form.is_enabled />
                    <button type="submit">"Save"</button>
                </form>
            </Modal>
            <Modal id=TOKEN_UPLOAD title="Upload Google token">
                <form on:submit=upload>
                    <TextArea label="Paste the contents of token.json" value=token_file rows=10 />
                    <button type="submit">"Upload"</button>
                </form>
            </Modal>
            <Modal id=CONFIRM_DELETE title="Delete user">
                <p>"Delete this user?"</p>
                <button on:click=confirm_delete>"Delete"</button>
                <button on:click=move |_| ctx.cancel(CONFIRM_DELETE)>"Cancel"</button>
            </Modal>
        </section>
    }
}
