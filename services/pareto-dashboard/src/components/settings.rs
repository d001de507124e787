//! Settings page: theme and password change

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::modal::CHANGE_PASSWORD;
use pareto_model::Theme;

use crate::components::form::TextField;
use crate::components::modal::Modal;
use crate::state::AppContext;

#[component]
pub fn SettingsPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let theme_label = move || match ctx.theme.get() {
        Theme::Light => "Switch to dark mode",
        Theme::Dark => "Switch to light mode",
    };

    view! {
        <section>
            <h2>"Settings"</h2>
            <p>
                <button on:click=move |_| ctx.toggle_theme()>{theme_label}</button>
            </p>
            <p>
                <button on:click=move |_| ctx.open_modal(CHANGE_PASSWORD)>"Change password"</button>
            </p>
            <ChangePasswordModal />
        </section>
    }
}

#[component]
fn ChangePasswordModal() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let current = RwSignal::new(String::new());
    let new = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(ctx.change_password(
            current.get_untracked(),
            new.get_untracked(),
            confirm.get_untracked(),
        ));
    };

    view! {
        <Modal id=CHANGE_PASSWORD title="Change password">
            <form on:submit=on_submit>
                <TextField label="Current password" value=current kind="password" />
                <TextField label="New password" value=new kind="password" />
                <TextField label="Confirm new password" value=confirm kind="password" />
                <button type="submit">"Update password"</button>
            </form>
        </Modal>
    }
}
