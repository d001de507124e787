//! Login, first-time password and password reset forms

use leptos::ev::SubmitEvent;
use leptos::prelude::*;
use leptos::task::spawn_local;
use pareto_model::{Portal, ScreenState};

use crate::components::form::TextField;
use crate::state::{AppContext, ResetStep};

const CARD: &str = "max-width: 380px; margin: 4rem auto; padding: 2rem; \
                    border: 1px solid #dee2e6; border-radius: 0.5rem;";
const PRIMARY: &str = "width: 100%; padding: 0.5rem; cursor: pointer;";
const LINK: &str = "display: block; margin-top: 1rem; border: none; background: none; \
                    cursor: pointer; text-decoration: underline;";

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let show_setup = move || ctx.setup_email.with(Option::is_some);
    let resetting = move || ctx.reset.with(Option::is_some);
    let heading = match ctx.portal {
        Portal::Admin => "Pareto Admin",
        Portal::User => "Pareto Portal",
    };

    let toggle = move |_| {
        ctx.setup_email
            .update(|email| *email = if email.is_some() { None } else { Some(String::new()) });
    };

    let toggle_reset = move |_| {
        ctx.reset.update(|step| {
            *step = if step.is_some() { None } else { Some(ResetStep::Request) }
        });
    };

    let form = move || match ctx.reset.get() {
        Some(ResetStep::Request) => view! { <ResetRequestForm /> }.into_any(),
        Some(ResetStep::Confirm(token)) => view! { <ResetPasswordForm token=token /> }.into_any(),
        None if show_setup() => view! { <SetupPasswordForm /> }.into_any(),
        None => view! { <LoginForm /> }.into_any(),
    };

    view! {
        <section style=CARD>
            <h1 style="margin-top: 0;">{heading}</h1>
            {form}
            {(ctx.portal == Portal::User)
                .then(|| {
                    view! {
                        <Show when=move || !resetting()>
                            <button style=LINK on:click=toggle>
                                {move || {
                                    if show_setup() { "Back to sign in" } else { "First time here? Set your password" }
                                }}
                            </button>
                        </Show>
                        <Show when=move || !show_setup()>
                            <button style=LINK on:click=toggle_reset>
                                {move || if resetting() { "Back to sign in" } else { "Forgot your password?" }}
                            </button>
                        </Show>
                    }
                })}
        </section>
    }
}

#[component]
fn LoginForm() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let login = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let busy = move || ctx.screen.get() == ScreenState::Authenticating;
    let label = match ctx.portal {
        Portal::Admin => "Username",
        Portal::User => "Email",
    };

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let secret = password.get_untracked();
        password.set(String::new());
        spawn_local(ctx.login(login.get_untracked(), secret));
    };

    view! {
        <form on:submit=on_submit>
            <TextField label=label value=login />
            <TextField label="Password" value=password kind="password" />
            <button type="submit" style=PRIMARY disabled=busy>
                {move || if busy() { "Signing in..." } else { "Sign in" }}
            </button>
        </form>
    }
}

#[component]
fn SetupPasswordForm() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let email = RwSignal::new(ctx.setup_email.get_untracked().unwrap_or_default());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(ctx.setup_password(
            email.get_untracked(),
            password.get_untracked(),
            confirm.get_untracked(),
        ));
    };

    view! {
        <form on:submit=on_submit>
            <p>"Choose a password for your portal account."</p>
            <TextField label="Email" value=email kind="email" />
            <TextField label="New password" value=password kind="password" />
            <TextField label="Confirm password" value=confirm kind="password" />
            <button type="submit" style=PRIMARY>"Set password"</button>
        </form>
    }
}

#[component]
fn ResetRequestForm() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let email = RwSignal::new(String::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(ctx.request_reset(email.get_untracked()));
    };

    view! {
        <form on:submit=on_submit>
            <p>"Enter your account e-mail and we will send you a reset token."</p>
            <TextField label="Email" value=email kind="email" />
            <button type="submit" style=PRIMARY>"Send reset token"</button>
        </form>
    }
}

#[component]
fn ResetPasswordForm(token: String) -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let token = RwSignal::new(token);
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());

    let on_submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        spawn_local(ctx.reset_password(
            token.get_untracked(),
            password.get_untracked(),
            confirm.get_untracked(),
        ));
    };

    view! {
        <form on:submit=on_submit>
            <TextField label="Reset token" value=token />
            <TextField label="New password" value=password kind="password" />
            <TextField label="Confirm password" value=confirm kind="password" />
            <button type="submit" style=PRIMARY>"Reset password"</button>
        </form>
    }
}
