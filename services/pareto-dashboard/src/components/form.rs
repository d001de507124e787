//! Form inputs bound to signals

use leptos::prelude::*;

const FIELD: &str = "display: flex; flex-direction: column; gap: 0.25rem; margin-bottom: 0.75rem;";
const INPUT: &str = "padding: 0.4rem; border: 1px solid #ced4da; border-radius: 0.25rem;";

#[component]
pub fn TextField(
    label: &'static str,
    value: RwSignal<String>,
    #[prop(default = "text")] kind: &'static str,
) -> impl IntoView {
    view! {
        <label style=FIELD>
            <span>{label}</span>
            <input
                type=kind
                style=INPUT
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        </label>
    }
}

#[component]
pub fn TextArea(label: &'static str, value: RwSignal<String>, #[prop(default = 6)] rows: u32) -> impl IntoView {
    view! {
        <label style=FIELD>
            <span>{label}</span>
            <textarea
                rows=rows
                style=INPUT
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            ></textarea>
        </label>
    }
}

#[component]
pub fn CheckField(label: &'static str, value: RwSignal<bool>) -> impl IntoView {
    view! {
        <label style="display: flex; gap: 0.5rem; margin-bottom: 0.75rem;">
            <input
                type="checkbox"
                prop:checked=move || value.get()
                on:change=move |ev| value.set(event_target_checked(&ev))
            />
            <span>{label}</span>
        </label>
    }
}

/// Drop-down over `(value, label)` pairs; the empty value means "any"
#[component]
pub fn SelectField(
    label: &'static str,
    value: RwSignal<String>,
    #[prop(into)] options: Signal<Vec<(String, String)>>,
) -> impl IntoView {
    view! {
        <label style=FIELD>
            <span>{label}</span>
            <select
                style=INPUT
                prop:value=move || value.get()
                on:change=move |ev| value.set(event_target_value(&ev))
            >
                {move || {
                    options
                        .get()
                        .into_iter()
                        .map(|(option, text)| {
                            let selected = value.get_untracked() == option;
                            view! { <option value=option selected=selected>{text}</option> }
                        })
                        .collect::<Vec<_>>()
                }}
            </select>
        </label>
    }
}

/// Blank input means "not set"
pub fn optional(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
