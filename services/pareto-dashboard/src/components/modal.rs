//! Modal dialog keyed by id

use leptos::prelude::*;

use crate::state::AppContext;

const BACKDROP: &str = "position: fixed; inset: 0; background: rgba(0, 0, 0, 0.4); \
                        display: flex; align-items: center; justify-content: center; z-index: 900;";
const DIALOG: &str = "background: var(--panel, #fff); color: inherit; padding: 1.5rem; \
                      border-radius: 0.5rem; min-width: 360px; max-width: 640px; \
                      max-height: 85vh; overflow: auto;";

/// Shown while `id` is open in the modal set. Closing it cancels whatever
/// create/edit/delete mode opened it.
#[component]
pub fn Modal(
    id: &'static str,
    #[prop(into)] title: Signal<String>,
    children: ChildrenFn,
) -> impl IntoView {
    let ctx = expect_context::<AppContext>();

    view! {
        <Show when=move || ctx.is_open(id)>
            <div style=BACKDROP>
                <div role="dialog" id=id style=DIALOG>
                    <header style="display: flex; justify-content: space-between; margin-bottom: 1rem;">
                        <h3 style="margin: 0;">{move || title.get()}</h3>
                        <button
                            style="border: none; background: none; cursor: pointer; font-size: 1.25rem;"
                            on:click=move |_| ctx.cancel(id)
                        >
                            "×"
                        </button>
                    </header>
                    {children()}
                </div>
            </div>
        </Show>
    }
}
