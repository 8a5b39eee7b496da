use leptos::prelude::*;

use toyboy_debugger::panels::PanelMap;

use super::SessionHandle;
use crate::ui_model::PanelSpec;

/// Collapsible box. The body stays mounted while collapsed so the viewport
/// canvas and its GL context survive.
#[component]
pub(super) fn Panel(
    spec: &'static PanelSpec,
    layout: RwSignal<PanelMap>,
    session: SessionHandle,
    children: Children,
) -> impl IntoView {
    let id = spec.id;
    let expanded = move || layout.with(|m| m.get(id).copied().unwrap_or(false));
    let toggle = move || {
        session.update_value(|s| {
            s.toggle_panel(id);
        });
        layout.set(session.with_value(|s| s.panels().snapshot()));
    };

    view! {
        <section class=move || if expanded() { "box" } else { "box collapsed" } data-box-id=id>
            <header class="box-header" on:click=move |_| toggle()>
                <span class="box-title">{spec.title}</span>
                <button
                    type="button"
                    class="collapse-button"
                    aria-expanded=move || expanded().to_string()
                    on:click=move |ev| {
                        ev.stop_propagation();
                        toggle();
                    }
                >
                    {move || if expanded() { "-" } else { "+" }}
                </button>
            </header>
            <div class="box-body">{children()}</div>
        </section>
    }
}

#[component]
pub(super) fn TextDump(text: RwSignal<String>) -> impl IntoView {
    view! {
        <pre class="dump">
            {move || {
                let t = text.get();
                if t.is_empty() { "(no data yet)".to_string() } else { t }
            }}
        </pre>
    }
}
