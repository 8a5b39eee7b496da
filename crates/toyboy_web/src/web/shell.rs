use leptos::prelude::*;

use toyboy_debugger::demux::RunState;
use toyboy_debugger::engine::EngineCommand;

use super::SessionHandle;
use crate::ui_model::speed_label;

#[component]
pub(super) fn Topbar(
    connected: RwSignal<bool>,
    engine_speed: RwSignal<Option<f64>>,
    fps: RwSignal<Option<u32>>,
) -> impl IntoView {
    view! {
        <header class="app-header">
            <div class="app-header-left">
                <h1 class="brand">"toyboy"</h1>
                <span class="subtle">
                    {move || speed_label(engine_speed.get())}
                </span>
            </div>
            <div class="app-header-right">
                <span class="status" id="fps">
                    {move || fps.get().map(|f| format!("{f} fps")).unwrap_or_else(|| "-- fps".to_string())}
                </span>
                <Show
                    when=move || connected.get()
                    fallback=|| view! { <span class="status offline">"disconnected"</span> }
                >
                    <span class="live-dot" title="Telemetry connected"></span>
                </Show>
            </div>
        </header>
    }
}

#[component]
pub(super) fn SystemErrorBanner(error: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || error.get().is_some()>
            <div class="error-banner">
                <div class="error-banner-head">
                    <div class="error-banner-title">"Error"</div>
                    <button class="btn sm" on:click=move |_| error.set(None)>
                        "Dismiss"
                    </button>
                </div>
                <div class="error-banner-body">{move || error.get().unwrap_or_default()}</div>
            </div>
        </Show>
    }
}

/// Run/Pause/Step and cartridge buttons. Before the first `CPUState` both
/// Run and Pause are offered.
#[component]
pub(super) fn Controls(session: SessionHandle, run_state: RwSignal<Option<RunState>>) -> impl IntoView {
    let send = move |cmd: EngineCommand| session.with_value(|s| s.send(cmd));
    let run_enabled = move || run_state.get().map_or(true, RunState::run_enabled);
    let pause_enabled = move || run_state.get().map_or(true, RunState::pause_enabled);

    view! {
        <section class="controls">
            <button id="run-btn" class="btn" disabled=move || !run_enabled() on:click=move |_| send(EngineCommand::Start)>
                "Run"
            </button>
            <button id="pause-btn" class="btn" disabled=move || !pause_enabled() on:click=move |_| send(EngineCommand::Pause)>
                "Pause"
            </button>
            <button id="step-btn" class="btn" on:click=move |_| send(EngineCommand::Step)>
                "Step"
            </button>
            <span class="controls-sep"></span>
            <button class="btn ghost" title="Load a cartridge" on:click=move |_| send(EngineCommand::Load)>
                "Load"
            </button>
            <button class="btn ghost" title="Save cartridge RAM" on:click=move |_| send(EngineCommand::Save)>
                "Save"
            </button>
        </section>
    }
}
