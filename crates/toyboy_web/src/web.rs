mod bridge;
mod gl;
mod keyboard;
mod logging;
mod numeric_field;
mod panel;
mod roms;
mod shell;
mod socket;
mod storage;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use leptos::html::Canvas;
use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use wasm_bindgen::{JsCast, JsValue};

use toyboy_debugger::config::ClientConfig;
use toyboy_debugger::demux::{RunState, TextPanel};
use toyboy_debugger::engine::EngineCommand;
use toyboy_debugger::frame::{FrameRateMeter, FrameRenderer};
use toyboy_debugger::keypad::Keypad;
use toyboy_debugger::persist::{load_layout, store_layout};
use toyboy_debugger::session::DebuggerSession;

use crate::ui_model::{
    build_session, engine_layout, number_watches_in, range_watches_in, PanelContent, PanelSpec,
    PANELS,
};
use bridge::AppBinding;
use gl::WebGlSurface;
use numeric_field::{NumberField, RangeField};
use panel::{Panel, TextDump};
use roms::RomsPanel;
use shell::{Controls, SystemErrorBanner, Topbar};
use socket::{SharedRenderer, StreamSinks};
use storage::BrowserStorage;

type SessionHandle = StoredValue<DebuggerSession<AppBinding>, LocalStorage>;

fn js_message(v: &JsValue) -> String {
    v.as_string()
        .or_else(|| v.dyn_ref::<js_sys::Error>().map(|e| String::from(e.message())))
        .unwrap_or_else(|| format!("{v:?}"))
}

pub fn start() {
    logging::init(tracing::Level::DEBUG);
    mount_to_body(|| view! { <App /> });
}

/// Handles every panel body needs.
#[derive(Clone)]
struct Wiring {
    session: SessionHandle,
    texts: BTreeMap<TextPanel, RwSignal<String>>,
    run_state: RwSignal<Option<RunState>>,
    error: RwSignal<Option<String>>,
    canvas: NodeRef<Canvas>,
    canvas_size: (usize, usize),
    roms_key: String,
}

fn panel_body(spec: &'static PanelSpec, w: &Wiring) -> AnyView {
    let session = w.session;
    match spec.content {
        PanelContent::Viewport => view! {
            <canvas
                class="lcd"
                node_ref=w.canvas
                width=w.canvas_size.0.to_string()
                height=w.canvas_size.1.to_string()
            ></canvas>
        }
        .into_any(),
        PanelContent::Controls => view! { <Controls session=session run_state=w.run_state /> }.into_any(),
        PanelContent::Text(tp) => {
            let text = w
                .texts
                .get(&tp)
                .copied()
                .unwrap_or_else(|| RwSignal::new(String::new()));
            view! {
                <div class="watches">
                    {number_watches_in(spec.id)
                        .map(|n| view! { <NumberField spec=n session=session /> })
                        .collect_view()}
                    {range_watches_in(spec.id)
                        .map(|r| view! { <RangeField spec=r session=session /> })
                        .collect_view()}
                </div>
                <TextDump text=text />
            }
            .into_any()
        }
        PanelContent::Roms => view! { <RomsPanel roms_key=w.roms_key.clone() error=w.error /> }.into_any(),
    }
}

#[component]
fn App() -> impl IntoView {
    let config = ClientConfig::load(&BrowserStorage);
    let saved_layout = load_layout(&BrowserStorage, &config.layout_key);
    let keypad = Keypad::new(config.tracked_keys.iter().map(String::as_str));
    let session: SessionHandle =
        StoredValue::new_local(build_session(AppBinding, &saved_layout).with_keypad(keypad));
    let layout = RwSignal::new(session.with_value(|s| s.panels().snapshot()));

    let layout_key = config.layout_key.clone();
    session.update_value(|s| {
        s.subscribe_panels(move |panels| {
            if let Err(e) = store_layout(&BrowserStorage, &layout_key, panels) {
                tracing::warn!(error = %e, "failed to store panel layout");
            }
        });
    });

    let texts: BTreeMap<TextPanel, RwSignal<String>> = TextPanel::all()
        .iter()
        .map(|&p| (p, RwSignal::new(String::new())))
        .collect();
    let run_state = RwSignal::new(None::<RunState>);
    let fps = RwSignal::new(None::<u32>);
    let connected = RwSignal::new(false);
    let engine_speed = RwSignal::new(None::<f64>);
    let error = RwSignal::new(None::<String>);
    let canvas = NodeRef::<Canvas>::new();
    let renderer: SharedRenderer = Rc::new(RefCell::new(None));

    keyboard::install(session);

    Effect::new({
        let renderer = Rc::clone(&renderer);
        move |_| {
            let Some(el) = canvas.get() else {
                return;
            };
            if renderer.borrow().is_some() {
                return;
            }
            match WebGlSurface::new(el) {
                Ok(surface) => *renderer.borrow_mut() = Some(FrameRenderer::new(surface)),
                Err(e) => {
                    tracing::error!(error = %e, "viewport renderer unavailable");
                    error.set(Some(format!("Viewport unavailable: {e}")));
                }
            }
        }
    });
    socket::start_render_loop(Rc::clone(&renderer), error);

    session.with_value(|s| s.send(EngineCommand::StartWebSocketServer));
    let sinks = StreamSinks {
        texts: texts.clone(),
        run_state,
        fps,
        renderer,
        meter: FrameRateMeter::new(),
    };
    let socket_url = config.socket_url.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match bridge::get_config().await {
            Ok(cfg) => {
                engine_speed.set(cfg.speed_percent());
                let applied = session.try_update_value(|s| s.apply_snapshot(&engine_layout(&cfg)));
                tracing::info!(panels = applied.unwrap_or(0), rom = cfg.rom_location().unwrap_or(""), "engine config loaded");
                layout.set(session.with_value(|s| s.panels().snapshot()));
            }
            Err(e) => tracing::warn!(error = %e, "GetConfig failed; keeping local layout"),
        }
        if let Err(e) = socket::connect(&socket_url, sinks, connected) {
            tracing::error!(error = %e, "telemetry unavailable");
            error.set(Some(e.to_string()));
        }
    });

    let wiring = Wiring {
        session,
        texts,
        run_state,
        error,
        canvas,
        canvas_size: (config.frame_width, config.frame_height),
        roms_key: config.roms_key.clone(),
    };

    view! {
        <div class="app">
            <Topbar connected=connected engine_speed=engine_speed fps=fps />
            <SystemErrorBanner error=error />
            <main class="boxes">
                {PANELS
                    .iter()
                    .map(|spec| {
                        let body = panel_body(spec, &wiring);
                        view! {
                            <Panel spec=spec layout=layout session=session>
                                {body}
                            </Panel>
                        }
                    })
                    .collect_view()}
            </main>
        </div>
    }
}
