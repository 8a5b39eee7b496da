use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use js_sys::{ArrayBuffer, Uint8Array};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{BinaryType, CloseEvent, MessageEvent, WebSocket};

use toyboy_debugger::demux::{RunState, StreamDemux, TelemetrySink, TextPanel, TransportMessage};
use toyboy_debugger::frame::{FrameRateMeter, FrameRenderer};
use toyboy_debugger::time::Instant;

use super::bridge::BridgeError;
use super::gl::WebGlSurface;

pub(super) type SharedRenderer = Rc<RefCell<Option<FrameRenderer<WebGlSurface>>>>;

/// Where routed payloads land in the UI.
pub(super) struct StreamSinks {
    pub(super) texts: BTreeMap<TextPanel, RwSignal<String>>,
    pub(super) run_state: RwSignal<Option<RunState>>,
    pub(super) fps: RwSignal<Option<u32>>,
    pub(super) renderer: SharedRenderer,
    pub(super) meter: FrameRateMeter,
}

impl TelemetrySink for StreamSinks {
    fn text(&mut self, panel: TextPanel, text: String) {
        if let Some(sig) = self.texts.get(&panel) {
            sig.set(text);
        }
    }

    fn frame(&mut self, pixels: Vec<u8>) {
        if let Some(fps) = self.meter.record(Instant::now()) {
            self.fps.set(Some(fps));
        }
        match self.renderer.borrow_mut().as_mut() {
            // Size errors are logged by the renderer.
            Some(r) => {
                let _ = r.submit(pixels);
            }
            None => tracing::debug!("frame dropped: renderer not ready"),
        }
    }

    fn run_state(&mut self, state: RunState) {
        self.run_state.set(Some(state));
    }
}

fn transport_message(ev: &MessageEvent) -> Option<TransportMessage> {
    let data = ev.data();
    if let Some(text) = data.as_string() {
        return Some(TransportMessage::Text(text));
    }
    let buf = data.dyn_into::<ArrayBuffer>().ok()?;
    Some(TransportMessage::Binary(Uint8Array::new(&buf).to_vec()))
}

/// Open the telemetry socket and feed every message through a fresh demux.
///
/// No reconnect: a closed socket is reported through `connected`.
pub(super) fn connect(
    url: &str,
    mut sinks: StreamSinks,
    connected: RwSignal<bool>,
) -> Result<WebSocket, BridgeError> {
    let ws = WebSocket::new(url).map_err(|e| BridgeError::Socket(super::js_message(&e)))?;
    ws.set_binary_type(BinaryType::Arraybuffer);

    let mut demux = StreamDemux::new();
    let onmessage = Closure::wrap(Box::new(move |ev: MessageEvent| {
        match transport_message(&ev) {
            Some(msg) => {
                demux.feed(msg, &mut sinks);
            }
            None => tracing::warn!("unsupported websocket message type"),
        }
    }) as Box<dyn FnMut(MessageEvent)>);
    ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
    onmessage.forget();

    let url_open = url.to_string();
    let onopen = Closure::wrap(Box::new(move |_ev: web_sys::Event| {
        tracing::info!(url = %url_open, "telemetry connected");
        connected.set(true);
    }) as Box<dyn FnMut(_)>);
    ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
    onopen.forget();

    let onclose = Closure::wrap(Box::new(move |ev: CloseEvent| {
        tracing::warn!(code = ev.code(), reason = %ev.reason(), "telemetry socket closed");
        connected.set(false);
    }) as Box<dyn FnMut(_)>);
    ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
    onclose.forget();

    Ok(ws)
}

/// `requestAnimationFrame` loop drawing the latest frame.
pub(super) fn start_render_loop(renderer: SharedRenderer, error: RwSignal<Option<String>>) {
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
    let next = Rc::clone(&tick);
    let mut reported = false;

    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        if let Some(r) = renderer.borrow_mut().as_mut() {
            if let Err(e) = r.render() {
                if !reported {
                    tracing::warn!(error = %e, "render failed");
                    error.set(Some(e.to_string()));
                    reported = true;
                }
            }
        }
        if let Some(cb) = next.borrow().as_ref() {
            request_frame(cb);
        }
    }) as Box<dyn FnMut()>));

    if let Some(cb) = tick.borrow().as_ref() {
        request_frame(cb);
    }
}

fn request_frame(cb: &Closure<dyn FnMut()>) {
    if let Some(w) = web_sys::window() {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}
