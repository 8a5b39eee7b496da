//! Window-level key listeners feeding the keypad.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;

use super::SessionHandle;

/// Keys typed into an input box are text, not joypad presses.
fn typing(ev: &KeyboardEvent) -> bool {
    ev.target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        .is_some()
}

fn listen<E: JsCast + 'static>(event: &str, mut handler: impl FnMut(E) + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let cb = Closure::wrap(Box::new(move |ev: JsValue| {
        if let Ok(ev) = ev.dyn_into::<E>() {
            handler(ev);
        }
    }) as Box<dyn FnMut(JsValue)>);
    if window
        .add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
        .is_ok()
    {
        cb.forget();
    }
}

pub(super) fn install(session: SessionHandle) {
    for (event, pressed) in [("keydown", true), ("keyup", false)] {
        listen(event, move |ev: KeyboardEvent| {
            if typing(&ev) {
                return;
            }
            session.update_value(|s| {
                s.key_event(&ev.key(), pressed);
            });
        });
    }
    // Keyup never arrives for keys held while the window loses focus.
    listen("blur", move |_ev: web_sys::Event| {
        session.update_value(|s| {
            s.release_keys();
        });
    });
}
