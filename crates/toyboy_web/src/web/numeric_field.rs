//! Watch inputs. Field state lives in the session; these components mirror it
//! into signals after every edit.

use leptos::ev::KeyboardEvent;
use leptos::prelude::*;

use toyboy_debugger::numeric::{FieldStatus, NumericFormat};

use super::SessionHandle;
use crate::ui_model::{NumberWatchSpec, RangeWatchSpec};

fn input_class(status: FieldStatus) -> String {
    format!("num-input {}", status.css_class())
}

#[component]
fn FormatToggle(format: RwSignal<NumericFormat>, on_toggle: Callback<()>) -> impl IntoView {
    view! {
        <Show when=move || format.get().is_integer()>
            <button
                type="button"
                class="btn sm ghost format-toggle"
                title="Switch between decimal and hexadecimal"
                on:click=move |_| on_toggle.run(())
            >
                {move || format.get().label()}
            </button>
        </Show>
    }
}

#[component]
pub(super) fn NumberField(spec: &'static NumberWatchSpec, session: SessionHandle) -> impl IntoView {
    let id = spec.id;
    let read = move || {
        session.with_value(|s| {
            s.field(id)
                .map(|f| (f.text().to_string(), f.status(), f.format()))
        })
    };
    let (t0, s0, f0) = read().unwrap_or((String::new(), FieldStatus::Empty, spec.format));
    let text = RwSignal::new(t0);
    let status = RwSignal::new(s0);
    let format = RwSignal::new(f0);
    let sync = move || {
        if let Some((t, s, f)) = read() {
            text.set(t);
            status.set(s);
            format.set(f);
        }
    };

    let confirm = move || {
        session.update_value(|s| match s.confirm_number(id) {
            Ok(v) => tracing::debug!(watch = %id, value = v, "watch confirmed"),
            Err(e) => tracing::debug!(watch = %id, error = %e, "watch not confirmed"),
        });
        sync();
    };
    let on_toggle = Callback::new(move |_| {
        session.update_value(|s| {
            if let Some(f) = s.field_mut(id) {
                f.toggle_format();
            }
        });
        sync();
    });

    view! {
        <div class="watch-field">
            <label class="watch-label" for=format!("watch-{id}")>{spec.label}</label>
            <div class="watch-input-row">
                <input
                    id=format!("watch-{id}")
                    class=move || input_class(status.get())
                    type="text"
                    spellcheck="false"
                    prop:value=move || text.get()
                    on:input=move |ev| {
                        let raw = event_target_value(&ev);
                        session.update_value(|s| {
                            if let Some(f) = s.field_mut(id) {
                                f.set_text(raw);
                            }
                        });
                        sync();
                    }
                    on:keydown=move |ev: KeyboardEvent| {
                        if ev.key() == "Enter" {
                            ev.prevent_default();
                            confirm();
                        }
                    }
                />
                <FormatToggle format=format on_toggle=on_toggle />
                <button
                    type="button"
                    class="btn sm"
                    disabled=move || !status.get().can_confirm()
                    on:click=move |_| confirm()
                >
                    "Set"
                </button>
            </div>
        </div>
    }
}

#[component]
pub(super) fn RangeField(spec: &'static RangeWatchSpec, session: SessionHandle) -> impl IntoView {
    let id = spec.id;
    let read = move || {
        session.with_value(|s| {
            s.range(id).map(|r| {
                (
                    (r.lower_text().to_string(), r.upper_text().to_string()),
                    r.statuses(),
                    r.format(),
                )
            })
        })
    };
    let (t0, s0, f0) = read().unwrap_or((
        (String::new(), String::new()),
        (FieldStatus::Empty, FieldStatus::Empty),
        spec.format,
    ));
    let lower = RwSignal::new(t0.0);
    let upper = RwSignal::new(t0.1);
    let statuses = RwSignal::new(s0);
    let format = RwSignal::new(f0);
    let sync = move || {
        if let Some(((lo, hi), st, f)) = read() {
            lower.set(lo);
            upper.set(hi);
            statuses.set(st);
            format.set(f);
        }
    };

    let confirm = move || {
        session.update_value(|s| match s.confirm_range(id) {
            Ok((begin, end)) => tracing::debug!(watch = %id, begin, end, "range confirmed"),
            Err(e) => tracing::debug!(watch = %id, error = %e, "range not confirmed"),
        });
        sync();
    };
    let on_toggle = Callback::new(move |_| {
        session.update_value(|s| {
            if let Some(r) = s.range_mut(id) {
                r.toggle_format();
            }
        });
        sync();
    });
    let on_enter = move |ev: KeyboardEvent| {
        if ev.key() == "Enter" {
            ev.prevent_default();
            confirm();
        }
    };
    let can_confirm = move || {
        let (lo, hi) = statuses.get();
        lo.can_confirm() && hi.can_confirm()
    };

    view! {
        <div class="watch-field">
            <span class="watch-label">{spec.label}</span>
            <div class="watch-input-row">
                <input
                    class=move || input_class(statuses.get().0)
                    type="text"
                    spellcheck="false"
                    aria-label="Begin"
                    prop:value=move || lower.get()
                    on:input=move |ev| {
                        let raw = event_target_value(&ev);
                        session.update_value(|s| {
                            if let Some(r) = s.range_mut(id) {
                                r.set_lower_text(raw);
                            }
                        });
                        sync();
                    }
                    on:keydown=on_enter
                />
                <span class="range-sep">"-"</span>
                <input
                    class=move || input_class(statuses.get().1)
                    type="text"
                    spellcheck="false"
                    aria-label="End"
                    prop:value=move || upper.get()
                    on:input=move |ev| {
                        let raw = event_target_value(&ev);
                        session.update_value(|s| {
                            if let Some(r) = s.range_mut(id) {
                                r.set_upper_text(raw);
                            }
                        });
                        sync();
                    }
                    on:keydown=on_enter
                />
                <FormatToggle format=format on_toggle=on_toggle />
                <button
                    type="button"
                    class="btn sm"
                    disabled=move || !can_confirm()
                    on:click=move |_| confirm()
                >
                    "Set"
                </button>
            </div>
        </div>
    }
}
