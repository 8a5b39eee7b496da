//! Uploaded cartridge images kept in localStorage.

use leptos::prelude::*;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use toyboy_debugger::persist::RomCatalogue;

use super::storage::BrowserStorage;
use crate::ui_model::rom_size_label;

#[derive(Debug, Clone, PartialEq)]
struct RomRow {
    name: String,
    size: usize,
}

fn rows(roms: &RomCatalogue) -> Vec<RomRow> {
    roms.entries()
        .map(|r| RomRow {
            name: r.name.clone(),
            size: r.size,
        })
        .collect()
}

fn download_bytes(filename: &str, bytes: &[u8]) -> Result<(), String> {
    let window = web_sys::window().ok_or("no window".to_string())?;
    let document = window.document().ok_or("no document".to_string())?;

    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&array.buffer());
    let blob = web_sys::Blob::new_with_u8_array_sequence(&parts)
        .map_err(|_| "blob: failed to create".to_string())?;
    let url = web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|_| "url: create_object_url failed".to_string())?;

    let a = document
        .create_element("a")
        .map_err(|_| "document: create_element failed".to_string())?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "document: anchor cast failed".to_string())?;
    a.set_href(&url);
    a.set_download(filename);
    a.click();

    let _ = web_sys::Url::revoke_object_url(&url);
    Ok(())
}

async fn read_file_bytes(file: web_sys::File) -> Result<Vec<u8>, String> {
    let reader = web_sys::FileReader::new().map_err(|_| "FileReader::new failed".to_string())?;
    reader
        .read_as_array_buffer(&file)
        .map_err(|_| "read_as_array_buffer failed".to_string())?;

    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        let reader_ok = reader.clone();
        let reject_err = reject.clone();
        let onload = Closure::wrap(Box::new(move |_ev: web_sys::ProgressEvent| {
            match reader_ok.result() {
                Ok(v) if !v.is_null() && !v.is_undefined() => {
                    let _ = resolve.call1(&JsValue::UNDEFINED, &v);
                }
                _ => {
                    let _ = reject.call1(&JsValue::UNDEFINED, &JsValue::from_str("missing result"));
                }
            }
        }) as Box<dyn FnMut(_)>);
        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        onload.forget();

        let onerror = Closure::wrap(Box::new(move |_ev: web_sys::ProgressEvent| {
            let _ = reject_err.call1(&JsValue::UNDEFINED, &JsValue::from_str("read error"));
        }) as Box<dyn FnMut(_)>);
        reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();
    });

    let v = wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map_err(|e| super::js_message(&e))?;
    let buf = v
        .dyn_into::<js_sys::ArrayBuffer>()
        .map_err(|_| "expected ArrayBuffer".to_string())?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}

#[component]
pub(super) fn RomsPanel(roms_key: String, error: RwSignal<Option<String>>) -> impl IntoView {
    let key = StoredValue::new(roms_key);
    let load = move || key.with_value(|k| RomCatalogue::load(&BrowserStorage, k));
    let listing = RwSignal::new(rows(&load()));

    let save = move |roms: &RomCatalogue| {
        if let Err(e) = key.with_value(|k| roms.save(&BrowserStorage, k)) {
            tracing::warn!(error = %e, "failed to store ROM catalogue");
            error.set(Some(format!("Could not store ROMs: {e}")));
        }
        listing.set(rows(roms));
    };

    let on_upload = move |ev: leptos::ev::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(files) = input.files() else {
            return;
        };
        let files: Vec<web_sys::File> = (0..files.length()).filter_map(|i| files.get(i)).collect();
        input.set_value("");
        wasm_bindgen_futures::spawn_local(async move {
            let mut roms = load();
            for file in files {
                let name = file.name();
                match read_file_bytes(file).await {
                    Ok(bytes) => {
                        roms.add(&name, &bytes, js_sys::Date::now() as u64);
                    }
                    Err(e) => {
                        tracing::warn!(rom = %name, error = %e, "failed to read ROM");
                        error.set(Some(format!("Could not read {name}: {e}")));
                    }
                }
            }
            save(&roms);
        });
    };

    let remove = move |name: String| {
        let mut roms = load();
        if roms.remove(&name) {
            save(&roms);
        }
    };

    let download = move |name: String| {
        let result = load()
            .bytes(&name)
            .map_err(|e| e.to_string())
            .and_then(|bytes| download_bytes(&name, &bytes));
        if let Err(e) = result {
            error.set(Some(format!("Could not export {name}: {e}")));
        }
    };

    view! {
        <div class="roms">
            <label class="btn sm">
                "Upload ROM…"
                <input type="file" accept=".gb,.gbc" multiple=true style="display: none;" on:change=on_upload />
            </label>
            <Show
                when=move || !listing.with(|l| l.is_empty())
                fallback=|| view! { <p class="subtle">"No files uploaded yet"</p> }
            >
                <ul class="rom-list">
                    <For
                        each=move || listing.get()
                        key=|r| r.name.clone()
                        children=move |r| {
                            let dl = r.name.clone();
                            let rm = r.name.clone();
                            view! {
                                <li class="rom">
                                    <strong>{r.name.clone()}</strong>
                                    <span class="subtle">{rom_size_label(r.size)}</span>
                                    <button class="btn sm ghost" on:click=move |_| download(dl.clone())>
                                        "Export"
                                    </button>
                                    <button class="btn sm ghost" on:click=move |_| remove(rm.clone())>
                                        "Delete"
                                    </button>
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
        </div>
    }
}
