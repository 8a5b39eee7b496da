//! Calls into the desktop shell's `window.go.main.App` binding.

use js_sys::{Array, Function, Promise, Reflect, JSON};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use toyboy_debugger::config::EngineConfig;
use toyboy_debugger::engine::{CommandSink, EngineCommand};

use super::js_message;

#[derive(Debug, thiserror::Error)]
pub(super) enum BridgeError {
    #[error("engine binding window.go.main.App is missing")]
    Missing,
    #[error("engine binding has no method {0}")]
    NoMethod(String),
    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{method} failed: {message}")]
    Call { method: String, message: String },
    #[error("telemetry socket: {0}")]
    Socket(String),
}

fn binding() -> Result<JsValue, BridgeError> {
    let mut obj: JsValue = web_sys::window().ok_or(BridgeError::Missing)?.into();
    for key in ["go", "main", "App"] {
        obj = Reflect::get(&obj, &JsValue::from_str(key)).map_err(|_| BridgeError::Missing)?;
        if obj.is_undefined() || obj.is_null() {
            return Err(BridgeError::Missing);
        }
    }
    Ok(obj)
}

fn call(method: &str, args: Vec<serde_json::Value>) -> Result<Promise, BridgeError> {
    let app = binding()?;
    let func = Reflect::get(&app, &JsValue::from_str(method))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
        .ok_or_else(|| BridgeError::NoMethod(method.to_string()))?;

    let call_err = |e: JsValue| BridgeError::Call {
        method: method.to_string(),
        message: js_message(&e),
    };
    let js_args = Array::new();
    for arg in args {
        js_args.push(&JSON::parse(&serde_json::to_string(&arg)?).map_err(call_err)?);
    }
    let ret = func.apply(&app, &js_args).map_err(call_err)?;
    Ok(Promise::resolve(&ret))
}

/// Fire-and-forget engine commands; failures are only logged.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct AppBinding;

impl CommandSink for AppBinding {
    fn dispatch(&self, command: EngineCommand) {
        let method = command.method();
        let promise = match command
            .arguments()
            .map_err(BridgeError::from)
            .and_then(|args| call(method, args))
        {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(%method, error = %e, "engine call failed");
                return;
            }
        };
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                tracing::warn!(%method, error = %js_message(&e), "engine call rejected");
            }
        });
    }
}

/// `GetConfig`, the one engine call whose answer is awaited.
pub(super) async fn get_config() -> Result<EngineConfig, BridgeError> {
    let call_err = |e: JsValue| BridgeError::Call {
        method: "GetConfig".to_string(),
        message: js_message(&e),
    };
    let value = JsFuture::from(call("GetConfig", Vec::new())?)
        .await
        .map_err(call_err)?;
    let text = JSON::stringify(&value)
        .map_err(call_err)?
        .as_string()
        .unwrap_or_else(|| "null".to_string());
    Ok(EngineConfig(serde_json::from_str(&text)?))
}
