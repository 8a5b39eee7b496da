use toyboy_debugger::persist::{KeyValueStore, PersistError};

use super::js_message;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

/// `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct BrowserStorage;

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        local_storage().and_then(|s| s.get_item(key).ok().flatten())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let storage = local_storage().ok_or(PersistError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| PersistError::Write {
                key: key.to_string(),
                reason: js_message(&e),
            })
    }

    fn remove(&self, key: &str) {
        if let Some(s) = local_storage() {
            let _ = s.remove_item(key);
        }
    }
}
