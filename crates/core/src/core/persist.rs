//! JSON objects kept in a string key-value store (browser `localStorage`).
//!
//! Loading never fails: a missing key yields the default, and a corrupt entry
//! is deleted before the default is returned so it cannot poison later loads.

use std::cell::RefCell;
use std::collections::BTreeMap;

use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::panels::PanelMap;

pub const LAYOUT_KEY: &str = "boxes";
pub const ROMS_KEY: &str = "roms";

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no ROM named {0}")]
    UnknownRom(String),
    #[error("ROM {name} has corrupt data: {source}")]
    CorruptRom {
        name: String,
        source: base64::DecodeError,
    },
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str);
}

/// Store backed by a map; used headless and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// Load the JSON object stored under `key`, or `default`.
///
/// Malformed JSON, a non-object value, or an object that does not fit `T`
/// removes the entry.
pub fn load_object<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    let Some(raw) = store.get(key) else {
        return default;
    };
    let parsed = serde_json::from_str::<serde_json::Value>(&raw)
        .map_err(|e| e.to_string())
        .and_then(|v| match v {
            serde_json::Value::Object(_) => {
                serde_json::from_value::<T>(v).map_err(|e| e.to_string())
            }
            _ => Err("not a JSON object".to_string()),
        });
    match parsed {
        Ok(obj) => obj,
        Err(reason) => {
            tracing::warn!(%key, %reason, "discarding corrupt stored object");
            store.remove(key);
            default
        }
    }
}

pub fn store_object<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), PersistError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

/// Saved panel layout (empty when nothing is stored).
pub fn load_layout(store: &dyn KeyValueStore, key: &str) -> PanelMap {
    load_object(store, key, PanelMap::new())
}

pub fn store_layout(
    store: &dyn KeyValueStore,
    key: &str,
    panels: &PanelMap,
) -> Result<(), PersistError> {
    store_object(store, key, panels)
}

/// One uploaded cartridge image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RomEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Size")]
    pub size: usize,
    /// Standard base64 with padding.
    #[serde(rename = "Data")]
    pub data: String,
    /// Upload time, milliseconds since the Unix epoch.
    #[serde(rename = "Time")]
    pub time_ms: u64,
}

impl RomEntry {
    pub fn new(name: impl Into<String>, bytes: &[u8], time_ms: u64) -> Self {
        Self {
            name: name.into(),
            size: bytes.len(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            time_ms,
        }
    }

    pub fn decode(&self) -> Result<Vec<u8>, PersistError> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.data)
            .map_err(|source| PersistError::CorruptRom {
                name: self.name.clone(),
                source,
            })
    }
}

/// ROM name → entry. Re-uploading a name replaces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RomCatalogue {
    roms: BTreeMap<String, RomEntry>,
}

impl RomCatalogue {
    pub fn load(store: &dyn KeyValueStore, key: &str) -> Self {
        load_object(store, key, Self::default())
    }

    pub fn save(&self, store: &dyn KeyValueStore, key: &str) -> Result<(), PersistError> {
        store_object(store, key, self)
    }

    pub fn len(&self) -> usize {
        self.roms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roms.is_empty()
    }

    /// Entries in name order.
    pub fn entries(&self) -> impl Iterator<Item = &RomEntry> {
        self.roms.values()
    }

    pub fn get(&self, name: &str) -> Option<&RomEntry> {
        self.roms.get(name)
    }

    pub fn add(&mut self, name: &str, bytes: &[u8], time_ms: u64) -> &RomEntry {
        tracing::info!(rom = %name, size = bytes.len(), "adding ROM");
        self.roms
            .insert(name.to_string(), RomEntry::new(name, bytes, time_ms));
        &self.roms[name]
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.roms.remove(name).is_some()
    }

    pub fn bytes(&self, name: &str) -> Result<Vec<u8>, PersistError> {
        self.get(name)
            .ok_or_else(|| PersistError::UnknownRom(name.to_string()))?
            .decode()
    }
}
