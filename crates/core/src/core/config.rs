//! Client settings and the engine's own configuration document.

use serde::{Deserialize, Serialize};

use crate::frame::{FRAME_HEIGHT, FRAME_WIDTH};
use crate::keypad::TRACKED_KEYS;
use crate::persist::{self, KeyValueStore, LAYOUT_KEY, ROMS_KEY};

pub const DEFAULT_SOCKET_URL: &str = "ws://localhost:8081/data";
/// Storage key for overrides of [`ClientConfig`].
pub const CLIENT_CONFIG_KEY: &str = "client";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub socket_url: String,
    pub frame_width: usize,
    pub frame_height: usize,
    pub tracked_keys: Vec<String>,
    pub layout_key: String,
    pub roms_key: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_url: DEFAULT_SOCKET_URL.to_string(),
            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
            tracked_keys: TRACKED_KEYS.iter().map(|k| k.to_string()).collect(),
            layout_key: LAYOUT_KEY.to_string(),
            roms_key: ROMS_KEY.to_string(),
        }
    }
}

impl ClientConfig {
    /// Defaults overlaid with whatever fields are stored.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        persist::load_object(store, CLIENT_CONFIG_KEY, Self::default())
    }
}

/// Result of the engine's `GetConfig`, kept as raw JSON; only a few fields
/// are read by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineConfig(pub serde_json::Value);

impl EngineConfig {
    fn at(&self, path: &str) -> Option<&serde_json::Value> {
        self.0.pointer(path)
    }

    /// Emulated clock speed as a percentage of real hardware.
    pub fn speed_percent(&self) -> Option<f64> {
        self.at("/Model/Clock/SpeedPercent")?.as_f64()
    }

    /// Path of the cartridge the engine boots.
    pub fn rom_location(&self) -> Option<&str> {
        self.at("/Model/ROM/Location")?.as_str()
    }

    /// Whether the engine's GUI config shows the named box.
    pub fn panel_shown(&self, gui_name: &str) -> Option<bool> {
        self.0
            .get("GUI")?
            .get(gui_name)?
            .get("Box")?
            .get("Show")?
            .as_bool()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStore;
    use pretty_assertions::assert_eq;

    #[test]
    fn stored_overrides_merge_with_defaults() {
        let store = MemoryStore::new();
        assert_eq!(ClientConfig::load(&store), ClientConfig::default());

        store
            .set(CLIENT_CONFIG_KEY, r#"{"socket_url":"ws://10.0.0.2:9000/data"}"#)
            .unwrap();
        let cfg = ClientConfig::load(&store);
        assert_eq!(cfg.socket_url, "ws://10.0.0.2:9000/data");
        assert_eq!(cfg.layout_key, "boxes");
        assert_eq!(cfg.tracked_keys.len(), 8);
    }

    #[test]
    fn engine_config_accessors() {
        let cfg: EngineConfig = serde_json::from_str(
            r#"{
                "Location": "config.json",
                "Model": {"Clock": {"SpeedPercent": 250.0}, "ROM": {"Location": "roms/tetris.gb"}},
                "GUI": {"WRAMMem": {"Box": {"Show": false, "Height": 0, "Width": 0}}}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.speed_percent(), Some(250.0));
        assert_eq!(cfg.rom_location(), Some("roms/tetris.gb"));
        assert_eq!(cfg.panel_shown("WRAMMem"), Some(false));
        assert_eq!(cfg.panel_shown("OAMMem"), None);
        assert_eq!(EngineConfig::default().speed_percent(), None);
    }
}
