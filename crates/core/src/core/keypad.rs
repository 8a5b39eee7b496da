//! Keyboard keys forwarded to the emulated joypad.
//!
//! The engine owns the key → button mapping; the client only reports which of
//! the tracked keys are held.

use std::collections::BTreeMap;

/// Key (lower-cased `KeyboardEvent.key`) → pressed.
pub type KeyMap = BTreeMap<String, bool>;

/// Keys the engine's default button mapping uses (d-pad on WASD, A/B on L/K,
/// Start/Select on M/N).
pub const TRACKED_KEYS: [&str; 8] = ["w", "a", "s", "d", "k", "l", "n", "m"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keypad {
    keys: KeyMap,
}

impl Default for Keypad {
    fn default() -> Self {
        Self::new(TRACKED_KEYS)
    }
}

impl Keypad {
    pub fn new<'a>(tracked: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            keys: tracked
                .into_iter()
                .map(|k| (k.to_ascii_lowercase(), false))
                .collect(),
        }
    }

    pub fn keys(&self) -> &KeyMap {
        &self.keys
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    /// Apply a key event. Returns the full map to send when a tracked key
    /// actually changed; auto-repeat and untracked keys return `None`.
    pub fn key_event(&mut self, key: &str, pressed: bool) -> Option<KeyMap> {
        let key = key.to_lowercase();
        let state = self.keys.get_mut(&key)?;
        if *state == pressed {
            return None;
        }
        *state = pressed;
        Some(self.keys.clone())
    }

    /// Release everything (e.g. when the window loses focus). Returns the map
    /// to send if anything was held.
    pub fn release_all(&mut self) -> Option<KeyMap> {
        let mut changed = false;
        for state in self.keys.values_mut() {
            changed |= std::mem::replace(state, false);
        }
        changed.then(|| self.keys.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_key_changes_emit_full_map() {
        let mut pad = Keypad::default();
        let sent = pad.key_event("W", true).expect("w is tracked");
        assert_eq!(sent.len(), TRACKED_KEYS.len());
        assert_eq!(sent.get("w"), Some(&true));
        assert!(sent.iter().filter(|(k, _)| k.as_str() != "w").all(|(_, v)| !v));
    }

    #[test]
    fn repeats_and_untracked_keys_are_silent() {
        let mut pad = Keypad::default();
        assert!(pad.key_event("k", true).is_some());
        assert!(pad.key_event("k", true).is_none());
        assert!(pad.key_event("Enter", true).is_none());
        assert!(pad.key_event("k", false).is_some());
    }

    #[test]
    fn release_all_only_reports_when_something_was_held() {
        let mut pad = Keypad::default();
        assert!(pad.release_all().is_none());
        pad.key_event("a", true);
        pad.key_event("m", true);
        let sent = pad.release_all().unwrap();
        assert!(sent.values().all(|v| !v));
        assert!(!pad.is_pressed("a"));
    }
}
