//! Open/collapsed state of the named debugger panels.

use std::collections::BTreeMap;

/// Panel id → expanded.
pub type PanelMap = BTreeMap<String, bool>;

/// Returned by [`PanelRegistry::subscribe`]; pass back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Listener = Box<dyn FnMut(&PanelMap)>;

/// Listeners get a snapshot of the whole mapping after every local change.
///
/// Listeners must not call back into the registry: the web shell keeps it in a
/// `RefCell` and a re-entrant borrow would panic.
#[derive(Default)]
pub struct PanelRegistry {
    states: PanelMap,
    listeners: Vec<(SubscriptionHandle, Listener)>,
    next_handle: u64,
}

impl std::fmt::Debug for PanelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelRegistry")
            .field("states", &self.states)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl PanelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start-up registration. Does not notify.
    pub fn register(&mut self, id: impl Into<String>, expanded: bool) {
        self.states.insert(id.into(), expanded);
    }

    pub fn get(&self, id: &str) -> Option<bool> {
        self.states.get(id).copied()
    }

    pub fn is_expanded(&self, id: &str) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.states.contains_key(id)
    }

    /// Copy of the full mapping.
    pub fn snapshot(&self) -> PanelMap {
        self.states.clone()
    }

    /// Store and notify. Returns `false` (and does nothing) for an id that was
    /// never registered.
    pub fn set_panel(&mut self, id: &str, expanded: bool) -> bool {
        let Some(state) = self.states.get_mut(id) else {
            tracing::debug!(panel = %id, "ignoring change to unknown panel");
            return false;
        };
        *state = expanded;
        self.notify();
        true
    }

    /// Flip a panel and return its new state. Unknown panels stay unknown and
    /// report collapsed.
    pub fn toggle_panel(&mut self, id: &str) -> bool {
        let expanded = !self.is_expanded(id);
        self.set_panel(id, expanded) && expanded
    }

    /// Overwrite known panels with engine-provided state, without notifying.
    ///
    /// Ids that were never registered are ignored. Returns how many entries
    /// were applied.
    pub fn apply_snapshot(&mut self, snapshot: &PanelMap) -> usize {
        let mut applied = 0;
        for (id, &expanded) in snapshot {
            match self.states.get_mut(id) {
                Some(state) => {
                    *state = expanded;
                    applied += 1;
                }
                None => tracing::debug!(panel = %id, "ignoring snapshot entry for unknown panel"),
            }
        }
        applied
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&PanelMap) + 'static) -> SubscriptionHandle {
        let handle = SubscriptionHandle(self.next_handle);
        self.next_handle += 1;
        self.listeners.push((handle, Box::new(listener)));
        handle
    }

    /// Returns `false` if the handle was not (or no longer) subscribed.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(h, _)| *h != handle);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let snapshot = self.snapshot();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&snapshot);
        }
    }
}
