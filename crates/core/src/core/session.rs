//! The debugger session: panel layout, watch inputs and keypad wired to one
//! outbound command sink.
//!
//! One session is built by the application root and lives for the whole run.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::engine::{CommandSink, EngineCommand};
use crate::field::FieldState;
use crate::keypad::Keypad;
use crate::numeric::FieldStatus;
use crate::panels::{PanelMap, PanelRegistry, SubscriptionHandle};
use crate::range_field::{RangeFieldState, RangeRejection};
use crate::watch::{WatchAggregator, WatchDocument};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfirmError {
    #[error("no watch input named {0}")]
    UnknownInput(String),
    #[error("value not confirmable ({0:?})")]
    Rejected(FieldStatus),
    #[error("range not confirmable ({0:?})")]
    RangeRejected(RangeRejection),
}

pub struct DebuggerSession<C: CommandSink + Clone + 'static> {
    panels: PanelRegistry,
    watches: Rc<RefCell<WatchAggregator<C>>>,
    commands: C,
    fields: BTreeMap<String, FieldState>,
    ranges: BTreeMap<String, RangeFieldState>,
    keypad: Keypad,
}

impl<C: CommandSink + Clone + 'static> DebuggerSession<C> {
    /// Register `panels` (id, default expanded), overlay the saved layout, and
    /// send the initial request carrying the full panel mapping.
    pub fn new<'a>(
        commands: C,
        panels: impl IntoIterator<Item = (&'a str, bool)>,
        saved_layout: &PanelMap,
    ) -> Self {
        let mut registry = PanelRegistry::new();
        for (id, expanded) in panels {
            registry.register(id, expanded);
        }
        registry.apply_snapshot(saved_layout);

        let watches = Rc::new(RefCell::new(WatchAggregator::new(commands.clone())));
        watches.borrow_mut().panels_changed(&registry.snapshot());
        let sink = Rc::clone(&watches);
        registry.subscribe(move |m| sink.borrow_mut().panels_changed(m));

        tracing::info!(panels = registry.snapshot().len(), "debugger session started");
        Self {
            panels: registry,
            watches,
            commands,
            fields: BTreeMap::new(),
            ranges: BTreeMap::new(),
            keypad: Keypad::default(),
        }
    }

    pub fn with_keypad(mut self, keypad: Keypad) -> Self {
        self.keypad = keypad;
        self
    }

    pub fn panels(&self) -> &PanelRegistry {
        &self.panels
    }

    pub fn toggle_panel(&mut self, id: &str) -> bool {
        self.panels.toggle_panel(id)
    }

    pub fn set_panel(&mut self, id: &str, expanded: bool) -> bool {
        self.panels.set_panel(id, expanded)
    }

    /// Engine-authoritative layout. Sends nothing.
    pub fn apply_snapshot(&mut self, snapshot: &PanelMap) -> usize {
        let applied = self.panels.apply_snapshot(snapshot);
        self.watches.borrow_mut().sync_panels(&self.panels.snapshot());
        applied
    }

    /// Extra panel listener (e.g. layout persistence).
    pub fn subscribe_panels(
        &mut self,
        listener: impl FnMut(&PanelMap) + 'static,
    ) -> SubscriptionHandle {
        self.panels.subscribe(listener)
    }

    pub fn unsubscribe_panels(&mut self, handle: SubscriptionHandle) -> bool {
        self.panels.unsubscribe(handle)
    }

    pub fn add_field(&mut self, field: FieldState) {
        self.fields.insert(field.id().to_string(), field);
    }

    pub fn add_range(&mut self, range: RangeFieldState) {
        self.ranges.insert(range.id().to_string(), range);
    }

    pub fn field(&self, id: &str) -> Option<&FieldState> {
        self.fields.get(id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut FieldState> {
        self.fields.get_mut(id)
    }

    pub fn range(&self, id: &str) -> Option<&RangeFieldState> {
        self.ranges.get(id)
    }

    pub fn range_mut(&mut self, id: &str) -> Option<&mut RangeFieldState> {
        self.ranges.get_mut(id)
    }

    pub fn confirm_number(&mut self, id: &str) -> Result<f64, ConfirmError> {
        let field = self
            .fields
            .get_mut(id)
            .ok_or_else(|| ConfirmError::UnknownInput(id.to_string()))?;
        let mut watches = self.watches.borrow_mut();
        field.confirm(&mut *watches).map_err(ConfirmError::Rejected)
    }

    pub fn confirm_range(&mut self, id: &str) -> Result<(f64, f64), ConfirmError> {
        let range = self
            .ranges
            .get_mut(id)
            .ok_or_else(|| ConfirmError::UnknownInput(id.to_string()))?;
        let mut watches = self.watches.borrow_mut();
        range
            .confirm(&mut *watches)
            .map(|r| (r.begin, r.end))
            .map_err(ConfirmError::RangeRejected)
    }

    /// Copy of the document as it stands between requests.
    pub fn document(&self) -> WatchDocument {
        self.watches.borrow().document().clone()
    }

    pub fn requests_sent(&self) -> u64 {
        self.watches.borrow().sent()
    }

    pub fn keypad(&self) -> &Keypad {
        &self.keypad
    }

    /// Returns whether the key map was sent.
    pub fn key_event(&mut self, key: &str, pressed: bool) -> bool {
        match self.keypad.key_event(key, pressed) {
            Some(keys) => {
                self.commands.dispatch(EngineCommand::SetKeyState(keys));
                true
            }
            None => false,
        }
    }

    pub fn release_keys(&mut self) -> bool {
        match self.keypad.release_all() {
            Some(keys) => {
                self.commands.dispatch(EngineCommand::SetKeyState(keys));
                true
            }
            None => false,
        }
    }

    /// Pass-through for the control buttons.
    pub fn send(&self, command: EngineCommand) {
        tracing::debug!(method = command.method(), "engine command");
        self.commands.dispatch(command);
    }
}
