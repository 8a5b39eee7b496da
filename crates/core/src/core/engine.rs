//! One-way commands to the emulation engine.
//!
//! The engine is reached through an opaque binding; nothing here waits for an
//! answer. The one query that does return data (`GetConfig`) lives with the
//! browser bridge because it is inherently async.

use std::cell::RefCell;
use std::rc::Rc;

use crate::keypad::KeyMap;
use crate::watch::WatchDocument;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineCommand {
    Start,
    Pause,
    Step,
    Load,
    Save,
    SetKeyState(KeyMap),
    MachineStateRequest(WatchDocument),
    StartWebSocketServer,
}

impl EngineCommand {
    /// Method name on the engine binding object.
    pub fn method(&self) -> &'static str {
        match self {
            EngineCommand::Start => "Start",
            EngineCommand::Pause => "Pause",
            EngineCommand::Step => "Step",
            EngineCommand::Load => "Load",
            EngineCommand::Save => "Save",
            EngineCommand::SetKeyState(_) => "SetKeyState",
            EngineCommand::MachineStateRequest(_) => "MachineStateRequest",
            EngineCommand::StartWebSocketServer => "StartWebSocketServer",
        }
    }

    /// Positional arguments as JSON values.
    #[cfg(feature = "serde")]
    pub fn arguments(&self) -> Result<Vec<serde_json::Value>, serde_json::Error> {
        Ok(match self {
            EngineCommand::SetKeyState(keys) => vec![serde_json::to_value(keys)?],
            EngineCommand::MachineStateRequest(doc) => vec![serde_json::to_value(doc)?],
            EngineCommand::Start
            | EngineCommand::Pause
            | EngineCommand::Step
            | EngineCommand::Load
            | EngineCommand::Save
            | EngineCommand::StartWebSocketServer => Vec::new(),
        })
    }
}

/// Fire-and-forget command dispatch.
///
/// Implementations must not block and must not surface failures to the
/// caller; a failed call is at most logged.
pub trait CommandSink {
    fn dispatch(&self, command: EngineCommand);
}

impl<T: CommandSink + ?Sized> CommandSink for &T {
    fn dispatch(&self, command: EngineCommand) {
        (**self).dispatch(command)
    }
}

impl<T: CommandSink + ?Sized> CommandSink for Rc<T> {
    fn dispatch(&self, command: EngineCommand) {
        (**self).dispatch(command)
    }
}

/// In-memory sink that records every command, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    commands: Rc<RefCell<Vec<EngineCommand>>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }

    /// Drain everything recorded so far.
    pub fn take(&self) -> Vec<EngineCommand> {
        std::mem::take(&mut *self.commands.borrow_mut())
    }

    /// Drain and keep only the state requests.
    pub fn take_requests(&self) -> Vec<WatchDocument> {
        self.take()
            .into_iter()
            .filter_map(|c| match c {
                EngineCommand::MachineStateRequest(doc) => Some(doc),
                _ => None,
            })
            .collect()
    }
}

impl CommandSink for CommandLog {
    fn dispatch(&self, command: EngineCommand) {
        tracing::trace!(method = command.method(), "recorded engine command");
        self.commands.borrow_mut().push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_match_binding() {
        assert_eq!(EngineCommand::Start.method(), "Start");
        assert_eq!(
            EngineCommand::MachineStateRequest(WatchDocument::default()).method(),
            "MachineStateRequest"
        );
        assert_eq!(
            EngineCommand::StartWebSocketServer.method(),
            "StartWebSocketServer"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn only_payload_commands_carry_arguments() {
        assert!(EngineCommand::Step.arguments().unwrap().is_empty());

        let mut keys = KeyMap::new();
        keys.insert("w".to_string(), true);
        let args = EngineCommand::SetKeyState(keys).arguments().unwrap();
        assert_eq!(args, vec![serde_json::json!({ "w": true })]);
    }

    #[test]
    fn log_drains() {
        let log = CommandLog::new();
        let sink: &dyn CommandSink = &log;
        sink.dispatch(EngineCommand::Pause);
        sink.dispatch(EngineCommand::MachineStateRequest(WatchDocument::default()));
        assert_eq!(log.len(), 2);
        assert_eq!(log.take_requests().len(), 1);
        assert!(log.is_empty());
    }
}
