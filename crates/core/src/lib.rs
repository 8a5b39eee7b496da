//! # toyboy_debugger
//!
//! Host-side logic of the toyboy debugger client: everything between the DOM
//! and the emulation engine that can be exercised without a browser.
//!
//! ## Quick Start
//!
//! ```
//! use toyboy_debugger::prelude::*;
//!
//! let engine = CommandLog::new();
//! let mut session = DebuggerSession::new(
//!     engine.clone(),
//!     [("CPURegisters", true), ("WRAM", false)],
//!     &PanelMap::new(),
//! );
//! session.add_field(FieldState::new(
//!     "TargetSpeed",
//!     NumericFormat::Float,
//!     Bounds::new(1.0, 10000.0),
//!     "100",
//! ));
//!
//! session.toggle_panel("WRAM");
//! session.field_mut("TargetSpeed").unwrap().set_text("200");
//! session.confirm_number("TargetSpeed").unwrap();
//!
//! // startup + toggle + confirm
//! assert_eq!(engine.take_requests().len(), 3);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): wire serialization, persisted objects and config
//!
//! ## Modules
//!
//! - [`numeric`], [`field`], [`range_field`]: numeric input validation
//! - [`panels`], [`watch`], [`session`]: inspection intent → engine requests
//! - [`demux`], [`frame`]: inbound telemetry stream
//! - [`engine`], [`keypad`]: outbound commands

#[path = "core/float_fmt.rs"]
pub mod float_fmt;

#[path = "core/numeric.rs"]
pub mod numeric;

#[path = "core/field.rs"]
pub mod field;

#[path = "core/range_field.rs"]
pub mod range_field;

#[path = "core/panels.rs"]
pub mod panels;

#[path = "core/watch.rs"]
pub mod watch;

#[path = "core/engine.rs"]
pub mod engine;

#[path = "core/keypad.rs"]
pub mod keypad;

#[path = "core/session.rs"]
pub mod session;

#[path = "core/demux.rs"]
pub mod demux;

#[path = "core/time.rs"]
pub mod time;

#[path = "core/frame.rs"]
pub mod frame;

#[cfg(feature = "serde")]
#[path = "core/persist.rs"]
pub mod persist;

#[cfg(feature = "serde")]
#[path = "core/config.rs"]
pub mod config;

/// Prelude module for convenient imports.
///
/// ```
/// use toyboy_debugger::prelude::*;
/// ```
pub mod prelude {
    pub use crate::demux::{Route, RunState, StreamDemux, TelemetrySink, TextPanel, TransportMessage};
    pub use crate::engine::{CommandLog, CommandSink, EngineCommand};
    pub use crate::field::FieldState;
    pub use crate::frame::{FrameRateMeter, FrameRenderer, Surface, FRAME_HEIGHT, FRAME_WIDTH};
    pub use crate::keypad::{KeyMap, Keypad};
    pub use crate::numeric::{Bounds, FieldStatus, NumericFormat};
    pub use crate::panels::{PanelMap, PanelRegistry, SubscriptionHandle};
    pub use crate::range_field::RangeFieldState;
    pub use crate::session::DebuggerSession;
    pub use crate::watch::{RangeWatch, WatchDocument};
}
