//! Panel and watch inventory, available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! layout and the session wiring on the host.

use toyboy_debugger::config::EngineConfig;
use toyboy_debugger::demux::TextPanel;
use toyboy_debugger::engine::CommandSink;
use toyboy_debugger::field::FieldState;
use toyboy_debugger::float_fmt::{fmt_f64_fixed, fmt_f64_trimmed};
use toyboy_debugger::numeric::{Bounds, NumericFormat};
use toyboy_debugger::panels::PanelMap;
use toyboy_debugger::range_field::RangeFieldState;
use toyboy_debugger::session::DebuggerSession;

/// What a panel's body shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelContent {
    Viewport,
    Controls,
    Text(TextPanel),
    Roms,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelSpec {
    /// Stable id; the engine keys `OpenBoxes` by it.
    pub id: &'static str,
    pub title: &'static str,
    pub expanded: bool,
    pub content: PanelContent,
    /// Box name under `GUI` in the engine's config, if it has one.
    pub engine_box: Option<&'static str>,
}

const fn text(panel: TextPanel, title: &'static str, engine_box: &'static str) -> PanelSpec {
    PanelSpec {
        id: panel.tag(),
        title,
        expanded: false,
        content: PanelContent::Text(panel),
        engine_box: Some(engine_box),
    }
}

pub const PANELS: &[PanelSpec] = &[
    PanelSpec {
        id: "Viewport",
        title: "Viewport",
        expanded: true,
        content: PanelContent::Viewport,
        engine_box: Some("ViewPort"),
    },
    PanelSpec {
        id: "Debugger",
        title: "Debugger",
        expanded: true,
        content: PanelContent::Controls,
        engine_box: Some("Debugger"),
    },
    text(TextPanel::Clock, "Timing", "Timing"),
    text(TextPanel::CpuRegisters, "CPU Registers", "Registers"),
    text(TextPanel::PpuRegisters, "PPU", "PPU"),
    text(TextPanel::ApuRegisters, "APU", "APU"),
    text(TextPanel::Disassembly, "Disassembly", "Disassembly"),
    text(TextPanel::Hram, "HRAM", "HRAMMem"),
    text(TextPanel::Wram, "WRAM", "WRAMMem"),
    text(TextPanel::Oam, "OAM", "OAMMem"),
    PanelSpec {
        id: "Roms",
        title: "ROMs",
        expanded: true,
        content: PanelContent::Roms,
        engine_box: None,
    },
];

pub fn panel(id: &str) -> Option<&'static PanelSpec> {
    PANELS.iter().find(|p| p.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberWatchSpec {
    pub id: &'static str,
    pub label: &'static str,
    /// Panel the input is rendered in.
    pub panel: &'static str,
    pub format: NumericFormat,
    pub bounds: Bounds,
    pub initial: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeWatchSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub panel: &'static str,
    pub format: NumericFormat,
    pub bounds: Bounds,
    pub initial: (&'static str, &'static str),
}

const ADDRESS: Bounds = Bounds::new(0.0, 65535.0);

pub const NUMBER_WATCHES: &[NumberWatchSpec] = &[NumberWatchSpec {
    id: "TargetSpeed",
    label: "Target speed (%)",
    panel: "Clock",
    format: NumericFormat::Float,
    bounds: Bounds::new(1.0, 10000.0),
    initial: "100",
}];

pub const RANGE_WATCHES: &[RangeWatchSpec] = &[
    RangeWatchSpec {
        id: "Disassembly",
        label: "Address range",
        panel: "Disassembly",
        format: NumericFormat::Hexadecimal,
        bounds: ADDRESS,
        initial: ("", ""),
    },
    RangeWatchSpec {
        id: "WRAM",
        label: "Address range",
        panel: "WRAM",
        format: NumericFormat::Hexadecimal,
        bounds: ADDRESS,
        initial: ("C000", "DFFF"),
    },
];

pub fn number_watches_in(panel: &str) -> impl Iterator<Item = &'static NumberWatchSpec> + '_ {
    NUMBER_WATCHES.iter().filter(move |w| w.panel == panel)
}

pub fn range_watches_in(panel: &str) -> impl Iterator<Item = &'static RangeWatchSpec> + '_ {
    RANGE_WATCHES.iter().filter(move |w| w.panel == panel)
}

/// Session with every panel and watch input registered. Sends the initial
/// request.
pub fn build_session<C>(commands: C, saved_layout: &PanelMap) -> DebuggerSession<C>
where
    C: CommandSink + Clone + 'static,
{
    let mut session = DebuggerSession::new(
        commands,
        PANELS.iter().map(|p| (p.id, p.expanded)),
        saved_layout,
    );
    for w in NUMBER_WATCHES {
        session.add_field(FieldState::new(w.id, w.format, w.bounds, w.initial));
    }
    for w in RANGE_WATCHES {
        session.add_range(RangeFieldState::new(
            w.id, w.format, w.bounds, w.initial.0, w.initial.1,
        ));
    }
    session
}

/// Panel visibility taken from the engine's GUI config.
pub fn engine_layout(config: &EngineConfig) -> PanelMap {
    PANELS
        .iter()
        .filter_map(|p| {
            let shown = config.panel_shown(p.engine_box?)?;
            Some((p.id.to_string(), shown))
        })
        .collect()
}

/// Topbar text for the engine's clock speed.
pub fn speed_label(percent: Option<f64>) -> String {
    percent
        .map(|p| format!("engine speed {}%", fmt_f64_trimmed(p, 2)))
        .unwrap_or_default()
}

/// ROM list size column, in kB with one decimal.
pub fn rom_size_label(bytes: usize) -> String {
    format!(" ({} kB)", fmt_f64_fixed(bytes as f64 / 1024.0, 1))
}
