//! Tagged telemetry stream: (text tag, binary payload) message pairs.
//!
//! The engine writes a text message naming the data kind followed by one
//! binary message with the data. [`StreamDemux`] pairs them back up and routes
//! each payload to a [`TelemetrySink`]. It relies on the transport delivering
//! messages in order; it cannot detect reordering.

/// One message as delivered by the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportMessage {
    Text(String),
    Binary(Vec<u8>),
}

/// Text-dump panels fed by the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TextPanel {
    CpuRegisters,
    PpuRegisters,
    ApuRegisters,
    Disassembly,
    Hram,
    Wram,
    Oam,
    Clock,
}

impl TextPanel {
    /// Stream tag, which is also the panel's id on the wire.
    pub const fn tag(self) -> &'static str {
        match self {
            TextPanel::CpuRegisters => "CPURegisters",
            TextPanel::PpuRegisters => "PPURegisters",
            TextPanel::ApuRegisters => "APURegisters",
            TextPanel::Disassembly => "Disassembly",
            TextPanel::Hram => "HRAM",
            TextPanel::Wram => "WRAM",
            TextPanel::Oam => "OAM",
            TextPanel::Clock => "Clock",
        }
    }

    pub fn all() -> &'static [TextPanel] {
        &[
            TextPanel::CpuRegisters,
            TextPanel::PpuRegisters,
            TextPanel::ApuRegisters,
            TextPanel::Disassembly,
            TextPanel::Hram,
            TextPanel::Wram,
            TextPanel::Oam,
            TextPanel::Clock,
        ]
    }
}

pub const VIEWPORT_TAG: &str = "Viewport";
pub const CPU_STATE_TAG: &str = "CPUState";

/// Where a tag's payload goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Frame,
    Text(TextPanel),
    RunState,
}

impl Route {
    /// Static routing table. Unknown tags have no route.
    pub fn for_tag(tag: &str) -> Option<Route> {
        match tag {
            VIEWPORT_TAG => Some(Route::Frame),
            CPU_STATE_TAG => Some(Route::RunState),
            _ => TextPanel::all()
                .iter()
                .copied()
                .find(|p| p.tag() == tag)
                .map(Route::Text),
        }
    }
}

/// CPU run state carried by the `CPUState` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Halted,
    Running,
}

impl RunState {
    pub fn from_status_byte(b: u8) -> Self {
        if b == 0 {
            RunState::Halted
        } else {
            RunState::Running
        }
    }

    /// Run is only offered while halted.
    pub fn run_enabled(self) -> bool {
        self == RunState::Halted
    }

    /// Pause is only offered while running.
    pub fn pause_enabled(self) -> bool {
        self == RunState::Running
    }
}

/// Consumers of routed payloads.
pub trait TelemetrySink {
    fn text(&mut self, panel: TextPanel, text: String);
    fn frame(&mut self, pixels: Vec<u8>);
    fn run_state(&mut self, state: RunState);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DemuxState {
    AwaitingTag,
    AwaitingPayload(String),
}

/// What happened to one fed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feed {
    /// A tag was stored; the next binary message is its payload.
    TagPending,
    /// A tag arrived while another was pending; the older one was discarded.
    TagReplaced { discarded: String },
    Routed(Route),
    /// A payload for a tag with no route.
    UnknownTag(String),
    /// A binary message with no preceding tag.
    PayloadWithoutTag,
    /// `CPUState` payload was empty.
    EmptyRunState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDemux {
    state: DemuxState,
}

impl Default for StreamDemux {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDemux {
    pub fn new() -> Self {
        Self {
            state: DemuxState::AwaitingTag,
        }
    }

    pub fn pending_tag(&self) -> Option<&str> {
        match &self.state {
            DemuxState::AwaitingTag => None,
            DemuxState::AwaitingPayload(tag) => Some(tag),
        }
    }

    pub fn feed(&mut self, msg: TransportMessage, sink: &mut dyn TelemetrySink) -> Feed {
        match msg {
            TransportMessage::Text(tag) => {
                let prev = std::mem::replace(&mut self.state, DemuxState::AwaitingPayload(tag));
                match prev {
                    DemuxState::AwaitingTag => Feed::TagPending,
                    DemuxState::AwaitingPayload(discarded) => {
                        tracing::warn!(%discarded, "tag arrived while awaiting payload; dropping earlier tag");
                        Feed::TagReplaced { discarded }
                    }
                }
            }
            TransportMessage::Binary(payload) => {
                match std::mem::replace(&mut self.state, DemuxState::AwaitingTag) {
                    DemuxState::AwaitingTag => {
                        tracing::warn!(len = payload.len(), "payload without tag dropped");
                        Feed::PayloadWithoutTag
                    }
                    DemuxState::AwaitingPayload(tag) => route(tag, payload, sink),
                }
            }
        }
    }
}

fn route(tag: String, payload: Vec<u8>, sink: &mut dyn TelemetrySink) -> Feed {
    let Some(route) = Route::for_tag(&tag) else {
        tracing::debug!(%tag, "ignoring payload for unknown tag");
        return Feed::UnknownTag(tag);
    };
    match route {
        Route::Frame => sink.frame(payload),
        Route::Text(panel) => sink.text(panel, String::from_utf8_lossy(&payload).into_owned()),
        Route::RunState => match payload.first() {
            Some(&b) => sink.run_state(RunState::from_status_byte(b)),
            None => {
                tracing::warn!("empty CPUState payload dropped");
                return Feed::EmptyRunState;
            }
        },
    }
    Feed::Routed(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug, PartialEq)]
    enum Event {
        Text(TextPanel, String),
        Frame(Vec<u8>),
        Run(RunState),
    }

    #[derive(Default)]
    struct Recorder(Vec<Event>);

    impl TelemetrySink for Recorder {
        fn text(&mut self, panel: TextPanel, text: String) {
            self.0.push(Event::Text(panel, text));
        }
        fn frame(&mut self, pixels: Vec<u8>) {
            self.0.push(Event::Frame(pixels));
        }
        fn run_state(&mut self, state: RunState) {
            self.0.push(Event::Run(state));
        }
    }

    fn text(s: &str) -> TransportMessage {
        TransportMessage::Text(s.to_string())
    }

    fn bin(b: &[u8]) -> TransportMessage {
        TransportMessage::Binary(b.to_vec())
    }

    #[test]
    fn routes_pairs_in_order() {
        let mut demux = StreamDemux::new();
        let mut rec = Recorder::default();

        assert_eq!(demux.feed(text("CPURegisters"), &mut rec), Feed::TagPending);
        assert_eq!(demux.pending_tag(), Some("CPURegisters"));
        assert_eq!(
            demux.feed(bin(b"A=01 F=B0"), &mut rec),
            Feed::Routed(Route::Text(TextPanel::CpuRegisters))
        );
        demux.feed(text("Viewport"), &mut rec);
        assert_eq!(demux.feed(bin(&[0, 85, 170, 255]), &mut rec), Feed::Routed(Route::Frame));

        assert_eq!(
            rec.0,
            vec![
                Event::Text(TextPanel::CpuRegisters, "A=01 F=B0".to_string()),
                Event::Frame(vec![0, 85, 170, 255]),
            ]
        );
        assert_eq!(demux.pending_tag(), None);
    }

    #[test]
    fn second_tag_replaces_first() {
        let mut demux = StreamDemux::new();
        let mut rec = Recorder::default();

        demux.feed(text("Clock"), &mut rec);
        assert_eq!(
            demux.feed(text("WRAM"), &mut rec),
            Feed::TagReplaced {
                discarded: "Clock".to_string()
            }
        );
        demux.feed(bin(b"C000: 00"), &mut rec);

        assert_eq!(rec.0, vec![Event::Text(TextPanel::Wram, "C000: 00".to_string())]);
    }

    #[test]
    fn payload_without_tag_is_dropped_and_stream_recovers() {
        let mut demux = StreamDemux::new();
        let mut rec = Recorder::default();

        assert_eq!(demux.feed(bin(b"junk"), &mut rec), Feed::PayloadWithoutTag);
        assert!(rec.0.is_empty());

        demux.feed(text("OAM"), &mut rec);
        demux.feed(bin(b"FE00"), &mut rec);
        assert_eq!(rec.0, vec![Event::Text(TextPanel::Oam, "FE00".to_string())]);
    }

    #[test]
    fn unknown_tags_are_ignored() {
        let mut demux = StreamDemux::new();
        let mut rec = Recorder::default();

        demux.feed(text("VRAM"), &mut rec);
        assert_eq!(
            demux.feed(bin(&[1, 2, 3]), &mut rec),
            Feed::UnknownTag("VRAM".to_string())
        );
        assert!(rec.0.is_empty());
        assert_eq!(demux.pending_tag(), None);
    }

    #[test]
    fn cpu_state_byte_drives_run_state() {
        let mut demux = StreamDemux::new();
        let mut rec = Recorder::default();

        for payload in [&[0u8][..], &[1], &[7, 0]] {
            demux.feed(text("CPUState"), &mut rec);
            demux.feed(bin(payload), &mut rec);
        }
        demux.feed(text("CPUState"), &mut rec);
        assert_eq!(demux.feed(bin(&[]), &mut rec), Feed::EmptyRunState);

        assert_eq!(
            rec.0,
            vec![
                Event::Run(RunState::Halted),
                Event::Run(RunState::Running),
                Event::Run(RunState::Running),
            ]
        );
        assert!(RunState::Halted.run_enabled() && !RunState::Halted.pause_enabled());
        assert!(RunState::Running.pause_enabled() && !RunState::Running.run_enabled());
    }

    #[test]
    fn text_payloads_decode_lossily() {
        let mut demux = StreamDemux::new();
        let mut rec = Recorder::default();
        demux.feed(text("Disassembly"), &mut rec);
        demux.feed(bin(&[b'N', b'O', b'P', 0xFF]), &mut rec);
        assert_eq!(
            rec.0,
            vec![Event::Text(TextPanel::Disassembly, "NOP\u{FFFD}".to_string())]
        );
    }

    #[test]
    fn every_text_panel_has_a_route() {
        for &p in TextPanel::all() {
            assert_eq!(Route::for_tag(p.tag()), Some(Route::Text(p)));
        }
        assert_eq!(Route::for_tag("Viewport"), Some(Route::Frame));
        assert_eq!(Route::for_tag("CPUState"), Some(Route::RunState));
        assert_eq!(Route::for_tag("None"), None);
    }
}
