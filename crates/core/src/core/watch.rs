//! The outbound state-request and the aggregator that keeps it.
//!
//! Every panel change and every confirmed edit produces exactly one request,
//! sent synchronously from the triggering event. The `last_edited_*` markers
//! tell the engine which watch just changed; they are cleared right after each
//! send so the next request only carries them if another confirm happened.

use std::collections::BTreeMap;

use crate::engine::{CommandSink, EngineCommand};
use crate::panels::PanelMap;

/// Inclusive address (or value) range being watched.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeWatch {
    #[cfg_attr(feature = "serde", serde(rename = "Begin"))]
    pub begin: f64,
    #[cfg_attr(feature = "serde", serde(rename = "End"))]
    pub end: f64,
}

impl RangeWatch {
    pub fn new(begin: f64, end: f64) -> Self {
        Self { begin, end }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WatchDocument {
    #[cfg_attr(feature = "serde", serde(rename = "OpenBoxes", default))]
    pub open_panels: PanelMap,
    #[cfg_attr(feature = "serde", serde(rename = "Numbers", default))]
    pub numbers: BTreeMap<String, f64>,
    #[cfg_attr(feature = "serde", serde(rename = "Ranges", default))]
    pub ranges: BTreeMap<String, RangeWatch>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "ClickedNumber", default, with = "empty_marker")
    )]
    pub last_edited_number: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "ClickedRange", default, with = "empty_marker")
    )]
    pub last_edited_range: Option<String>,
}

impl WatchDocument {
    pub fn clear_last_edited(&mut self) {
        self.last_edited_number = None;
        self.last_edited_range = None;
    }
}

/// The wire uses `""` for "no field was just edited".
#[cfg(feature = "serde")]
mod empty_marker {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(v.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(raw.filter(|s| !s.is_empty()))
    }
}

/// Receiver of confirmed edits.
pub trait WatchSink {
    fn number_confirmed(&mut self, id: &str, value: f64);
    fn range_confirmed(&mut self, id: &str, range: RangeWatch);
}

/// Owns the session's [`WatchDocument`] and dispatches it on every change.
pub struct WatchAggregator<C: CommandSink> {
    doc: WatchDocument,
    commands: C,
    sent: u64,
}

impl<C: CommandSink> WatchAggregator<C> {
    pub fn new(commands: C) -> Self {
        Self {
            doc: WatchDocument::default(),
            commands,
            sent: 0,
        }
    }

    /// Current document (markers are always cleared between sends).
    pub fn document(&self) -> &WatchDocument {
        &self.doc
    }

    /// Number of requests dispatched so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn commands(&self) -> &C {
        &self.commands
    }

    /// Adopt an engine-provided layout without sending anything.
    pub fn sync_panels(&mut self, panels: &PanelMap) {
        self.doc.open_panels = panels.clone();
    }

    pub fn panels_changed(&mut self, panels: &PanelMap) {
        self.doc.open_panels = panels.clone();
        self.dispatch();
    }

    fn dispatch(&mut self) {
        self.sent += 1;
        tracing::debug!(
            seq = self.sent,
            clicked_number = self.doc.last_edited_number.as_deref().unwrap_or(""),
            clicked_range = self.doc.last_edited_range.as_deref().unwrap_or(""),
            "sending machine state request"
        );
        self.commands
            .dispatch(EngineCommand::MachineStateRequest(self.doc.clone()));
        self.doc.clear_last_edited();
    }
}

impl<C: CommandSink> WatchSink for WatchAggregator<C> {
    fn number_confirmed(&mut self, id: &str, value: f64) {
        self.doc.numbers.insert(id.to_string(), value);
        self.doc.last_edited_number = Some(id.to_string());
        self.dispatch();
    }

    fn range_confirmed(&mut self, id: &str, range: RangeWatch) {
        self.doc.ranges.insert(id.to_string(), range);
        self.doc.last_edited_range = Some(id.to_string());
        self.dispatch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::CommandLog;
    use pretty_assertions::assert_eq;

    #[test]
    fn confirm_marks_only_the_next_request() {
        let log = CommandLog::new();
        let mut agg = WatchAggregator::new(log.clone());

        agg.number_confirmed("TargetSpeed", 250.0);
        let mut panels = PanelMap::new();
        panels.insert("WRAM".to_string(), true);
        agg.panels_changed(&panels);

        let sent = log.take_requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].last_edited_number.as_deref(), Some("TargetSpeed"));
        assert_eq!(sent[0].numbers.get("TargetSpeed"), Some(&250.0));
        assert_eq!(sent[1].last_edited_number, None);
        // The watch itself persists across requests.
        assert_eq!(sent[1].numbers.get("TargetSpeed"), Some(&250.0));
        assert_eq!(sent[1].open_panels, panels);
    }

    #[test]
    fn range_confirm_sets_range_marker_only() {
        let log = CommandLog::new();
        let mut agg = WatchAggregator::new(log.clone());

        agg.range_confirmed("WRAM", RangeWatch::new(0xC000 as f64, 0xC0FF as f64));
        let sent = log.take_requests();
        assert_eq!(sent[0].last_edited_range.as_deref(), Some("WRAM"));
        assert_eq!(sent[0].last_edited_number, None);
        assert_eq!(agg.document().last_edited_range, None);
        assert_eq!(agg.sent(), 1);
    }

    #[test]
    fn synced_panels_ride_along_with_the_next_request() {
        let log = CommandLog::new();
        let mut agg = WatchAggregator::new(log.clone());
        let mut panels = PanelMap::new();
        panels.insert("OAM".to_string(), true);

        agg.sync_panels(&panels);
        assert!(log.is_empty());
        assert_eq!(agg.sent(), 0);

        agg.number_confirmed("TargetSpeed", 100.0);
        assert_eq!(log.take_requests()[0].open_panels, panels);
    }

    #[test]
    fn every_change_sends_without_coalescing() {
        let log = CommandLog::new();
        let mut agg = WatchAggregator::new(log.clone());
        for i in 0..5 {
            agg.number_confirmed("TargetSpeed", i as f64);
        }
        assert_eq!(log.take_requests().len(), 5);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn wire_shape_uses_engine_field_names() {
        let mut doc = WatchDocument::default();
        doc.open_panels.insert("CPURegisters".to_string(), true);
        doc.ranges
            .insert("Disassembly".to_string(), RangeWatch::new(256.0, 512.0));
        doc.last_edited_range = Some("Disassembly".to_string());

        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "OpenBoxes": { "CPURegisters": true },
                "Numbers": {},
                "Ranges": { "Disassembly": { "Begin": 256.0, "End": 512.0 } },
                "ClickedNumber": "",
                "ClickedRange": "Disassembly",
            })
        );

        let back: WatchDocument = serde_json::from_value(v).unwrap();
        assert_eq!(back, doc);
    }
}
