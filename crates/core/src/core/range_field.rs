//! Two-sided (begin/end) numeric input, confirmed atomically.

use crate::numeric::{self, Bounds, FieldStatus, NumericFormat, Parsed};
use crate::watch::{RangeWatch, WatchSink};

/// Why a range confirm was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeRejection {
    Lower(FieldStatus),
    Upper(FieldStatus),
    /// Both sides are valid on their own but `lower > upper`.
    Inverted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeFieldState {
    id: String,
    bounds: Bounds,
    format: NumericFormat,
    lower_text: String,
    upper_text: String,
    last_lower: Option<f64>,
    last_upper: Option<f64>,
}

impl RangeFieldState {
    pub fn new(
        id: impl Into<String>,
        format: NumericFormat,
        bounds: Bounds,
        lower_text: impl Into<String>,
        upper_text: impl Into<String>,
    ) -> Self {
        let lower_text = lower_text.into();
        let upper_text = upper_text.into();
        let last_lower = numeric::parse(&lower_text, format, bounds).value();
        let last_upper = numeric::parse(&upper_text, format, bounds).value();
        Self {
            id: id.into(),
            bounds,
            format,
            lower_text,
            upper_text,
            last_lower,
            last_upper,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn format(&self) -> NumericFormat {
        self.format
    }

    pub fn lower_text(&self) -> &str {
        &self.lower_text
    }

    pub fn upper_text(&self) -> &str {
        &self.upper_text
    }

    pub fn last_confirmed(&self) -> Option<RangeWatch> {
        Some(RangeWatch::new(self.last_lower?, self.last_upper?))
    }

    pub fn set_lower_text(&mut self, text: impl Into<String>) {
        self.lower_text = text.into();
    }

    pub fn set_upper_text(&mut self, text: impl Into<String>) {
        self.upper_text = text.into();
    }

    pub fn parsed(&self) -> (Parsed, Parsed) {
        (
            numeric::parse(&self.lower_text, self.format, self.bounds),
            numeric::parse(&self.upper_text, self.format, self.bounds),
        )
    }

    /// Both sides parse (in or out of range) and lower exceeds upper.
    pub fn is_inverted(&self) -> bool {
        let (lo, hi) = self.parsed();
        matches!((lo.number(), hi.number()), (Some(lo), Some(hi)) if lo > hi)
    }

    /// Per-side display status. An inverted pair flags both sides invalid.
    pub fn statuses(&self) -> (FieldStatus, FieldStatus) {
        if self.is_inverted() {
            return (FieldStatus::Invalid, FieldStatus::Invalid);
        }
        let (lo, hi) = self.parsed();
        (
            FieldStatus::derive(lo, self.last_lower),
            FieldStatus::derive(hi, self.last_upper),
        )
    }

    /// Switch to the other integer base and re-render each side that parses.
    ///
    /// An unparsable side keeps its text. Returns `false` for float ranges.
    pub fn toggle_format(&mut self) -> bool {
        let Some(next) = self.format.toggled() else {
            return false;
        };
        if let Some(lower) = numeric::rerender(&self.lower_text, self.format, next) {
            self.lower_text = lower;
        }
        if let Some(upper) = numeric::rerender(&self.upper_text, self.format, next) {
            self.upper_text = upper;
        }
        self.format = next;
        true
    }

    /// Commit both sides or neither.
    pub fn confirm(&mut self, sink: &mut dyn WatchSink) -> Result<RangeWatch, RangeRejection> {
        let (lo, hi) = self.parsed();
        let lower = match lo {
            Parsed::Value(v) => v,
            other => return Err(RangeRejection::Lower(FieldStatus::derive(other, None))),
        };
        let upper = match hi {
            Parsed::Value(v) => v,
            other => return Err(RangeRejection::Upper(FieldStatus::derive(other, None))),
        };
        if lower > upper {
            return Err(RangeRejection::Inverted);
        }

        self.last_lower = Some(lower);
        self.last_upper = Some(upper);
        let range = RangeWatch::new(lower, upper);
        sink.range_confirmed(&self.id, range);
        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct Recorder {
        ranges: Vec<(String, RangeWatch)>,
    }

    impl WatchSink for Recorder {
        fn number_confirmed(&mut self, _id: &str, _value: f64) {
            panic!("range field confirmed a number");
        }

        fn range_confirmed(&mut self, id: &str, range: RangeWatch) {
            self.ranges.push((id.to_string(), range));
        }
    }

    fn wram(lower: &str, upper: &str) -> RangeFieldState {
        RangeFieldState::new(
            "WRAM",
            NumericFormat::Decimal,
            Bounds::new(0.0, 65535.0),
            lower,
            upper,
        )
    }

    #[test]
    fn inverted_range_is_rejected_and_both_sides_flagged() {
        let mut rec = Recorder::default();
        let mut r = wram("", "");
        r.set_lower_text("100");
        r.set_upper_text("50");

        assert_eq!(r.statuses(), (FieldStatus::Invalid, FieldStatus::Invalid));
        assert_eq!(r.confirm(&mut rec), Err(RangeRejection::Inverted));
        assert!(rec.ranges.is_empty());
        assert_eq!(r.last_confirmed(), None);
    }

    #[test]
    fn confirm_is_all_or_nothing() {
        let mut rec = Recorder::default();
        let mut r = wram("10", "20");
        assert_eq!(r.last_confirmed(), Some(RangeWatch::new(10.0, 20.0)));

        r.set_lower_text("11");
        r.set_upper_text("");
        assert_eq!(
            r.confirm(&mut rec),
            Err(RangeRejection::Upper(FieldStatus::Empty))
        );
        r.set_upper_text("99999");
        assert_eq!(
            r.confirm(&mut rec),
            Err(RangeRejection::Upper(FieldStatus::Invalid))
        );
        r.set_lower_text("x");
        assert_eq!(
            r.confirm(&mut rec),
            Err(RangeRejection::Lower(FieldStatus::Invalid))
        );

        assert!(rec.ranges.is_empty());
        assert_eq!(r.last_confirmed(), Some(RangeWatch::new(10.0, 20.0)));
    }

    #[test]
    fn successful_confirm_updates_both_and_notifies() {
        let mut rec = Recorder::default();
        let mut r = wram("0", "0");
        r.set_lower_text("49152");
        r.set_upper_text("49407");
        assert_eq!(r.statuses(), (FieldStatus::Changed, FieldStatus::Changed));

        let got = r.confirm(&mut rec).unwrap();
        assert_eq!(got, RangeWatch::new(49152.0, 49407.0));
        assert_eq!(rec.ranges, vec![("WRAM".to_string(), got)]);
        assert_eq!(r.statuses(), (FieldStatus::Confirmed, FieldStatus::Confirmed));
    }

    #[test]
    fn equal_bounds_are_accepted() {
        let mut rec = Recorder::default();
        let mut r = wram("", "");
        r.set_lower_text("7");
        r.set_upper_text("7");
        assert!(r.confirm(&mut rec).is_ok());
    }

    #[test]
    fn empty_and_invalid_sides_keep_distinct_statuses() {
        let r = wram("", "zz");
        assert_eq!(r.statuses(), (FieldStatus::Empty, FieldStatus::Invalid));
    }

    #[test]
    fn toggle_rerenders_both_sides() {
        let mut r = wram("49152", "57343");
        assert!(r.toggle_format());
        assert_eq!((r.lower_text(), r.upper_text()), ("C000", "DFFF"));
        assert!(r.toggle_format());
        assert_eq!((r.lower_text(), r.upper_text()), ("49152", "57343"));
        assert_eq!(r.statuses(), (FieldStatus::Confirmed, FieldStatus::Confirmed));
    }

    #[test]
    fn toggle_rerenders_each_side_independently() {
        let mut r = RangeFieldState::new(
            "WRAM",
            NumericFormat::Hexadecimal,
            Bounds::new(0.0, 65535.0),
            "C000",
            "",
        );
        r.set_upper_text("zz");

        assert!(r.toggle_format());
        assert_eq!(r.format(), NumericFormat::Decimal);
        assert_eq!((r.lower_text(), r.upper_text()), ("49152", "zz"));
        assert_eq!(r.statuses(), (FieldStatus::Confirmed, FieldStatus::Invalid));
    }

    #[test]
    fn float_range_has_no_toggle() {
        let mut r = RangeFieldState::new(
            "Speed",
            NumericFormat::Float,
            Bounds::new(1.0, 10.0),
            "1.5",
            "2",
        );
        assert!(!r.toggle_format());
        assert_eq!((r.lower_text(), r.upper_text()), ("1.5", "2"));
    }
}
