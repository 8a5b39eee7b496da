//! Single-value numeric input.

use crate::numeric::{self, Bounds, FieldStatus, NumericFormat, Parsed};
use crate::watch::WatchSink;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    id: String,
    bounds: Bounds,
    format: NumericFormat,
    last_confirmed: Option<f64>,
    text: String,
}

impl FieldState {
    /// Create a field whose initial text counts as confirmed if it is valid.
    pub fn new(
        id: impl Into<String>,
        format: NumericFormat,
        bounds: Bounds,
        initial_text: impl Into<String>,
    ) -> Self {
        let text = initial_text.into();
        let last_confirmed = numeric::parse(&text, format, bounds).value();
        Self {
            id: id.into(),
            bounds,
            format,
            last_confirmed,
            text,
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

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn last_confirmed(&self) -> Option<f64> {
        self.last_confirmed
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn parsed(&self) -> Parsed {
        numeric::parse(&self.text, self.format, self.bounds)
    }

    pub fn status(&self) -> FieldStatus {
        FieldStatus::derive(self.parsed(), self.last_confirmed)
    }

    /// Switch between decimal and hexadecimal, re-rendering the current text.
    ///
    /// Returns `false` (and changes nothing) for float fields or when the
    /// current text does not parse.
    pub fn toggle_format(&mut self) -> bool {
        let Some(next) = self.format.toggled() else {
            return false;
        };
        let Some(text) = numeric::rerender(&self.text, self.format, next) else {
            return false;
        };
        self.format = next;
        self.text = text;
        true
    }

    /// Commit the current text and notify `sink`.
    ///
    /// On rejection the field is untouched and the blocking status is returned.
    pub fn confirm(&mut self, sink: &mut dyn WatchSink) -> Result<f64, FieldStatus> {
        let status = self.status();
        let value = match self.parsed() {
            Parsed::Value(v) if status.can_confirm() => v,
            _ => return Err(status),
        };
        self.last_confirmed = Some(value);
        sink.number_confirmed(&self.id, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watch::RangeWatch;

    #[derive(Default)]
    struct Recorder {
        numbers: Vec<(String, f64)>,
    }

    impl WatchSink for Recorder {
        fn number_confirmed(&mut self, id: &str, value: f64) {
            self.numbers.push((id.to_string(), value));
        }

        fn range_confirmed(&mut self, _id: &str, _range: RangeWatch) {
            panic!("single field confirmed a range");
        }
    }

    fn addr_field(text: &str) -> FieldState {
        FieldState::new(
            "Breakpoint",
            NumericFormat::Decimal,
            Bounds::new(0.0, 65535.0),
            text,
        )
    }

    #[test]
    fn confirming_valid_decimal_sets_value() {
        let mut rec = Recorder::default();
        let mut f = addr_field("");
        assert_eq!(f.status(), FieldStatus::Empty);

        for (text, v) in [("0", 0.0), ("1234", 1234.0), ("65535", 65535.0)] {
            f.set_text(text);
            assert_eq!(f.status(), FieldStatus::Changed);
            assert_eq!(f.confirm(&mut rec), Ok(v));
            assert_eq!(f.last_confirmed(), Some(v));
            assert_eq!(f.status(), FieldStatus::Confirmed);
        }
        assert_eq!(rec.numbers.len(), 3);
        assert_eq!(rec.numbers[2], ("Breakpoint".to_string(), 65535.0));
    }

    #[test]
    fn confirm_rejects_empty_and_invalid() {
        let mut rec = Recorder::default();
        let mut f = addr_field("10");

        f.set_text("");
        assert_eq!(f.confirm(&mut rec), Err(FieldStatus::Empty));
        f.set_text("70000");
        assert_eq!(f.confirm(&mut rec), Err(FieldStatus::Invalid));
        f.set_text("ten");
        assert_eq!(f.confirm(&mut rec), Err(FieldStatus::Invalid));

        assert!(rec.numbers.is_empty());
        assert_eq!(f.last_confirmed(), Some(10.0));
    }

    #[test]
    fn reconfirming_the_same_value_still_notifies() {
        let mut rec = Recorder::default();
        let mut f = addr_field("42");
        assert_eq!(f.status(), FieldStatus::Confirmed);
        assert_eq!(f.confirm(&mut rec), Ok(42.0));
        assert_eq!(rec.numbers.len(), 1);
    }

    #[test]
    fn toggle_rerenders_current_not_confirmed_value() {
        let mut f = addr_field("16");
        f.set_text("255");
        assert!(f.toggle_format());
        assert_eq!(f.format(), NumericFormat::Hexadecimal);
        assert_eq!(f.text(), "FF");
        assert_eq!(f.status(), FieldStatus::Changed);
        assert_eq!(f.last_confirmed(), Some(16.0));
    }

    #[test]
    fn double_toggle_keeps_value() {
        let mut f = addr_field("4096");
        assert!(f.toggle_format());
        assert_eq!(f.text(), "1000");
        assert!(f.toggle_format());
        assert_eq!(f.text(), "4096");
        assert_eq!(f.status(), FieldStatus::Confirmed);
    }

    #[test]
    fn toggle_ignores_unparsable_text() {
        let mut f = addr_field("1");
        f.set_text("12zz");
        let before = f.status();
        assert!(!f.toggle_format());
        assert_eq!(f.text(), "12zz");
        assert_eq!(f.format(), NumericFormat::Decimal);
        assert_eq!(f.status(), before);
    }

    #[test]
    fn float_fields_do_not_toggle() {
        let mut f = FieldState::new(
            "TargetSpeed",
            NumericFormat::Float,
            Bounds::new(1.0, 10000.0),
            "100",
        );
        assert!(!f.toggle_format());
        f.set_text("12.5");
        assert_eq!(f.parsed(), Parsed::Value(12.5));
    }

    #[test]
    fn out_of_range_initial_text_is_not_confirmed() {
        let f = addr_field("99999");
        assert_eq!(f.last_confirmed(), None);
        assert_eq!(f.status(), FieldStatus::Invalid);
    }
}
