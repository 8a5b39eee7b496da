//! Numeric text formats shared by the single-value and range validators.

use crate::float_fmt::fmt_f64_trimmed;

/// Fractional digits used when rendering a `Float` field.
const FLOAT_DECIMALS: usize = 6;

/// How a field's text is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumericFormat {
    Decimal,
    Hexadecimal,
    Float,
}

impl NumericFormat {
    /// Short label shown on the toggle button.
    pub fn label(self) -> &'static str {
        match self {
            NumericFormat::Decimal => "DEC",
            NumericFormat::Hexadecimal => "HEX",
            NumericFormat::Float => "FLOAT",
        }
    }

    /// The other integer base, or `None` for float fields (which have no toggle).
    pub fn toggled(self) -> Option<NumericFormat> {
        match self {
            NumericFormat::Decimal => Some(NumericFormat::Hexadecimal),
            NumericFormat::Hexadecimal => Some(NumericFormat::Decimal),
            NumericFormat::Float => None,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, NumericFormat::Float)
    }

    /// Render `value` as field text. Integer formats truncate toward zero.
    pub fn render(self, value: f64) -> String {
        match self {
            NumericFormat::Decimal => (value as i64).to_string(),
            NumericFormat::Hexadecimal => {
                let v = value as i64;
                if v < 0 {
                    format!("-{:X}", v.unsigned_abs())
                } else {
                    format!("{v:X}")
                }
            }
            NumericFormat::Float => fmt_f64_trimmed(value, FLOAT_DECIMALS),
        }
    }

    /// Parse trimmed, non-empty text. No range check.
    fn parse_raw(self, text: &str) -> Option<f64> {
        match self {
            NumericFormat::Decimal => text.parse::<i64>().ok().map(|v| v as f64),
            NumericFormat::Hexadecimal => i64::from_str_radix(text, 16).ok().map(|v| v as f64),
            NumericFormat::Float => text.parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// Inclusive bounds. Unbounded sides are `±∞`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl Bounds {
    pub const UNBOUNDED: Bounds = Bounds {
        min: f64::NEG_INFINITY,
        max: f64::INFINITY,
    };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Outcome of reading a field's text.
///
/// `Unparsable` and `OutOfRange` are both displayed as invalid, but callers
/// that care (logging, tests) can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed {
    Empty,
    Unparsable,
    OutOfRange(f64),
    Value(f64),
}

impl Parsed {
    /// The in-range value, if any.
    pub fn value(self) -> Option<f64> {
        match self {
            Parsed::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Any numeric reading of the text, including out-of-range ones.
    pub fn number(self) -> Option<f64> {
        match self {
            Parsed::Value(v) | Parsed::OutOfRange(v) => Some(v),
            Parsed::Empty | Parsed::Unparsable => None,
        }
    }
}

pub fn parse(text: &str, format: NumericFormat, bounds: Bounds) -> Parsed {
    let text = text.trim();
    if text.is_empty() {
        return Parsed::Empty;
    }
    match format.parse_raw(text) {
        None => Parsed::Unparsable,
        Some(v) if bounds.contains(v) => Parsed::Value(v),
        Some(v) => Parsed::OutOfRange(v),
    }
}

/// Display state of one text input, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldStatus {
    Empty,
    Invalid,
    Changed,
    Confirmed,
}

impl FieldStatus {
    /// Derive the status from a parse outcome and the last confirmed value.
    pub fn derive(parsed: Parsed, last_confirmed: Option<f64>) -> FieldStatus {
        match parsed {
            Parsed::Empty => FieldStatus::Empty,
            Parsed::Unparsable | Parsed::OutOfRange(_) => FieldStatus::Invalid,
            Parsed::Value(v) if Some(v) != last_confirmed => FieldStatus::Changed,
            Parsed::Value(_) => FieldStatus::Confirmed,
        }
    }

    pub fn can_confirm(self) -> bool {
        matches!(self, FieldStatus::Changed | FieldStatus::Confirmed)
    }

    /// CSS class applied to the input element; confirmed fields carry none.
    pub fn css_class(self) -> &'static str {
        match self {
            FieldStatus::Empty => "empty",
            FieldStatus::Invalid => "invalid",
            FieldStatus::Changed => "changed",
            FieldStatus::Confirmed => "",
        }
    }
}

/// Re-render `text` in `to`, if it parses under `from`.
///
/// Returns `None` when the text is unparsable and must be left alone.
/// Empty text stays empty. Out-of-range values are still re-rendered.
pub(crate) fn rerender(text: &str, from: NumericFormat, to: NumericFormat) -> Option<String> {
    match parse(text, from, Bounds::UNBOUNDED) {
        Parsed::Empty => Some(String::new()),
        Parsed::Unparsable => None,
        Parsed::Value(v) | Parsed::OutOfRange(v) => Some(to.render(v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_each_format() {
        let b = Bounds::UNBOUNDED;
        assert_eq!(parse("42", NumericFormat::Decimal, b), Parsed::Value(42.0));
        assert_eq!(parse(" ff ", NumericFormat::Hexadecimal, b), Parsed::Value(255.0));
        assert_eq!(parse("FF", NumericFormat::Hexadecimal, b), Parsed::Value(255.0));
        assert_eq!(parse("1.5", NumericFormat::Float, b), Parsed::Value(1.5));
        assert_eq!(parse("-7", NumericFormat::Decimal, b), Parsed::Value(-7.0));
    }

    #[test]
    fn empty_is_not_invalid() {
        let b = Bounds::new(0.0, 10.0);
        assert_eq!(parse("   ", NumericFormat::Decimal, b), Parsed::Empty);
        assert_eq!(FieldStatus::derive(Parsed::Empty, None), FieldStatus::Empty);
    }

    #[test]
    fn unparsable_and_out_of_range_are_distinct_but_both_invalid() {
        let b = Bounds::new(0.0, 10.0);
        let bad = parse("1x", NumericFormat::Decimal, b);
        let high = parse("11", NumericFormat::Decimal, b);
        assert_eq!(bad, Parsed::Unparsable);
        assert_eq!(high, Parsed::OutOfRange(11.0));
        assert_eq!(FieldStatus::derive(bad, None), FieldStatus::Invalid);
        assert_eq!(FieldStatus::derive(high, None), FieldStatus::Invalid);
    }

    #[test]
    fn decimal_rejects_hex_digits_and_float_rejects_inf() {
        let b = Bounds::UNBOUNDED;
        assert_eq!(parse("1A", NumericFormat::Decimal, b), Parsed::Unparsable);
        assert_eq!(parse("1.0", NumericFormat::Decimal, b), Parsed::Unparsable);
        assert_eq!(parse("inf", NumericFormat::Float, b), Parsed::Unparsable);
        assert_eq!(parse("NaN", NumericFormat::Float, b), Parsed::Unparsable);
    }

    #[test]
    fn bounds_are_inclusive() {
        let b = Bounds::new(0.0, 65535.0);
        assert_eq!(parse("0", NumericFormat::Decimal, b), Parsed::Value(0.0));
        assert_eq!(parse("FFFF", NumericFormat::Hexadecimal, b), Parsed::Value(65535.0));
        assert_eq!(
            parse("10000", NumericFormat::Hexadecimal, b),
            Parsed::OutOfRange(65536.0)
        );
    }

    #[test]
    fn hex_render_is_uppercase_without_prefix() {
        assert_eq!(NumericFormat::Hexadecimal.render(48879.0), "BEEF");
        assert_eq!(NumericFormat::Hexadecimal.render(-255.0), "-FF");
        assert_eq!(NumericFormat::Decimal.render(48879.0), "48879");
        assert_eq!(NumericFormat::Float.render(1010.0), "1010");
    }

    #[test]
    fn hex_round_trips_over_a_16_bit_range() {
        let b = Bounds::new(0.0, 65535.0);
        for v in (0..=0xFFFFu32).step_by(97).chain([0xFFFF]) {
            let text = NumericFormat::Hexadecimal.render(v as f64);
            assert_eq!(
                parse(&text, NumericFormat::Hexadecimal, b),
                Parsed::Value(v as f64),
                "value {v} rendered as {text}"
            );
        }
    }

    #[test]
    fn status_priority() {
        assert_eq!(FieldStatus::derive(Parsed::Value(3.0), Some(3.0)), FieldStatus::Confirmed);
        assert_eq!(FieldStatus::derive(Parsed::Value(3.0), Some(4.0)), FieldStatus::Changed);
        assert_eq!(FieldStatus::derive(Parsed::Value(3.0), None), FieldStatus::Changed);
        assert!(FieldStatus::Changed.can_confirm());
        assert!(FieldStatus::Confirmed.can_confirm());
        assert!(!FieldStatus::Empty.can_confirm());
        assert!(!FieldStatus::Invalid.can_confirm());
    }

    #[test]
    fn rerender_leaves_unparsable_text_alone() {
        assert_eq!(
            rerender("zz", NumericFormat::Hexadecimal, NumericFormat::Decimal),
            None
        );
        assert_eq!(
            rerender("255", NumericFormat::Decimal, NumericFormat::Hexadecimal),
            Some("FF".to_string())
        );
        assert_eq!(
            rerender("", NumericFormat::Decimal, NumericFormat::Hexadecimal),
            Some(String::new())
        );
    }

    #[test]
    fn float_has_no_toggle() {
        assert_eq!(NumericFormat::Float.toggled(), None);
        assert_eq!(
            NumericFormat::Decimal.toggled(),
            Some(NumericFormat::Hexadecimal)
        );
    }
}
