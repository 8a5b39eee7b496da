//! Float formatting helpers that avoid `format!` on floats.
//!
//! Rust's float-to-decimal formatting has had wasm-facing panics in some
//! toolchain/browser combinations (`dragon.rs`). These helpers handle
//! `NaN`/`±Inf` explicitly and otherwise scale + round into an `i64` and format
//! integers only.

/// Largest number of fractional digits the helpers will produce.
pub(crate) const MAX_DECIMALS: usize = 9;

#[inline]
pub fn fmt_f64_fixed(v: f64, decimals: usize) -> String {
    fmt_f64_fixed_inner(v, decimals)
}

/// Like [`fmt_f64_fixed`], but trailing fractional zeros (and a dangling `.`)
/// are removed, so `100.0` renders as `100` and `1.250` as `1.25`.
pub fn fmt_f64_trimmed(v: f64, max_decimals: usize) -> String {
    let mut out = fmt_f64_fixed_inner(v, max_decimals);
    if !v.is_finite() || !out.contains('.') {
        return out;
    }
    while out.ends_with('0') {
        out.pop();
    }
    if out.ends_with('.') {
        out.pop();
    }
    out
}

fn fmt_f64_fixed_inner(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return if v.is_nan() {
            "NaN".to_string()
        } else if v.is_sign_positive() {
            "Inf".to_string()
        } else {
            "-Inf".to_string()
        };
    }

    let decimals = decimals.min(MAX_DECIMALS);

    let scale_i64 = 10_i64.checked_pow(decimals as u32).unwrap_or(1_i64);
    let scale_f = scale_i64 as f64;

    let scaled = (v * scale_f).round();
    if !scaled.is_finite() || scaled.abs() > (i64::MAX as f64) {
        return if v.is_sign_negative() {
            "-Inf".to_string()
        } else {
            "Inf".to_string()
        };
    }

    let scaled_i = scaled as i64;
    let negative = scaled_i < 0;

    let abs_i = scaled_i.abs();
    let int_part = abs_i / scale_i64;
    let frac_part = abs_i % scale_i64;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&int_part.to_string());

    if decimals > 0 {
        out.push('.');
        let frac_str = frac_part.to_string();
        for _ in 0..decimals.saturating_sub(frac_str.len()) {
            out.push('0');
        }
        out.push_str(&frac_str);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pads_fraction() {
        assert_eq!(fmt_f64_fixed(1.5, 3), "1.500");
        assert_eq!(fmt_f64_fixed(-0.25, 2), "-0.25");
        assert_eq!(fmt_f64_fixed(12.0, 0), "12");
    }

    #[test]
    fn trimmed_drops_trailing_zeros() {
        assert_eq!(fmt_f64_trimmed(100.0, 6), "100");
        assert_eq!(fmt_f64_trimmed(1.25, 6), "1.25");
        assert_eq!(fmt_f64_trimmed(-0.0000001, 6), "0");
        assert_eq!(fmt_f64_trimmed(f64::NEG_INFINITY, 6), "-Inf");
    }
}
