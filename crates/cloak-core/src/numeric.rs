//! Lenient numeric parsing for spreadsheet cells.
//!
//! Cells in the export carry thousands separators, percent signs and the odd
//! stray annotation. Both converters are total: anything that does not start
//! with a number reads as zero. This conflates an explicit `0` with an
//! unparseable cell; callers that treat zero as "absent" inherit that.

use std::sync::OnceLock;

use regex::Regex;

/// Leading signed decimal with optional fraction and exponent.
fn float_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("regex is valid")
    })
}

/// Leading signed run of digits.
fn integer_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[+-]?\d+").expect("regex is valid"))
}

/// Drop thousands separators and percent signs, then leading whitespace.
fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != ',' && *c != '%')
        .collect::<String>()
        .trim_start()
        .to_string()
}

/// Parse the integer prefix of `raw`, or `0`.
///
/// ```
/// use cloak_core::numeric::to_integer;
///
/// assert_eq!(to_integer("1,234"), 1234);
/// assert_eq!(to_integer("12.9"), 12);
/// assert_eq!(to_integer("n/a"), 0);
/// ```
pub fn to_integer(raw: &str) -> i64 {
    let cleaned = clean(raw);
    integer_prefix()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .unwrap_or(0)
}

/// Parse the floating-point prefix of `raw`, or `0.0`.
///
/// ```
/// use cloak_core::numeric::to_float;
///
/// assert_eq!(to_float("12.5%"), 12.5);
/// assert_eq!(to_float("1,000.25"), 1000.25);
/// assert_eq!(to_float(""), 0.0);
/// ```
pub fn to_float(raw: &str) -> f64 {
    let cleaned = clean(raw);
    float_prefix()
        .find(&cleaned)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── to_integer ────────────────────────────────────────────────────────

    #[test]
    fn test_to_integer_plain() {
        assert_eq!(to_integer("719"), 719);
        assert_eq!(to_integer("  42"), 42);
    }

    #[test]
    fn test_to_integer_strips_separators() {
        assert_eq!(to_integer("1,234"), 1234);
        assert_eq!(to_integer("1,234,567"), 1_234_567);
        assert_eq!(to_integer("50%"), 50);
    }

    #[test]
    fn test_to_integer_truncates_fraction() {
        assert_eq!(to_integer("12.9"), 12);
        assert_eq!(to_integer("3abc"), 3);
        assert_eq!(to_integer("1e3"), 1);
    }

    #[test]
    fn test_to_integer_negative() {
        assert_eq!(to_integer("-5"), -5);
    }

    #[test]
    fn test_to_integer_garbage_is_zero() {
        for raw in ["", " ", "abc", "%", ",,,", "-", "N/A", "#DIV/0!"] {
            assert_eq!(to_integer(raw), 0, "input {raw:?}");
        }
    }

    #[test]
    fn test_to_integer_reads_leading_digits_of_dates() {
        assert_eq!(to_integer("8/1"), 8);
    }

    #[test]
    fn test_to_integer_overflow_is_zero() {
        assert_eq!(to_integer("99999999999999999999999"), 0);
    }

    // ── to_float ──────────────────────────────────────────────────────────

    #[test]
    fn test_to_float_percent() {
        assert_eq!(to_float("12.5%"), 12.5);
        assert_eq!(to_float("82.76%"), 82.76);
    }

    #[test]
    fn test_to_float_separators_and_sign() {
        assert_eq!(to_float("1,000.25"), 1000.25);
        assert_eq!(to_float("-3.5"), -3.5);
        assert_eq!(to_float(".5"), 0.5);
        assert_eq!(to_float("7."), 7.0);
    }

    #[test]
    fn test_to_float_exponent() {
        assert_eq!(to_float("1e3"), 1000.0);
        assert_eq!(to_float("2.5E-1"), 0.25);
    }

    #[test]
    fn test_to_float_garbage_is_zero() {
        for raw in ["", "abc", "%", ",", "-", ".", "NaN", "Infinity", "#DIV/0!"] {
            assert_eq!(to_float(raw), 0.0, "input {raw:?}");
        }
    }

    #[test]
    fn test_to_float_decorated_non_numeric_is_zero() {
        assert_eq!(to_float("n/a%"), 0.0);
        assert_eq!(to_float(",,%"), 0.0);
    }
}
