//! Text-to-type coercion for declared logical types.

use csvjson_model::{LogicalType, TypedValue};

/// Coerce already-trimmed, non-empty text to `logical_type`.
///
/// Returns `None` when the text does not fit the type.
pub fn coerce(text: &str, logical_type: LogicalType) -> Option<TypedValue> {
    match logical_type {
        LogicalType::Integer64 => parse_integer(text).map(TypedValue::Integer),
        LogicalType::Float64 => parse_float(text).map(TypedValue::Float),
        LogicalType::String => Some(TypedValue::String(text.to_string())),
    }
}

/// Base-10 signed integer within i64 range; no fraction, no exponent.
pub fn parse_integer(text: &str) -> Option<i64> {
    text.parse::<i64>().ok()
}

/// Decimal number with optional sign, fraction and exponent.
///
/// Textual infinities and NaN are rejected, as is anything that overflows
/// to a non-finite value.
pub fn parse_float(text: &str) -> Option<f64> {
    if !is_decimal_literal(text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut idx = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        idx += 1;
    }

    let int_start = idx;
    idx += count_digits(&bytes[idx..]);
    let mut mantissa_digits = idx - int_start;

    if bytes.get(idx) == Some(&b'.') {
        idx += 1;
        let frac_digits = count_digits(&bytes[idx..]);
        idx += frac_digits;
        mantissa_digits += frac_digits;
    }
    if mantissa_digits == 0 {
        return false;
    }

    if matches!(bytes.get(idx), Some(b'e' | b'E')) {
        idx += 1;
        if matches!(bytes.get(idx), Some(b'+' | b'-')) {
            idx += 1;
        }
        let exp_digits = count_digits(&bytes[idx..]);
        if exp_digits == 0 {
            return false;
        }
        idx += exp_digits;
    }

    idx == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("-7"), Some(-7));
        assert_eq!(parse_integer("+7"), Some(7));
        assert_eq!(parse_integer("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_integer("9223372036854775808"), None);
        assert_eq!(parse_integer("1.0"), None);
        assert_eq!(parse_integer("1e3"), None);
        assert_eq!(parse_integer("abc"), None);
        assert_eq!(parse_integer("12abc"), None);
        assert_eq!(parse_integer("-"), None);
    }

    #[test]
    fn floats() {
        assert_eq!(parse_float("299.98"), Some(299.98));
        assert_eq!(parse_float("-0.5"), Some(-0.5));
        assert_eq!(parse_float(".5"), Some(0.5));
        assert_eq!(parse_float("5."), Some(5.0));
        assert_eq!(parse_float("42"), Some(42.0));
        assert_eq!(parse_float("1.5e3"), Some(1500.0));
        assert_eq!(parse_float("1E-2"), Some(0.01));
    }

    #[test]
    fn rejects_non_decimal_floats() {
        for text in ["inf", "-infinity", "NaN", "nan", "1e", "e5", ".", "+", "1.2.3", "0x10", "1e400"] {
            assert_eq!(parse_float(text), None, "{text}");
        }
    }

    #[test]
    fn string_coercion_is_verbatim() {
        assert_eq!(
            coerce("Fan Shop", LogicalType::String),
            Some(TypedValue::String("Fan Shop".to_string()))
        );
    }
}
