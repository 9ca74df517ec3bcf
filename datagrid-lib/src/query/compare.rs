//! Type-aware filter predicate.

use crate::model::DataType;
use crate::model::Value;
use crate::model::date::epoch_millis;

use super::Operator;

/// Evaluates `data <operator> filter` under the comparator for `data_type`.
///
/// A null `data` never matches. See [`Operator`] for which operators each
/// data type understands and how the others fall back.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::{DataType, Value};
/// use datagrid_lib::query::{matches, Operator};
///
/// // Number columns parse both sides, so string-typed fields still compare.
/// assert!(matches(&Value::from("30"), &Value::from(30i64), Operator::Gte, DataType::Number));
/// assert!(!matches(&Value::Null, &Value::from(30i64), Operator::Gte, DataType::Number));
/// ```
pub fn matches(data: &Value, filter: &Value, operator: Operator, data_type: DataType) -> bool {
    if data.is_null() {
        return false;
    }

    match data_type {
        DataType::String => {
            let data = lowercase(data);
            let filter = lowercase(filter);
            match operator {
                Operator::Eq => data == filter,
                Operator::StartsWith => data.starts_with(&filter),
                Operator::EndsWith => data.ends_with(&filter),
                _ => data.contains(&filter),
            }
        }
        DataType::Number => compare_ordered(parse_float(data), parse_float(filter), operator),
        DataType::Date | DataType::DateTime => match (epoch_millis(data), epoch_millis(filter)) {
            (Some(a), Some(b)) => compare_ordered(a as f64, b as f64, operator),
            _ => false,
        },
        DataType::Boolean => coerce_bool(data) == coerce_bool(filter),
        DataType::Unknown => lowercase(data).contains(&lowercase(filter)),
    }
}

/// Number and date comparison; unknown operators compare for equality.
/// NaN on either side makes every operator false.
fn compare_ordered(a: f64, b: f64, operator: Operator) -> bool {
    match operator {
        Operator::Gt => a > b,
        Operator::Gte => a >= b,
        Operator::Lt => a < b,
        Operator::Lte => a <= b,
        _ => a == b,
    }
}

fn lowercase(value: &Value) -> String {
    value.display_string().unwrap_or_default().to_lowercase()
}

/// Parses the longest numeric prefix of the value's string form.
///
/// `"30abc"` is 30, `"  -1.5e2x"` is -150, and anything without a leading
/// number (including null and booleans) is NaN.
pub fn parse_float(value: &Value) -> f64 {
    match value {
        Value::Int(n) => *n as f64,
        Value::Float(f) => *f,
        Value::Null | Value::Bool(_) => f64::NAN,
        other => other
            .display_string()
            .map(|s| parse_float_prefix(&s))
            .unwrap_or(f64::NAN),
    }
}

fn parse_float_prefix(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    if text[end..].starts_with("Infinity") {
        return text[..end + "Infinity".len()].replace("Infinity", "inf").parse().unwrap_or(f64::NAN);
    }

    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut mantissa_digits = end - digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        mantissa_digits += frac_end - frac_start;
        if mantissa_digits > 0 {
            end = frac_end;
        }
    }
    if mantissa_digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(f64::NAN)
}

/// Coerces a value to a boolean.
///
/// Numbers are true when non-zero; the strings `false`, `0`, `no` and the
/// empty string are false, every other string is true.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(n) => *n != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::String(s) => !matches!(s.trim().to_ascii_lowercase().as_str(), "" | "false" | "0" | "no"),
        Value::DateTime(_) | Value::Json(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_never_matches() {
        for data_type in [
            DataType::String,
            DataType::Number,
            DataType::Boolean,
            DataType::Date,
            DataType::DateTime,
            DataType::Unknown,
        ] {
            for operator in [Operator::Eq, Operator::Contains, Operator::Gte, Operator::Other] {
                assert!(!matches(&Value::Null, &Value::Null, operator, data_type));
                assert!(!matches(&Value::Null, &Value::from(""), operator, data_type));
            }
        }
    }

    #[test]
    fn test_string_operators_case_insensitive() {
        let data = Value::from("Amelia");
        assert!(matches(&data, &Value::from("amelia"), Operator::Eq, DataType::String));
        assert!(matches(&data, &Value::from("ELI"), Operator::Contains, DataType::String));
        assert!(matches(&data, &Value::from("am"), Operator::StartsWith, DataType::String));
        assert!(matches(&data, &Value::from("LIA"), Operator::EndsWith, DataType::String));
        assert!(!matches(&data, &Value::from("bob"), Operator::Contains, DataType::String));
    }

    #[test]
    fn test_string_unknown_operator_is_contains() {
        let data = Value::from("Amelia");
        assert!(matches(&data, &Value::from("mel"), Operator::Gt, DataType::String));
        assert!(matches(&data, &Value::from("mel"), Operator::Other, DataType::String));
    }

    #[test]
    fn test_number_parses_both_sides() {
        let data = Value::from("30");
        assert!(matches(&data, &Value::from(30i64), Operator::Gte, DataType::Number));
        assert!(matches(&data, &Value::from("30"), Operator::Eq, DataType::Number));
        assert!(!matches(&data, &Value::from(30i64), Operator::Gt, DataType::Number));
        assert!(matches(&Value::from(12.5), &Value::from("20"), Operator::Lt, DataType::Number));
        assert!(matches(&Value::from(20i64), &Value::from(20i64), Operator::Lte, DataType::Number));
    }

    #[test]
    fn test_number_unknown_operator_is_eq() {
        assert!(matches(&Value::from(5i64), &Value::from("5"), Operator::Contains, DataType::Number));
        assert!(!matches(&Value::from(5i64), &Value::from("6"), Operator::Contains, DataType::Number));
    }

    #[test]
    fn test_number_nan_is_false() {
        let data = Value::from("abc");
        for operator in [Operator::Eq, Operator::Gt, Operator::Gte, Operator::Lt, Operator::Lte, Operator::Other] {
            assert!(!matches(&data, &Value::from("abc"), operator, DataType::Number));
        }
    }

    #[test]
    fn test_date_comparison() {
        let data = Value::from("2024-03-01");
        assert!(matches(&data, &Value::from("2024-01-01"), Operator::Gt, DataType::Date));
        assert!(matches(&data, &Value::from("2024-03-01T00:00:00Z"), Operator::Eq, DataType::DateTime));
        assert!(!matches(&data, &Value::from("not a date"), Operator::Lt, DataType::Date));
    }

    #[test]
    fn test_boolean_equality_only() {
        assert!(matches(&Value::from(true), &Value::from("true"), Operator::Eq, DataType::Boolean));
        assert!(matches(&Value::from(false), &Value::from("false"), Operator::Gt, DataType::Boolean));
        assert!(!matches(&Value::from(true), &Value::from(0i64), Operator::Eq, DataType::Boolean));
    }

    #[test]
    fn test_unknown_type_substring() {
        let data = Value::from(12345i64);
        assert!(matches(&data, &Value::from("234"), Operator::Eq, DataType::Unknown));
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float(&Value::from("30abc")), 30.0);
        assert_eq!(parse_float(&Value::from("  -1.5e2x")), -150.0);
        assert_eq!(parse_float(&Value::from(".5")), 0.5);
        assert_eq!(parse_float(&Value::from("7.")), 7.0);
        assert_eq!(parse_float(&Value::from("1e")), 1.0);
        assert!(parse_float(&Value::from("abc")).is_nan());
        assert!(parse_float(&Value::from(".")).is_nan());
        assert!(parse_float(&Value::from(true)).is_nan());
        assert_eq!(parse_float(&Value::from("-Infinity")), f64::NEG_INFINITY);
    }
}
