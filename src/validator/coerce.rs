//! Per-type coercion of raw JSON values into [`TypedValue`]s.
//!
//! Query and path values always arrive as strings, body values as whatever JSON
//! the caller sent, so every scalar coercion accepts both shapes.

use super::core::validate_fields;
use super::{FieldIssue, TypedValue};
use crate::schema::{EnumSpec, FieldType};
use serde_json::{Map, Value};

const TRUTHY: &[&str] = &["true", "t", "1", "yes", "y", "on"];
const FALSY: &[&str] = &["false", "f", "0", "no", "n", "off"];

/// Coerce `raw` to `ty`. `field` names the top-level field, `location` the
/// path to `raw` inside it.
pub(crate) fn coerce(
    ty: &FieldType,
    raw: &Value,
    delimiter: Option<char>,
    field: &str,
    location: &str,
) -> Result<TypedValue, Vec<FieldIssue>> {
    let fail = |message: String| vec![FieldIssue::at(field, location, message)];

    if raw.is_null() && !matches!(ty, FieldType::Json) {
        return Err(fail("Field may not be null.".to_string()));
    }

    match ty {
        FieldType::Bool => coerce_bool(raw).ok_or_else(|| fail("Not a valid boolean.".into())),
        FieldType::Integer => coerce_int(raw)
            .map(TypedValue::Int)
            .ok_or_else(|| fail("Not a valid integer.".into())),
        FieldType::Float => coerce_float(raw)
            .map(TypedValue::Float)
            .ok_or_else(|| fail("Not a valid number.".into())),
        FieldType::Timestamp => coerce_timestamp(raw)
            .map(TypedValue::Timestamp)
            .ok_or_else(|| fail("Not a valid timestamp.".into())),
        FieldType::String => raw
            .as_str()
            .map(|s| TypedValue::Str(s.to_string()))
            .ok_or_else(|| fail("Not a valid string.".into())),
        FieldType::Asset => match raw.as_str().map(str::trim) {
            Some(s) if !s.is_empty() && !s.chars().any(char::is_whitespace) => {
                Ok(TypedValue::Asset(s.to_string()))
            }
            _ => Err(fail("Not a valid asset identifier.".into())),
        },
        FieldType::Address => match raw.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => Ok(TypedValue::Address(s.to_string())),
            _ => Err(fail("Not a valid address.".into())),
        },
        FieldType::Enum(spec) => coerce_enum(spec, raw).map_err(fail),
        FieldType::List(item) => {
            let items = list_items(raw, delimiter).ok_or_else(|| fail("Not a valid list.".into()))?;
            let mut out = Vec::with_capacity(items.len());
            for (i, element) in items.iter().enumerate() {
                // first failing element ends the list
                let element_location = format!("{location}[{i}]");
                out.push(coerce(item, element, None, field, &element_location)?);
            }
            Ok(TypedValue::List(out))
        }
        FieldType::Tuple(items) => {
            let Some(values) = array_or_json_string(raw) else {
                return Err(fail(format!("Expected a list of {} elements.", items.len())));
            };
            if values.len() != items.len() {
                return Err(fail(format!("Expected a list of {} elements.", items.len())));
            }
            let mut out = Vec::with_capacity(items.len());
            let mut issues = Vec::new();
            for (i, (item_ty, element)) in items.iter().zip(values.iter()).enumerate() {
                match coerce(item_ty, element, None, field, &format!("{location}[{i}]")) {
                    Ok(v) => out.push(v),
                    Err(mut e) => issues.append(&mut e),
                }
            }
            if issues.is_empty() {
                Ok(TypedValue::Tuple(out))
            } else {
                Err(issues)
            }
        }
        FieldType::Object(schema) => {
            let map = object_or_json_string(raw)
                .ok_or_else(|| fail("Not a valid mapping type.".into()))?;
            validate_fields(schema, &map, Some((field, location))).map(TypedValue::Object)
        }
        FieldType::Json => Ok(TypedValue::Json(raw.clone())),
    }
}

fn coerce_bool(raw: &Value) -> Option<TypedValue> {
    match raw {
        Value::Bool(b) => Some(TypedValue::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(TypedValue::Bool(true)),
            Some(0) => Some(TypedValue::Bool(false)),
            _ => None,
        },
        Value::String(s) => {
            let token = s.trim().to_ascii_lowercase();
            if TRUTHY.contains(&token.as_str()) {
                Some(TypedValue::Bool(true))
            } else if FALSY.contains(&token.as_str()) {
                Some(TypedValue::Bool(false))
            } else {
                None
            }
        }
        _ => None,
    }
}

fn coerce_int(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_float(raw: &Value) -> Option<f64> {
    let value = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    value.is_finite().then_some(value)
}

fn coerce_timestamp(raw: &Value) -> Option<u64> {
    match raw {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse::<u64>().ok()
        }
        _ => None,
    }
}

fn coerce_enum(spec: &EnumSpec, raw: &Value) -> Result<TypedValue, String> {
    raw.as_str()
        .and_then(|s| spec.resolve(s))
        .map(|canonical| TypedValue::Enum(canonical.to_string()))
        .ok_or_else(|| format!("Must be one of: {}.", spec.variants.join(", ")))
}

/// Arrays pass through; strings are either a JSON array literal or, when a
/// delimiter is declared, split on it.
fn list_items(raw: &Value, delimiter: Option<char>) -> Option<Vec<Value>> {
    if let Some(items) = array_or_json_string(raw) {
        return Some(items);
    }
    let (Value::String(s), Some(delim)) = (raw, delimiter) else {
        return None;
    };
    if s.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(
        s.split(delim)
            .map(|part| Value::String(part.trim().to_string()))
            .collect(),
    )
}

fn array_or_json_string(raw: &Value) -> Option<Vec<Value>> {
    match raw {
        Value::Array(items) => Some(items.clone()),
        Value::String(s) if s.trim_start().starts_with('[') => {
            match serde_json::from_str::<Value>(s) {
                Ok(Value::Array(items)) => Some(items),
                _ => None,
            }
        }
        _ => None,
    }
}

fn object_or_json_string(raw: &Value) -> Option<Map<String, Value>> {
    match raw {
        Value::Object(map) => Some(map.clone()),
        Value::String(s) if s.trim_start().starts_with('{') => {
            match serde_json::from_str::<Value>(s) {
                Ok(Value::Object(map)) => Some(map),
                _ => None,
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ok(ty: &FieldType, raw: Value) -> TypedValue {
        coerce(ty, &raw, None, "f", "f").unwrap()
    }

    fn err(ty: &FieldType, raw: Value) -> Vec<FieldIssue> {
        coerce(ty, &raw, None, "f", "f").unwrap_err()
    }

    #[test]
    fn bool_tokens_are_case_insensitive() {
        for token in ["TRUE", "t", "1", "Yes", "y", "On"] {
            assert_eq!(ok(&FieldType::Bool, json!(token)), TypedValue::Bool(true), "{token}");
        }
        for token in ["false", "F", "0", "no", "N", "off"] {
            assert_eq!(ok(&FieldType::Bool, json!(token)), TypedValue::Bool(false), "{token}");
        }
        assert_eq!(ok(&FieldType::Bool, json!(1)), TypedValue::Bool(true));
        assert_eq!(err(&FieldType::Bool, json!("maybe"))[0].message, "Not a valid boolean.");
        assert!(coerce(&FieldType::Bool, &json!(2), None, "f", "f").is_err());
    }

    #[test]
    fn timestamps_are_non_negative_integers() {
        assert_eq!(ok(&FieldType::Timestamp, json!("100")), TypedValue::Timestamp(100));
        assert_eq!(ok(&FieldType::Timestamp, json!(0)), TypedValue::Timestamp(0));
        assert!(coerce(&FieldType::Timestamp, &json!(-1), None, "f", "f").is_err());
        assert!(coerce(&FieldType::Timestamp, &json!("-1"), None, "f", "f").is_err());
        assert!(coerce(&FieldType::Timestamp, &json!("1.5"), None, "f", "f").is_err());
    }

    #[test]
    fn integers_and_floats() {
        assert_eq!(ok(&FieldType::Integer, json!(" 42 ")), TypedValue::Int(42));
        assert_eq!(ok(&FieldType::Integer, json!(3.0)), TypedValue::Int(3));
        assert!(coerce(&FieldType::Integer, &json!(3.5), None, "f", "f").is_err());
        assert_eq!(ok(&FieldType::Float, json!("0.25")), TypedValue::Float(0.25));
        assert!(coerce(&FieldType::Float, &json!("NaN"), None, "f", "f").is_err());
    }

    #[test]
    fn enum_returns_canonical_variant() {
        const SIDE: EnumSpec = EnumSpec::new("Side", &["BUY", "SELL"]);
        assert_eq!(
            ok(&FieldType::Enum(SIDE), json!("sell")),
            TypedValue::Enum("SELL".into())
        );
        assert_eq!(
            err(&FieldType::Enum(SIDE), json!("hold"))[0].message,
            "Must be one of: BUY, SELL."
        );
    }

    #[test]
    fn list_reports_first_failing_element() {
        let ty = FieldType::list_of(FieldType::Timestamp);
        let issues = err(&ty, json!(["1", "2", "x", "y"]));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].location, "f[2]");
        assert_eq!(issues[0].field, "f");
    }

    #[test]
    fn delimited_strings_split_into_lists() {
        let ty = FieldType::list_of(FieldType::Asset);
        let value = coerce(&ty, &json!("BTC, ETH"), Some(','), "f", "f").unwrap();
        assert_eq!(
            value,
            TypedValue::List(vec![
                TypedValue::Asset("BTC".into()),
                TypedValue::Asset("ETH".into())
            ])
        );
        assert!(coerce(&ty, &json!("BTC"), None, "f", "f").is_err());
    }

    #[test]
    fn tuple_checks_arity_and_elements() {
        let ty = FieldType::Tuple(vec![FieldType::Asset, FieldType::Timestamp]);
        assert_eq!(
            ok(&ty, json!(["BTC", 1])),
            TypedValue::Tuple(vec![TypedValue::Asset("BTC".into()), TypedValue::Timestamp(1)])
        );
        assert_eq!(err(&ty, json!(["BTC"]))[0].message, "Expected a list of 2 elements.");
        assert_eq!(err(&ty, json!(["BTC", "soon"]))[0].location, "f[1]");
    }

    #[test]
    fn null_is_rejected_except_for_json() {
        assert_eq!(err(&FieldType::String, Value::Null)[0].message, "Field may not be null.");
        assert_eq!(ok(&FieldType::Json, Value::Null), TypedValue::Json(Value::Null));
    }
}
