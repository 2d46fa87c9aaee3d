use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A coerced, domain-typed field value.
///
/// Serializes to the natural JSON shape of the value (enums as their canonical
/// spelling, tuples and lists as arrays), so typed argument structs can be
/// deserialized straight from [`ValidatedArguments`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TypedValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Timestamp(u64),
    Str(String),
    /// Canonical variant of an enumerated field
    Enum(String),
    Asset(String),
    Address(String),
    List(Vec<TypedValue>),
    Tuple(Vec<TypedValue>),
    Object(BTreeMap<String, TypedValue>),
    Json(Value),
}

impl TypedValue {
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TypedValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TypedValue::Int(i) => Some(*i),
            TypedValue::Timestamp(t) => i64::try_from(*t).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<u64> {
        match self {
            TypedValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Numeric view used by range rules
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TypedValue::Int(i) => Some(*i as f64),
            TypedValue::Float(f) => Some(*f),
            TypedValue::Timestamp(t) => Some(*t as f64),
            _ => None,
        }
    }

    /// Text view of string-like variants
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TypedValue::Str(s)
            | TypedValue::Enum(s)
            | TypedValue::Asset(s)
            | TypedValue::Address(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[TypedValue]> {
        match self {
            TypedValue::List(items) | TypedValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_object(&self) -> Option<&BTreeMap<String, TypedValue>> {
        match self {
            TypedValue::Object(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Bool(b)
    }
}

impl From<i64> for TypedValue {
    fn from(i: i64) -> Self {
        TypedValue::Int(i)
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::Str(s.to_string())
    }
}

impl From<String> for TypedValue {
    fn from(s: String) -> Self {
        TypedValue::Str(s)
    }
}

/// Final typed argument set handed to a handler.
///
/// Its key set is exactly the descriptor's field names. Consumed by value.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ValidatedArguments {
    values: BTreeMap<String, TypedValue>,
}

impl ValidatedArguments {
    pub(crate) fn new(values: BTreeMap<String, TypedValue>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypedValue> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, TypedValue> {
        self.values
    }

    /// Unpack into a keyword-style argument struct.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn typed_values_serialize_to_natural_json() {
        let value = TypedValue::List(vec![
            TypedValue::Tuple(vec![TypedValue::Asset("BTC".into()), TypedValue::Timestamp(5)]),
            TypedValue::Null,
        ]);
        assert_eq!(value.to_json(), json!([["BTC", 5], null]));
        assert_eq!(TypedValue::Enum("BINANCE".into()).to_json(), json!("BINANCE"));
    }

    #[test]
    fn into_typed_unpacks_keyword_struct() {
        #[derive(Deserialize)]
        struct Args {
            from_timestamp: u64,
            location: Option<String>,
            async_query: bool,
        }
        let mut map = BTreeMap::new();
        map.insert("from_timestamp".to_string(), TypedValue::Timestamp(10));
        map.insert("location".to_string(), TypedValue::Null);
        map.insert("async_query".to_string(), TypedValue::Bool(true));
        let args: Args = ValidatedArguments::new(map).into_typed().unwrap();
        assert_eq!(args.from_timestamp, 10);
        assert!(args.location.is_none());
        assert!(args.async_query);
    }

    #[test]
    fn numeric_views() {
        assert_eq!(TypedValue::Timestamp(3).as_f64(), Some(3.0));
        assert_eq!(TypedValue::Int(-2).as_i64(), Some(-2));
        assert_eq!(TypedValue::Str("x".into()).as_f64(), None);
    }
}
