use crate::payload::{PartialPayload, RawRequest};
use crate::schema::{FieldType, SchemaDescriptor};
use serde_json::Value;
use std::fmt;

/// One input location of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Body,
    Query,
    Path,
}

impl Location {
    /// Extract what this location contributes, or `None` when it contributes
    /// nothing.
    ///
    /// - body: `None` when empty, not JSON, or not a JSON object; otherwise the
    ///   object unfiltered
    /// - query: `None` when the query string carries no pairs; list-typed
    ///   fields collect every occurrence, other keys keep the last one
    /// - path: always present, holding only the keys the route pattern bound
    #[must_use]
    pub fn read(self, request: &RawRequest, schema: &SchemaDescriptor) -> Option<PartialPayload> {
        match self {
            Location::Body => read_body(&request.body),
            Location::Query => read_query(request, schema),
            Location::Path => Some(read_path(request)),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Body => "json",
            Location::Query => "query",
            Location::Path => "view_args",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn read_body(body: &[u8]) -> Option<PartialPayload> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn read_query(request: &RawRequest, schema: &SchemaDescriptor) -> Option<PartialPayload> {
    if request.query.is_empty() {
        return None;
    }
    let mut map = PartialPayload::new();
    for (key, value) in &request.query {
        let list_delimiter = schema.field(key).and_then(|spec| match spec.ty {
            FieldType::List(_) => Some(spec.delimiter),
            _ => None,
        });
        match list_delimiter {
            Some(delimiter) => {
                let entry = map
                    .entry(key.clone())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if !entry.is_array() {
                    *entry = Value::Array(Vec::new());
                }
                if let Value::Array(items) = entry {
                    match delimiter {
                        Some(d) => items.extend(
                            value
                                .split(d)
                                .map(str::trim)
                                .filter(|part| !part.is_empty())
                                .map(|part| Value::String(part.to_string())),
                        ),
                        None => items.push(Value::String(value.clone())),
                    }
                }
            }
            // first occurrence wins for scalars
            None => {
                map.entry(key.clone())
                    .or_insert_with(|| Value::String(value.clone()));
            }
        }
    }
    Some(map)
}

fn read_path(request: &RawRequest) -> PartialPayload {
    let mut map = PartialPayload::new();
    // later bindings of the same name win
    for (name, value) in &request.path_params {
        map.insert(name.to_string(), Value::String(value.clone()));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use http::Method;
    use serde_json::json;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::builder("S")
            .field(FieldSpec::new("assets", FieldType::list_of(FieldType::Asset)).delimited(','))
            .field(FieldSpec::new("tags", FieldType::list_of(FieldType::String)))
            .field(FieldSpec::new("location", FieldType::String))
            .build()
            .unwrap()
    }

    #[test]
    fn body_absent_for_empty_invalid_or_non_object() {
        let s = schema();
        for body in ["", "   \n", "{not json", "[1,2]", "\"text\""] {
            let req = RawRequest::new(Method::GET, "/").with_body(body);
            assert!(Location::Body.read(&req, &s).is_none(), "{body:?}");
        }
        let req = RawRequest::new(Method::GET, "/").with_body("{}");
        assert_eq!(Location::Body.read(&req, &s), Some(PartialPayload::new()));
    }

    #[test]
    fn body_passes_unknown_keys_through() {
        let req = RawRequest::new(Method::GET, "/").with_json_body(&json!({"zzz": 1}));
        let map = Location::Body.read(&req, &schema()).unwrap();
        assert_eq!(map.get("zzz"), Some(&json!(1)));
    }

    #[test]
    fn query_lists_collect_all_occurrences() {
        let req = RawRequest::from_target(
            Method::GET,
            "/?assets=BTC,ETH&assets=DOT&tags=a&tags=b&location=x&location=y",
        );
        let map = Location::Query.read(&req, &schema()).unwrap();
        assert_eq!(map["assets"], json!(["BTC", "ETH", "DOT"]));
        assert_eq!(map["tags"], json!(["a", "b"]));
        assert_eq!(map["location"], json!("x"));
    }

    #[test]
    fn query_absent_without_pairs() {
        let req = RawRequest::from_target(Method::GET, "/trades");
        assert!(Location::Query.read(&req, &schema()).is_none());
    }

    #[test]
    fn path_is_never_absent() {
        let req = RawRequest::new(Method::GET, "/");
        assert_eq!(Location::Path.read(&req, &schema()), Some(PartialPayload::new()));
        let req = req.with_path_param("blockchain", "ETH");
        assert_eq!(Location::Path.read(&req, &schema()).unwrap()["blockchain"], json!("ETH"));
    }
}
