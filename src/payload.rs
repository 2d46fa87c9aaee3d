//! Request-scoped carriers for the three input locations.

use crate::router::ParamVec;
use http::Method;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;

/// Mapping contributed by exactly one input location
pub type PartialPayload = Map<String, Value>;

/// Single mapping after the composite loader applied precedence
pub type MergedPayload = Map<String, Value>;

/// Ordered, multi-valued query pairs as they appeared on the wire
pub type QueryPairs = SmallVec<[(String, String); 8]>;

/// Per-request raw input: body bytes, query pairs and bound path params.
///
/// Nothing is parsed ahead of time; each location reader decides how to read
/// its own source.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: Method,
    pub path: String,
    pub body: Vec<u8>,
    pub query: QueryPairs,
    pub path_params: ParamVec,
}

impl RawRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: Vec::new(),
            query: QueryPairs::new(),
            path_params: ParamVec::new(),
        }
    }

    /// Build from a request target such as `/trades?location=kraken`
    pub fn from_target(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        let mut request = Self::new(method, path);
        request.query = parse_query_pairs(query);
        request
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_json_body(self, body: &Value) -> Self {
        let bytes = serde_json::to_vec(body).unwrap_or_default();
        self.with_body(bytes)
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryPairs) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_query_pair(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.push((Arc::from(name), value.to_string()));
        self
    }

    #[must_use]
    pub fn with_path_params(mut self, params: ParamVec) -> Self {
        self.path_params = params;
        self
    }

    /// Last value bound for a path param
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Decode a raw query string into ordered pairs, keeping repeated keys.
#[must_use]
pub fn parse_query_pairs(query: &str) -> QueryPairs {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_target_keeps_repeated_query_keys() {
        let req = RawRequest::from_target(Method::GET, "/prices?assets=BTC&assets=ETH&x=a%20b");
        assert_eq!(req.path, "/prices");
        assert_eq!(req.query.len(), 3);
        assert_eq!(req.query[1], ("assets".to_string(), "ETH".to_string()));
        assert_eq!(req.query[2].1, "a b");
    }

    #[test]
    fn path_param_is_last_write_wins() {
        let req = RawRequest::new(Method::GET, "/x")
            .with_path_param("id", "1")
            .with_path_param("id", "2");
        assert_eq!(req.path_param("id"), Some("2"));
        assert_eq!(req.path_param("missing"), None);
    }
}
