use crate::payload::{parse_query_pairs, QueryPairs, RawRequest};
use crate::router::ParamVec;
use http::Method;
use may_minihttp::Request;
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info, warn};

/// HTTP request data extracted from the wire, before routing.
///
/// The body is kept as raw bytes; the body location reader decides whether it
/// is usable JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path without the query string
    pub path: String,
    /// Decoded query pairs in wire order
    pub query: QueryPairs,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Split a request target into path and raw query string
#[must_use]
pub fn split_target(target: &str) -> (&str, &str) {
    match target.split_once('?') {
        Some((path, query)) => (if path.is_empty() { "/" } else { path }, query),
        None => (if target.is_empty() { "/" } else { target }, ""),
    }
}

impl ParsedRequest {
    /// Build from a method and a target such as `/api/1/trades?location=kraken`
    #[must_use]
    pub fn from_target(method: &str, target: &str) -> Self {
        let (path, query) = split_target(target);
        Self {
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            query: parse_query_pairs(query),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Hand the request to the loaders with the router's path params bound
    #[must_use]
    pub fn into_raw(self, method: Method, path_params: ParamVec) -> RawRequest {
        RawRequest::new(method, self.path)
            .with_body(self.body)
            .with_query(self.query)
            .with_path_params(path_params)
    }
}

/// Extract method, target, headers and body from a `may_minihttp::Request`.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let (path, query) = {
        let (path, query) = split_target(req.path());
        (path.to_string(), parse_query_pairs(query))
    };

    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    debug!(
        header_count = headers.len(),
        query_pairs = query.len(),
        "Headers and query extracted"
    );

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        warn!(error = %e, path = %path, "Failed to read request body");
        body.clear();
    }

    info!(
        method = %method,
        path = %path,
        body_size_bytes = body.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        path,
        query,
        headers,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_target() {
        assert_eq!(split_target("/p?x=1"), ("/p", "x=1"));
        assert_eq!(split_target("/p"), ("/p", ""));
        assert_eq!(split_target("?x=1"), ("/", "x=1"));
    }

    #[test]
    fn test_from_target_and_headers() {
        let req = ParsedRequest::from_target("get", "/api/1/trades?location=kraken&only_cache=true")
            .with_header("X-Request-Id", "abc");
        assert_eq!(req.method, "GET");
        assert_eq!(req.path, "/api/1/trades");
        assert_eq!(req.query.len(), 2);
        assert_eq!(req.header("x-request-id"), Some("abc"));
    }

    #[test]
    fn test_into_raw_carries_params() {
        let mut params = ParamVec::new();
        params.push(("name".into(), "kraken".to_string()));
        let raw = ParsedRequest::from_target("GET", "/x?a=1")
            .with_body(b"{}".to_vec())
            .into_raw(Method::GET, params);
        assert_eq!(raw.path_param("name"), Some("kraken"));
        assert_eq!(raw.body, b"{}");
        assert_eq!(raw.query[0].0, "a");
    }
}
