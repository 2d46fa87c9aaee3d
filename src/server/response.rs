use crate::dispatcher::HandlerResponse;
use http::StatusCode;
use may_minihttp::Response;
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// Upper bound on distinct interned header lines
const MAX_INTERNED_HEADERS: usize = 1024;

static HEADER_LINES: Lazy<Mutex<HashMap<String, &'static str>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub(crate) fn status_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Unknown")
}

/// `may_minihttp` only takes `'static` header lines. Lines are leaked once and
/// reused; past the cap new lines are dropped.
fn header_line(name: &str, value: &str) -> Option<&'static str> {
    let line = format!("{name}: {value}");
    let mut lines = HEADER_LINES.lock().ok()?;
    if let Some(existing) = lines.get(&line) {
        return Some(*existing);
    }
    if lines.len() >= MAX_INTERNED_HEADERS {
        warn!(header = %name, "Header line cache full, dropping header");
        return None;
    }
    let leaked: &'static str = Box::leak(line.clone().into_boxed_str());
    lines.insert(line, leaked);
    Some(leaked)
}

pub fn write_handler_response(res: &mut Response, response: HandlerResponse) {
    res.status_code(response.status as usize, status_reason(response.status));
    let mut has_content_type = false;
    for (name, value) in &response.headers {
        if name.eq_ignore_ascii_case("content-type") {
            has_content_type = true;
        }
        if let Some(line) = header_line(name, value) {
            res.header(line);
        }
    }
    match response.body {
        Value::String(s) if !has_content_type => {
            res.header("Content-Type: text/plain");
            res.body_vec(s.into_bytes());
        }
        other => {
            if !has_content_type {
                res.header("Content-Type: application/json");
            }
            res.body_vec(other.to_string().into_bytes());
        }
    }
}
