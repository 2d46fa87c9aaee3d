use crate::connector::ConnectorSlot;
use crate::loader::LoaderKind;
use crate::payload::RawRequest;
use crate::schema::{SchemaError, SchemaSource};
use crate::validator::{validate, ValidatedArguments, ValidationError};
use http::Method;
use serde::Serialize;
use serde_json::{json, Value};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated response header storage
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Per-dispatch correlation id backed by ULID
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse a caller-supplied id when it parses, otherwise mint one
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

/// Result of a handler: status, headers and JSON body
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with a content-type header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header (case-insensitive name match)
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Why a bound request did not reach (or did not return from) its handler
#[derive(Debug)]
pub enum DispatchError {
    /// Caller input rejected by the descriptor
    Validation(ValidationError),
    /// A schema factory needs the chain connector and none is configured
    DependencyUnavailable { resource: String },
    /// A factory produced an invalid descriptor
    Schema(SchemaError),
    HandlerPanicked { resource: String, details: String },
}

impl DispatchError {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            DispatchError::Validation(_) => 400,
            DispatchError::DependencyUnavailable { .. } => 503,
            DispatchError::Schema(_) | DispatchError::HandlerPanicked { .. } => 500,
        }
    }

    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        let status = self.status();
        match self {
            DispatchError::Validation(e) => HandlerResponse::json(status, e.to_json()),
            DispatchError::DependencyUnavailable { resource } => HandlerResponse::json(
                status,
                json!({
                    "error": "Chain connector is not configured",
                    "resource": resource,
                }),
            ),
            DispatchError::Schema(e) => HandlerResponse::error(status, &e.to_string()),
            DispatchError::HandlerPanicked { details, .. } => {
                HandlerResponse::error(status, &format!("Handler panicked: {details}"))
            }
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Validation(e) => write!(f, "{e}"),
            DispatchError::DependencyUnavailable { resource } => {
                write!(f, "resource {resource} requires a chain connector but none is configured")
            }
            DispatchError::Schema(e) => write!(f, "{e}"),
            DispatchError::HandlerPanicked { resource, details } => {
                write!(f, "handler for {resource} panicked: {details}")
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::Validation(e) => Some(e),
            DispatchError::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ValidationError> for DispatchError {
    fn from(e: ValidationError) -> Self {
        DispatchError::Validation(e)
    }
}

impl From<SchemaError> for DispatchError {
    fn from(e: SchemaError) -> Self {
        DispatchError::Schema(e)
    }
}

/// Handler receiving the validated keyword set of one request
pub type Handler = Arc<dyn Fn(ValidatedArguments) -> HandlerResponse + Send + Sync>;

/// What one (resource, verb) pair is bound to
#[derive(Clone)]
pub struct Binding {
    pub loader: LoaderKind,
    pub schema: SchemaSource,
    handler: Handler,
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("loader", &self.loader)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Binding table plus the connector slot factories read from.
///
/// Read-only after startup; shared across requests behind `Arc`.
#[derive(Clone)]
pub struct Dispatcher {
    bindings: HashMap<(String, Method), Binding>,
    connector: Arc<ConnectorSlot>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Dispatcher with an empty connector slot
    #[must_use]
    pub fn new() -> Self {
        Self::with_connector_slot(Arc::new(ConnectorSlot::new()))
    }

    #[must_use]
    pub fn with_connector_slot(connector: Arc<ConnectorSlot>) -> Self {
        Self {
            bindings: HashMap::new(),
            connector,
        }
    }

    #[must_use]
    pub fn connector_slot(&self) -> &Arc<ConnectorSlot> {
        &self.connector
    }

    /// Bind a loader, schema and handler to `resource` + `method`.
    ///
    /// Rebinding the same pair replaces the previous binding.
    pub fn bind<F>(
        &mut self,
        resource: &str,
        method: Method,
        loader: LoaderKind,
        schema: impl Into<SchemaSource>,
        handler: F,
    ) where
        F: Fn(ValidatedArguments) -> HandlerResponse + Send + Sync + 'static,
    {
        let schema = schema.into();
        let key = (resource.to_string(), method.clone());
        if self.bindings.contains_key(&key) {
            warn!(resource = %resource, method = %method, "Replaced existing binding");
        }
        info!(
            resource = %resource,
            method = %method,
            loader = %loader,
            schema = ?schema,
            total_bindings = self.bindings.len() + 1,
            "Binding registered"
        );
        self.bindings.insert(
            key,
            Binding {
                loader,
                schema,
                handler: Arc::new(handler),
            },
        );
    }

    #[must_use]
    pub fn binding(&self, resource: &str, method: &Method) -> Option<&Binding> {
        self.bindings.get(&(resource.to_string(), method.clone()))
    }

    /// Verbs bound for `resource`, sorted by name
    #[must_use]
    pub fn methods_for(&self, resource: &str) -> Vec<Method> {
        let mut methods: Vec<Method> = self
            .bindings
            .keys()
            .filter(|(r, _)| r == resource)
            .map(|(_, m)| m.clone())
            .collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Run schema resolution, loading and validation for a request without
    /// calling the handler. `None` when nothing is bound.
    #[must_use]
    pub fn resolve(
        &self,
        resource: &str,
        request: &RawRequest,
    ) -> Option<Result<ValidatedArguments, DispatchError>> {
        let binding = self.binding(resource, &request.method)?;
        Some(self.prepare(resource, binding, request))
    }

    fn prepare(
        &self,
        resource: &str,
        binding: &Binding,
        request: &RawRequest,
    ) -> Result<ValidatedArguments, DispatchError> {
        let schema = binding.schema.resolve(&self.connector, resource)?;
        let merged = binding.loader.load(request, &schema);
        debug!(
            resource = %resource,
            loader = %binding.loader,
            merged_keys = ?merged.keys().collect::<Vec<_>>(),
            "Payload merged"
        );
        Ok(validate(&merged, &schema)?)
    }

    /// Dispatch with a freshly minted request id
    #[must_use]
    pub fn dispatch(&self, resource: &str, request: &RawRequest) -> Option<HandlerResponse> {
        self.dispatch_with_request_id(resource, request, RequestId::new())
    }

    /// Resolve the schema, load, validate and call the bound handler.
    ///
    /// Returns `None` when `resource` + method has no binding. Any failure
    /// before the handler becomes an error response; the handler's own
    /// response is returned unchanged.
    #[must_use]
    pub fn dispatch_with_request_id(
        &self,
        resource: &str,
        request: &RawRequest,
        request_id: RequestId,
    ) -> Option<HandlerResponse> {
        let Some(binding) = self.binding(resource, &request.method) else {
            debug!(
                request_id = %request_id,
                resource = %resource,
                method = %request.method,
                "No binding for resource and method"
            );
            return None;
        };

        let args = match self.prepare(resource, binding, request) {
            Ok(args) => args,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    resource = %resource,
                    method = %request.method,
                    status = e.status(),
                    error = %e,
                    "Request rejected before handler"
                );
                return Some(e.into_response());
            }
        };

        info!(
            request_id = %request_id,
            resource = %resource,
            method = %request.method,
            "Handler execution start"
        );
        let start = Instant::now();
        let handler = Arc::clone(&binding.handler);
        match catch_unwind(AssertUnwindSafe(move || handler(args))) {
            Ok(response) => {
                info!(
                    request_id = %request_id,
                    resource = %resource,
                    status = response.status,
                    execution_time_us = start.elapsed().as_micros() as u64,
                    "Handler execution complete"
                );
                Some(response)
            }
            Err(panic) => {
                let details = panic_message(panic.as_ref());
                error!(
                    request_id = %request_id,
                    resource = %resource,
                    panic_message = %details,
                    "Handler panicked"
                );
                Some(
                    DispatchError::HandlerPanicked {
                        resource: resource.to_string(),
                        details,
                    }
                    .into_response(),
                )
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, FieldType, SchemaDescriptor};

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::builder("Tasks")
            .field(FieldSpec::new("task_id", FieldType::Integer).nullable())
            .build()
            .unwrap()
    }

    #[test]
    fn request_id_round_trips_through_header() {
        let id = RequestId::new();
        let header = id.to_string();
        assert_eq!(RequestId::from_header_or_new(Some(&header)), id);
        assert_ne!(RequestId::from_header_or_new(Some("nope")), id);
    }

    #[test]
    fn panicking_handler_becomes_500() {
        let mut d = Dispatcher::new();
        d.bind("tasks", Method::GET, LoaderKind::Path, schema(), |_| {
            panic!("boom");
        });
        let resp = d
            .dispatch("tasks", &RawRequest::new(Method::GET, "/tasks"))
            .unwrap();
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Handler panicked: boom");
    }

    #[test]
    fn unbound_verb_is_none() {
        let mut d = Dispatcher::new();
        d.bind("tasks", Method::GET, LoaderKind::Path, schema(), |args| {
            HandlerResponse::ok(args.to_json())
        });
        assert!(d
            .dispatch("tasks", &RawRequest::new(Method::POST, "/tasks"))
            .is_none());
        assert_eq!(d.methods_for("tasks"), vec![Method::GET]);
    }

    #[test]
    fn set_header_replaces_case_insensitively() {
        let mut resp = HandlerResponse::ok(json!({}));
        resp.set_header("Content-Type", "text/plain".to_string());
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("content-type"), Some("text/plain"));
    }
}
