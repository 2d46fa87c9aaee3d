//! HTTP host for the resource table, built on `may_minihttp`.
//!
//! [`AppService::handle`] is the whole request path: health check, routing,
//! then dispatch. A route that exists but has no binding for the verb answers
//! 405 with an `Allow` header.

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::{parse_request, split_target, ParsedRequest};
pub use service::{health_endpoint, AppService};
