//! # Dispatcher Module
//!
//! Binds, per resource and HTTP verb, one [`LoaderKind`](crate::loader::LoaderKind),
//! one [`SchemaSource`](crate::schema::SchemaSource) and one handler, and runs
//! the request pipeline:
//!
//! 1. resolve the schema (static, or built by a factory from the connector
//!    snapshot taken for this request)
//! 2. load and merge the request locations
//! 3. validate
//! 4. call the handler with the [`ValidatedArguments`](crate::validator::ValidatedArguments)
//!
//! Failures before the handler become responses: validation issues are 400,
//! a missing connector is 503. Handler panics are caught and answered with 500.
//!
//! ```rust
//! use brrtargs::dispatcher::{Dispatcher, HandlerResponse};
//! use brrtargs::loader::LoaderKind;
//! use brrtargs::payload::RawRequest;
//! use brrtargs::schema::{FieldSpec, FieldType, SchemaDescriptor};
//! use http::Method;
//!
//! let schema = SchemaDescriptor::builder("Trades")
//!     .field(FieldSpec::new("async_query", FieldType::Bool).default_value(false))
//!     .build()
//!     .unwrap();
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.bind("trades", Method::GET, LoaderKind::BodyAndQuery, schema, |args| {
//!     HandlerResponse::ok(args.to_json())
//! });
//!
//! let request = RawRequest::from_target(Method::GET, "/trades?async_query=yes");
//! let response = dispatcher.dispatch("trades", &request).unwrap();
//! assert_eq!(response.body["async_query"], true);
//! ```

mod core;

pub use core::{
    Binding, DispatchError, Dispatcher, Handler, HandlerResponse, HeaderVec, RequestId,
    MAX_INLINE_HEADERS,
};
