//! # Typed Module
//!
//! Keyword-struct handlers.
//!
//! Instead of reading fields out of [`ValidatedArguments`](crate::validator::ValidatedArguments)
//! by name, a handler can declare a struct whose fields match the descriptor
//! and receive it already deserialized:
//!
//! ```rust
//! use brrtargs::dispatcher::{Dispatcher, HandlerResponse};
//! use brrtargs::loader::LoaderKind;
//! use brrtargs::schema::{FieldSpec, FieldType, SchemaDescriptor};
//! use http::Method;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct OracleArgs {
//!     oracle: String,
//!     async_query: bool,
//! }
//!
//! let schema = SchemaDescriptor::builder("OracleCache")
//!     .field(FieldSpec::new("oracle", FieldType::String).required())
//!     .field(FieldSpec::new("async_query", FieldType::Bool).default_value(false))
//!     .build()
//!     .unwrap();
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.bind_typed("oracle_cache", Method::GET, LoaderKind::BodyQueryAndPath, schema,
//!     |args: OracleArgs| HandlerResponse::ok(serde_json::json!({ "oracle": args.oracle })));
//! ```
//!
//! The struct and the descriptor must agree; a mismatch is answered with 500.

mod core;

pub use core::typed_handler;
