//! # brrtargs
//!
//! Request argument resolution for resource endpoints: read each input
//! location, merge them by precedence, validate the result against a
//! declarative descriptor, then call a handler with typed keyword arguments.
//!
//! ## Request flow
//!
//! ```text
//! HTTP request
//!   -> router          pattern match, path params decoded
//!   -> dispatcher      (resource, verb) -> loader + descriptor + handler
//!        -> schema     static descriptor, or factory over the chain connector
//!        -> loader     body / query / path readers, merged path > query > body
//!        -> validator  coerce, defaults, rules, whole-payload checks
//!   -> handler         facade call with ValidatedArguments
//! ```
//!
//! ## Modules
//!
//! - **[`loader`]** - location readers and composite loaders
//! - **[`schema`]** - field specs, descriptors and descriptor factories
//! - **[`validator`]** - payload validation and typed values
//! - **[`connector`]** - chain connector trait and the process-wide slot
//! - **[`dispatcher`]** - endpoint bindings and dispatch
//! - **[`typed`]** - binding handlers that take deserialized argument structs
//! - **[`resources`]** - the registered resource table and facade trait
//! - **[`router`]** - path pattern matching
//! - **[`server`]** - `may_minihttp` host
//! - **[`config`]**, **[`logging`]**, **[`runtime_config`]**, **[`cli`]** - process setup
//!
//! ## Example
//!
//! ```rust
//! use brrtargs::loader::LoaderKind;
//! use brrtargs::payload::RawRequest;
//! use brrtargs::schema::{FieldSpec, FieldType, SchemaDescriptor};
//! use brrtargs::validator::validate;
//! use http::Method;
//!
//! let schema = SchemaDescriptor::builder("Balances")
//!     .field(FieldSpec::new("name", FieldType::String).nullable())
//!     .field(FieldSpec::new("ignore_cache", FieldType::Bool).default_value(false))
//!     .build()
//!     .unwrap();
//!
//! let request = RawRequest::from_target(Method::GET, "/balances/kraken?name=ignored")
//!     .with_path_param("name", "kraken")
//!     .with_body(r#"{"ignore_cache": true}"#);
//!
//! let merged = LoaderKind::BodyQueryAndPath.load(&request, &schema);
//! let args = validate(&merged, &schema).unwrap();
//! assert_eq!(args.get("name").and_then(|v| v.as_str()), Some("kraken"));
//! assert_eq!(args.get("ignore_cache").and_then(|v| v.as_bool()), Some(true));
//! ```

pub mod cli;
pub mod config;
pub mod connector;
pub mod dispatcher;
pub mod loader;
pub mod logging;
pub mod payload;
pub mod resources;
pub mod router;
pub mod runtime_config;
pub mod schema;
pub mod server;
pub mod typed;
pub mod validator;

pub use dispatcher::{Dispatcher, HandlerResponse};
pub use loader::LoaderKind;
pub use router::Router;
pub use schema::{SchemaDescriptor, SchemaSource};
pub use validator::{validate, ValidatedArguments, ValidationError};
