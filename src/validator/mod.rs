//! # Validator Module
//!
//! Applies a [`SchemaDescriptor`](crate::schema::SchemaDescriptor) to a merged
//! payload and produces [`ValidatedArguments`].
//!
//! ## Coercion
//!
//! Raw values come from JSON bodies (typed JSON) or from query/path strings, so
//! each target type accepts both encodings. Booleans accept a small set of
//! case-insensitive tokens, timestamps are non-negative integer epoch seconds,
//! lists validate element by element and stop at the first failing element,
//! tuples check arity then each position, and objects recurse into their own
//! descriptor.
//!
//! ## Failures
//!
//! A [`ValidationError`] lists every [`FieldIssue`] found: unknown keys, missing
//! required fields, uncoercible values and rule violations. A handler never
//! sees partially valid arguments.

mod coerce;
mod core;
mod error;
mod value;

pub use core::validate;
pub use error::{FieldIssue, ValidationError};
pub use value::{TypedValue, ValidatedArguments};
