//! # Schema Module
//!
//! Declarative descriptions of the arguments an endpoint accepts.
//!
//! A [`SchemaDescriptor`] is an ordered set of [`FieldSpec`]s (name, target
//! [`FieldType`], required/nullable flags, optional default, [`FieldRule`]s)
//! plus optional whole-payload checks. Descriptors are either built once at
//! startup ([`SchemaSource::Static`]) or produced per request by a
//! [`SchemaFactory`] that needs the active chain connector
//! ([`SchemaSource::Factory`]).
//!
//! ```rust
//! use brrtargs::schema::{FieldRule, FieldSpec, FieldType, SchemaDescriptor};
//!
//! let schema = SchemaDescriptor::builder("AsyncTasksQuery")
//!     .field(
//!         FieldSpec::new("task_id", FieldType::Integer)
//!             .nullable()
//!             .rule(FieldRule::min(0.0)),
//!     )
//!     .build()
//!     .expect("field names are unique");
//! assert_eq!(schema.field_names(), vec!["task_id"]);
//! ```

mod factory;
mod types;

pub(crate) use types::domain_enum;
pub use factory::{SchemaFactory, SchemaSource};
pub use types::{
    CheckFn, EnumSpec, FieldDefault, FieldRule, FieldSpec, FieldType, RuleFn, SchemaBuilder,
    SchemaCheck, SchemaDescriptor, SchemaError,
};
