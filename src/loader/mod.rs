//! # Loader Module
//!
//! Location readers and the composite loaders that merge them.
//!
//! A [`Location`] reads one part of a [`RawRequest`](crate::payload::RawRequest)
//! (JSON body, query string, bound path segments) and either returns the
//! mapping it contributes or `None`. A [`LoaderKind`] is the static,
//! per-endpoint choice of which locations to read and in what precedence:
//!
//! | Loader | lowest -> highest |
//! |---|---|
//! | `BodyAndPath` | body, path |
//! | `BodyAndQuery` | body, query |
//! | `BodyQueryAndPath` | body, query, path |
//!
//! plus the single-location `Body`, `Query` and `Path` loaders.

mod composite;
mod readers;

pub use composite::{merge_into, LoaderKind};
pub use readers::Location;
