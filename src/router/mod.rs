//! # Router Module
//!
//! Resolves request paths to resource names and extracts the path segments
//! bound by `{param}` patterns.
//!
//! Patterns are compiled to anchored regexes once at registration. Matching
//! ignores the HTTP method: a resource owns a path, and the dispatcher decides
//! which verbs it binds.
//!
//! ## Example
//!
//! ```rust
//! use brrtargs::router::Router;
//!
//! let mut router = Router::new("/api/1");
//! router.add_route("/oracles/{oracle}/cache", "oracle_cache").unwrap();
//!
//! let m = router.route("/api/1/oracles/coingecko/cache").unwrap();
//! assert_eq!(m.resource.as_ref(), "oracle_cache");
//! assert_eq!(m.get_path_param("oracle"), Some("coingecko"));
//! ```

mod core;

pub use core::{ParamVec, RouteMatch, Router, RouterError, MAX_INLINE_PARAMS};
