//! Router core: pattern compilation and path matching.

use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Maximum number of path parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated path parameter storage.
///
/// Names are `Arc<str>` shared with the compiled route; values are per request.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of matching a request path to a resource
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Resource name the pattern was registered for
    pub resource: Arc<str>,
    /// Pattern as registered (without base path)
    pub pattern: Arc<str>,
    /// URL-decoded path segments bound by the pattern
    pub path_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics when a name repeats in the pattern.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Convert path_params to a HashMap (allocates)
    #[must_use]
    pub fn path_params_map(&self) -> HashMap<String, String> {
        self.path_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

/// Error raised while registering a route
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// The same pattern was registered twice
    DuplicatePattern { pattern: String },
    /// Pattern is malformed (unbalanced braces, empty parameter name, ...)
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::DuplicatePattern { pattern } => {
                write!(f, "route pattern '{pattern}' is already registered")
            }
            RouterError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern '{pattern}': {reason}")
            }
        }
    }
}

impl std::error::Error for RouterError {}

#[derive(Debug, Clone)]
struct CompiledRoute {
    pattern: Arc<str>,
    resource: Arc<str>,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

/// Maps request paths to resource names.
///
/// Matching is method-agnostic: which verbs a resource accepts is the
/// dispatcher's concern. Patterns use `{name}` segments; every pattern is
/// mounted under the router's base path.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
    base_path: String,
}

impl Router {
    /// Create an empty router mounted at `base_path` (e.g. `/api/1`)
    #[must_use]
    pub fn new(base_path: &str) -> Self {
        Self {
            routes: Vec::new(),
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Register `pattern` for `resource`.
    ///
    /// Routes with fewer parameters are tried first, so a literal segment
    /// wins over a parameter in the same position.
    pub fn add_route(&mut self, pattern: &str, resource: &str) -> Result<(), RouterError> {
        if self.routes.iter().any(|r| r.pattern.as_ref() == pattern) {
            return Err(RouterError::DuplicatePattern {
                pattern: pattern.to_string(),
            });
        }
        let (regex, param_names) = Self::path_to_regex(pattern)?;
        self.routes.push(CompiledRoute {
            pattern: Arc::from(pattern),
            resource: Arc::from(resource),
            regex,
            param_names: param_names.into_iter().map(Arc::from).collect(),
        });
        self.routes.sort_by_key(|r| r.param_names.len());
        debug!(
            pattern = %pattern,
            resource = %resource,
            routes_count = self.routes.len(),
            "Route registered"
        );
        Ok(())
    }

    /// Match a request path (including the base path) to a resource.
    #[must_use]
    pub fn route(&self, path: &str) -> Option<RouteMatch> {
        let Some(relative) = self.strip_base(path) else {
            warn!(path = %path, base_path = %self.base_path, "Path outside base path");
            return None;
        };

        for route in &self.routes {
            let Some(captures) = route.regex.captures(relative) else {
                continue;
            };
            let mut path_params = ParamVec::new();
            for (i, name) in route.param_names.iter().enumerate() {
                if let Some(raw) = captures.get(i + 1) {
                    let value = urlencoding::decode(raw.as_str())
                        .map(|decoded| decoded.into_owned())
                        .unwrap_or_else(|_| raw.as_str().to_string());
                    path_params.push((Arc::clone(name), value));
                }
            }
            info!(
                path = %path,
                resource = %route.resource,
                route_pattern = %route.pattern,
                path_params = ?path_params,
                "Route matched"
            );
            return Some(RouteMatch {
                resource: Arc::clone(&route.resource),
                pattern: Arc::clone(&route.pattern),
                path_params,
            });
        }

        warn!(path = %path, "No route matched");
        None
    }

    /// `(full pattern, resource)` pairs in match order
    #[must_use]
    pub fn routes(&self) -> Vec<(String, String)> {
        self.routes
            .iter()
            .map(|r| (format!("{}{}", self.base_path, r.pattern), r.resource.to_string()))
            .collect()
    }

    /// Print all registered routes to stdout
    pub fn dump_routes(&self) {
        println!(
            "[routes] base_path={} count={}",
            self.base_path,
            self.routes.len()
        );
        for (pattern, resource) in self.routes() {
            println!("[route] {pattern} -> {resource}");
        }
    }

    fn strip_base<'a>(&self, path: &'a str) -> Option<&'a str> {
        let relative = if self.base_path.is_empty() {
            path
        } else {
            let rest = path.strip_prefix(self.base_path.as_str())?;
            if !rest.is_empty() && !rest.starts_with('/') {
                return None;
            }
            rest
        };
        let trimmed = relative.trim_end_matches('/');
        Some(if trimmed.is_empty() { "/" } else { trimmed })
    }

    /// Convert a `{param}` path pattern to an anchored regex plus the ordered
    /// parameter names. Literal segments are escaped.
    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), RouterError> {
        let invalid = |reason: &str| RouterError::InvalidPattern {
            pattern: path.to_string(),
            reason: reason.to_string(),
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if path == "/" {
            let regex = Regex::new(r"^/$").map_err(|e| invalid(&e.to_string()))?;
            return Ok((regex, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 5);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = &segment[1..segment.len() - 1];
                if param_name.is_empty() || param_name.contains(['{', '}']) {
                    return Err(invalid("empty or nested parameter name"));
                }
                pattern.push_str("/([^/]+)");
                param_names.push(param_name.to_string());
            } else if segment.contains(['{', '}']) {
                return Err(invalid("parameters must span a whole segment"));
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        pattern.push('$');
        let regex = Regex::new(&pattern).map_err(|e| invalid(&e.to_string()))?;
        Ok((regex, param_names))
    }
}
