//! Router core module - hot path for request routing.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use super::routes::RouteMeta;
use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` because they come from the static route table;
/// values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Result of successfully matching a request path to a route
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteMeta>,
    /// Path parameters extracted from the URL (e.g., `{id}` → `("id", "123")`)
    pub path_params: ParamVec,
    pub handler_name: String,
    /// Query string parameters (populated by the server)
    pub query_params: ParamVec,
}

impl RouteMatch {
    /// Get a path parameter by name. Last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name. Last occurrence wins (`?genre=a&genre=b` → `b`).
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }
}

struct CompiledRoute {
    method: Method,
    regex: Regex,
    meta: Arc<RouteMeta>,
    param_names: Vec<Arc<str>>,
}

/// Matches `(method, path)` pairs against a fixed table of path templates.
///
/// Templates compile to anchored regexes once, at construction. Matching is a
/// linear scan; the table is tiny.
#[derive(Clone)]
pub struct Router {
    routes: Arc<Vec<CompiledRoute>>,
}

impl Router {
    /// Compile `routes` into a router.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a template cannot be compiled.
    pub fn new(routes: Vec<RouteMeta>) -> Result<Self, regex::Error> {
        let mut routes = routes;
        // Longest template first so `/movies/{id}` is tried before `/movies`.
        routes.sort_by_key(|r| std::cmp::Reverse(r.path_pattern.len()));

        let compiled = routes
            .into_iter()
            .map(|route| {
                let (regex, param_names) = Self::path_to_regex(&route.path_pattern)?;
                Ok(CompiledRoute {
                    method: route.method.clone(),
                    regex,
                    param_names: param_names.into_iter().map(Arc::from).collect(),
                    meta: Arc::new(route),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;

        info!(routes_count = compiled.len(), "Routing table loaded");
        for r in compiled.iter() {
            debug!(
                method = %r.method,
                path = %r.meta.path_pattern,
                handler = %r.meta.handler_name,
                "Route registered"
            );
        }

        Ok(Self {
            routes: Arc::new(compiled),
        })
    }

    /// Find the route for `method` and `path`. `path` must not contain the query string.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        for route in self.routes.iter() {
            if route.method != *method {
                continue;
            }
            if let Some(captures) = route.regex.captures(path) {
                let mut params = ParamVec::new();
                for (i, name) in route.param_names.iter().enumerate() {
                    if let Some(val) = captures.get(i + 1) {
                        params.push((Arc::clone(name), decode_segment(val.as_str())));
                    }
                }
                return Some(RouteMatch {
                    route: Arc::clone(&route.meta),
                    path_params: params,
                    handler_name: route.meta.handler_name.clone(),
                    query_params: ParamVec::new(),
                });
            }
        }
        debug!(method = %method, path = %path, "No route matched");
        None
    }

    /// Number of routes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub(crate) fn path_to_regex(path: &str) -> Result<(Regex, Vec<String>), regex::Error> {
        if path == "/" {
            return Ok((Regex::new(r"^/$")?, Vec::new()));
        }

        let mut pattern = String::with_capacity(path.len() + 16);
        pattern.push('^');
        let mut param_names = Vec::with_capacity(path.matches('{').count());

        for segment in path.split('/') {
            if segment.starts_with('{') && segment.ends_with('}') {
                let param_name = segment
                    .trim_start_matches('{')
                    .trim_end_matches('}')
                    .to_owned();
                pattern.push_str("/([^/]+)");
                param_names.push(param_name);
            } else if !segment.is_empty() {
                pattern.push('/');
                pattern.push_str(&regex::escape(segment));
            }
        }

        // A single trailing slash is tolerated: `/movies/` routes like `/movies`.
        pattern.push_str("/?$");
        Ok((Regex::new(&pattern)?, param_names))
    }
}

/// Percent-decode a captured path segment. Segments that do not decode to
/// UTF-8 are kept as sent.
fn decode_segment(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_owned(),
    }
}
