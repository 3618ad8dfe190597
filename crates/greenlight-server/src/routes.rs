//! Request routing and path matching.
//!
//! Paths are templates with `{name}` parameters. Matching is two-staged:
//! first by path, then by method, so that a known path with an unsupported
//! method can be told apart from an unknown path.
//!
//! # Example
//!
//! ```rust
//! use greenlight_server::routes::{Endpoint, RouteOutcome, Router};
//! use http::Method;
//!
//! let router = Router::greenlight();
//!
//! match router.match_route(&Method::GET, "/v1/movies/42") {
//!     RouteOutcome::Matched { endpoint, params } => {
//!         assert_eq!(endpoint, Endpoint::ShowMovie);
//!         assert_eq!(params.get("id"), Some("42"));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

use http::Method;

use greenlight_extract::Params;

/// The handlers a route can lead to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// `GET /v1/healthcheck`
    Healthcheck,
    /// `POST /v1/movies`
    CreateMovie,
    /// `GET /v1/movies/{id}`
    ShowMovie,
    /// `PATCH /v1/movies/{id}`
    UpdateMovie,
    /// `DELETE /v1/movies/{id}`
    DeleteMovie,
}

/// Result of routing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// A route matched both path and method.
    Matched {
        /// Handler to invoke.
        endpoint: Endpoint,
        /// Extracted path parameters.
        params: Params,
    },
    /// The path is known but not for this method.
    MethodNotAllowed {
        /// Methods registered for the path, in registration order.
        allowed: Vec<Method>,
    },
    /// No route has this path.
    NotFound,
}

/// A segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathSegment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: Method,
    segments: Vec<PathSegment>,
    endpoint: Endpoint,
}

impl Route {
    fn new(method: Method, pattern: &str, endpoint: Endpoint) -> Self {
        Self {
            method,
            segments: parse_segments(pattern),
            endpoint,
        }
    }

    fn match_path(&self, path_segments: &[&str]) -> Option<Params> {
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (pattern, actual) in self.segments.iter().zip(path_segments) {
            match pattern {
                PathSegment::Literal(expected) if expected == actual => {}
                PathSegment::Literal(_) => return None,
                PathSegment::Param(name) => params.push(name.as_str(), *actual),
            }
        }
        Some(params)
    }
}

fn parse_segments(pattern: &str) -> Vec<PathSegment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) => PathSegment::Param(name.to_string()),
            None => PathSegment::Literal(s.to_string()),
        })
        .collect()
}

/// HTTP request router.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the router for the Greenlight API.
    #[must_use]
    pub fn greenlight() -> Self {
        let mut router = Self::new();
        router.add_route(Method::GET, "/v1/healthcheck", Endpoint::Healthcheck);
        router.add_route(Method::POST, "/v1/movies", Endpoint::CreateMovie);
        router.add_route(Method::GET, "/v1/movies/{id}", Endpoint::ShowMovie);
        router.add_route(Method::PATCH, "/v1/movies/{id}", Endpoint::UpdateMovie);
        router.add_route(Method::DELETE, "/v1/movies/{id}", Endpoint::DeleteMovie);
        router
    }

    /// Registers a route.
    pub fn add_route(&mut self, method: Method, pattern: &str, endpoint: Endpoint) {
        self.routes.push(Route::new(method, pattern, endpoint));
    }

    /// Returns the number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes a request by method and path.
    ///
    /// A `HEAD` request matches `GET` routes.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> RouteOutcome {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut allowed = Vec::new();

        for route in &self.routes {
            let Some(params) = route.match_path(&segments) else {
                continue;
            };
            if route.method == *method || (*method == Method::HEAD && route.method == Method::GET)
            {
                return RouteOutcome::Matched {
                    endpoint: route.endpoint,
                    params,
                };
            }
            if !allowed.contains(&route.method) {
                allowed.push(route.method.clone());
            }
        }

        if allowed.is_empty() {
            RouteOutcome::NotFound
        } else {
            RouteOutcome::MethodNotAllowed { allowed }
        }
    }
}
