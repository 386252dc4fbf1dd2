//! An in-memory REST host.
//!
//! [`MockHost`] stands in for the host framework: it accepts routes through
//! [`HostRegistrar`], matches requests by method and anchored regex, copies
//! named captures into request params, runs the permission callback and only
//! then calls the dispatch callback.

use std::fmt;

use regex::Regex;
use restfluent_core::{HostError, HttpMethod, Reply, RestRequest, RouteError, RouteResult};
use restfluent_dispatch::{HostRegistrar, RouteOptions};
use restfluent_router::CompiledPath;
use tracing::debug;

use crate::error::TestError;
use crate::request::TestRequestBuilder;
use crate::response::TestResponse;

/// One route as the host stores it.
pub struct HostRoute {
    prefix: String,
    pattern: String,
    matcher: Regex,
    options: RouteOptions,
}

impl HostRoute {
    /// Namespace the route was registered under.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Compiled route pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Route method.
    pub fn method(&self) -> HttpMethod {
        self.options.method
    }

    /// Anchored matcher for full request paths.
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }
}

impl fmt::Debug for HostRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRoute")
            .field("method", &self.options.method)
            .field("matcher", &self.matcher.as_str())
            .finish_non_exhaustive()
    }
}

/// In-memory host that routes requests to registered dispatch callbacks.
///
/// # Example
///
/// ```ignore
/// let mut host = MockHost::new();
/// register_routes(&routes, &middleware, &mut host)?;
///
/// let response = host.send(TestRequest::get("/v1/product/42")).await?;
/// response.assert_status(StatusCode::OK);
/// ```
#[derive(Debug, Default)]
pub struct MockHost {
    routes: Vec<HostRoute>,
}

impl MockHost {
    /// Creates an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns registered routes in registration order.
    pub fn routes(&self) -> &[HostRoute] {
        &self.routes
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Handles one request.
    ///
    /// The first route whose method and matcher both match wins. Requests
    /// with a method outside the supported set never match.
    pub async fn handle(&self, mut request: RestRequest) -> Reply {
        let Some(method) = HttpMethod::from_http(request.method()) else {
            return HostError::no_route().into();
        };

        let path = request.path().to_string();
        let matched = self.routes.iter().find_map(|route| {
            if route.options.method != method {
                return None;
            }
            route.matcher.captures(&path).map(|captures| (route, captures))
        });

        let Some((route, captures)) = matched else {
            debug!(method = %method, path = %path, "no route matched");
            return HostError::no_route().into();
        };

        for name in route.matcher.capture_names().flatten() {
            if let Some(value) = captures.name(name) {
                request.set_param(name, value.as_str());
            }
        }

        if !(route.options.permission_callback)(&request) {
            debug!(route = %route.matcher.as_str(), "permission denied");
            return HostError::forbidden().into();
        }

        (route.options.dispatch_callback)(request).await
    }

    /// Builds and handles a test request.
    pub async fn send(&self, request: TestRequestBuilder) -> Result<TestResponse, TestError> {
        let request = request.build()?;
        Ok(TestResponse::new(self.handle(request).await))
    }
}

impl HostRegistrar for MockHost {
    fn register(&mut self, prefix: &str, pattern: &str, options: RouteOptions) -> RouteResult<()> {
        let matcher = CompiledPath::compile(pattern).matcher(prefix)?;

        let duplicate = self
            .routes
            .iter()
            .any(|r| r.options.method == options.method && r.matcher.as_str() == matcher.as_str());
        if duplicate {
            return Err(RouteError::registration(
                format!("{} {}", options.method, matcher.as_str()),
                "route already registered",
            ));
        }

        self.routes.push(HostRoute {
            prefix: prefix.to_string(),
            pattern: pattern.to_string(),
            matcher,
            options,
        });
        Ok(())
    }
}
