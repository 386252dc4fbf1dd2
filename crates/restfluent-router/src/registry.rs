//! The ordered route table built during declaration.
//!
//! A [`RouteRegistry`] is owned by the application's composition root. Routes
//! are appended through the verb entry points while the application boots;
//! the registration pass then reads the table once.

use crate::group::{GroupOverrides, GroupStack};
use crate::route::{RouteDefinition, DEFAULT_CONTENT_TYPE, DEFAULT_PREFIX};
use http::StatusCode;
use restfluent_core::HttpMethod;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Defaults applied to every new route before group overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefaults {
    /// Namespace prefix.
    pub prefix: String,
    /// Default `Content-Type`.
    pub content_type: String,
    /// Status used when a handler result names none.
    pub default_status: StatusCode,
    /// Whether envelope wrapping starts on.
    pub envelope: bool,
}

impl Default for RouteDefaults {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            default_status: StatusCode::OK,
            envelope: false,
        }
    }
}

/// One row of [`RouteRegistry::debug_routes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteSummary {
    /// Namespace prefix.
    pub prefix: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Compiled pattern.
    pub pattern: String,
}

/// Ordered collection of declared routes plus the group stack.
///
/// # Example
///
/// ```
/// use restfluent_router::{GroupOverrides, RouteRegistry};
///
/// let mut routes = RouteRegistry::new();
/// routes.get("/health");
/// routes.group(GroupOverrides::new().prefix("admin/v1"), |routes| {
///     routes.delete("/users/{id:int}");
/// });
///
/// let summary = routes.debug_routes();
/// assert_eq!(summary[0].prefix, "v1");
/// assert_eq!(summary[1].prefix, "admin/v1");
/// assert_eq!(summary[1].pattern, "/users/(?P<id>[0-9]+)");
/// ```
#[derive(Debug, Default)]
pub struct RouteRegistry {
    defaults: RouteDefaults,
    routes: Vec<RouteDefinition>,
    groups: GroupStack,
}

impl RouteRegistry {
    /// Creates an empty registry with library defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given defaults.
    #[must_use]
    pub fn with_defaults(defaults: RouteDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Returns the defaults applied to new routes.
    pub fn defaults(&self) -> &RouteDefaults {
        &self.defaults
    }

    /// Declares a `GET` route.
    pub fn get(&mut self, template: &str) -> &mut RouteDefinition {
        self.route(HttpMethod::Get, template)
    }

    /// Declares a `POST` route.
    pub fn post(&mut self, template: &str) -> &mut RouteDefinition {
        self.route(HttpMethod::Post, template)
    }

    /// Declares a `PUT` route.
    pub fn put(&mut self, template: &str) -> &mut RouteDefinition {
        self.route(HttpMethod::Put, template)
    }

    /// Declares a `PATCH` route.
    pub fn patch(&mut self, template: &str) -> &mut RouteDefinition {
        self.route(HttpMethod::Patch, template)
    }

    /// Declares a `DELETE` route.
    pub fn delete(&mut self, template: &str) -> &mut RouteDefinition {
        self.route(HttpMethod::Delete, template)
    }

    /// Declares a route for any supported method.
    ///
    /// The group in effect supplies the prefix (if non-empty), the permission
    /// predicate (if set) and the initial middleware chain.
    pub fn route(&mut self, method: HttpMethod, template: &str) -> &mut RouteDefinition {
        let mut route = RouteDefinition::new(method, template);
        route
            .prefix(self.defaults.prefix.clone())
            .content_type(self.defaults.content_type.clone())
            .formatter(self.defaults.envelope);
        route.set_default_status(self.defaults.default_status);

        let group = self.groups.current();
        if let Some(prefix) = group.effective_prefix() {
            route.prefix(prefix);
        }
        if let Some(permission) = &group.permission {
            route.set_permission(permission.clone());
        }
        route.replace_middleware(group.middleware.clone());

        debug!(route = %route.label(), "route declared");
        self.routes.push(route);
        let index = self.routes.len() - 1;
        &mut self.routes[index]
    }

    /// Declares routes under shared defaults.
    ///
    /// The group stack is restored to its pre-call state when `declare`
    /// returns, and also when it panics; the panic then continues unwinding.
    /// Whatever `declare` returns (a `Result`, for instance) is passed back.
    pub fn group<T, F>(&mut self, overrides: GroupOverrides, declare: F) -> T
    where
        F: FnOnce(&mut Self) -> T,
    {
        let depth = self.groups.depth();
        self.groups.push(overrides);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| declare(self)));
        self.groups.restore(depth);
        match outcome {
            Ok(value) => value,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    /// Returns the group stack.
    pub fn group_stack(&self) -> &GroupStack {
        &self.groups
    }

    /// Returns the declared routes in declaration order.
    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    /// Returns the number of declared routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no route is declared.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Lists `(prefix, method, pattern)` for every route, in declaration order.
    pub fn debug_routes(&self) -> Vec<RouteSummary> {
        self.routes
            .iter()
            .map(|route| RouteSummary {
                prefix: route.route_prefix().to_string(),
                method: route.method(),
                pattern: route.pattern().to_string(),
            })
            .collect()
    }

    /// Removes every route and resets the group stack.
    pub fn clear(&mut self) {
        self.routes.clear();
        self.groups = GroupStack::new();
    }
}
