//! The one-time registration pass.
//!
//! Hands every declared route to the host's router together with a permission
//! callback and a dispatch callback. The host owns matching, runs the
//! permission callback first and only then invokes the dispatch callback.

use std::fmt;

use restfluent_core::{permission_fn, HttpMethod, Permission, RouteResult};
use restfluent_middleware::MiddlewareRegistry;
use restfluent_router::RouteRegistry;
use restfluent_telemetry::metrics::describe_metrics;
use tracing::{debug, info};

use crate::dispatcher::{DispatchCallback, Dispatcher};

/// What the host receives for one route.
#[derive(Clone)]
pub struct RouteOptions {
    /// HTTP method.
    pub method: HttpMethod,
    /// Evaluated by the host before dispatch; allows everything when the
    /// route declares no predicate.
    pub permission_callback: Permission,
    /// Runs the route's middleware and handler.
    pub dispatch_callback: DispatchCallback,
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// The host's route registration API.
pub trait HostRegistrar {
    /// Registers one route under a namespace prefix.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::Registration`](restfluent_core::RouteError::Registration)
    /// if the host refuses the route.
    fn register(&mut self, prefix: &str, pattern: &str, options: RouteOptions) -> RouteResult<()>;
}

/// Registers every declared route with the host, in declaration order.
///
/// Call this once per process, after declaration is complete. Calling it
/// twice registers every route twice; guarding against that is the caller's
/// responsibility.
///
/// Registers the restfluent metric descriptions with the installed recorder
/// before handing routes over.
///
/// Returns the number of routes registered.
///
/// # Errors
///
/// Stops at and returns the first error the host reports.
pub fn register_routes<H>(
    routes: &RouteRegistry,
    middleware: &MiddlewareRegistry,
    host: &mut H,
) -> RouteResult<usize>
where
    H: HostRegistrar + ?Sized,
{
    describe_metrics();

    for route in routes.routes() {
        let permission_callback = route
            .permission()
            .cloned()
            .unwrap_or_else(|| permission_fn(|_| true));

        let dispatcher = Dispatcher::new(route, middleware);
        let label = dispatcher.label().to_string();

        host.register(
            route.route_prefix(),
            route.pattern(),
            RouteOptions {
                method: route.method(),
                permission_callback,
                dispatch_callback: dispatcher.into_callback(),
            },
        )?;
        debug!(route = %label, "route registered");
    }

    info!(count = routes.len(), "routes registered with host");
    Ok(routes.len())
}
