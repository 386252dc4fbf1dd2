//! Per-route dispatch.
//!
//! A [`Dispatcher`] is built once per route when routes are registered with
//! the host. It owns a snapshot of the route, the route's resolved middleware
//! [`Pipeline`] and the terminal step that calls the handler.
//!
//! # Terminal step
//!
//! 1. No handler bound: a `missing_callback` host error with status 500
//! 2. Handler returned a final response or error: returned verbatim
//! 3. Otherwise the result is normalized, `Content-Type` is defaulted and the
//!    envelope is applied if the route asks for it
//!
//! # Example
//!
//! ```rust,ignore
//! use restfluent_dispatch::Dispatcher;
//!
//! let dispatcher = Dispatcher::new(&routes.routes()[0], &middleware);
//! let reply = dispatcher.dispatch(request).await;
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use restfluent_core::{
    BoxFuture, HandlerOutput, HostError, Reply, RestRequest, RouteError,
};
use restfluent_middleware::{Endpoint, MiddlewareRegistry, Pipeline};
use restfluent_router::RouteDefinition;
use restfluent_telemetry::metrics::record_dispatch;
use tracing::{debug, error};

use crate::envelope::shape;
use crate::normalize::{normalize_scalar, normalize_structured};

/// The closure a host invokes for each matched request.
pub type DispatchCallback = Arc<dyn Fn(RestRequest) -> BoxFuture<'static, Reply> + Send + Sync>;

/// Turns a handler result into the final reply for a route.
///
/// Final responses and errors pass through untouched; everything else is
/// normalized and shaped.
pub fn finalize(output: HandlerOutput, route: &RouteDefinition) -> Reply {
    match output {
        HandlerOutput::Response(response) => Reply::Response(response),
        HandlerOutput::Error(error) => Reply::Error(error),
        HandlerOutput::Structured(map) => shape(normalize_structured(map, route), route).into(),
        HandlerOutput::Scalar(value) => shape(normalize_scalar(value, route), route).into(),
    }
}

/// The end of a route's chain: invokes the handler and finalizes its result.
struct Terminal {
    route: Arc<RouteDefinition>,
    label: String,
}

impl Terminal {
    async fn invoke(&self, request: RestRequest) -> Reply {
        let Some(handler) = self.route.handler_ref() else {
            error!(route = %self.label, "route missing callback");
            return HostError::from(RouteError::missing_handler(self.label.clone())).into();
        };

        let output = handler(request).await;
        finalize(output, &self.route)
    }
}

impl Endpoint for Terminal {
    fn call(&self, request: RestRequest) -> BoxFuture<'_, Reply> {
        Box::pin(self.invoke(request))
    }
}

/// Runs one route's middleware chain and handler.
pub struct Dispatcher {
    pipeline: Pipeline,
    terminal: Terminal,
}

impl Dispatcher {
    /// Builds a dispatcher from a snapshot of `route`.
    ///
    /// Middleware references are resolved now; unresolvable ones are logged
    /// and skipped on every request.
    pub fn new(route: &RouteDefinition, middleware: &MiddlewareRegistry) -> Self {
        let label = route.label();
        let pipeline = Pipeline::resolve(route.middleware_refs(), middleware);
        debug!(route = %label, stages = ?pipeline.stage_names(), "dispatcher built");

        Self {
            pipeline,
            terminal: Terminal {
                route: Arc::new(route.clone()),
                label,
            },
        }
    }

    /// Returns the route snapshot.
    pub fn route(&self) -> &RouteDefinition {
        &self.terminal.route
    }

    /// Returns the route label (`METHOD /prefix/pattern`).
    pub fn label(&self) -> &str {
        &self.terminal.label
    }

    /// Returns the resolved middleware pipeline.
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Dispatches one request.
    pub async fn dispatch(&self, request: RestRequest) -> Reply {
        let start = Instant::now();
        let reply = self.pipeline.process(request, &self.terminal).await;

        record_dispatch(
            &self.terminal.label,
            self.terminal.route.method().as_str(),
            reply.status().as_u16(),
            start.elapsed(),
        );
        reply
    }

    /// Wraps this dispatcher as a host callback.
    pub fn into_callback(self) -> DispatchCallback {
        let dispatcher = Arc::new(self);
        Arc::new(move |request: RestRequest| -> BoxFuture<'static, Reply> {
            let dispatcher = Arc::clone(&dispatcher);
            Box::pin(async move { dispatcher.dispatch(request).await })
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("route", &self.terminal.label)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use restfluent_core::{HttpMethod, RestResponse};
    use restfluent_middleware::{FnMiddleware, MiddlewareRef};
    use serde_json::json;

    fn empty_registry() -> MiddlewareRegistry {
        MiddlewareRegistry::new()
    }

    #[tokio::test]
    async fn test_missing_handler_is_500() {
        let route = RouteDefinition::new(HttpMethod::Get, "/nothing");
        let dispatcher = Dispatcher::new(&route, &empty_registry());

        let reply = dispatcher.dispatch(RestRequest::get("/v1/nothing")).await;
        let error = reply.as_error().unwrap();
        assert_eq!(error.code(), "missing_callback");
        assert_eq!(error.message(), "Route missing callback");
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_final_response_bypasses_shaping() {
        let mut route = RouteDefinition::new(HttpMethod::Get, "/raw");
        route
            .handler(|_req| async { RestResponse::new(json!("raw"), StatusCode::IM_A_TEAPOT) })
            .formatter(true);
        let dispatcher = Dispatcher::new(&route, &empty_registry());

        let reply = dispatcher.dispatch(RestRequest::get("/")).await;
        let response = reply.as_response().unwrap();
        assert_eq!(response.body(), &json!("raw"));
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert!(response.header("content-type").is_none());
    }

    #[tokio::test]
    async fn test_final_error_bypasses_shaping() {
        let mut route = RouteDefinition::new(HttpMethod::Get, "/err");
        route.handler(|_req| async { HostError::forbidden() }).formatter(true);

        let reply = Dispatcher::new(&route, &empty_registry())
            .dispatch(RestRequest::get("/"))
            .await;
        assert_eq!(reply.as_error().map(HostError::code), Some("rest_forbidden"));
    }

    #[tokio::test]
    async fn test_structured_result_is_normalized_and_enveloped() {
        let mut route = RouteDefinition::new(HttpMethod::Post, "/orders");
        route
            .handler(|_req| async { json!({ "data": { "id": 9 }, "status": 201 }) })
            .status();

        let reply = Dispatcher::new(&route, &empty_registry())
            .dispatch(RestRequest::get("/"))
            .await;
        assert_eq!(reply.status(), StatusCode::CREATED);
        assert_eq!(
            reply.body(),
            json!({ "data": { "id": 9 }, "status": 201, "success": true })
        );
        assert_eq!(reply.header("Content-Type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_snapshot_is_taken_at_build_time() {
        let mut route = RouteDefinition::new(HttpMethod::Get, "/snap");
        route.handler(|_req| async { "before" });
        let dispatcher = Dispatcher::new(&route, &empty_registry());

        route.handler(|_req| async { "after" });
        let reply = dispatcher.dispatch(RestRequest::get("/")).await;
        assert_eq!(reply.body(), json!("before"));
    }

    #[tokio::test]
    async fn test_middleware_wraps_terminal() {
        let mut middleware = MiddlewareRegistry::new();
        middleware.register_instance(
            "stamp",
            FnMiddleware::new("stamp", |request, next| {
                Box::pin(async move {
                    match next.run(request).await {
                        Reply::Response(r) => Reply::from(r.with_header("X-Stamp", "yes")),
                        other => other,
                    }
                })
            }),
        );

        let mut route = RouteDefinition::new(HttpMethod::Get, "/stamped");
        route
            .handler(|req: RestRequest| async move { req.param("id").unwrap_or("none").to_string() })
            .middleware([MiddlewareRef::named("stamp"), MiddlewareRef::named("ghost")]);

        let callback = Dispatcher::new(&route, &middleware).into_callback();
        let reply = callback(RestRequest::get("/")).await;
        assert_eq!(reply.header("x-stamp"), Some("yes"));
        assert_eq!(reply.body(), json!("none"));
    }
}
