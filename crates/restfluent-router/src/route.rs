//! Route definitions and their fluent builder.

use crate::path::CompiledPath;
use http::StatusCode;
use restfluent_core::{
    handler_fn, permission_fn, Handler, HandlerOutput, Headers, HttpMethod, Permission,
    RestRequest,
};
use restfluent_middleware::MiddlewareRef;
use std::fmt;
use std::future::Future;

/// Default route namespace.
pub const DEFAULT_PREFIX: &str = "v1";

/// Default response content type.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Key names the normalizer reads from structured handler results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseKeyMap {
    /// Key holding the response body.
    pub data: String,
    /// Key holding the status code.
    pub status: String,
    /// Key holding extra response headers.
    pub headers: String,
}

impl Default for ResponseKeyMap {
    fn default() -> Self {
        Self {
            data: "data".to_string(),
            status: "status".to_string(),
            headers: "headers".to_string(),
        }
    }
}

/// One declared endpoint.
///
/// The method and path are fixed at creation. Everything else is set through
/// the builder methods, which mutate the route in place and return it again
/// so calls can be chained:
///
/// ```ignore
/// routes
///     .get("/product/{id:int}")
///     .handler(|req: RestRequest| async move { json!({ "data": req.param("id") }) })
///     .middleware(["audit"])
///     .formatter(true);
/// ```
#[derive(Clone)]
pub struct RouteDefinition {
    method: HttpMethod,
    path: CompiledPath,
    prefix: String,
    handler: Option<Handler>,
    content_type: String,
    headers: Headers,
    middleware: Vec<MiddlewareRef>,
    envelope: bool,
    default_status: StatusCode,
    permission: Option<Permission>,
    keys: ResponseKeyMap,
}

impl RouteDefinition {
    /// Creates a route with library defaults.
    pub fn new(method: HttpMethod, template: &str) -> Self {
        Self {
            method,
            path: CompiledPath::compile(template),
            prefix: DEFAULT_PREFIX.to_string(),
            handler: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            headers: Headers::new(),
            middleware: Vec::new(),
            envelope: false,
            default_status: StatusCode::OK,
            permission: None,
            keys: ResponseKeyMap::default(),
        }
    }

    // Builder calls

    /// Sets the handler; the default status becomes 200.
    pub fn handler<F, Fut, O>(&mut self, func: F) -> &mut Self
    where
        F: Fn(RestRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<HandlerOutput>,
    {
        self.handler_with_status(func, StatusCode::OK)
    }

    /// Sets the handler and the status used when its result names none.
    pub fn handler_with_status<F, Fut, O>(&mut self, func: F, status: StatusCode) -> &mut Self
    where
        F: Fn(RestRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = O> + Send + 'static,
        O: Into<HandlerOutput>,
    {
        self.set_handler(handler_fn(func), status)
    }

    /// Sets an already type-erased handler.
    pub fn set_handler(&mut self, handler: Handler, status: StatusCode) -> &mut Self {
        self.handler = Some(handler);
        self.default_status = status;
        self
    }

    /// Sets the permission predicate the host checks before dispatch.
    pub fn permissions<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&RestRequest) -> bool + Send + Sync + 'static,
    {
        self.permission = Some(permission_fn(predicate));
        self
    }

    /// Appends middleware after any already present.
    pub fn middleware<I, M>(&mut self, middleware: I) -> &mut Self
    where
        I: IntoIterator<Item = M>,
        M: Into<MiddlewareRef>,
    {
        self.middleware.extend(middleware.into_iter().map(Into::into));
        self
    }

    /// Sets the default `Content-Type`.
    pub fn content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    /// Turns envelope wrapping on or off.
    pub fn formatter(&mut self, on: bool) -> &mut Self {
        self.envelope = on;
        self
    }

    /// Turns envelope wrapping on.
    pub fn status(&mut self) -> &mut Self {
        self.formatter(true)
    }

    /// Renames the keys read from structured handler results.
    pub fn map(
        &mut self,
        data: impl Into<String>,
        status: impl Into<String>,
        headers: impl Into<String>,
    ) -> &mut Self {
        self.keys = ResponseKeyMap {
            data: data.into(),
            status: status.into(),
            headers: headers.into(),
        };
        self
    }

    /// Sets the route namespace.
    pub fn prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.prefix = prefix.into();
        self
    }

    /// Adds default response headers, replacing same-named ones.
    pub fn headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub(crate) fn set_default_status(&mut self, status: StatusCode) {
        self.default_status = status;
    }

    pub(crate) fn set_permission(&mut self, permission: Permission) {
        self.permission = Some(permission);
    }

    pub(crate) fn replace_middleware(&mut self, middleware: Vec<MiddlewareRef>) {
        self.middleware = middleware;
    }

    // Accessors

    /// Returns the HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Returns the compiled path.
    pub fn path(&self) -> &CompiledPath {
        &self.path
    }

    /// Returns the compiled pattern as handed to the host.
    pub fn pattern(&self) -> &str {
        self.path.as_str()
    }

    /// Returns the namespace prefix.
    pub fn route_prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the handler, if one is bound.
    pub fn handler_ref(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    /// Returns true if a handler is bound.
    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }

    /// Returns the default `Content-Type`.
    pub fn default_content_type(&self) -> &str {
        &self.content_type
    }

    /// Returns the default response headers.
    pub fn default_headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the middleware chain in declaration order.
    pub fn middleware_refs(&self) -> &[MiddlewareRef] {
        &self.middleware
    }

    /// Returns true if envelope wrapping is on.
    pub fn uses_envelope(&self) -> bool {
        self.envelope
    }

    /// Returns the status used when a handler result names none.
    pub fn default_status(&self) -> StatusCode {
        self.default_status
    }

    /// Returns the permission predicate.
    pub fn permission(&self) -> Option<&Permission> {
        self.permission.as_ref()
    }

    /// Runs the permission predicate; a route without one allows everything.
    pub fn is_permitted(&self, request: &RestRequest) -> bool {
        self.permission.as_ref().map_or(true, |allow| allow(request))
    }

    /// Returns the result key names.
    pub fn keys(&self) -> &ResponseKeyMap {
        &self.keys
    }

    /// Returns `METHOD prefix/pattern`, used as the route label in logs.
    pub fn label(&self) -> String {
        format!("{} {}", self.method, self.path.full_route(&self.prefix))
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("method", &self.method)
            .field("prefix", &self.prefix)
            .field("pattern", &self.path.as_str())
            .field("has_handler", &self.handler.is_some())
            .field("content_type", &self.content_type)
            .field("headers", &self.headers)
            .field("middleware", &self.middleware)
            .field("envelope", &self.envelope)
            .field("default_status", &self.default_status)
            .field("has_permission", &self.permission.is_some())
            .field("keys", &self.keys)
            .finish()
    }
}
