//! Core middleware trait and the explicit chain runner.
//!
//! A route's middleware is held as an ordered slice of [`Stage`]s plus a
//! terminal [`Endpoint`]. [`Next`] walks that slice one position at a time,
//! so the first declared middleware runs first and wraps everything after it.
//!
//! # Example
//!
//! ```ignore
//! use restfluent_middleware::{BoxFuture, Middleware, Next};
//! use restfluent_core::{Reply, RestRequest};
//!
//! struct Audit;
//!
//! impl Middleware for Audit {
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//!
//!     fn handle<'a>(&'a self, request: RestRequest, next: Next<'a>) -> BoxFuture<'a, Reply> {
//!         Box::pin(async move {
//!             tracing::info!(path = request.path(), "audit");
//!             next.run(request).await
//!         })
//!     }
//! }
//! ```

use restfluent_core::{Reply, RestRequest};
use restfluent_telemetry::metrics::record_middleware_passthrough;
use std::fmt;
use std::sync::Arc;

pub use restfluent_core::BoxFuture;

/// A request interceptor with access to the rest of the chain.
///
/// A middleware may:
///
/// - call `next.run(request)` and return its reply unchanged
/// - call `next.run(request)` and post-process the reply
/// - return its own reply without calling `next`, short-circuiting the
///   remaining middleware and the handler
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this middleware, used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Handles the request.
    fn handle<'a>(&'a self, request: RestRequest, next: Next<'a>) -> BoxFuture<'a, Reply>;
}

/// The terminal step of a chain.
pub trait Endpoint: Send + Sync {
    /// Produces the reply once every middleware has passed the request on.
    fn call(&self, request: RestRequest) -> BoxFuture<'_, Reply>;
}

impl<F> Endpoint for F
where
    F: Fn(RestRequest) -> BoxFuture<'static, Reply> + Send + Sync,
{
    fn call(&self, request: RestRequest) -> BoxFuture<'_, Reply> {
        self(request)
    }
}

/// One resolved position in a middleware chain.
#[derive(Clone)]
pub enum Stage {
    /// A middleware instance that handles the request.
    Active(Arc<dyn Middleware>),
    /// An unresolved reference; the request skips straight to the next stage.
    Passthrough(String),
}

impl Stage {
    /// Wraps a middleware instance.
    pub fn active<M: Middleware>(middleware: M) -> Self {
        Self::Active(Arc::new(middleware))
    }

    /// Returns the middleware name, or the unresolved reference.
    pub fn name(&self) -> &str {
        match self {
            Self::Active(m) => m.name(),
            Self::Passthrough(reference) => reference,
        }
    }

    /// Returns true if this stage skips to the next one.
    pub fn is_passthrough(&self) -> bool {
        matches!(self, Self::Passthrough(_))
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active(m) => f.debug_tuple("Active").field(&m.name()).finish(),
            Self::Passthrough(r) => f.debug_tuple("Passthrough").field(r).finish(),
        }
    }
}

/// The remainder of a chain: the stages not yet run, then the endpoint.
///
/// Consumed by [`run`](Next::run), so each position is entered at most once.
pub struct Next<'a> {
    chain: &'a [Stage],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Creates a runner positioned at the start of `chain`.
    pub fn new(chain: &'a [Stage], endpoint: &'a dyn Endpoint) -> Self {
        Self { chain, endpoint }
    }

    /// Returns the number of stages still ahead of the endpoint.
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }

    /// Runs the next stage, or the endpoint once the chain is exhausted.
    pub fn run(self, request: RestRequest) -> BoxFuture<'a, Reply> {
        match self.chain.split_first() {
            None => self.endpoint.call(request),
            Some((stage, rest)) => {
                let next = Next::new(rest, self.endpoint);
                match stage {
                    Stage::Active(middleware) => middleware.handle(request, next),
                    Stage::Passthrough(reference) => {
                        record_middleware_passthrough(reference);
                        next.run(request)
                    }
                }
            }
        }
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```ignore
/// let timing = FnMiddleware::new("timing", |request, next| {
///     Box::pin(async move {
///         let start = std::time::Instant::now();
///         let reply = next.run(request).await;
///         tracing::debug!(elapsed = ?start.elapsed(), "handled");
///         reply
///     })
/// });
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(RestRequest, Next<'a>) -> BoxFuture<'a, Reply> + Send + Sync + 'static,
{
    /// Creates a new closure-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(RestRequest, Next<'a>) -> BoxFuture<'a, Reply> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn handle<'a>(&'a self, request: RestRequest, next: Next<'a>) -> BoxFuture<'a, Reply> {
        (self.func)(request, next)
    }
}
