//! Per-route middleware pipeline.
//!
//! A [`Pipeline`] is built once, when a route is registered, from the
//! route's middleware references. It is immutable afterwards and shared by
//! every request the route serves.

use crate::middleware::{Endpoint, Middleware, Next, Stage};
use crate::registry::{MiddlewareRef, MiddlewareRegistry};
use restfluent_core::{Reply, RestRequest};
use std::sync::Arc;

/// An ordered, immutable middleware chain.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::builder()
///     .stage(RateLimitPolicy::new(store))
///     .build();
///
/// let reply = pipeline.process(request, &endpoint).await;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Resolves a route's middleware references against a registry.
    ///
    /// References that cannot be resolved become passthrough stages.
    #[must_use]
    pub fn resolve(references: &[MiddlewareRef], registry: &MiddlewareRegistry) -> Self {
        Self {
            stages: registry.resolve_chain(references),
        }
    }

    /// Runs the request through every stage, then the endpoint.
    pub async fn process(&self, request: RestRequest, endpoint: &dyn Endpoint) -> Reply {
        Next::new(&self.stages, endpoint).run(request).await
    }

    /// Returns the stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Returns the names of all stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Returns the number of stages, passthroughs included.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }
}

/// Builder for constructing a [`Pipeline`] directly from instances.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a middleware instance.
    #[must_use]
    pub fn stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Stage::active(middleware));
        self
    }

    /// Appends a shared middleware instance.
    #[must_use]
    pub fn shared(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.stages.push(Stage::Active(middleware));
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{BoxFuture, FnMiddleware};
    use http::StatusCode;
    use restfluent_core::RestResponse;
    use serde_json::json;

    fn endpoint(_request: RestRequest) -> BoxFuture<'static, Reply> {
        Box::pin(async { Reply::from(RestResponse::ok(json!("handled"))) })
    }

    fn tagging(name: &'static str) -> impl Middleware {
        FnMiddleware::new(name, move |mut request: RestRequest, next| {
            let seen = request
                .attribute("seen")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            request.set_attribute("seen", json!(format!("{seen}{name}")));
            next.run(request)
        })
    }

    #[test]
    fn test_empty_pipeline() {
        let pipeline = Pipeline::default();
        assert_eq!(pipeline.stage_count(), 0);
        assert!(pipeline.stage_names().is_empty());
    }

    #[tokio::test]
    async fn test_builder_preserves_order() {
        let pipeline = Pipeline::builder().stage(tagging("a")).stage(tagging("b")).build();
        assert_eq!(pipeline.stage_names(), vec!["a", "b"]);

        let capture = Pipeline::builder()
            .stage(tagging("a"))
            .stage(tagging("b"))
            .stage(FnMiddleware::new("echo", |request: RestRequest, _next| {
                let seen = request.attribute("seen").cloned().unwrap_or_default();
                Box::pin(async move { Reply::from(RestResponse::ok(seen)) })
            }))
            .build();
        let reply = capture.process(RestRequest::get("/"), &endpoint).await;
        assert_eq!(reply.body(), json!("ab"));
    }

    #[tokio::test]
    async fn test_resolve_with_unknown_reference() {
        let mut registry = MiddlewareRegistry::new();
        registry.register_instance("tag", tagging("tag"));

        let refs = vec![MiddlewareRef::named("tag"), MiddlewareRef::named("nope")];
        let pipeline = Pipeline::resolve(&refs, &registry);

        assert_eq!(pipeline.stage_names(), vec!["tag", "nope"]);
        assert!(pipeline.stages()[1].is_passthrough());

        let reply = pipeline.process(RestRequest::get("/"), &endpoint).await;
        assert_eq!(reply.status(), StatusCode::OK);
    }
}
