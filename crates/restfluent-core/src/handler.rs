//! Handler and permission callables.
//!
//! Routes store type-erased callables so that a single route table can hold
//! handlers of any concrete closure type.

use crate::output::HandlerOutput;
use crate::request::RestRequest;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased route handler.
pub type Handler = Arc<dyn Fn(RestRequest) -> BoxFuture<'static, HandlerOutput> + Send + Sync>;

/// A type-erased permission predicate, evaluated by the host before dispatch.
pub type Permission = Arc<dyn Fn(&RestRequest) -> bool + Send + Sync>;

/// Wraps an async function as a [`Handler`].
///
/// The function may return anything convertible into [`HandlerOutput`]:
/// a JSON value, a string, a [`RestResponse`](crate::RestResponse), a
/// [`HostError`](crate::HostError), or a `Result` of those.
///
/// # Example
///
/// ```
/// use restfluent_core::{handler_fn, RestRequest};
/// use serde_json::json;
///
/// let handler = handler_fn(|request: RestRequest| async move {
///     json!({ "data": { "id": request.param("id") }, "status": 200 })
/// });
/// # let _ = handler;
/// ```
pub fn handler_fn<F, Fut, O>(func: F) -> Handler
where
    F: Fn(RestRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = O> + Send + 'static,
    O: Into<HandlerOutput>,
{
    Arc::new(move |request: RestRequest| -> BoxFuture<'static, HandlerOutput> {
        let fut = func(request);
        Box::pin(async move {
            let output: HandlerOutput = fut.await.into();
            output
        })
    })
}

/// Wraps a predicate as a [`Permission`].
pub fn permission_fn<F>(func: F) -> Permission
where
    F: Fn(&RestRequest) -> bool + Send + Sync + 'static,
{
    Arc::new(func)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_handler_fn_converts_output() {
        let handler = handler_fn(|_req| async { "hello" });
        let output = handler(RestRequest::get("/")).await;
        assert_eq!(output, HandlerOutput::Scalar(json!("hello")));
    }

    #[test]
    fn test_permission_fn() {
        let permission = permission_fn(|req| req.header("x-admin").is_some());
        assert!(!permission(&RestRequest::get("/")));
    }
}
