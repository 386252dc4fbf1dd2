//! Host-native response and error values.
//!
//! A [`RestResponse`] is a fully-formed response (body, status, headers) and a
//! [`HostError`] is a fully-formed error. Either one returned by a handler is
//! passed to the host untouched. [`Reply`] is what a dispatch run produces.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use indexmap::IndexMap;
use serde_json::{json, Value};
use thiserror::Error;

/// Ordered header map.
///
/// Insertion order is preserved so that route defaults come first and handler
/// headers follow, which keeps responses stable for logging and tests.
pub type Headers = IndexMap<String, String>;

/// The HTTP response type handed to hosts that speak `http`.
pub type HttpResponse = http::Response<Full<Bytes>>;

/// A fully-formed response value.
///
/// # Example
///
/// ```
/// use restfluent_core::RestResponse;
/// use http::StatusCode;
/// use serde_json::json;
///
/// let response = RestResponse::new(json!({"ok": true}), StatusCode::CREATED)
///     .with_header("X-Trace", "abc");
///
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.header("x-trace"), Some("abc"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    body: Value,
    status: StatusCode,
    headers: Headers,
}

impl RestResponse {
    /// Creates a response with no headers.
    #[must_use]
    pub fn new(body: Value, status: StatusCode) -> Self {
        Self {
            body,
            status,
            headers: Headers::new(),
        }
    }

    /// Creates a `200 OK` response.
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(body, StatusCode::OK)
    }

    /// Creates a response from all three parts.
    #[must_use]
    pub fn from_parts(body: Value, status: StatusCode, headers: Headers) -> Self {
        Self {
            body,
            status,
            headers,
        }
    }

    /// Adds or replaces a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Looks up a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Splits the response into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Value, StatusCode, Headers) {
        (self.body, self.status, self.headers)
    }

    /// Converts to an `http` response with a JSON-serialized body.
    ///
    /// Headers whose name or value is not valid HTTP are dropped with a warning.
    #[must_use]
    pub fn into_http(self) -> HttpResponse {
        let body = serde_json::to_vec(&self.body).unwrap_or_default();
        let mut response = http::Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = self.status;

        let headers = response.headers_mut();
        for (name, value) in &self.headers {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "dropping invalid response header"),
            }
        }
        response
    }
}

/// A fully-formed error value.
///
/// Serializes as `{"code", "message", "data": {"status", ...}}`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct HostError {
    code: String,
    message: String,
    status: StatusCode,
    data: Option<Value>,
}

impl HostError {
    /// Creates a host error.
    #[must_use]
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
            data: None,
        }
    }

    /// The error produced when a route has no handler bound.
    #[must_use]
    pub fn missing_handler() -> Self {
        Self::new(
            "missing_callback",
            "Route missing callback",
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }

    /// The error produced when a permission predicate rejects a request.
    #[must_use]
    pub fn forbidden() -> Self {
        Self::new(
            "rest_forbidden",
            "Sorry, you are not allowed to do that.",
            StatusCode::FORBIDDEN,
        )
    }

    /// The error produced when no route matches a request.
    #[must_use]
    pub fn no_route() -> Self {
        Self::new(
            "rest_no_route",
            "No route was found matching the URL and request method.",
            StatusCode::NOT_FOUND,
        )
    }

    /// Attaches extra data, merged into the `data` member of the body.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Returns the error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the extra data, if any.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Renders the JSON error body.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let mut data = json!({ "status": self.status.as_u16() });
        if let (Some(Value::Object(extra)), Value::Object(target)) = (&self.data, &mut data) {
            for (k, v) in extra {
                target.insert(k.clone(), v.clone());
            }
        }
        json!({
            "code": self.code,
            "message": self.message,
            "data": data,
        })
    }

    /// Converts to an `http` response.
    #[must_use]
    pub fn into_http(self) -> HttpResponse {
        RestResponse::new(self.to_body(), self.status)
            .with_header(CONTENT_TYPE.as_str(), "application/json")
            .into_http()
    }
}

/// The result of one dispatch run.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A final response.
    Response(RestResponse),
    /// A final error.
    Error(HostError),
}

impl Reply {
    /// Returns the HTTP status of either variant.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Response(r) => r.status(),
            Self::Error(e) => e.status(),
        }
    }

    /// Returns true if this is an error reply.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Returns the response, if this is one.
    #[must_use]
    pub fn as_response(&self) -> Option<&RestResponse> {
        match self {
            Self::Response(r) => Some(r),
            Self::Error(_) => None,
        }
    }

    /// Returns the error, if this is one.
    #[must_use]
    pub fn as_error(&self) -> Option<&HostError> {
        match self {
            Self::Response(_) => None,
            Self::Error(e) => Some(e),
        }
    }

    /// Looks up a response header by case-insensitive name.
    ///
    /// Error replies carry no headers.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.as_response().and_then(|r| r.header(name))
    }

    /// Returns the body as the host would serialize it.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            Self::Response(r) => r.body().clone(),
            Self::Error(e) => e.to_body(),
        }
    }

    /// Converts to an `http` response.
    #[must_use]
    pub fn into_http(self) -> HttpResponse {
        match self {
            Self::Response(r) => r.into_http(),
            Self::Error(e) => e.into_http(),
        }
    }
}

impl From<RestResponse> for Reply {
    fn from(response: RestResponse) -> Self {
        Self::Response(response)
    }
}

impl From<HostError> for Reply {
    fn from(error: HostError) -> Self {
        Self::Error(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = RestResponse::ok(json!(null)).with_header("Content-Type", "text/plain");
        assert_eq!(response.header("content-type"), Some("text/plain"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_host_error_body_shape() {
        let err = HostError::missing_handler().with_data(json!({"route": "v1/x"}));
        let body = err.to_body();
        assert_eq!(body["code"], "missing_callback");
        assert_eq!(body["message"], "Route missing callback");
        assert_eq!(body["data"]["status"], 500);
        assert_eq!(body["data"]["route"], "v1/x");
    }

    #[test]
    fn test_reply_accessors() {
        let reply = Reply::from(HostError::no_route());
        assert!(reply.is_error());
        assert_eq!(reply.status(), StatusCode::NOT_FOUND);
        assert!(reply.as_response().is_none());
        assert!(reply.header("content-type").is_none());
    }

    #[tokio::test]
    async fn test_into_http_serializes_json() {
        let response = RestResponse::new(json!({"a": 1}), StatusCode::ACCEPTED)
            .with_header("X-Test", "1")
            .with_header("Bad Header", "x")
            .into_http();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers().get("x-test").unwrap(), "1");
        assert_eq!(response.headers().len(), 1);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"a": 1}));
    }
}
