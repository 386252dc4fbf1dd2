//! Test request building.

use std::net::{IpAddr, SocketAddr};

use bytes::Bytes;
use http::{header, HeaderName, HeaderValue};
use restfluent_core::{CallerIdentity, HttpMethod, RestRequest};
use serde::Serialize;
use serde_json::Value;

use crate::error::TestError;

/// Entry point for building requests sent to a [`MockHost`](crate::MockHost).
pub struct TestRequest;

impl TestRequest {
    /// Starts a `GET` request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(HttpMethod::Get, uri)
    }

    /// Starts a `POST` request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(HttpMethod::Post, uri)
    }

    /// Starts a `PUT` request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(HttpMethod::Put, uri)
    }

    /// Starts a `PATCH` request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(HttpMethod::Patch, uri)
    }

    /// Starts a `DELETE` request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(HttpMethod::Delete, uri)
    }
}

/// Builder for a [`RestRequest`].
///
/// Header and body errors are deferred to [`build`](Self::build) so calls
/// can be chained.
#[must_use]
pub struct TestRequestBuilder {
    method: HttpMethod,
    uri: String,
    headers: Vec<(String, String)>,
    body: Bytes,
    peer_addr: Option<SocketAddr>,
    identity: CallerIdentity,
    attributes: Vec<(String, Value)>,
    error: Option<TestError>,
}

impl TestRequestBuilder {
    /// Creates a builder for `method` and `uri`.
    pub fn new(method: HttpMethod, uri: impl AsRef<str>) -> Self {
        Self {
            method,
            uri: uri.as_ref().to_string(),
            headers: Vec::new(),
            body: Bytes::new(),
            peer_addr: None,
            identity: CallerIdentity::anonymous(),
            attributes: Vec::new(),
            error: None,
        }
    }

    /// Returns the method this builder targets.
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets `X-Forwarded-For`.
    pub fn forwarded_for(self, chain: impl Into<String>) -> Self {
        self.header("X-Forwarded-For", chain)
    }

    /// Sets `X-Real-IP`.
    pub fn real_ip(self, ip: impl Into<String>) -> Self {
        self.header("X-Real-IP", ip)
    }

    /// Sets the direct peer address.
    pub fn peer_ip(mut self, ip: IpAddr) -> Self {
        self.peer_addr = Some(SocketAddr::new(ip, 0));
        self
    }

    /// Marks the caller as an authenticated user.
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.identity = CallerIdentity::user(user_id);
        self
    }

    /// Sets an application attribute.
    pub fn attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.push((key.into(), value));
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and `Content-Type: application/json`.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.body = Bytes::from(bytes),
            Err(e) => self.error = Some(TestError::Json(e)),
        }
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// Builds the request.
    pub fn build(self) -> Result<RestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let mut inner = http::Request::builder()
            .method(self.method.to_http())
            .uri(self.uri.as_str())
            .body(self.body)
            .map_err(|e| TestError::RequestBuild(e.to_string()))?;

        for (name, value) in self.headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|_| TestError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|_| TestError::InvalidHeader(format!("{name}: {value}")))?;
            inner.headers_mut().append(header_name, header_value);
        }

        let mut request = RestRequest::new(inner);
        if let Some(addr) = self.peer_addr {
            request = request.with_peer_addr(addr);
        }
        request.set_identity(self.identity);
        for (key, value) in self.attributes {
            request.set_attribute(key, value);
        }
        Ok(request)
    }
}
