//! The inbound request seen by middleware and handlers.

use crate::identity::CallerIdentity;
use bytes::Bytes;
use http::{Extensions, HeaderMap, Method, Uri};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::net::SocketAddr;

/// The HTTP request type accepted from the host.
pub type HttpRequest = http::Request<Bytes>;

/// Header carrying the client chain when behind a proxy.
const FORWARDED_FOR: &str = "x-forwarded-for";
/// Header carrying the client address set by a single reverse proxy.
const REAL_IP: &str = "x-real-ip";

/// A request flowing through the route layer.
///
/// Wraps the host's HTTP request and adds the metadata the route layer needs:
/// the direct peer address, path parameters captured by the host's matcher,
/// and free-form application attributes that middleware may set for handlers.
///
/// # Example
///
/// ```
/// use restfluent_core::RestRequest;
/// use serde_json::json;
///
/// let mut request = RestRequest::get("/v1/product/42");
/// request.set_param("id", "42");
/// request.set_attribute("tenant", json!("acme"));
///
/// assert_eq!(request.param("id"), Some("42"));
/// assert_eq!(request.attribute("tenant"), Some(&json!("acme")));
/// ```
#[derive(Debug)]
pub struct RestRequest {
    inner: HttpRequest,
    peer_addr: Option<SocketAddr>,
    params: IndexMap<String, String>,
    attributes: Map<String, Value>,
}

impl RestRequest {
    /// Wraps a host request.
    #[must_use]
    pub fn new(inner: HttpRequest) -> Self {
        Self {
            inner,
            peer_addr: None,
            params: IndexMap::new(),
            attributes: Map::new(),
        }
    }

    /// Creates an empty-bodied request for the given method and URI.
    ///
    /// An unparsable URI falls back to `/`.
    #[must_use]
    pub fn from_method_uri(method: Method, uri: &str) -> Self {
        let mut inner = http::Request::new(Bytes::new());
        *inner.method_mut() = method;
        *inner.uri_mut() = uri.parse().unwrap_or_else(|_| Uri::from_static("/"));
        Self::new(inner)
    }

    /// Creates an empty `GET` request.
    #[must_use]
    pub fn get(uri: &str) -> Self {
        Self::from_method_uri(Method::GET, uri)
    }

    /// Sets the direct peer address.
    #[must_use]
    pub fn with_peer_addr(mut self, addr: SocketAddr) -> Self {
        self.peer_addr = Some(addr);
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// Returns the URI path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// Returns the path plus query string, as a server would report the request URI.
    #[must_use]
    pub fn request_uri(&self) -> &str {
        self.inner
            .uri()
            .path_and_query()
            .map_or_else(|| self.path(), |pq| pq.as_str())
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Returns the request headers mutably.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        self.inner.headers_mut()
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.headers().get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the raw `X-Forwarded-For` header, if non-empty.
    #[must_use]
    pub fn forwarded_for(&self) -> Option<&str> {
        self.header(FORWARDED_FOR).filter(|v| !v.is_empty())
    }

    /// Returns the raw `X-Real-IP` header, if non-empty.
    #[must_use]
    pub fn real_ip(&self) -> Option<&str> {
        self.header(REAL_IP).filter(|v| !v.is_empty())
    }

    /// Returns the direct peer address.
    #[must_use]
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer_addr
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        self.inner.body()
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(self.inner.body())
    }

    /// Returns a path parameter captured by the host's matcher.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Returns all path parameters in capture order.
    #[must_use]
    pub fn params(&self) -> &IndexMap<String, String> {
        &self.params
    }

    /// Sets a path parameter.
    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    /// Returns an application attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Sets an application attribute.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Returns the typed extensions of the underlying request.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        self.inner.extensions()
    }

    /// Returns the typed extensions of the underlying request mutably.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        self.inner.extensions_mut()
    }

    /// Returns the caller identity, anonymous unless one was set.
    #[must_use]
    pub fn identity(&self) -> &CallerIdentity {
        static ANONYMOUS: CallerIdentity = CallerIdentity::Anonymous;
        self.inner
            .extensions()
            .get::<CallerIdentity>()
            .unwrap_or(&ANONYMOUS)
    }

    /// Sets the caller identity.
    pub fn set_identity(&mut self, identity: CallerIdentity) {
        self.inner.extensions_mut().insert(identity);
    }

    /// Returns the wrapped host request.
    #[must_use]
    pub fn into_inner(self) -> HttpRequest {
        self.inner
    }
}

impl From<HttpRequest> for RestRequest {
    fn from(inner: HttpRequest) -> Self {
        Self::new(inner)
    }
}
