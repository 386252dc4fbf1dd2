//! Rate limiting middleware.
//!
//! Counts requests per caller in a fixed window held by a [`CounterStore`]
//! and rejects callers over the ceiling with `429 Too Many Requests`.
//!
//! ## Counter keys
//!
//! - authenticated caller: `<prefix>user_<id>`
//! - anyone else: `<prefix><sha1 hex of "ip|request-uri">`
//!
//! The client IP is taken from the first `X-Forwarded-For` entry, then
//! `X-Real-IP`, then the peer address. A caller with none of these gets a
//! fresh anonymous token per request and is therefore never limited
//! consistently.
//!
//! ## Example
//!
//! ```ignore
//! use restfluent_middleware::stages::RateLimitPolicy;
//! use std::time::Duration;
//!
//! let rate_limit = RateLimitPolicy::builder(store)
//!     .limit(100)
//!     .window(Duration::from_secs(60))
//!     .build();
//! ```

use crate::middleware::{BoxFuture, Middleware, Next};
use crate::store::CounterStore;
use http::StatusCode;
use restfluent_core::{
    AnonymousProvider, IdentityProvider, Reply, RestRequest, RestResponse, RouteError,
};
use restfluent_telemetry::metrics::record_rate_limited;
use serde_json::json;
use sha1::{Digest, Sha1};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Rate limit header names.
pub mod headers {
    /// Seconds to wait before retrying (on 429).
    pub const RETRY_AFTER: &str = "Retry-After";
}

/// Default request ceiling per window.
pub const DEFAULT_LIMIT: u64 = 60;

/// Default window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Default counter key prefix.
pub const DEFAULT_KEY_PREFIX: &str = "rate_limit_";

/// Fixed-window rate limiting policy.
#[derive(Clone)]
pub struct RateLimitPolicy {
    limit: u64,
    window: Duration,
    key_prefix: String,
    store: Arc<dyn CounterStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl fmt::Debug for RateLimitPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimitPolicy")
            .field("limit", &self.limit)
            .field("window", &self.window)
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

/// Builder for [`RateLimitPolicy`].
pub struct RateLimitBuilder {
    limit: u64,
    window: Duration,
    key_prefix: String,
    store: Arc<dyn CounterStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl RateLimitBuilder {
    /// Starts a builder with the default 60 requests per 60 seconds.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            window: DEFAULT_WINDOW,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            store,
            identity: Arc::new(AnonymousProvider),
        }
    }

    /// Sets the maximum number of requests allowed per window.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the window length.
    #[must_use]
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Sets the window length in seconds.
    #[must_use]
    pub fn window_secs(self, seconds: u64) -> Self {
        self.window(Duration::from_secs(seconds))
    }

    /// Sets the counter key prefix.
    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Sets the identity provider used to key authenticated callers.
    #[must_use]
    pub fn identity<P: IdentityProvider>(mut self, provider: P) -> Self {
        self.identity = Arc::new(provider);
        self
    }

    /// Builds the policy.
    #[must_use]
    pub fn build(self) -> RateLimitPolicy {
        RateLimitPolicy {
            limit: self.limit,
            window: self.window,
            key_prefix: self.key_prefix,
            store: self.store,
            identity: self.identity,
        }
    }
}

impl RateLimitPolicy {
    /// Creates a policy with default limits and no authenticated callers.
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        RateLimitBuilder::new(store).build()
    }

    /// Creates a new rate limit builder.
    pub fn builder(store: Arc<dyn CounterStore>) -> RateLimitBuilder {
        RateLimitBuilder::new(store)
    }

    /// Returns the request ceiling.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the counter key for a request.
    pub fn key_for(&self, request: &RestRequest) -> String {
        if self.identity.is_authenticated(request) {
            if let Some(id) = self.identity.current_identity_id(request) {
                return format!("{}user_{id}", self.key_prefix);
            }
        }

        let fingerprint = format!("{}|{}", client_ip(request), request.request_uri());
        let digest = Sha1::digest(fingerprint.as_bytes());
        format!("{}{digest:x}", self.key_prefix)
    }

    /// Returns the `Retry-After` value: the window in whole seconds, rounded up.
    pub fn retry_after_secs(&self) -> u64 {
        let secs = self.window.as_secs();
        if self.window.subsec_nanos() > 0 {
            secs.saturating_add(1)
        } else {
            secs
        }
    }

    fn rejection(&self) -> Reply {
        let retry_after = self.retry_after_secs();
        let err = RouteError::rate_limit_exceeded(retry_after);
        RestResponse::new(json!({ "message": err.to_string() }), err.status_code())
            .with_header(headers::RETRY_AFTER, retry_after.to_string())
            .into()
    }
}

/// Resolves the client address used in anonymous counter keys.
pub fn client_ip(request: &RestRequest) -> String {
    if let Some(first) = request
        .forwarded_for()
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return first.to_string();
    }
    if let Some(real_ip) = request.real_ip() {
        return real_ip.trim().to_string();
    }
    if let Some(addr) = request.peer_addr() {
        return addr.ip().to_string();
    }
    format!("anon_{}", uuid::Uuid::now_v7().simple())
}

impl Middleware for RateLimitPolicy {
    fn name(&self) -> &'static str {
        "rate-limit"
    }

    fn handle<'a>(&'a self, request: RestRequest, next: Next<'a>) -> BoxFuture<'a, Reply> {
        Box::pin(async move {
            let key = self.key_for(&request);

            match self.store.get(&key).await {
                None => {
                    self.store.set(&key, 1, self.window).await;
                }
                Some(count) if count < self.limit => {
                    self.store.set(&key, count + 1, self.window).await;
                }
                Some(count) => {
                    warn!(key = %key, count, limit = self.limit, "rate limit exceeded");
                    record_rate_limited(self.name());
                    return self.rejection();
                }
            }

            debug!(key = %key, "rate limit passed");
            next.run(request).await
        })
    }
}
