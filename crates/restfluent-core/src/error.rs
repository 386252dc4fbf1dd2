//! Error types for the route layer.
//!
//! [`RouteError`] covers the conditions the route layer itself can hit. Most of
//! them never reach a client as a Rust error: a missing handler becomes a
//! [`HostError`] reply, an unresolvable middleware degrades to a passthrough,
//! and an exceeded rate limit is an ordinary 429 response. The enum exists so
//! those outcomes have one name, one category and one status mapping.

use crate::response::HostError;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`RouteError`].
pub type RouteResult<T> = Result<T, RouteError>;

/// Categories of route-layer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// A fault inside the route layer or its configuration.
    Internal,
    /// The caller exceeded a rate limit.
    RateLimited,
    /// The route table could not be handed to the host.
    Registration,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Internal | Self::Registration => StatusCode::INTERNAL_SERVER_ERROR,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// Errors raised by the route layer.
///
/// # Example
///
/// ```
/// use restfluent_core::{ErrorCategory, RouteError};
///
/// let err = RouteError::missing_handler("GET v1/users");
/// assert_eq!(err.category(), ErrorCategory::Internal);
/// assert_eq!(err.to_host_error().code(), "missing_callback");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// A route reached dispatch with no handler bound.
    #[error("Route missing callback")]
    MissingHandler {
        /// Route label (`METHOD prefix/pattern`), for logs.
        route: String,
    },

    /// A middleware reference could not be resolved to an instance.
    #[error("middleware reference `{reference}` could not be resolved")]
    UnresolvableMiddleware {
        /// The unresolved reference.
        reference: String,
    },

    /// The caller exceeded the configured request ceiling.
    #[error("Too many requests")]
    RateLimitExceeded {
        /// Seconds until the counter window expires.
        retry_after_secs: u64,
    },

    /// A compiled path could not be turned into a matcher.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The host refused a route during the registration pass.
    #[error("failed to register route {route}: {message}")]
    Registration {
        /// Route label (`METHOD prefix/pattern`).
        route: String,
        /// Host-supplied reason.
        message: String,
    },
}

impl RouteError {
    /// Creates a missing handler error.
    #[must_use]
    pub fn missing_handler(route: impl Into<String>) -> Self {
        Self::MissingHandler {
            route: route.into(),
        }
    }

    /// Creates an unresolvable middleware error.
    #[must_use]
    pub fn unresolvable_middleware(reference: impl Into<String>) -> Self {
        Self::UnresolvableMiddleware {
            reference: reference.into(),
        }
    }

    /// Creates a rate limit exceeded error.
    #[must_use]
    pub const fn rate_limit_exceeded(retry_after_secs: u64) -> Self {
        Self::RateLimitExceeded { retry_after_secs }
    }

    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    /// Creates a registration error.
    #[must_use]
    pub fn registration(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Registration {
            route: route.into(),
            message: message.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingHandler { .. }
            | Self::UnresolvableMiddleware { .. }
            | Self::InvalidPattern { .. } => ErrorCategory::Internal,
            Self::RateLimitExceeded { .. } => ErrorCategory::RateLimited,
            Self::Registration { .. } => ErrorCategory::Registration,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingHandler { .. } => "missing_callback",
            Self::UnresolvableMiddleware { .. } => "unresolvable_middleware",
            Self::RateLimitExceeded { .. } => "rate_limited",
            Self::InvalidPattern { .. } => "invalid_pattern",
            Self::Registration { .. } => "registration_failed",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Converts this error into a host error value.
    #[must_use]
    pub fn to_host_error(&self) -> HostError {
        HostError::new(self.code(), self.to_string(), self.status_code())
    }
}

impl From<RouteError> for HostError {
    fn from(err: RouteError) -> Self {
        err.to_host_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handler_maps_to_500() {
        let err = RouteError::missing_handler("GET v1/things");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let host = err.to_host_error();
        assert_eq!(host.code(), "missing_callback");
        assert_eq!(host.message(), "Route missing callback");
        assert_eq!(host.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_rate_limit_maps_to_429() {
        let err = RouteError::rate_limit_exceeded(60);
        assert_eq!(err.category(), ErrorCategory::RateLimited);
        assert_eq!(err.status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(err.to_string(), "Too many requests");
    }

    #[test]
    fn test_unresolvable_middleware_display() {
        let err = RouteError::unresolvable_middleware("audit");
        assert!(err.to_string().contains("audit"));
        assert_eq!(err.code(), "unresolvable_middleware");
    }

    #[test]
    fn test_registration_category() {
        let err = RouteError::registration("GET v1/x", "duplicate");
        assert_eq!(err.category(), ErrorCategory::Registration);
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::RateLimited).unwrap();
        assert_eq!(json, "\"rate_limited\"");
    }
}
