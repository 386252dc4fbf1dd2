//! Caller identity and the identity provider seam.
//!
//! The route layer never authenticates anyone itself. The embedder plugs in an
//! [`IdentityProvider`] that answers two questions for a request: is the
//! caller authenticated, and what is their identifier.

use crate::request::RestRequest;
use serde::{Deserialize, Serialize};

/// The identity of the caller, as established by the embedder.
///
/// # Example
///
/// ```rust
/// use restfluent_core::CallerIdentity;
///
/// let identity = CallerIdentity::user("17");
/// assert_eq!(identity.log_id(), "user:17");
/// assert!(CallerIdentity::anonymous().user_id().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallerIdentity {
    /// An authenticated user.
    User {
        /// Stable user identifier.
        user_id: String,
    },
    /// No authenticated caller.
    #[default]
    Anonymous,
}

impl CallerIdentity {
    /// Creates a user identity.
    #[must_use]
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::User {
            user_id: user_id.into(),
        }
    }

    /// Creates an anonymous identity.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self::Anonymous
    }

    /// Returns the user identifier, if authenticated.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id),
            Self::Anonymous => None,
        }
    }

    /// Returns a string identifier suitable for logging.
    #[must_use]
    pub fn log_id(&self) -> String {
        match self {
            Self::User { user_id } => format!("user:{user_id}"),
            Self::Anonymous => "anonymous".to_string(),
        }
    }
}

/// Identity/session lookup consumed by middleware such as rate limiting.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Returns true if the caller of `request` is authenticated.
    fn is_authenticated(&self, request: &RestRequest) -> bool;

    /// Returns the identifier of the authenticated caller.
    fn current_identity_id(&self, request: &RestRequest) -> Option<String>;
}

/// Provider that treats every caller as anonymous.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousProvider;

impl IdentityProvider for AnonymousProvider {
    fn is_authenticated(&self, _request: &RestRequest) -> bool {
        false
    }

    fn current_identity_id(&self, _request: &RestRequest) -> Option<String> {
        None
    }
}

/// Provider that reads the [`CallerIdentity`] stored on the request.
///
/// Pair it with an upstream middleware or host hook that calls
/// [`RestRequest::set_identity`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdentityProvider;

impl IdentityProvider for RequestIdentityProvider {
    fn is_authenticated(&self, request: &RestRequest) -> bool {
        request.identity().user_id().is_some()
    }

    fn current_identity_id(&self, request: &RestRequest) -> Option<String> {
        request.identity().user_id().map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_provider() {
        let request = RestRequest::get("/");
        assert!(!AnonymousProvider.is_authenticated(&request));
        assert!(AnonymousProvider.current_identity_id(&request).is_none());
    }

    #[test]
    fn test_request_identity_provider() {
        let mut request = RestRequest::get("/");
        assert!(!RequestIdentityProvider.is_authenticated(&request));

        request.set_identity(CallerIdentity::user("u-9"));
        assert!(RequestIdentityProvider.is_authenticated(&request));
        assert_eq!(
            RequestIdentityProvider.current_identity_id(&request),
            Some("u-9".to_string())
        );
    }

    #[test]
    fn test_serialization() {
        let identity = CallerIdentity::user("u123");
        let json = serde_json::to_string(&identity).expect("serialization should work");
        assert!(json.contains("\"type\":\"user\""));
        assert!(json.contains("\"user_id\":\"u123\""));

        let parsed: CallerIdentity =
            serde_json::from_str(&json).expect("deserialization should work");
        assert_eq!(identity, parsed);
    }
}
