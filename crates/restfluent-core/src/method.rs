//! HTTP verbs a route can be declared with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The HTTP method of a route.
///
/// Only the five verbs the route builder exposes are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

/// Error returned when a string is not one of the supported verbs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported HTTP method: {0}")]
pub struct ParseMethodError(pub String);

impl HttpMethod {
    /// Returns the canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Returns all supported methods.
    #[must_use]
    pub const fn all() -> [HttpMethod; 5] {
        [Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete]
    }

    /// Converts to the `http` crate's method type.
    #[must_use]
    pub fn to_http(self) -> http::Method {
        match self {
            Self::Get => http::Method::GET,
            Self::Post => http::Method::POST,
            Self::Put => http::Method::PUT,
            Self::Patch => http::Method::PATCH,
            Self::Delete => http::Method::DELETE,
        }
    }

    /// Converts from the `http` crate's method type.
    ///
    /// Returns `None` for verbs routes cannot be declared with.
    #[must_use]
    pub fn from_http(method: &http::Method) -> Option<Self> {
        Self::all().into_iter().find(|m| m.to_http() == *method)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseMethodError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!("Patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("OPTIONS".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_http_conversion() {
        for method in HttpMethod::all() {
            assert_eq!(HttpMethod::from_http(&method.to_http()), Some(method));
        }
        assert_eq!(HttpMethod::from_http(&http::Method::HEAD), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
