//! Test response wrapper.

use http::StatusCode;
use restfluent_core::{HostError, Reply};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// A reply from a [`MockHost`](crate::MockHost) with assertion helpers.
///
/// Host errors are rendered the way a REST host would render them: the body
/// is `{code, message, data: {status}}`.
#[derive(Debug, Clone)]
pub struct TestResponse {
    reply: Reply,
}

impl TestResponse {
    /// Wraps a reply.
    pub fn new(reply: Reply) -> Self {
        Self { reply }
    }

    /// Returns the underlying reply.
    pub fn reply(&self) -> &Reply {
        &self.reply
    }

    /// Unwraps into the underlying reply.
    pub fn into_reply(self) -> Reply {
        self.reply
    }

    /// Returns the status.
    pub fn status(&self) -> StatusCode {
        self.reply.status()
    }

    /// Returns the status as a `u16`.
    pub fn status_code(&self) -> u16 {
        self.status().as_u16()
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        self.status().is_success()
    }

    /// Returns the host error, if the reply is one.
    pub fn error(&self) -> Option<&HostError> {
        self.reply.as_error()
    }

    /// Returns the host error code, if the reply is an error.
    pub fn error_code(&self) -> Option<&str> {
        self.error().map(HostError::code)
    }

    /// Looks up a header, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.reply.header(name)
    }

    /// Returns the JSON body.
    pub fn json_value(&self) -> Value {
        match &self.reply {
            Reply::Error(error) => error.to_body(),
            Reply::Response(_) => self.reply.body(),
        }
    }

    /// Deserializes the JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_value(self.json_value())?)
    }

    /// Asserts the status.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status(),
            expected,
            "expected status {expected}, got {}",
            self.status()
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        match self.header(name) {
            Some(actual) => assert_eq!(
                actual, expected,
                "header {name}: expected {expected:?}, got {actual:?}"
            ),
            None => panic!("header {name} not present"),
        }
        self
    }

    /// Asserts the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the body differs.
    pub fn assert_json_eq(&self, expected: &Value) -> &Self {
        let actual = self.json_value();
        assert_eq!(&actual, expected, "JSON body mismatch");
        self
    }

    /// Asserts the host error code.
    ///
    /// # Panics
    ///
    /// Panics if the reply is not an error with that code.
    pub fn assert_error_code(&self, expected: &str) -> &Self {
        assert_eq!(
            self.error_code(),
            Some(expected),
            "expected host error {expected}"
        );
        self
    }
}

impl From<Reply> for TestResponse {
    fn from(reply: Reply) -> Self {
        Self::new(reply)
    }
}
