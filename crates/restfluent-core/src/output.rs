//! The shapes a handler may return.

use crate::response::{HostError, Reply, RestResponse};
use http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

/// A handler's return value, classified by shape.
///
/// The dispatcher matches on the variant: the first two bypass normalization
/// entirely, the last two are normalized against the route's configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum HandlerOutput {
    /// Already a final response; returned verbatim.
    Response(RestResponse),
    /// Already a final error; returned verbatim.
    Error(HostError),
    /// A keyed mapping (a JSON object, or a struct serialized to one).
    Structured(Map<String, Value>),
    /// Any non-mapping value, used as the body unchanged.
    Scalar(Value),
}

impl HandlerOutput {
    /// Classifies a JSON value: objects become [`Structured`](Self::Structured),
    /// everything else [`Scalar`](Self::Scalar).
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Structured(map),
            other => Self::Scalar(other),
        }
    }

    /// Serializes any value and classifies the result.
    ///
    /// A struct with named fields takes the keyed-mapping path, exactly like
    /// a hand-built JSON object. A serialization failure becomes a 500 error.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::from_value(value),
            Err(e) => Self::Error(HostError::new(
                "serialization_failed",
                e.to_string(),
                StatusCode::INTERNAL_SERVER_ERROR,
            )),
        }
    }

    /// Returns true if this output bypasses normalization.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Response(_) | Self::Error(_))
    }
}

impl From<Value> for HandlerOutput {
    fn from(value: Value) -> Self {
        Self::from_value(value)
    }
}

impl From<Map<String, Value>> for HandlerOutput {
    fn from(map: Map<String, Value>) -> Self {
        Self::Structured(map)
    }
}

impl From<RestResponse> for HandlerOutput {
    fn from(response: RestResponse) -> Self {
        Self::Response(response)
    }
}

impl From<HostError> for HandlerOutput {
    fn from(error: HostError) -> Self {
        Self::Error(error)
    }
}

impl From<Reply> for HandlerOutput {
    fn from(reply: Reply) -> Self {
        match reply {
            Reply::Response(r) => Self::Response(r),
            Reply::Error(e) => Self::Error(e),
        }
    }
}

impl From<&str> for HandlerOutput {
    fn from(s: &str) -> Self {
        Self::Scalar(Value::String(s.to_string()))
    }
}

impl From<String> for HandlerOutput {
    fn from(s: String) -> Self {
        Self::Scalar(Value::String(s))
    }
}

impl From<()> for HandlerOutput {
    fn from((): ()) -> Self {
        Self::Scalar(Value::Null)
    }
}

impl<T, E> From<Result<T, E>> for HandlerOutput
where
    T: Into<HandlerOutput>,
    E: Into<HandlerOutput>,
{
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => v.into(),
            Err(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Created {
        data: Value,
        status: u16,
    }

    #[test]
    fn test_object_is_structured() {
        let output = HandlerOutput::from(json!({"data": 1}));
        assert!(matches!(output, HandlerOutput::Structured(_)));
    }

    #[test]
    fn test_array_is_scalar() {
        let output = HandlerOutput::from(json!([1, 2]));
        assert_eq!(output, HandlerOutput::Scalar(json!([1, 2])));
    }

    #[test]
    fn test_struct_takes_mapping_path() {
        let output = HandlerOutput::json(&Created {
            data: json!({"id": 123}),
            status: 404,
        });
        match output {
            HandlerOutput::Structured(map) => {
                assert_eq!(map["status"], 404);
                assert_eq!(map["data"], json!({"id": 123}));
            }
            other => panic!("expected structured output, got {other:?}"),
        }
    }

    #[test]
    fn test_result_conversion() {
        let ok: Result<Value, HostError> = Ok(json!("fine"));
        assert_eq!(HandlerOutput::from(ok), HandlerOutput::Scalar(json!("fine")));

        let err: Result<Value, HostError> = Err(HostError::forbidden());
        assert!(HandlerOutput::from(err).is_final());
    }
}
