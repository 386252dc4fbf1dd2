//! Response shaping applied after normalization.

use crate::normalize::NormalizedResult;
use http::header::CONTENT_TYPE;
use http::StatusCode;
use restfluent_core::{Headers, RestResponse};
use restfluent_router::RouteDefinition;
use serde_json::{json, Value};

/// Wraps a body as `{data, status, success}`.
///
/// `success` is true for 2xx statuses.
pub fn wrap_envelope(body: Value, status: StatusCode) -> Value {
    json!({
        "data": body,
        "status": status.as_u16(),
        "success": status.is_success(),
    })
}

/// Sets `Content-Type` unless a header of that name (in any case) exists.
pub fn default_content_type(headers: &mut Headers, content_type: &str) {
    let present = headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
    if !present {
        headers.insert("Content-Type".to_string(), content_type.to_string());
    }
}

/// Builds the final response for a normalized result under a route's settings.
pub fn shape(result: NormalizedResult, route: &RouteDefinition) -> RestResponse {
    let NormalizedResult {
        body,
        status,
        mut headers,
    } = result;

    default_content_type(&mut headers, route.default_content_type());

    let body = if route.uses_envelope() {
        wrap_envelope(body, status)
    } else {
        body
    };

    RestResponse::from_parts(body, status, headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use restfluent_core::HttpMethod;

    #[test]
    fn test_envelope_success_range() {
        assert_eq!(
            wrap_envelope(json!({ "id": 1 }), StatusCode::CREATED),
            json!({ "data": { "id": 1 }, "status": 201, "success": true })
        );
        assert_eq!(
            wrap_envelope(json!("nope"), StatusCode::NOT_FOUND)["success"],
            json!(false)
        );
        assert_eq!(
            wrap_envelope(Value::Null, StatusCode::MULTIPLE_CHOICES)["success"],
            json!(false)
        );
    }

    #[test]
    fn test_content_type_defaulting() {
        let mut headers = Headers::new();
        default_content_type(&mut headers, "application/json");
        assert_eq!(headers.get("Content-Type").map(String::as_str), Some("application/json"));

        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "text/csv".to_string());
        default_content_type(&mut headers, "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("content-type").map(String::as_str), Some("text/csv"));
    }

    #[test]
    fn test_shape_with_envelope() {
        let mut route = RouteDefinition::new(HttpMethod::Get, "/x");
        route.formatter(true).content_type("application/vnd.api+json");

        let response = shape(
            NormalizedResult {
                body: json!([1]),
                status: StatusCode::OK,
                headers: Headers::new(),
            },
            &route,
        );

        assert_eq!(response.body(), &json!({ "data": [1], "status": 200, "success": true }));
        assert_eq!(response.header("content-type"), Some("application/vnd.api+json"));
    }

    #[test]
    fn test_shape_without_envelope() {
        let route = RouteDefinition::new(HttpMethod::Get, "/x");
        let response = shape(
            NormalizedResult {
                body: json!("plain"),
                status: StatusCode::ACCEPTED,
                headers: Headers::new(),
            },
            &route,
        );
        assert_eq!(response.body(), &json!("plain"));
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }
}
