//! Extraction of body, status and headers from handler results.
//!
//! Structured results are read through the route's [`ResponseKeyMap`]:
//!
//! - status: the status key if present and valid, else the route default
//! - headers: route defaults, overridden by the headers key when it holds a mapping
//! - body: the data key, else `body`, else `response`, else the whole value
//!
//! Any other value is the body as-is. Nothing here fails: malformed keys fall
//! back to the route's defaults.
//!
//! [`ResponseKeyMap`]: restfluent_router::ResponseKeyMap

use http::StatusCode;
use restfluent_core::Headers;
use restfluent_router::RouteDefinition;
use serde_json::{Map, Value};

/// Fallback body keys, checked after the route's data key.
const FALLBACK_BODY_KEYS: [&str; 2] = ["body", "response"];

/// Body, status and headers extracted from one handler result.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResult {
    /// Response body.
    pub body: Value,
    /// Response status.
    pub status: StatusCode,
    /// Response headers, route defaults first.
    pub headers: Headers,
}

/// Normalizes any JSON value: objects take the keyed path, the rest pass through.
pub fn normalize(value: Value, route: &RouteDefinition) -> NormalizedResult {
    match value {
        Value::Object(map) => normalize_structured(map, route),
        other => normalize_scalar(other, route),
    }
}

/// Normalizes a keyed mapping.
pub fn normalize_structured(map: Map<String, Value>, route: &RouteDefinition) -> NormalizedResult {
    let keys = route.keys();

    let status = map
        .get(&keys.status)
        .and_then(status_from_value)
        .unwrap_or_else(|| route.default_status());

    let mut headers = route.default_headers().clone();
    if let Some(Value::Object(extra)) = map.get(&keys.headers) {
        for (name, value) in extra {
            if let Some(value) = header_value(value) {
                merge_header(&mut headers, name, value);
            }
        }
    }

    let body_key = std::iter::once(keys.data.as_str())
        .chain(FALLBACK_BODY_KEYS)
        .find(|key| map.contains_key(*key))
        .map(str::to_string);

    let body = match body_key {
        Some(key) => {
            let mut map = map;
            map.remove(&key).unwrap_or(Value::Null)
        }
        None => Value::Object(map),
    };

    NormalizedResult {
        body,
        status,
        headers,
    }
}

/// Normalizes a non-mapping value.
pub fn normalize_scalar(value: Value, route: &RouteDefinition) -> NormalizedResult {
    NormalizedResult {
        body: value,
        status: route.default_status(),
        headers: route.default_headers().clone(),
    }
}

/// Reads a status from a number or a numeric string.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn status_from_value(value: &Value) -> Option<StatusCode> {
    let code = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u16::try_from(code)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
}

/// Renders a header value; `null` means no header.
fn header_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Inserts a header, replacing any existing one with the same name in any case.
pub fn merge_header(headers: &mut Headers, name: &str, value: String) {
    if let Some(existing) = headers.keys().find(|k| k.eq_ignore_ascii_case(name)).cloned() {
        headers.shift_remove(&existing);
    }
    headers.insert(name.to_string(), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use restfluent_core::HttpMethod;
    use serde::Serialize;
    use serde_json::json;

    fn route() -> RouteDefinition {
        RouteDefinition::new(HttpMethod::Get, "/x")
    }

    fn structured(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test input must be an object"),
        }
    }

    #[test]
    fn test_headers_merge_over_route_defaults() {
        let mut route = route();
        route.headers([("X-Base", "base")]);

        let result = normalize(
            json!({ "data": { "ok": true }, "status": 201, "headers": { "X-Test": "1" } }),
            &route,
        );

        assert_eq!(result.body, json!({ "ok": true }));
        assert_eq!(result.status, StatusCode::CREATED);
        assert_eq!(
            result.headers.into_iter().collect::<Vec<_>>(),
            vec![
                ("X-Base".to_string(), "base".to_string()),
                ("X-Test".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_status_falls_back_to_route_default() {
        let mut route = route();
        route.handler_with_status(|_req| async {}, StatusCode::ACCEPTED);

        let result = normalize(json!({ "data": { "ok": true } }), &route);
        assert_eq!(result.status, StatusCode::ACCEPTED);
    }

    #[test]
    fn test_custom_keys() {
        let mut route = route();
        route.map("payload", "code", "hdrs");

        let result = normalize(
            json!({ "payload": { "msg": "teapot" }, "code": 418, "hdrs": { "X-Test": "1" } }),
            &route,
        );
        assert_eq!(result.body, json!({ "msg": "teapot" }));
        assert_eq!(result.status, StatusCode::IM_A_TEAPOT);
        assert_eq!(result.headers.get("X-Test").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_body_key_precedence() {
        let route = route();
        assert_eq!(normalize(json!({ "body": { "a": 1 }, "status": 200 }), &route).body, json!({ "a": 1 }));
        assert_eq!(
            normalize(json!({ "response": { "b": 2 }, "status": 200 }), &route).body,
            json!({ "b": 2 })
        );
        assert_eq!(
            normalize(json!({ "data": 1, "body": 2, "response": 3 }), &route).body,
            json!(1)
        );
        assert_eq!(normalize(json!({ "body": 2, "response": 3 }), &route).body, json!(2));
    }

    #[test]
    fn test_whole_value_when_no_body_key() {
        let value = json!({ "id": 7, "status": 201, "headers": { "X-A": "a" } });
        let result = normalize(value.clone(), &route());
        assert_eq!(result.body, value);
        assert_eq!(result.status, StatusCode::CREATED);
        assert_eq!(result.headers.get("X-A").map(String::as_str), Some("a"));
    }

    #[test]
    fn test_null_data_key_counts_as_present() {
        let result = normalize(json!({ "data": null, "body": "ignored" }), &route());
        assert_eq!(result.body, Value::Null);
    }

    #[test]
    fn test_scalar_passthrough() {
        let result = normalize(json!("hello"), &route());
        assert_eq!(result.body, json!("hello"));
        assert_eq!(result.status, StatusCode::OK);
        assert!(result.headers.is_empty());

        let list = normalize(json!([1, 2, 3]), &route());
        assert_eq!(list.body, json!([1, 2, 3]));
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!(status_from_value(&json!(404)), Some(StatusCode::NOT_FOUND));
        assert_eq!(status_from_value(&json!("202")), Some(StatusCode::ACCEPTED));
        assert_eq!(status_from_value(&json!(201.0)), Some(StatusCode::CREATED));
        assert_eq!(status_from_value(&json!("abc")), None);
        assert_eq!(status_from_value(&json!(42)), None);
        assert_eq!(status_from_value(&json!(70_000)), None);
        assert_eq!(status_from_value(&json!(true)), None);
    }

    #[test]
    fn test_invalid_status_uses_default() {
        let result = normalize(json!({ "data": 1, "status": "teapot" }), &route());
        assert_eq!(result.status, StatusCode::OK);
    }

    #[test]
    fn test_non_mapping_headers_are_ignored() {
        let mut route = route();
        route.headers([("X-Base", "base")]);
        let result = normalize(json!({ "data": 1, "headers": "X-Nope: 1" }), &route);
        assert_eq!(result.headers.len(), 1);
    }

    #[test]
    fn test_header_values_are_stringified() {
        let result = normalize(
            json!({ "data": 1, "headers": { "X-Count": 3, "X-Flag": true, "X-None": null } }),
            &route(),
        );
        assert_eq!(result.headers.get("X-Count").map(String::as_str), Some("3"));
        assert_eq!(result.headers.get("X-Flag").map(String::as_str), Some("true"));
        assert!(!result.headers.contains_key("X-None"));
    }

    #[test]
    fn test_header_override_ignores_case() {
        let mut route = route();
        route.headers([("Content-Type", "text/plain")]);
        let result = normalize(
            json!({ "data": 1, "headers": { "content-type": "text/csv" } }),
            &route,
        );
        assert_eq!(result.headers.len(), 1);
        assert_eq!(result.headers.get("content-type").map(String::as_str), Some("text/csv"));
    }

    #[test]
    fn test_struct_with_named_fields() {
        #[derive(Serialize)]
        struct Created {
            data: Value,
            status: u16,
        }

        let value = serde_json::to_value(Created {
            data: json!({ "id": 1 }),
            status: 201,
        })
        .unwrap();
        let result = normalize_structured(structured(value), &route());
        assert_eq!(result.body, json!({ "id": 1 }));
        assert_eq!(result.status, StatusCode::CREATED);
    }
}
