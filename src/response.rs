//! Turns raw responses into decoded payloads or typed errors.

use crate::transport::RawResponse;
use crate::{Error, Result};
use serde_json::{Map, Value};

/// Message used when an error response has an empty body.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Classifies a raw response.
///
/// Statuses below 400 yield the decoded JSON body, or an empty object when the
/// body is empty or not JSON. Statuses of 400 and above yield the [`Error`]
/// variant for their class.
///
/// # Examples
///
/// ```
/// use b2brouter::response::classify;
/// use b2brouter::transport::RawResponse;
/// use b2brouter::Error;
/// use http::{HeaderMap, StatusCode};
///
/// let ok = RawResponse::new(StatusCode::OK, r#"{"invoice":{"id":"inv_1"}}"#, HeaderMap::new());
/// assert_eq!(classify(ok).unwrap()["invoice"]["id"], "inv_1");
///
/// let missing = RawResponse::new(
///     StatusCode::NOT_FOUND,
///     r#"{"error":{"message":"Invoice not found"}}"#,
///     HeaderMap::new(),
/// );
/// match classify(missing) {
///     Err(Error::NotFound(err)) => assert_eq!(err.message, "Invoice not found"),
///     other => panic!("unexpected {:?}", other),
/// }
/// ```
pub fn classify(response: RawResponse) -> Result<Value> {
    let json_body = serde_json::from_str::<Value>(&response.body).ok();

    if response.status.as_u16() < 400 {
        return Ok(match json_body {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(value) => value,
        });
    }

    Err(error_from(response, json_body))
}

/// Checks a response whose body is not JSON, returning the body on success.
///
/// Error statuses are classified exactly like [`classify`] does.
pub fn check_raw(response: RawResponse) -> Result<String> {
    if response.status.as_u16() < 400 {
        return Ok(response.body);
    }

    let json_body = serde_json::from_str::<Value>(&response.body).ok();
    Err(error_from(response, json_body))
}

fn error_from(response: RawResponse, json_body: Option<Value>) -> Error {
    let message = extract_error_message(json_body.as_ref(), &response.body);
    let status = response.status;

    if status.is_client_error() {
        tracing::error!(
            status = status.as_u16(),
            message = %message,
            "Client error (4xx)"
        );
    } else {
        tracing::warn!(
            status = status.as_u16(),
            message = %message,
            "Server error (5xx)"
        );
    }

    Error::from_status(status, message, response.body, json_body, response.headers)
}

/// Picks the most specific human-readable message out of an error body.
///
/// Tries `error.message`, then `message`, then `error` (a string as-is, any
/// other value re-serialized), then the raw body, then [`UNKNOWN_ERROR`].
///
/// # Examples
///
/// ```
/// use b2brouter::response::extract_error_message;
/// use serde_json::json;
///
/// let body = json!({"error": {"message": "M1"}});
/// assert_eq!(extract_error_message(Some(&body), ""), "M1");
///
/// let body = json!({"error": "M3"});
/// assert_eq!(extract_error_message(Some(&body), ""), "M3");
///
/// assert_eq!(extract_error_message(None, ""), "Unknown error");
/// ```
pub fn extract_error_message(json_body: Option<&Value>, raw_body: &str) -> String {
    if let Some(Value::Object(map)) = json_body {
        let nested = map
            .get("error")
            .and_then(|error| error.get("message"))
            .filter(|message| !message.is_null());
        if let Some(message) = nested {
            return text_of(message);
        }

        if let Some(message) = map.get("message").filter(|message| !message.is_null()) {
            return text_of(message);
        }

        if let Some(error) = map.get("error").filter(|error| !error.is_null()) {
            return text_of(error);
        }
    }

    if raw_body.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        raw_body.to_string()
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, HeaderValue, StatusCode};
    use serde_json::json;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse::new(StatusCode::from_u16(status).unwrap(), body, HeaderMap::new())
    }

    #[test]
    fn test_success_returns_decoded_body() {
        let value = classify(raw(200, r#"{"invoice":{"id":"inv_1","number":"INV-1"}}"#)).unwrap();
        assert_eq!(value["invoice"]["id"], "inv_1");
    }

    #[test]
    fn test_success_with_empty_or_invalid_body_is_empty_object() {
        assert_eq!(classify(raw(204, "")).unwrap(), json!({}));
        assert_eq!(classify(raw(200, "not json")).unwrap(), json!({}));
        assert_eq!(classify(raw(200, "null")).unwrap(), json!({}));
    }

    #[test]
    fn test_redirect_statuses_are_not_errors() {
        assert!(classify(raw(302, "{}")).is_ok());
        assert!(classify(raw(399, "{}")).is_ok());
    }

    #[test]
    fn test_error_statuses_map_to_variants() {
        assert!(matches!(classify(raw(400, "{}")), Err(Error::InvalidRequest(_))));
        assert!(matches!(classify(raw(401, "{}")), Err(Error::Authentication(_))));
        assert!(matches!(classify(raw(403, "{}")), Err(Error::Permission(_))));
        assert!(matches!(classify(raw(404, "{}")), Err(Error::NotFound(_))));
        assert!(matches!(classify(raw(422, "{}")), Err(Error::InvalidRequest(_))));
        assert!(matches!(classify(raw(500, "{}")), Err(Error::Api(_))));
        assert!(matches!(classify(raw(418, "{}")), Err(Error::Api(_))));
    }

    #[test]
    fn test_message_precedence() {
        let cases = [
            (json!({"error": {"message": "M1"}, "message": "other"}), "M1"),
            (json!({"message": "M2"}), "M2"),
            (json!({"message": "M2", "error": "M3"}), "M2"),
            (json!({"error": "M3"}), "M3"),
            (json!({"error": {"code": 42}}), r#"{"code":42}"#),
        ];

        for (body, expected) in cases {
            assert_eq!(extract_error_message(Some(&body), "raw"), expected);
        }
    }

    #[test]
    fn test_message_falls_back_to_raw_body() {
        let err = classify(raw(502, "Bad Gateway")).unwrap_err();
        assert_eq!(err.message(), Some("Bad Gateway"));
        assert_eq!(err.json_body(), None);

        let body = json!({"errors": ["x"]});
        assert_eq!(extract_error_message(Some(&body), "{\"errors\":[\"x\"]}"), "{\"errors\":[\"x\"]}");
    }

    #[test]
    fn test_empty_error_body_is_unknown_error() {
        let err = classify(raw(500, "")).unwrap_err();
        assert_eq!(err.message(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn test_error_keeps_response_details() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-Id", HeaderValue::from_static("req_abc"));
        let body = r#"{"error":{"message":"Validation failed"},"errors":{"number":["is taken"]}}"#;

        let err = classify(RawResponse::new(StatusCode::UNPROCESSABLE_ENTITY, body, headers))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidRequest(_)));
        assert_eq!(err.message(), Some("Validation failed"));
        assert_eq!(err.raw_body(), Some(body));
        assert_eq!(err.json_body().unwrap()["errors"]["number"][0], "is taken");
        assert_eq!(err.request_id(), Some("req_abc"));
        assert!(err.headers().unwrap().contains_key("x-request-id"));
    }

    #[test]
    fn test_check_raw_returns_body() {
        let xml = "<?xml version=\"1.0\"?><RegFactuSistemaFacturacion/>";
        assert_eq!(check_raw(raw(200, xml)).unwrap(), xml);

        let err = check_raw(raw(404, r#"{"error":"Tax report not found"}"#)).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(err.message(), Some("Tax report not found"));
    }
}
