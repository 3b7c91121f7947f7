//! Request construction: URL, authentication headers and payload placement.

use crate::{Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde_json::Value;
use url::form_urlencoded;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-B2B-API-Key";

/// Header carrying the API version.
pub const API_VERSION_HEADER: &str = "X-B2B-API-Version";

/// Payload of a write request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured data, serialized to JSON by the transport.
    Json(Value),
    /// An already encoded body, sent as-is.
    Raw(String),
}

impl RequestBody {
    /// Serializes the body into the bytes sent on the wire.
    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            RequestBody::Raw(text) => Ok(text.clone().into_bytes()),
            RequestBody::Json(value) => {
                serde_json::to_vec(value).map_err(|e| Error::SerializationFailed(e.to_string()))
            }
        }
    }
}

/// A fully formed request, ready to hand to a [`Transport`](crate::transport::Transport).
///
/// Built once per call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// The HTTP method.
    pub method: Method,

    /// The absolute URL, including any query string.
    pub url: String,

    /// The request headers.
    pub headers: HeaderMap,

    /// The request body; always `None` for GET and DELETE.
    pub body: Option<RequestBody>,
}

impl PreparedRequest {
    /// Builds a JSON API request.
    ///
    /// For GET and DELETE, `params` is encoded into the query string. For every
    /// other method it becomes the JSON body. `path` must start with `/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or version cannot be used as a header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use b2brouter::request::PreparedRequest;
    /// use http::Method;
    /// use serde_json::json;
    ///
    /// let request = PreparedRequest::json(
    ///     Method::GET,
    ///     "https://api.example.com",
    ///     "/accounts/acme/invoices",
    ///     &json!({"limit": 25, "offset": 0}),
    ///     "my-key",
    ///     "2025-10-13",
    /// ).unwrap();
    ///
    /// assert_eq!(request.url, "https://api.example.com/accounts/acme/invoices?limit=25&offset=0");
    /// assert!(request.body.is_none());
    /// ```
    pub fn json(
        method: Method,
        api_base: &str,
        path: &str,
        params: &Value,
        api_key: &str,
        api_version: &str,
    ) -> Result<Self> {
        let mut headers = auth_headers(api_key, api_version)?;
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            http::header::ACCEPT,
            HeaderValue::from_static("application/json"),
        );

        let mut url = join_url(api_base, path);
        let body = if carries_query(&method) {
            let query = build_query(params);
            if !query.is_empty() {
                url.push('?');
                url.push_str(&query);
            }
            None
        } else {
            let payload = match params {
                Value::Null => Value::Object(Default::default()),
                other => other.clone(),
            };
            Some(RequestBody::Json(payload))
        };

        Ok(Self {
            method,
            url,
            headers,
            body,
        })
    }

    /// Builds a GET request for a raw, non-JSON download.
    ///
    /// Only the authentication headers are set.
    ///
    /// # Errors
    ///
    /// Returns an error if the key or version cannot be used as a header value.
    pub fn download(api_base: &str, path: &str, api_key: &str, api_version: &str) -> Result<Self> {
        Ok(Self {
            method: Method::GET,
            url: join_url(api_base, path),
            headers: auth_headers(api_key, api_version)?,
            body: None,
        })
    }
}

fn carries_query(method: &Method) -> bool {
    *method == Method::GET || *method == Method::DELETE
}

fn join_url(api_base: &str, path: &str) -> String {
    format!("{}{}", api_base.trim_end_matches('/'), path)
}

fn auth_headers(api_key: &str, api_version: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(header_name(API_KEY_HEADER)?, header_value(api_key)?);
    headers.insert(header_name(API_VERSION_HEADER)?, header_value(api_version)?);
    Ok(headers)
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::try_from(name)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::try_from(value)
        .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Encodes `params` as a bracket-style form query string.
///
/// Objects nest as `key[sub]`, arrays as `key[0]`, booleans become `1`/`0`
/// and `null` entries are dropped. Anything other than an object encodes to an
/// empty string.
///
/// # Examples
///
/// ```
/// use b2brouter::request::build_query;
/// use serde_json::json;
///
/// assert_eq!(build_query(&json!({"closed": false, "sent": true})), "closed=0&sent=1");
/// assert_eq!(build_query(&json!({"ids": ["a", "b"]})), "ids%5B0%5D=a&ids%5B1%5D=b");
/// ```
pub fn build_query(params: &Value) -> String {
    let mut pairs = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            flatten(key.clone(), value, &mut pairs);
        }
    }

    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn flatten(key: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(flag) => pairs.push((key, if *flag { "1" } else { "0" }.to_string())),
        Value::Number(number) => pairs.push((key, number.to_string())),
        Value::String(text) => pairs.push((key, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{}[{}]", key, index), item, pairs);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten(format!("{}[{}]", key, sub), item, pairs);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://api.example.com";

    #[test]
    fn test_get_puts_params_in_query() {
        let request = PreparedRequest::json(
            Method::GET,
            BASE,
            "/accounts/acme/tax_reports",
            &json!({"invoice_id": "inv 1", "limit": 25, "offset": 50}),
            "key",
            "2025-10-13",
        )
        .unwrap();

        assert_eq!(
            request.url,
            "https://api.example.com/accounts/acme/tax_reports?invoice_id=inv+1&limit=25&offset=50"
        );
        assert!(request.body.is_none());
    }

    #[test]
    fn test_delete_without_params_has_no_query() {
        let request =
            PreparedRequest::json(Method::DELETE, BASE, "/invoices/1", &json!({}), "key", "v")
                .unwrap();
        assert_eq!(request.url, "https://api.example.com/invoices/1");
        assert!(request.body.is_none());
    }

    #[test]
    fn test_write_methods_carry_json_body() {
        for method in [Method::POST, Method::PUT, Method::PATCH] {
            let params = json!({"invoice": {"number": "INV-1"}});
            let request =
                PreparedRequest::json(method.clone(), BASE, "/invoices/1", &params, "key", "v")
                    .unwrap();

            assert_eq!(request.url, "https://api.example.com/invoices/1", "{}", method);
            assert_eq!(request.body, Some(RequestBody::Json(params)));
        }
    }

    #[test]
    fn test_null_params_become_empty_object_body() {
        let request =
            PreparedRequest::json(Method::POST, BASE, "/invoices/send_invoice/1", &Value::Null, "k", "v")
                .unwrap();
        assert_eq!(request.body, Some(RequestBody::Json(json!({}))));
    }

    #[test]
    fn test_json_headers() {
        let request =
            PreparedRequest::json(Method::GET, BASE, "/invoices/1", &json!({}), "secret", "2025-10-13")
                .unwrap();

        assert_eq!(request.headers.get(API_KEY_HEADER).unwrap(), "secret");
        assert_eq!(request.headers.get(API_VERSION_HEADER).unwrap(), "2025-10-13");
        assert_eq!(request.headers.get("Content-Type").unwrap(), "application/json");
        assert_eq!(request.headers.get("Accept").unwrap(), "application/json");
    }

    #[test]
    fn test_download_omits_content_negotiation() {
        let request = PreparedRequest::download(BASE, "/tax_reports/7/download", "secret", "v").unwrap();

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://api.example.com/tax_reports/7/download");
        assert!(request.headers.contains_key(API_KEY_HEADER));
        assert!(!request.headers.contains_key("Content-Type"));
        assert!(!request.headers.contains_key("Accept"));
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        let result = PreparedRequest::json(Method::GET, BASE, "/x", &json!({}), "bad\nkey", "v");
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_json_body_is_serialized() {
        let body = RequestBody::Json(json!({"key": "value", "number": 123}));
        let bytes = body.to_bytes().unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, json!({"key": "value", "number": 123}));
    }

    #[test]
    fn test_raw_body_is_sent_verbatim() {
        let body = RequestBody::Raw("{\"already\":\"encoded\"}".to_string());
        assert_eq!(body.to_bytes().unwrap(), b"{\"already\":\"encoded\"}".to_vec());
    }

    #[test]
    fn test_nested_query_encoding() {
        let query = build_query(&json!({
            "filter": {"status": "sent", "skip": null},
            "ids": [1, 2],
            "new": true
        }));

        assert_eq!(
            query,
            "filter%5Bstatus%5D=sent&ids%5B0%5D=1&ids%5B1%5D=2&new=1"
        );
    }

    #[test]
    fn test_non_object_params_encode_to_nothing() {
        assert_eq!(build_query(&Value::Null), "");
        assert_eq!(build_query(&json!(["a"])), "");
    }
}
