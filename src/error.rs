//! Error types for B2BRouter API calls.
//!
//! Every failure is surfaced through the single [`Error`] enum. Responses with
//! an HTTP error status are split by status class into their own variants, each
//! carrying an [`ApiError`] with everything the server sent back, so callers can
//! pattern-match on the class and still log the raw details.

use http::{HeaderMap, StatusCode};
use serde_json::Value;

/// Header the API uses to correlate a response with server-side logs.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Details of an error response returned by the API.
///
/// Fields are populated from the raw response as received; none of them are
/// rewritten after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// Human-readable message extracted from the response body.
    pub message: String,

    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The raw response body.
    pub raw_body: String,

    /// The response body decoded as JSON, if it was valid JSON.
    pub json_body: Option<Value>,

    /// The response headers.
    pub headers: HeaderMap,

    /// The value of the `X-Request-Id` response header, if present.
    pub request_id: Option<String>,
}

impl ApiError {
    /// Creates a new `ApiError`, picking the request id out of `headers`.
    pub fn new(
        message: impl Into<String>,
        status: StatusCode,
        raw_body: impl Into<String>,
        json_body: Option<Value>,
        headers: HeaderMap,
    ) -> Self {
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Self {
            message: message.into(),
            status,
            raw_body: raw_body.into(),
            json_body,
            headers,
            request_id,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (status {})", self.message, self.status.as_u16())?;
        if let Some(request_id) = &self.request_id {
            write!(f, " [request id {}]", request_id)?;
        }
        Ok(())
    }
}

/// The main error type for B2BRouter API calls.
///
/// # Examples
///
/// ```no_run
/// use b2brouter::{B2BRouterClient, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = B2BRouterClient::new("my-api-key")?;
///
/// match client.invoices().retrieve("inv_1", serde_json::json!({})).await {
///     Ok(invoice) => println!("Invoice: {}", invoice["number"]),
///     Err(Error::NotFound(err)) => eprintln!("No such invoice: {}", err.message),
///     Err(Error::Connection { message, .. }) => eprintln!("Network trouble: {}", message),
///     Err(e) => {
///         eprintln!("Error: {}", e);
///         if let Some(request_id) = e.request_id() {
///             eprintln!("  request id: {}", request_id);
///         }
///     }
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// No response was received (DNS failure, refused connection, timeout, TLS failure).
    ///
    /// This is the only error kind the client retries.
    #[error("Connection error: {message}")]
    Connection {
        /// Diagnostic description of the failure.
        message: String,
        /// The underlying transport error, when there is one.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The API key was rejected (HTTP 401).
    #[error("Authentication error: {0}")]
    Authentication(ApiError),

    /// The API key is not allowed to perform this operation (HTTP 403).
    #[error("Permission error: {0}")]
    Permission(ApiError),

    /// The requested resource does not exist (HTTP 404).
    #[error("Not found: {0}")]
    NotFound(ApiError),

    /// The request was malformed or failed validation (HTTP 400 or 422).
    #[error("Invalid request: {0}")]
    InvalidRequest(ApiError),

    /// Any other HTTP error status.
    #[error("API error: {0}")]
    Api(ApiError),

    /// A caller-supplied argument was rejected before any request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid configuration was provided to the client builder.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Failed to convert a decoded payload into a caller-chosen type.
    #[error("Failed to deserialize response: {0}")]
    DeserializationFailed(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Builds the error variant matching the class of `status`.
    ///
    /// # Examples
    ///
    /// ```
    /// use b2brouter::Error;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = Error::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad", "", None, HeaderMap::new());
    /// assert!(matches!(err, Error::InvalidRequest(_)));
    ///
    /// let err = Error::from_status(StatusCode::BAD_GATEWAY, "down", "", None, HeaderMap::new());
    /// assert!(matches!(err, Error::Api(_)));
    /// ```
    pub fn from_status(
        status: StatusCode,
        message: impl Into<String>,
        raw_body: impl Into<String>,
        json_body: Option<Value>,
        headers: HeaderMap,
    ) -> Self {
        let details = ApiError::new(message, status, raw_body, json_body, headers);
        match status.as_u16() {
            400 | 422 => Error::InvalidRequest(details),
            401 => Error::Authentication(details),
            403 => Error::Permission(details),
            404 => Error::NotFound(details),
            _ => Error::Api(details),
        }
    }

    /// Creates a connection error without an underlying transport error.
    pub fn connection(message: impl Into<String>) -> Self {
        Error::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` if this error is retried by the client.
    ///
    /// Only connection-level failures qualify; a received status, even 5xx,
    /// is a definitive answer.
    ///
    /// # Examples
    ///
    /// ```
    /// use b2brouter::Error;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// assert!(Error::connection("connection refused").is_retryable());
    ///
    /// let err = Error::from_status(
    ///     StatusCode::INTERNAL_SERVER_ERROR,
    ///     "Server error",
    ///     "Server error",
    ///     None,
    ///     HeaderMap::new(),
    /// );
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Returns the API error details for errors caused by an HTTP error status.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Authentication(details)
            | Error::Permission(details)
            | Error::NotFound(details)
            | Error::InvalidRequest(details)
            | Error::Api(details) => Some(details),
            _ => None,
        }
    }

    /// Returns the message reported by the server, or the diagnostic message
    /// of a connection failure.
    pub fn message(&self) -> Option<&str> {
        match self {
            Error::Connection { message, .. } => Some(message),
            _ => self.api_error().map(|details| details.message.as_str()),
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        self.api_error().map(|details| details.status)
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_body(&self) -> Option<&str> {
        self.api_error().map(|details| details.raw_body.as_str())
    }

    /// Returns the decoded JSON body if the error response was valid JSON.
    pub fn json_body(&self) -> Option<&Value> {
        self.api_error()?.json_body.as_ref()
    }

    /// Returns the response headers if this error has them.
    pub fn headers(&self) -> Option<&HeaderMap> {
        self.api_error().map(|details| &details.headers)
    }

    /// Returns the request correlation id if the server sent one.
    pub fn request_id(&self) -> Option<&str> {
        self.api_error()?.request_id.as_deref()
    }
}

/// A specialized `Result` type for B2BRouter API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn error_for(status: u16) -> Error {
        Error::from_status(
            StatusCode::from_u16(status).unwrap(),
            "boom",
            "boom",
            None,
            HeaderMap::new(),
        )
    }

    #[test]
    fn test_status_class_mapping() {
        assert!(matches!(error_for(400), Error::InvalidRequest(_)));
        assert!(matches!(error_for(422), Error::InvalidRequest(_)));
        assert!(matches!(error_for(401), Error::Authentication(_)));
        assert!(matches!(error_for(403), Error::Permission(_)));
        assert!(matches!(error_for(404), Error::NotFound(_)));
        for status in [402, 405, 409, 429, 500, 502, 503] {
            assert!(matches!(error_for(status), Error::Api(_)), "status {}", status);
        }
    }

    #[test]
    fn test_request_id_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("req_test_12345"));

        let err = Error::from_status(StatusCode::NOT_FOUND, "missing", "{}", None, headers);

        assert_eq!(err.request_id(), Some("req_test_12345"));
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.message(), Some("missing"));
        assert_eq!(err.raw_body(), Some("{}"));
    }

    #[test]
    fn test_connection_error_has_no_status() {
        let err = Error::connection("dns lookup failed");
        assert_eq!(err.status(), None);
        assert_eq!(err.request_id(), None);
        assert_eq!(err.message(), Some("dns lookup failed"));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_local_errors_are_not_retryable() {
        assert!(!Error::InvalidArgument("x".into()).is_retryable());
        assert!(!Error::ConfigurationError("x".into()).is_retryable());
        assert!(!error_for(503).is_retryable());
    }
}
