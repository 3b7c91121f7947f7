//! Single-attempt HTTP execution.
//!
//! A [`Transport`] issues exactly one request and reports what came back. It
//! never looks at the status code: any received response, even a 500, is a
//! success at this layer. Only failing to get a response at all is an error,
//! reported as [`Error::Connection`].

use crate::request::PreparedRequest;
use crate::{Error, Result};
use async_trait::async_trait;
use http::{HeaderMap, StatusCode};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default time allowed to establish a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// A response as received from the server, before classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: StatusCode,

    /// The response body as text.
    pub body: String,

    /// The response headers.
    pub headers: HeaderMap,
}

impl RawResponse {
    /// Creates a new `RawResponse`.
    pub fn new(status: StatusCode, body: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            status,
            body: body.into(),
            headers,
        }
    }
}

/// Executes a single HTTP request.
///
/// Implementations must not retry; retries are layered on top by
/// [`RetryingTransport`](crate::retry::RetryingTransport). Implement this trait
/// to plug a different HTTP stack, or a test double, into
/// [`B2BRouterClient`](crate::B2BRouterClient).
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use b2brouter::request::PreparedRequest;
/// use b2brouter::transport::{RawResponse, Transport};
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl Transport for AlwaysOk {
///     async fn send(&self, _request: &PreparedRequest, _timeout: Duration) -> b2brouter::Result<RawResponse> {
///         Ok(RawResponse::new(StatusCode::OK, "{}", HeaderMap::new()))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request`, allowing at most `timeout` for the whole exchange.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] when no response could be obtained.
    async fn send(&self, request: &PreparedRequest, timeout: Duration) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &PreparedRequest, timeout: Duration) -> Result<RawResponse> {
        (**self).send(request, timeout).await
    }
}

/// The default [`Transport`], backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with the default connect timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    /// Creates a transport with a custom connect timeout.
    ///
    /// Redirects are never followed: a 3xx response is returned as received.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn with_connect_timeout(connect_timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { http_client })
    }

    /// Wraps an existing `reqwest::Client`.
    ///
    /// The client should be built with `reqwest::redirect::Policy::none()`.
    /// Otherwise it follows redirects itself, and the API key header travels to
    /// whatever host the `Location` names.
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &PreparedRequest, timeout: Duration) -> Result<RawResponse> {
        let start_time = Instant::now();

        let mut builder = self
            .http_client
            .request(request.method.clone(), request.url.as_str())
            .timeout(timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.to_bytes()?);
        }

        let response = builder.send().await.map_err(connection_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(connection_error)?;

        tracing::info!(
            status = status.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            "Received HTTP response"
        );

        Ok(RawResponse {
            status,
            body,
            headers,
        })
    }
}

fn connection_error(error: reqwest::Error) -> Error {
    let message = if error.is_timeout() {
        format!("Request timed out: {}", error)
    } else if error.is_connect() {
        format!("Failed to connect: {}", error)
    } else {
        format!("Request failed: {}", error)
    };

    Error::Connection {
        message,
        source: Some(error),
    }
}
