//! The B2BRouter API client.
//!
//! [`B2BRouterClient`] holds the immutable configuration and the transport
//! shared by every request. Use [`ClientBuilder`] to configure one, then reach
//! the API through the service accessors.

use crate::{
    collection::Collection,
    request::PreparedRequest,
    response,
    retry::{RetryPolicy, RetryingTransport},
    service::{InvoiceService, TaxReportService, TaxReportSettingService},
    transport::{HttpTransport, Transport},
    Error, Result,
};
use http::Method;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Default API base URL (the staging environment).
pub const DEFAULT_API_BASE: &str = "https://api-staging.b2brouter.net";

/// Default API version sent with every request.
pub const DEFAULT_API_VERSION: &str = "2025-10-13";

/// Default per-attempt request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(80);

/// A client for the B2BRouter API.
///
/// Cloning is cheap and clones share configuration and connections, so one
/// client can serve many tasks at once.
///
/// # Examples
///
/// ```no_run
/// use b2brouter::B2BRouterClient;
/// use serde_json::json;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), b2brouter::Error> {
/// let client = B2BRouterClient::builder("my-api-key")
///     .api_base("https://api.b2brouter.net")
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let invoice = client.invoices().retrieve("inv_1", json!({})).await?;
/// println!("Invoice number: {}", invoice["number"]);
///
/// let page = client
///     .invoices()
///     .list("my-account", json!({"limit": 25, "offset": 0}))
///     .await?;
/// println!("{} of {:?} invoices", page.count(), page.total());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct B2BRouterClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    api_key: String,
    api_base: String,
    api_version: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for B2BRouterClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("B2BRouterClient")
            .field("api_base", &self.inner.api_base)
            .field("api_version", &self.inner.api_version)
            .field("timeout", &self.inner.timeout)
            .field("retry_policy", &self.inner.retry_policy)
            .finish_non_exhaustive()
    }
}

impl B2BRouterClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `api_key` is empty.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    ///
    /// # Examples
    ///
    /// ```
    /// use b2brouter::B2BRouterClient;
    ///
    /// let client = B2BRouterClient::builder("my-api-key")
    ///     .api_base("https://api.b2brouter.net/")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(client.api_base(), "https://api.b2brouter.net");
    /// ```
    pub fn builder(api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(api_key)
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.inner.api_key
    }

    /// Returns the API base URL, without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.inner.api_base
    }

    /// Returns the API version.
    pub fn api_version(&self) -> &str {
        &self.inner.api_version
    }

    /// Returns the per-attempt request timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Returns the retry policy applied to connection failures.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry_policy
    }

    /// Invoice operations.
    pub fn invoices(&self) -> InvoiceService<'_> {
        InvoiceService::new(self)
    }

    /// Tax report operations.
    pub fn tax_reports(&self) -> TaxReportService<'_> {
        TaxReportService::new(self)
    }

    /// Tax report setting operations.
    pub fn tax_report_settings(&self) -> TaxReportSettingService<'_> {
        TaxReportSettingService::new(self)
    }

    /// Makes a JSON API request and returns the decoded response body.
    ///
    /// For GET and DELETE `params` goes into the query string; for other
    /// methods it is sent as the JSON body. Connection failures are retried
    /// according to the retry policy; error statuses are returned as the
    /// matching [`Error`] variant without retrying.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use b2brouter::B2BRouterClient;
    /// use http::Method;
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), b2brouter::Error> {
    /// let client = B2BRouterClient::new("my-api-key")?;
    /// let result = client
    ///     .request(Method::GET, "/invoices/inv_1/validate", &json!({}))
    ///     .await?;
    /// println!("{}", result);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn request(&self, method: Method, path: &str, params: &Value) -> Result<Value> {
        let request = PreparedRequest::json(
            method,
            &self.inner.api_base,
            path,
            params,
            &self.inner.api_key,
            &self.inner.api_version,
        )?;

        let raw = self.inner.transport.send(&request, self.inner.timeout).await?;
        response::classify(raw)
    }

    /// Makes a GET request whose successful body is not JSON, returning it as text.
    pub async fn request_raw(&self, path: &str) -> Result<String> {
        let request = PreparedRequest::download(
            &self.inner.api_base,
            path,
            &self.inner.api_key,
            &self.inner.api_version,
        )?;

        let raw = self.inner.transport.send(&request, self.inner.timeout).await?;
        response::check_raw(raw)
    }

    /// Makes a GET request to a list endpoint and wraps the result in a [`Collection`].
    ///
    /// Items are read from `items_key`; pagination metadata from `meta`.
    pub async fn request_list(&self, path: &str, items_key: &str, params: &Value) -> Result<Collection> {
        let mut body = self.request(Method::GET, path, params).await?;
        let items = take_items(&mut body, items_key);
        let meta = body.get_mut("meta").map(Value::take).filter(|meta| !meta.is_null());
        Ok(Collection::new(items, meta))
    }
}

/// Removes the array under `key` from `body`, or returns an empty list.
pub(crate) fn take_items(body: &mut Value, key: &str) -> Vec<Value> {
    match body.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// Builder for configuring and creating a [`B2BRouterClient`].
///
/// # Examples
///
/// ```
/// use b2brouter::ClientBuilder;
/// use std::time::Duration;
///
/// let client = ClientBuilder::new("my-api-key")
///     .api_version("2024-01-01")
///     .timeout(Duration::from_secs(120))
///     .max_retries(5)
///     .retry_delay(Duration::from_millis(500))
///     .build()
///     .unwrap();
///
/// assert_eq!(client.api_version(), "2024-01-01");
/// assert_eq!(client.retry_policy().max_retries, 5);
/// ```
pub struct ClientBuilder {
    api_key: String,
    api_base: String,
    api_version: String,
    timeout: Duration,
    retry_policy: RetryPolicy,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            transport: None,
        }
    }

    /// Sets the API base URL. Trailing slashes are removed.
    pub fn api_base(mut self, url: impl AsRef<str>) -> Self {
        self.api_base = url.as_ref().trim_end_matches('/').to_string();
        self
    }

    /// Sets the API version sent in the `X-B2B-API-Version` header.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Sets the per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of retries after a connection failure.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.retry_policy.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry; later retries double it.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_policy.base_delay = delay;
        self
    }

    /// Sets the whole retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Uses a custom transport instead of the built-in `reqwest` one.
    ///
    /// The transport is still wrapped with the retry policy.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the configured `B2BRouterClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty, the base URL is invalid, or
    /// the HTTP client cannot be built.
    pub fn build(self) -> Result<B2BRouterClient> {
        if self.api_key.is_empty() {
            return Err(Error::ConfigurationError(
                "API key cannot be empty".to_string(),
            ));
        }

        Url::parse(&self.api_base)?;

        let transport: Box<dyn Transport> = match self.transport {
            Some(custom) => Box::new(RetryingTransport::new(custom, self.retry_policy)),
            None => Box::new(RetryingTransport::new(
                HttpTransport::new()?,
                self.retry_policy,
            )),
        };

        Ok(B2BRouterClient {
            inner: Arc::new(ClientInner {
                api_key: self.api_key,
                api_base: self.api_base,
                api_version: self.api_version,
                timeout: self.timeout,
                retry_policy: self.retry_policy,
                transport,
            }),
        })
    }
}
