//! Bounded exponential-backoff retries for connection failures.
//!
//! Only [`Error::Connection`](crate::Error::Connection) is retried. A response
//! with any status code, 5xx included, is handed back unchanged for
//! classification.

use crate::request::PreparedRequest;
use crate::transport::{RawResponse, Transport};
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Default delay before the first retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// How many times to retry and how long to wait in between.
///
/// The delay before retry `n` (1-indexed) is `base_delay * 2^(n - 1)`.
///
/// # Examples
///
/// ```
/// use b2brouter::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3, Duration::from_millis(100));
///
/// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(100)));
/// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(200)));
/// assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(400)));
/// assert_eq!(policy.delay_for_attempt(4), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// The maximum number of retries after the first attempt.
    pub max_retries: usize,

    /// The delay before the first retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a new `RetryPolicy`.
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Returns the delay before the given retry, or `None` if retries are exhausted.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The number of failed attempts so far (1 = first retry)
    pub fn delay_for_attempt(&self, attempt: usize) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }

        let exponent = u32::try_from(attempt - 1).unwrap_or(u32::MAX);
        let multiplier = 2u32.saturating_pow(exponent);
        Some(self.base_delay.saturating_mul(multiplier))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

/// A [`Transport`] that retries connection failures of an inner transport.
///
/// Attempts run one after another on the calling task; the backoff delay is
/// awaited before the next attempt starts. Once retries are exhausted the last
/// connection error is returned unchanged.
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    /// Wraps `inner` with the given retry policy.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Returns the retry policy.
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Returns the wrapped transport.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn send(&self, request: &PreparedRequest, timeout: Duration) -> Result<RawResponse> {
        let mut failures = 0;

        loop {
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                attempt = failures + 1,
                "Executing HTTP request"
            );

            let error = match self.inner.send(request, timeout).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_retryable() => e,
                Err(e) => return Err(e),
            };

            failures += 1;

            match self.policy.delay_for_attempt(failures) {
                Some(delay) => {
                    tracing::warn!(
                        error = %error,
                        attempt = failures,
                        delay_ms = delay.as_millis(),
                        method = %request.method,
                        url = %request.url,
                        "Connection failed, retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(
                        error = %error,
                        attempts = failures,
                        method = %request.method,
                        url = %request.url,
                        "Connection failed, giving up"
                    );
                    return Err(error);
                }
            }
        }
    }
}
