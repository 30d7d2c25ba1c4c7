//! Rate-limited, retrying upstream requests.
//!
//! Every upstream call goes through [`RetryingFetcher`]: it waits for the
//! client's [`ApiRateLimiter`] before each attempt and backs off exponentially
//! when the provider answers 429. Other failures are returned immediately.

use std::sync::Arc;
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use serde::de::DeserializeOwned;

use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::provider::{ApiRateLimiter, ProviderError, Result};
use crate::sync::{ProgressCallback, SyncProgress, emit};

/// Default number of attempts per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// First backoff delay in milliseconds; doubles on every throttled attempt.
pub const INITIAL_BACKOFF_MS: u64 = 2_000;

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 60_000;

/// Configuration for retry operations.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Delay after the first throttled attempt.
    pub min_delay: Duration,
    /// Maximum delay between attempts.
    pub max_delay: Duration,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            with_jitter: false,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            min_delay,
            max_delay,
            max_attempts,
            with_jitter: false,
        }
    }

    /// Set the number of attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Build an exponential backoff strategy from this configuration.
    ///
    /// The strategy yields one delay per attempt: `min_delay * 2^attempt`.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.max(1) as usize);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Sends upstream requests through a rate limiter with throttling backoff.
#[derive(Clone)]
pub struct RetryingFetcher {
    transport: Arc<dyn HttpTransport>,
    limiter: ApiRateLimiter,
    retry: RetryConfig,
}

impl RetryingFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, limiter: ApiRateLimiter, retry: RetryConfig) -> Self {
        Self {
            transport,
            limiter,
            retry,
        }
    }

    pub fn limiter(&self) -> &ApiRateLimiter {
        &self.limiter
    }

    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Send `request`, returning the first successful response.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Request`] on any non-2xx status other than 429 (no retry)
    /// - [`ProviderError::RetriesExhausted`] when every attempt was throttled
    /// - [`ProviderError::Transport`] when the request could not be sent
    pub async fn send(
        &self,
        request: HttpRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<HttpResponse> {
        let max_attempts = self.retry.max_attempts.max(1);
        let resource = resource_name(&request.url);
        let mut backoff = self.retry.clone().into_backoff().build();

        for attempt in 0..max_attempts {
            self.limiter.wait_for_slot().await;

            let response = self.transport.send(request.clone()).await?;

            match check_status(&resource, response) {
                Err(e) if e.is_rate_limited() => {
                    let wait = backoff.next().unwrap_or(self.retry.max_delay);
                    emit(
                        on_progress,
                        SyncProgress::RateLimitBackoff {
                            resource: resource.clone(),
                            retry_after_ms: u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                            attempt: attempt + 1,
                        },
                    );
                    tracing::warn!(
                        resource = %resource,
                        attempt = attempt + 1,
                        max_attempts,
                        wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                        "Rate limited, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                other => return other,
            }
        }

        Err(ProviderError::RetriesExhausted {
            resource,
            attempts: max_attempts,
        })
    }

    /// Send `request` and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        request: HttpRequest,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<T> {
        let response = self.send(request, on_progress).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }
}

/// Map a response to `Ok` on 2xx, [`ProviderError::Throttled`] on 429 and
/// [`ProviderError::Request`] otherwise.
fn check_status(resource: &str, response: HttpResponse) -> Result<HttpResponse> {
    if response.status == 429 {
        return Err(ProviderError::Throttled {
            resource: resource.to_string(),
        });
    }
    if !response.is_success() {
        return Err(ProviderError::Request {
            resource: resource.to_string(),
            status: response.status,
            status_text: response.status_text(),
            body: response.text(),
        });
    }
    Ok(response)
}

/// URL path used to name a request in logs and errors (query strings may carry
/// identifiers we do not want repeated everywhere).
fn resource_name(url: &str) -> String {
    url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string())
}
