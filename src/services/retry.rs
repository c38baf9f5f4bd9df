//! Shared bounded-concurrency, timed, retried HTTP call helper.
//!
//! Generalizes the semaphore + rate-limit + exponential-backoff loop used
//! by [`crate::services::solana::helius::HeliusClient`] so the honeypot
//! providers (C5) and the swap aggregator client don't each reimplement
//! their own retry loop.

use std::sync::Arc;
use std::time::Duration;

use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::core::error::AppError;
use crate::core::result::AppResult;

/// Configuration for a single retrying call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Per-attempt request timeout
    pub timeout: Duration,
    /// Ceiling on total time spent retrying
    pub max_elapsed: Duration,
    /// Maximum concurrent in-flight calls sharing this policy's semaphore
    pub max_concurrent: usize,
}

impl RetryPolicy {
    /// Build a policy from a millisecond timeout, defaulting concurrency
    /// and total retry budget to values that match the Helius client.
    pub fn from_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            timeout: Duration::from_millis(timeout_ms),
            max_elapsed: Duration::from_millis(timeout_ms.saturating_mul(3)),
            max_concurrent: 5,
        }
    }
}

/// A bounded-concurrency HTTP caller shared by a single upstream (one per
/// honeypot provider, one for the aggregator).
pub struct RetryingHttpClient {
    http: Client,
    semaphore: Arc<Semaphore>,
    policy: RetryPolicy,
    name: String,
}

impl RetryingHttpClient {
    /// Build a client for a named upstream under `policy`.
    pub fn new(name: impl Into<String>, policy: RetryPolicy) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(policy.timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AppError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            semaphore: Arc::new(Semaphore::new(policy.max_concurrent)),
            policy,
            name: name.into(),
        })
    }

    /// Issue a GET request with query params, retrying transient failures.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, &str)],
        headers: &[(&str, &str)],
    ) -> AppResult<T> {
        let _permit = self.semaphore.acquire().await
            .map_err(|_| AppError::internal(format!("{} semaphore closed", self.name)))?;

        let mut backoff = ExponentialBackoff::default();
        backoff.max_elapsed_time = Some(self.policy.max_elapsed);

        let mut last_error = None;
        loop {
            let mut request = self.http.get(url).query(params);
            for (k, v) in headers {
                request = request.header(*k, *v);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().await.map_err(|e| {
                            AppError::external_service(self.name.clone(), format!("invalid response body: {e}"))
                        });
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        warn!("{} rate limited, backing off", self.name);
                        last_error = Some(AppError::external_service(self.name.clone(), "rate limited".to_string()));
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        last_error = Some(AppError::external_service(
                            self.name.clone(),
                            format!("status {status}: {body}"),
                        ));
                    }
                }
                Err(e) => {
                    last_error = Some(AppError::external_service(self.name.clone(), format!("request failed: {e}")));
                }
            }

            match backoff.next_backoff() {
                Some(delay) => {
                    debug!("{} retrying in {:?}", self.name, delay);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(last_error.unwrap_or_else(|| {
                        AppError::external_service(self.name.clone(), "request failed".to_string())
                    }));
                }
            }
        }
    }

    /// Issue a POST request with a JSON body, retrying transient failures.
    pub async fn post_json<B: serde::Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> AppResult<T> {
        let _permit = self.semaphore.acquire().await
            .map_err(|_| AppError::internal(format!("{} semaphore closed", self.name)))?;

        let mut backoff = ExponentialBackoff::default();
        backoff.max_elapsed_time = Some(self.policy.max_elapsed);

        let mut last_error = None;
        loop {
            let mut request = self.http.post(url).json(body);
            for (k, v) in headers {
                request = request.header(*k, *v);
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.json::<T>().await.map_err(|e| {
                            AppError::external_service(self.name.clone(), format!("invalid response body: {e}"))
                        });
                    } else if status == StatusCode::TOO_MANY_REQUESTS {
                        last_error = Some(AppError::external_service(self.name.clone(), "rate limited".to_string()));
                    } else {
                        let text = response.text().await.unwrap_or_default();
                        last_error = Some(AppError::external_service(
                            self.name.clone(),
                            format!("status {status}: {text}"),
                        ));
                    }
                }
                Err(e) => {
                    last_error = Some(AppError::external_service(self.name.clone(), format!("request failed: {e}")));
                }
            }

            match backoff.next_backoff() {
                Some(delay) => tokio::time::sleep(delay).await,
                None => {
                    return Err(last_error.unwrap_or_else(|| {
                        AppError::external_service(self.name.clone(), "request failed".to_string())
                    }));
                }
            }
        }
    }
}
