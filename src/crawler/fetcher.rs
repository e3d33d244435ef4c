//! HTTP fetcher implementation
//!
//! This module handles every HTTP request the crawler makes, including:
//! - Building the shared HTTP client
//! - Sending the identifying header set with each request
//! - Retrying transient failures under a replaceable retry policy
//! - Collapsing terminal failure into an absent body
//!
//! Nothing in here returns an error to its caller. A URL that never answers
//! with 200 simply yields a `FetchResult` without a body.

use crate::config::{BackoffKind, FetchConfig, HarvestConfig, HeaderConfig};
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Outcome of fetching one URL after all attempts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// Page body; absent unless some attempt answered 200
    pub body: Option<String>,

    /// Status of the last response received, if any
    pub status_code: Option<u16>,

    /// Attempts made, including the successful one
    pub attempts: u32,
}

/// A single response as seen by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Classification of network-level failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Timeout,
    Connect,
    Other,
}

/// A request that never produced a response
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            TransportErrorKind::Timeout
        } else if e.is_connect() {
            TransportErrorKind::Connect
        } else {
            TransportErrorKind::Other
        };
        Self::new(kind, e.to_string())
    }
}

/// Issues a single GET request
///
/// Implementations must be safe to call from many in-flight requests at once;
/// one transport is shared by every fetch in a crawl.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &HeaderConfig,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

/// Builds the HTTP client shared by every request of a crawl
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs.min(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Transport` backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        headers: &HeaderConfig,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, headers.user_agent.as_str())
            .header(ACCEPT_LANGUAGE, headers.accept_language.as_str())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

/// What a failed attempt looked like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// A response arrived with a non-200 status
    Status(u16),

    /// No response arrived
    Transport(TransportErrorKind),
}

/// Decides whether and when a failed attempt is retried
pub trait RetryPolicy: Send + Sync + fmt::Debug {
    /// Total attempts, including the first
    fn max_attempts(&self) -> u32;

    /// Pause before `attempt` (the first retry is attempt 2)
    fn delay_before(&self, attempt: u32) -> Duration;

    /// Whether a failed attempt is worth repeating
    ///
    /// Every non-200 status and every network failure is retryable by default.
    fn should_retry(&self, _outcome: &AttemptOutcome) -> bool {
        true
    }
}

/// Constant pause between attempts
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl FixedDelay {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy for FixedDelay {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_before(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

/// Doubling pause between attempts, capped at `max_delay`
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub max_attempts: u32,
    pub base: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_before(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(2).min(31);
        self.base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Builds the retry policy described by the fetch configuration
pub fn retry_policy_from_config(config: &FetchConfig) -> Arc<dyn RetryPolicy> {
    let base = Duration::from_millis(config.retry_delay_ms);
    match config.backoff {
        BackoffKind::Fixed => Arc::new(FixedDelay::new(config.max_attempts, base)),
        BackoffKind::Exponential => Arc::new(ExponentialBackoff {
            max_attempts: config.max_attempts,
            base,
            max_delay: Duration::from_millis(config.max_delay_ms),
        }),
    }
}

/// Bounded, retrying GET shared by the listing walker and detail extractor
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    headers: HeaderConfig,
    timeout: Duration,
    policy: Arc<dyn RetryPolicy>,
}

impl Fetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        headers: HeaderConfig,
        timeout: Duration,
        policy: Arc<dyn RetryPolicy>,
    ) -> Self {
        Self {
            transport,
            headers,
            timeout,
            policy,
        }
    }

    /// Builds a fetcher using the headers, timeout and retry policy from `config`
    pub fn from_config(transport: Arc<dyn Transport>, config: &HarvestConfig) -> Self {
        Self::new(
            transport,
            config.headers.clone(),
            Duration::from_secs(config.fetch.timeout_secs),
            retry_policy_from_config(&config.fetch),
        )
    }

    /// Fetches a URL, retrying non-200 responses and network failures
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Return body |
    /// | Other status | Log, retry if the policy allows |
    /// | Timeout / connection error | Log, retry if the policy allows |
    /// | Attempts exhausted | Return without body |
    ///
    /// No pause follows the final attempt.
    pub async fn fetch(&self, url: &str) -> FetchResult {
        let max_attempts = self.policy.max_attempts().max(1);
        let mut last_status = None;
        let mut attempt = 0;

        loop {
            attempt += 1;

            let outcome = match self.transport.get(url, &self.headers, self.timeout).await {
                Ok(response) if response.status == 200 => {
                    return FetchResult {
                        body: Some(response.body),
                        status_code: Some(200),
                        attempts: attempt,
                    };
                }
                Ok(response) => {
                    tracing::warn!(
                        "Non-200 response for {}: {} (attempt {}/{})",
                        url,
                        response.status,
                        attempt,
                        max_attempts
                    );
                    last_status = Some(response.status);
                    AttemptOutcome::Status(response.status)
                }
                Err(e) => {
                    tracing::warn!(
                        "Error fetching {}: {} (attempt {}/{})",
                        url,
                        e,
                        attempt,
                        max_attempts
                    );
                    AttemptOutcome::Transport(e.kind)
                }
            };

            if attempt >= max_attempts || !self.policy.should_retry(&outcome) {
                tracing::debug!("Giving up on {} after {} attempt(s)", url, attempt);
                return FetchResult {
                    body: None,
                    status_code: last_status,
                    attempts: attempt,
                };
            }

            let delay = self.policy.delay_before(attempt + 1);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

impl fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fetcher")
            .field("headers", &self.headers)
            .field("timeout", &self.timeout)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
