//! Outbound call policy: timeouts, error classification and a single retry.
//!
//! Both outbound calls (LLM extraction and deployment) go through
//! [`with_timeout`] and [`retry_once`]. Transport failures, timeouts and 5xx
//! responses are retried once after a fixed delay; everything else is
//! returned immediately.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Default delay before the single retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Connection refused, reset, DNS failure and the like.
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("upstream returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// A 2xx response that reports failure in its body.
    #[error("upstream rejected the request: {0}")]
    Rejected(String),
    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Whether a second attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Rejected(_) | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Run `fut`, giving up after `limit`. Dropping the future aborts the request.
pub async fn with_timeout<T, Fut>(limit: Duration, fut: Fut) -> Result<T, UpstreamError>
where
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .unwrap_or(Err(UpstreamError::Timeout(limit)))
}

/// Execute `operation`, retrying at most once on a retryable error.
///
/// The retry happens after a fixed `delay`; there is no backoff schedule.
/// Non-retryable errors are returned without sleeping.
pub async fn retry_once<T, F, Fut>(delay: Duration, mut operation: F) -> Result<T, UpstreamError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, UpstreamError>>,
{
    match operation().await {
        Ok(value) => Ok(value),
        Err(err) if err.is_retryable() => {
            warn!(
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Transient upstream error, retrying once"
            );
            tokio::time::sleep(delay).await;
            operation().await
        }
        Err(err) => Err(err),
    }
}
