//! Retry policy for chat-completion requests.

use std::time::Duration;

use reqwest::Response;
use reqwest::header::RETRY_AFTER;

use crate::error::AiError;

/// Error bodies longer than this many characters are clipped.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Exponential backoff for retryable provider failures.
#[derive(Debug, Clone)]
pub struct LlmRetryConfig {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for LlmRetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl LlmRetryConfig {
    /// Return the first failure as is.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before the retry following failed `attempt` (zero-based), or
    /// `None` when `err` should be returned to the caller.
    pub fn next_delay(&self, attempt: u32, err: &AiError) -> Option<Duration> {
        if attempt >= self.max_retries || !err.is_retryable() {
            return None;
        }

        let delay = match err.retry_after() {
            Some(seconds) => Duration::from_secs(seconds),
            None => self.base_delay.saturating_mul(1 << attempt.min(16)),
        };
        Some(delay.min(self.max_delay))
    }
}

/// Turn a non-success HTTP response into `AiError::LlmHttp`.
pub(crate) async fn error_from_response(response: Response, provider: &str) -> AiError {
    let status = response.status().as_u16();
    let retry_after_secs = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok());
    let body = response.text().await.unwrap_or_default();

    AiError::LlmHttp {
        provider: provider.to_string(),
        status,
        message: clip_body(&body),
        retry_after_secs,
    }
}

fn clip_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_CHARS) {
        Some((cut, _)) => format!("{}... [truncated]", &body[..cut]),
        None => body.to_string(),
    }
}
