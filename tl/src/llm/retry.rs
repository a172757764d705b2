//! Shared POST-with-retry used by every provider client

use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, warn};

use super::LlmError;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(INITIAL_BACKOFF_MS * 2u64.pow(attempt))
}

/// POST a JSON body, retrying network errors and transient statuses
///
/// `decorate` adds provider headers to each attempt. A 429 waits for its
/// `retry-after` (or the backoff when absent) and surfaces as `RateLimited`
/// once retries run out.
pub(crate) async fn post_json<F>(
    http: &Client,
    url: &str,
    body: &serde_json::Value,
    max_retries: u32,
    decorate: F,
) -> Result<Response, LlmError>
where
    F: Fn(RequestBuilder) -> RequestBuilder,
{
    debug!(%url, %max_retries, "post_json: called");
    let mut attempt = 0;

    loop {
        let request = decorate(http.post(url))
            .header("content-type", "application/json")
            .json(body);

        match send_once(request, backoff(attempt)).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() && attempt < max_retries => {
                let wait = e.retry_after().unwrap_or_else(|| backoff(attempt));
                attempt += 1;
                warn!(attempt, wait_ms = %wait.as_millis(), error = %e, "post_json: retrying after transient error");
                tokio::time::sleep(wait).await;
            }
            Err(e) => {
                debug!(attempt, error = %e, "post_json: giving up");
                return Err(e);
            }
        }
    }
}

async fn send_once(request: RequestBuilder, default_wait: Duration) -> Result<Response, LlmError> {
    let response = request.send().await?;
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(default_wait);
        debug!(retry_after_ms = %retry_after.as_millis(), "send_once: rate limited (429)");
        return Err(LlmError::RateLimited { retry_after });
    }

    if !response.status().is_success() {
        let message = response.text().await.unwrap_or_default();
        debug!(%status, "send_once: API error");
        return Err(LlmError::ApiError { status, message });
    }

    Ok(response)
}
