//! Artifact downloads.

use anyhow::{Context, Result};
use std::time::Duration;

use crate::config::{MAX_RETRY_DELAY, RETRY_BASE_DELAY};

/// Downloads `url`, retrying transient failures with exponential backoff.
pub(crate) async fn download_with_retries(
    client: &reqwest::Client,
    url: &str,
    auth_token: Option<&str>,
    max_size: usize,
    attempts: u32,
) -> Result<Vec<u8>> {
    let attempts = attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match download_with_size_limit(client, url, auth_token, max_size).await {
            Ok(bytes) => return Ok(bytes),
            Err(e) => {
                let retriable = is_retriable(&e);
                last_error = Some(e);
                if !retriable {
                    break;
                }
                if attempt < attempts {
                    log::warn!(
                        "Failed to download {} (attempt {}/{}), retrying...",
                        url,
                        attempt,
                        attempts
                    );
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        anyhow::anyhow!("Failed to download {} after {} attempts", url, attempts)
    }))
}

/// Delay after the `attempt`-th failure: doubling from the base, capped.
fn backoff_delay(attempt: u32) -> Duration {
    2u32.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| RETRY_BASE_DELAY.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
}

/// Downloads an artifact with size limit enforcement.
async fn download_with_size_limit(
    client: &reqwest::Client,
    url: &str,
    auth_token: Option<&str>,
    max_size: usize,
) -> Result<Vec<u8>> {
    let mut request = client.get(url);
    if let Some(token) = auth_token {
        request = request.bearer_auth(token);
    }

    let response = request
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?
        .error_for_status()?;

    if let Some(content_length) = response.content_length() {
        if content_length > max_size as u64 {
            return Err(anyhow::anyhow!(
                "Artifact too large: {} bytes (max: {} bytes)",
                content_length,
                max_size
            ));
        }
    }

    let bytes = response
        .bytes()
        .await
        .with_context(|| format!("Failed to read body from {}", url))?
        .to_vec();

    // Content-length may be missing or wrong
    if bytes.len() > max_size {
        return Err(anyhow::anyhow!(
            "Artifact too large: {} bytes (max: {} bytes)",
            bytes.len(),
            max_size
        ));
    }

    Ok(bytes)
}

/// Timeouts, connection failures and 5xx/429 responses are worth retrying.
fn is_retriable(error: &anyhow::Error) -> bool {
    for cause in error.chain() {
        if let Some(reqwest_err) = cause.downcast_ref::<reqwest::Error>() {
            if let Some(status) = reqwest_err.status() {
                return status.is_server_error() || status.as_u16() == 429;
            }
            return reqwest_err.is_timeout() || reqwest_err.is_connect() || reqwest_err.is_request();
        }
    }
    false
}

/// Per-request timeout used by the shared client.
pub(crate) fn request_timeout(seconds: u64) -> Duration {
    Duration::from_secs(seconds.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_then_caps() {
        assert_eq!(backoff_delay(1), RETRY_BASE_DELAY);
        assert_eq!(backoff_delay(2), RETRY_BASE_DELAY * 2);
        assert_eq!(backoff_delay(3), RETRY_BASE_DELAY * 4);
        assert_eq!(backoff_delay(10), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_backoff_does_not_overflow_on_large_attempts() {
        for attempt in [32, 33, 64, u32::MAX] {
            assert_eq!(backoff_delay(attempt), MAX_RETRY_DELAY);
        }
        assert_eq!(backoff_delay(0), RETRY_BASE_DELAY);
    }

    #[test]
    fn test_request_timeout_is_at_least_one_second() {
        assert_eq!(request_timeout(0), Duration::from_secs(1));
        assert_eq!(request_timeout(30), Duration::from_secs(30));
    }
}
