//! HTTP plumbing shared by the providers.

use std::time::Duration;

use anyhow::Context;
use examforge_core::error::ProviderError;

pub(crate) fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("failed to build HTTP client")
}

/// Classify a transport failure.
pub(crate) fn send_error(e: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(e.to_string())
    }
}

/// Turn 429/401/4xx/5xx responses into provider errors.
///
/// `extract_message` pulls a readable message out of an error body; it gets
/// the raw body and returns it unchanged when nothing better is found.
pub(crate) async fn check_status(
    response: reqwest::Response,
    extract_message: fn(String) -> String,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }
    if status == 401 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::AuthenticationFailed(extract_message(body)));
    }
    if status >= 400 {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::ApiError {
            status,
            message: extract_message(body),
        });
    }
    Ok(response)
}

pub(crate) fn parse_error(e: reqwest::Error) -> ProviderError {
    ProviderError::ApiError {
        status: 0,
        message: format!("failed to parse response: {e}"),
    }
}
