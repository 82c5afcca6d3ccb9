//! Error types.
//!
//! `ProviderError` covers failures talking to an LLM backend. It lives in
//! `examforge-core` so the engine and the web layer can downcast and classify
//! provider failures without string matching. `ExamError` is what the
//! generate and evaluate operations return.

use thiserror::Error;

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),
}

/// Errors returned by question generation and answer evaluation.
#[derive(Debug, Error)]
pub enum ExamError {
    /// The model's reply could not be coerced into the requested schema.
    #[error("model reply does not match the {schema} schema: {reason}")]
    SchemaViolation { schema: &'static str, reason: String },

    /// The model graded a different number of questions than were asked.
    #[error("expected {expected} evaluations, model returned {actual}")]
    EvaluationCountMismatch { expected: usize, actual: usize },

    /// The model call did not finish within the configured timeout.
    #[error("model call timed out after {secs}s")]
    TimedOut { secs: u64 },

    /// Evaluation was requested without a generated exam in the session.
    #[error("no generated exam in this session; generate questions first")]
    MissingSession,

    /// The provider call failed.
    #[error("provider call failed: {0:#}")]
    Provider(#[source] anyhow::Error),
}

impl ExamError {
    /// Classify a failed provider call. A transport timeout is the same
    /// condition as the engine's own deadline expiring.
    pub fn from_provider(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ProviderError>() {
            Some(ProviderError::Timeout(secs)) => ExamError::TimedOut { secs: *secs },
            _ => ExamError::Provider(err),
        }
    }
}
