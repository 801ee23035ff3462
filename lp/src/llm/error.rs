//! LLM error types

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during LLM operations
///
/// None of these are retried internally; every variant ends the current run.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    #[error("Connection error: {0}")]
    Connectivity(String),

    #[error("Rate limited{}", .retry_after.map(|d| format!(", retry after {:?}", d)).unwrap_or_default())]
    RateLimited { retry_after: Option<Duration> },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        let message = message.into();
        debug!(%status, "LlmError::from_status: called");
        match status {
            401 | 403 => LlmError::Authentication { message },
            429 => LlmError::RateLimited { retry_after },
            _ => LlmError::ApiError { status, message },
        }
    }

    /// Check if this is a rate limit error
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, LlmError::RateLimited { .. })
    }

    /// Check if this is an authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, LlmError::Authentication { .. })
    }

    /// Get the retry duration if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        debug!(error = %e, "LlmError::from<reqwest::Error>: called");
        if let Some(status) = e.status() {
            LlmError::from_status(status.as_u16(), e.to_string(), None)
        } else if e.is_decode() {
            LlmError::InvalidResponse(e.to_string())
        } else {
            // Connect, timeout, TLS, body and request-building failures
            LlmError::Connectivity(e.to_string())
        }
    }
}
