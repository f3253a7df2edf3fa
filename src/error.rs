//! Error types for planning runs.
//!
//! Errors are classified by recoverability:
//! - Retryable: network issues, timeouts, a single source being down
//! - NonRetryable: configuration problems, empty runs
//! - RequiresUserAction: expired credentials
//!
//! A failed source fetch degrades the run (that source contributes
//! nothing) rather than failing it; only `CredentialExpired` and a fully
//! empty run abort.

use thiserror::Error;

/// Error types for planning runs.
#[derive(Debug, Error)]
pub enum PlanningError {
    // Retryable errors
    // Field deliberately not named `source`: thiserror treats a field of
    // that name as the error cause, which &'static str cannot be.
    #[error("Source '{name}' unavailable: {reason}")]
    SourceUnavailable { name: &'static str, reason: String },

    #[error("Summarization unavailable: {0}")]
    SummarizationUnavailable(String),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Non-retryable errors
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("A planning run is already in progress")]
    AlreadyRunning,

    #[error("No items retrievable from any source")]
    EmptyRun,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Requires user action
    #[error("Credentials expired or revoked; re-authenticate and retry")]
    CredentialExpired,
}

impl PlanningError {
    /// Returns true if this error is retryable on a later run.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PlanningError::SourceUnavailable { .. }
                | PlanningError::SummarizationUnavailable(_)
                | PlanningError::Timeout(_)
                | PlanningError::Http(_)
                | PlanningError::AlreadyRunning
        )
    }

    /// Returns true if this error requires user action to resolve.
    pub fn requires_user_action(&self) -> bool {
        matches!(
            self,
            PlanningError::CredentialExpired | PlanningError::ConfigurationError(_)
        )
    }
}
