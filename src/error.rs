//! Error types for tripforge.
//!
//! Each layer owns its error enum: [`AgentError`] for the planning pipeline,
//! [`StorageError`] for the catalog, [`CommandError`] for the CLI. The
//! top-level [`Error`] unifies them for callers that cross layers.

use thiserror::Error;

use crate::agent::router::BackendId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Planning pipeline failure.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Catalog/storage failure.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// CLI command failure.
    #[error(transparent)]
    Command(#[from] CommandError),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the planning pipeline and its LLM backends.
#[derive(Debug, Error)]
pub enum AgentError {
    /// No API key was configured.
    #[error("no API key configured (set OPENAI_API_KEY or TRIPFORGE_API_KEY)")]
    ApiKeyMissing,

    /// The configured provider name is not supported.
    #[error("unsupported provider: {name}")]
    UnsupportedProvider {
        /// Provider name as configured.
        name: String,
    },

    /// The backend returned an error response or the transport failed.
    #[error("API request failed{}: {message}", status_suffix(.status))]
    ApiRequest {
        /// Error text from the provider.
        message: String,
        /// HTTP status, when known.
        status: Option<u16>,
    },

    /// A backend attempt exceeded its time budget.
    #[error("backend '{backend}' timed out after {seconds}s")]
    Timeout {
        /// Backend that timed out.
        backend: BackendId,
        /// Configured timeout.
        seconds: u64,
    },

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Primary and fallback backends both failed.
    #[error(
        "backend '{primary}' failed ({primary_error}); fallback to 'default' also failed ({fallback_error})"
    )]
    BackendsExhausted {
        /// The backend tried first.
        primary: BackendId,
        /// Message from the primary attempt.
        primary_error: String,
        /// Message from the fallback attempt.
        fallback_error: String,
    },

    /// No backend is registered under the requested name.
    #[error("unknown backend: {name}")]
    UnknownBackend {
        /// Requested backend name.
        name: String,
    },

    /// Model output could not be parsed.
    #[error("failed to parse model response: {message}")]
    ResponseParse {
        /// What went wrong.
        message: String,
        /// Raw content that failed to parse.
        content: String,
    },

    /// A tool call failed.
    #[error("tool '{name}' failed: {message}")]
    ToolExecution {
        /// Tool name.
        name: String,
        /// Failure detail.
        message: String,
    },

    /// The model kept calling tools past the iteration limit.
    #[error("tool loop exceeded {max_iterations} iterations without a final answer")]
    ToolLoopExceeded {
        /// Configured iteration limit.
        max_iterations: usize,
    },

    /// Trip criteria failed validation.
    #[error("invalid trip criteria: {message}")]
    InvalidCriteria {
        /// Validation failure.
        message: String,
    },

    /// Pipeline-level failure not covered above.
    #[error("orchestration error: {message}")]
    Orchestration {
        /// Failure detail.
        message: String,
    },
}

#[allow(clippy::ref_option)]
fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl AgentError {
    /// Returns `true` for caller-initiated cancellation.
    ///
    /// Cancellation is the one failure the router never retries.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` when the provider signalled rate limiting or unavailability.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Self::ApiRequest { status, message } => {
                matches!(status, Some(429 | 503))
                    || message.to_lowercase().contains("rate limit")
            }
            _ => false,
        }
    }

    /// Short label for the failure class, used in logs.
    #[must_use]
    pub fn failure_kind(&self) -> &'static str {
        if self.is_rate_limited() {
            "rate_limited"
        } else {
            match self {
                Self::Timeout { .. } => "timeout",
                Self::Cancelled => "cancelled",
                _ => "error",
            }
        }
    }
}

/// Errors raised by the catalog storage layer.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying SQLite error.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The catalog schema has not been created.
    #[error("catalog not initialized; run `tripforge init` first")]
    NotInitialized,

    /// The catalog mutex was poisoned by a panicking holder.
    #[error("catalog connection lock poisoned")]
    LockPoisoned,

    /// A query was refused before execution.
    #[error("query rejected: {0}")]
    QueryRejected(String),

    /// Row data could not be converted.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised by CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A command failed to execute.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Invalid user input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Output could not be formatted.
    #[error("output formatting failed: {0}")]
    OutputFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backends_exhausted_mentions_both_messages() {
        let err = AgentError::BackendsExhausted {
            primary: BackendId::Smart,
            primary_error: "quota exceeded".to_string(),
            fallback_error: "connection reset".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("quota exceeded"));
        assert!(text.contains("connection reset"));
        assert!(text.contains("smart"));
    }

    #[test]
    fn test_rate_limit_detection() {
        let err = AgentError::ApiRequest {
            message: "too many requests".to_string(),
            status: Some(429),
        };
        assert!(err.is_rate_limited());
        assert_eq!(err.failure_kind(), "rate_limited");

        let err = AgentError::ApiRequest {
            message: "Rate limit reached for model".to_string(),
            status: None,
        };
        assert!(err.is_rate_limited());

        let err = AgentError::ApiRequest {
            message: "bad gateway".to_string(),
            status: Some(502),
        };
        assert!(!err.is_rate_limited());
        assert_eq!(err.failure_kind(), "error");
    }

    #[test]
    fn test_api_request_display_includes_status() {
        let err = AgentError::ApiRequest {
            message: "boom".to_string(),
            status: Some(500),
        };
        assert_eq!(err.to_string(), "API request failed (status 500): boom");
    }

    #[test]
    fn test_cancelled_is_not_rate_limited() {
        assert!(AgentError::Cancelled.is_cancelled());
        assert!(!AgentError::Cancelled.is_rate_limited());
        assert_eq!(AgentError::Cancelled.failure_kind(), "cancelled");
    }

    #[test]
    fn test_storage_error_conversion() {
        let err: Error = StorageError::NotInitialized.into();
        assert!(matches!(err, Error::Storage(StorageError::NotInitialized)));
    }
}
