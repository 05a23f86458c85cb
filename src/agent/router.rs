//! Brain Router: named LLM backends with one-shot fallback.
//!
//! Every pipeline stage asks the router for a backend by logical name
//! (`default`, `fast`, `smart`). The router runs the stage's operation
//! against that backend under a per-attempt timeout and, if it fails for
//! any reason other than caller cancellation, runs it once more against
//! the `default` backend.
//!
//! ```text
//! ATTEMPT_PRIMARY ─ ok ──────────────────────────────► DONE
//!        │ err (not cancelled, primary != default)
//!        ▼
//! observer(primary, err) ─► ATTEMPT_DEFAULT ─ ok ────► DONE
//!                                  │ err
//!                                  ▼
//!                        BackendsExhausted (FATAL)
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::agent::provider::LlmProvider;
use crate::error::AgentError;

/// Logical backend names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// General-purpose backend and the fallback target.
    Default,
    /// Low-latency backend (Stage-2 formatting).
    Fast,
    /// Strongest backend (Stage-1 tool calling).
    Smart,
}

impl BackendId {
    /// All backends in registration order.
    pub const ALL: [Self; 3] = [Self::Default, Self::Fast, Self::Smart];

    /// Parses a backend name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownBackend`] for unrecognised names.
    pub fn parse(name: &str) -> Result<Self, AgentError> {
        match name.trim().to_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "fast" => Ok(Self::Fast),
            "smart" => Ok(Self::Smart),
            _ => Err(AgentError::UnknownBackend {
                name: name.to_string(),
            }),
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Fast => "fast",
            Self::Smart => "smart",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provider bound to a model under a logical backend name.
#[derive(Clone)]
pub struct Brain {
    /// Logical name.
    pub id: BackendId,
    /// Transport used for chat completions.
    pub provider: Arc<dyn LlmProvider>,
    /// Model identifier sent with every request.
    pub model: String,
}

impl Brain {
    /// Creates a brain.
    #[must_use]
    pub fn new(id: BackendId, provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            id,
            provider,
            model: model.into(),
        }
    }
}

impl fmt::Debug for Brain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Brain")
            .field("id", &self.id)
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .finish()
    }
}

/// Callback invoked once per fallback with the failed backend and its error.
pub type FallbackObserver = Arc<dyn Fn(BackendId, &AgentError) + Send + Sync>;

/// Routes operations to named backends with automatic fallback to `default`.
pub struct BrainRouter {
    brains: BTreeMap<BackendId, Brain>,
    timeout: Duration,
    observer: Option<FallbackObserver>,
}

impl fmt::Debug for BrainRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrainRouter")
            .field("brains", &self.brains.values().collect::<Vec<_>>())
            .field("timeout", &self.timeout)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl BrainRouter {
    /// Creates a router whose `default` backend is `default`.
    #[must_use]
    pub fn new(default: Brain, timeout: Duration) -> Self {
        let mut brains = BTreeMap::new();
        brains.insert(
            BackendId::Default,
            Brain {
                id: BackendId::Default,
                ..default
            },
        );
        Self {
            brains,
            timeout,
            observer: None,
        }
    }

    /// Registers (or replaces) a backend.
    #[must_use]
    pub fn with_brain(mut self, brain: Brain) -> Self {
        self.brains.insert(brain.id, brain);
        self
    }

    /// Sets the fallback observer.
    #[must_use]
    pub fn with_observer(mut self, observer: FallbackObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Looks up a registered backend.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownBackend`] if `id` was never registered.
    pub fn brain(&self, id: BackendId) -> Result<&Brain, AgentError> {
        self.brains.get(&id).ok_or_else(|| AgentError::UnknownBackend {
            name: id.to_string(),
        })
    }

    /// Runs `op` against `backend`, retrying once on `default` when it fails.
    ///
    /// At most two backend calls are made. Cancellation aborts the pending
    /// attempt and is returned as [`AgentError::Cancelled`] without a retry.
    /// When `backend` is already `default` its error is returned as-is.
    ///
    /// # Errors
    ///
    /// - [`AgentError::Cancelled`] if `cancel` fires.
    /// - The primary error when the primary backend is `default`.
    /// - [`AgentError::BackendsExhausted`] when both attempts fail.
    pub async fn invoke_with_fallback<'a, T, F>(
        &'a self,
        backend: BackendId,
        operation: &str,
        op: F,
        cancel: &CancellationToken,
    ) -> Result<T, AgentError>
    where
        F: Fn(&'a Brain) -> BoxFuture<'a, Result<T, AgentError>>,
    {
        let primary = self.brain(backend)?;
        debug!(backend = %primary.id, model = %primary.model, operation, "invoking backend");

        let primary_err = match self.attempt(primary, op(primary), cancel).await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if primary_err.is_cancelled() || cancel.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        if primary.id == BackendId::Default {
            return Err(primary_err);
        }

        warn!(
            backend = %primary.id,
            operation,
            kind = primary_err.failure_kind(),
            error = %primary_err,
            "backend failed, falling back to default"
        );
        if let Some(observer) = &self.observer {
            observer(primary.id, &primary_err);
        }

        let fallback = self.brain(BackendId::Default)?;
        match self.attempt(fallback, op(fallback), cancel).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_cancelled() || cancel.is_cancelled() => Err(AgentError::Cancelled),
            Err(fallback_err) => {
                warn!(
                    backend = %fallback.id,
                    operation,
                    kind = fallback_err.failure_kind(),
                    error = %fallback_err,
                    "fallback backend failed"
                );
                Err(AgentError::BackendsExhausted {
                    primary: primary.id,
                    primary_error: primary_err.to_string(),
                    fallback_error: fallback_err.to_string(),
                })
            }
        }
    }

    async fn attempt<'a, T>(
        &self,
        brain: &'a Brain,
        fut: BoxFuture<'a, Result<T, AgentError>>,
        cancel: &CancellationToken,
    ) -> Result<T, AgentError> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(AgentError::Cancelled),
            result = tokio::time::timeout(self.timeout, fut) => {
                result.unwrap_or_else(|_| {
                    Err(AgentError::Timeout {
                        backend: brain.id,
                        seconds: self.timeout.as_secs(),
                    })
                })
            }
        }
    }
}
