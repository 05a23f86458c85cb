//! Pluggable LLM provider trait.
//!
//! A provider is pure transport: it turns a [`ChatRequest`] into one
//! completion. Backend naming, timeouts and fallback live in the
//! [`BrainRouter`](super::router::BrainRouter), so the same provider can
//! serve several logical backends with different models.

use async_trait::async_trait;

use super::message::{ChatRequest, ChatResponse};
use crate::error::AgentError;

/// Trait for LLM provider backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name (e.g., `"openai"`).
    fn name(&self) -> &'static str;

    /// Executes a chat completion request.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] on API failures or unparseable responses.
    /// Rate limiting should be reported as [`AgentError::ApiRequest`] with
    /// status 429 so the router can label it.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, AgentError>;
}
