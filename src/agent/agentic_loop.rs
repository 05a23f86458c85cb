//! Agentic tool-calling loop.
//!
//! Drives the LLM ↔ tool execution round-trip: sends a request to the model,
//! executes any tool calls in the response, appends results, and repeats
//! until the model produces a final text response or the iteration limit
//! is reached.

use tracing::debug;

use super::executor::ToolExecutor;
use super::message::{ChatRequest, ChatResponse, TokenUsage};
use super::provider::LlmProvider;
use crate::error::AgentError;

/// Runs an agentic loop: model → tool calls → tool results → model → …
///
/// Continues until the model responds without tool calls (i.e., it produces
/// a final text answer) or `max_iterations` is reached.
///
/// # Arguments
///
/// * `provider` - LLM provider to call.
/// * `request` - Initial chat request (mutated in-place with tool messages).
/// * `executor` - Dispatches tool calls to the gateway.
/// * `max_iterations` - Safety limit on round-trips.
///
/// # Returns
///
/// The final [`ChatResponse`] containing the model's text answer, with
/// usage summed over every round.
///
/// # Errors
///
/// Returns [`AgentError::ToolLoopExceeded`] if the model keeps requesting
/// tools beyond `max_iterations`. Propagates any provider errors.
pub async fn agentic_loop(
    provider: &dyn LlmProvider,
    request: &mut ChatRequest,
    executor: &ToolExecutor<'_>,
    max_iterations: usize,
) -> Result<ChatResponse, AgentError> {
    let mut usage = TokenUsage::default();

    for iteration in 0..max_iterations {
        let response = provider.chat(request).await?;
        usage += response.usage;

        if !response.wants_tools() {
            debug!(
                iteration,
                total_tokens = usage.total_tokens,
                "agentic loop completed with final text response"
            );
            return Ok(ChatResponse { usage, ..response });
        }

        debug!(
            iteration,
            tool_count = response.tool_calls.len(),
            "executing tool calls"
        );

        let results: Vec<_> = response
            .tool_calls
            .iter()
            .map(|call| {
                let result = executor.execute(call);
                debug!(
                    tool = call.name,
                    call_id = call.id,
                    is_error = result.is_error,
                    "tool execution complete"
                );
                result
            })
            .collect();
        request.push_tool_round(response.tool_calls, &results);
    }

    Err(AgentError::ToolLoopExceeded { max_iterations })
}
